use thiserror::Error;

use crate::logic::validate::Violation;
use crate::model::NodeId;

/// Integrity failures found when a node list is turned into a graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Duplicate node id: {0}")]
    DuplicateNode(NodeId),

    #[error("Node id {0} is too large; ids must not exceed 2^53 - 1")]
    IdOutOfRange(NodeId),

    #[error("Node {child} references missing parent {parent}")]
    MissingParent { child: NodeId, parent: NodeId },

    #[error("Node {child} has parent {parent}, which is not a route")]
    ParentNotRoute { child: NodeId, parent: NodeId },

    #[error("Route {route} lists child {child} which does not exist")]
    DanglingChild { route: NodeId, child: NodeId },

    #[error("Route {route} lists child {child} in the wrong array or more than once")]
    ChildMismatch { route: NodeId, child: NodeId },

    #[error("Node {child} is not listed by its parent {parent}")]
    UnlistedChild { child: NodeId, parent: NodeId },

    #[error("Parent chain of node {0} contains a cycle")]
    Cycle(NodeId),

    #[error("Endpoint {node} has duplicate parameter '{name}'")]
    DuplicateParameter { node: NodeId, name: String },

    #[error("Endpoint {node} has duplicate response key '{key}'")]
    DuplicateResponseKey { node: NodeId, key: String },
}

/// A mutation that was refused. The graph it was applied to is unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node {0} is not an endpoint")]
    NotAnEndpoint(NodeId),

    #[error("Target route not found: {0}")]
    TargetNotFound(NodeId),

    #[error("A node cannot be nested inside itself: {0}")]
    SelfNesting(NodeId),

    #[error("Route {moved} cannot be moved under {target}: {target} is one of its descendants")]
    CircularNesting { moved: NodeId, target: NodeId },

    #[error("Response field '{0}' not found")]
    FieldNotFound(String),

    #[error("Response field key must not be empty")]
    InvalidFieldKey,

    #[error("Response field key '{0}' is already in use")]
    DuplicateFieldKey(String),

    #[error("Invalid status code '{0}': expected an integer between 100 and 599")]
    InvalidStatusCode(String),
}

impl MutationError {
    /// Structural rejections are shown to the user as a blocking notice.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            MutationError::CircularNesting { .. } | MutationError::SelfNesting(_)
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("API name must not be empty")]
    EmptyName,

    #[error("Port must be an integer between 1 and 65535, got {0}")]
    PortOutOfRange(i64),
}

/// Reasons an export request is blocked before any text is emitted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExportError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Graph has {} validation error(s)", .0.len())]
    Validation(Vec<Violation>),
}
