use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

use crate::error::{GraphError, MutationError};
use crate::model::{generate_session_id, ComponentGraph, Node, SessionId};

/// One user's editing state: the current graph snapshot plus history.
///
/// Commands are applied one at a time. Each successful change swaps in the
/// new snapshot as a whole and records the previous one for undo.
#[derive(Debug, Clone)]
pub struct EditorSession {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    graph: ComponentGraph,
    undo_stack: VecDeque<ComponentGraph>,
    redo_stack: Vec<ComponentGraph>,
    history_limit: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: SessionId,
    pub created_at: String,
    pub updated_at: String,
    pub node_count: usize,
    pub route_count: usize,
    pub endpoint_count: usize,
    pub can_undo: bool,
    pub can_redo: bool,
}

impl EditorSession {
    pub fn new(history_limit: usize) -> Self {
        Self::with_graph(ComponentGraph::new(), history_limit)
    }

    pub fn with_graph(graph: ComponentGraph, history_limit: usize) -> Self {
        let now = Utc::now();
        Self {
            id: generate_session_id(),
            created_at: now,
            updated_at: now,
            graph,
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            history_limit,
        }
    }

    pub fn graph(&self) -> &ComponentGraph {
        &self.graph
    }

    /// Run a mutation against the current snapshot and keep its result.
    pub fn apply<F>(&mut self, mutation: F) -> Result<(), MutationError>
    where
        F: FnOnce(&ComponentGraph) -> Result<ComponentGraph, MutationError>,
    {
        let next = mutation(&self.graph)?;
        self.commit(next);
        Ok(())
    }

    /// Like [`apply`](Self::apply) for mutations that also return a value,
    /// such as the id of a created node.
    pub fn apply_with<T, F>(&mut self, mutation: F) -> Result<T, MutationError>
    where
        F: FnOnce(&ComponentGraph) -> Result<(ComponentGraph, T), MutationError>,
    {
        let (next, value) = mutation(&self.graph)?;
        self.commit(next);
        Ok(value)
    }

    /// Replace the whole graph with an uploaded node list
    pub fn import(&mut self, nodes: Vec<Node>) -> Result<(), GraphError> {
        let next = ComponentGraph::from_nodes(nodes)?;
        self.commit(next);
        Ok(())
    }

    pub fn undo(&mut self) -> bool {
        match self.undo_stack.pop_back() {
            Some(previous) => {
                let current = std::mem::replace(&mut self.graph, previous);
                self.redo_stack.push(current);
                self.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.redo_stack.pop() {
            Some(next) => {
                let current = std::mem::replace(&mut self.graph, next);
                self.push_undo(current);
                self.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            created_at: self.created_at.to_rfc3339(),
            updated_at: self.updated_at.to_rfc3339(),
            node_count: self.graph.len(),
            route_count: self.graph.routes().count(),
            endpoint_count: self.graph.endpoints().count(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        }
    }

    fn commit(&mut self, next: ComponentGraph) {
        // no-op mutations (duplicate parameter, blank name, ...) leave history alone
        if next == self.graph {
            return;
        }
        let previous = std::mem::replace(&mut self.graph, next);
        self.push_undo(previous);
        self.redo_stack.clear();
        self.updated_at = Utc::now();
    }

    fn push_undo(&mut self, snapshot: ComponentGraph) {
        if self.history_limit == 0 {
            return;
        }
        if self.undo_stack.len() == self.history_limit {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::GraphMutator;
    use crate::model::{NodeKind, ParameterType};

    #[test]
    fn undo_and_redo_walk_snapshots() {
        let mut session = EditorSession::new(10);
        let api = session
            .apply_with(|g| Ok(GraphMutator::create_at_root(g, NodeKind::Route)))
            .unwrap();
        session
            .apply_with(|g| GraphMutator::create_under_route(g, api, NodeKind::Endpoint))
            .unwrap();
        assert_eq!(session.graph().len(), 2);

        assert!(session.undo());
        assert_eq!(session.graph().len(), 1);
        assert!(session.undo());
        assert!(session.graph().is_empty());
        assert!(!session.undo());

        assert!(session.redo());
        assert_eq!(session.graph().len(), 1);
        assert!(session.can_redo());
    }

    #[test]
    fn new_change_clears_redo() {
        let mut session = EditorSession::new(10);
        session
            .apply_with(|g| Ok(GraphMutator::create_at_root(g, NodeKind::Route)))
            .unwrap();
        session.undo();
        session
            .apply_with(|g| Ok(GraphMutator::create_at_root(g, NodeKind::Endpoint)))
            .unwrap();
        assert!(!session.can_redo());
    }

    #[test]
    fn rejected_and_noop_mutations_do_not_touch_history() {
        let mut session = EditorSession::new(10);
        let ep = session
            .apply_with(|g| Ok(GraphMutator::create_at_root(g, NodeKind::Endpoint)))
            .unwrap();
        session
            .apply(|g| GraphMutator::add_parameter(g, ep, ParameterType::Query, "q"))
            .unwrap();
        let before = session.graph().clone();

        session
            .apply(|g| GraphMutator::add_parameter(g, ep, ParameterType::Query, "q"))
            .unwrap();
        assert!(session.apply(|g| GraphMutator::move_to_root(g, crate::model::NodeId(999))).is_err());

        assert_eq!(session.graph(), &before);
        assert!(session.undo());
        assert!(session.undo());
        assert!(!session.undo());
    }

    #[test]
    fn history_is_bounded() {
        let mut session = EditorSession::new(2);
        for _ in 0..5 {
            session
                .apply_with(|g| Ok(GraphMutator::create_at_root(g, NodeKind::Route)))
                .unwrap();
        }
        assert!(session.undo());
        assert!(session.undo());
        assert!(!session.undo());
        assert_eq!(session.graph().len(), 3);
    }

    #[test]
    fn failed_import_keeps_graph() {
        let mut session = EditorSession::new(10);
        session
            .apply_with(|g| Ok(GraphMutator::create_at_root(g, NodeKind::Route)))
            .unwrap();
        let mut nodes = session.graph().to_nodes();
        nodes.push(nodes[0].clone());

        assert!(session.import(nodes).is_err());
        assert_eq!(session.graph().len(), 1);
    }
}
