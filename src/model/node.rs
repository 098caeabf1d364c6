use crate::model::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display label given to every freshly created route
pub const DEFAULT_ROUTE_NAME: &str = "Nueva Ruta";
/// Base path of a route created at the forest root
pub const ROOT_ROUTE_BASE_PATH: &str = "/api";
/// Base path of a route created inside another route
pub const NESTED_ROUTE_BASE_PATH: &str = "/subruta";
pub const DEFAULT_ENDPOINT_PATH: &str = "/example";

/// A single editable element of the API tree.
///
/// The graph owns every node; `parent_id` and the child id lists of a route
/// are plain references used for traversal only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,

    /// Route this node sits in, `None` at the forest root
    pub parent_id: Option<NodeId>,

    /// Depth recorded when the node was last placed (0 at the root)
    #[serde(default)]
    pub level: u32,

    /// Presentation flag for the editor, ignored by validation and emission
    #[serde(default)]
    pub expanded: bool,

    #[serde(flatten)]
    pub body: NodeBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeBody {
    Route(RouteData),
    Endpoint(EndpointData),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Route,
    Endpoint,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Route => write!(f, "route"),
            NodeKind::Endpoint => write!(f, "endpoint"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteData {
    pub name: String,

    /// Segment prefixed to the paths of everything inside this route
    pub base_path: String,

    #[serde(default)]
    pub child_endpoint_ids: Vec<NodeId>,

    #[serde(default)]
    pub child_route_ids: Vec<NodeId>,
}

impl RouteData {
    pub fn new(base_path: &str) -> Self {
        Self {
            name: DEFAULT_ROUTE_NAME.to_string(),
            base_path: base_path.to_string(),
            child_endpoint_ids: Vec::new(),
            child_route_ids: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.child_endpoint_ids.is_empty() && self.child_route_ids.is_empty()
    }

    /// Child list that holds nodes of the given kind
    pub fn children(&self, kind: NodeKind) -> &Vec<NodeId> {
        match kind {
            NodeKind::Route => &self.child_route_ids,
            NodeKind::Endpoint => &self.child_endpoint_ids,
        }
    }

    pub fn children_mut(&mut self, kind: NodeKind) -> &mut Vec<NodeId> {
        match kind {
            NodeKind::Route => &mut self.child_route_ids,
            NodeKind::Endpoint => &mut self.child_endpoint_ids,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Name of the Express registration call (`app.get`, `app.post`, ...)
    pub fn handler_name(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an endpoint reads its parameters from. Exactly one source is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    #[default]
    None,
    Route,
    Query,
    Body,
    Headers,
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ParameterType::None => "none",
            ParameterType::Route => "route",
            ParameterType::Query => "query",
            ParameterType::Body => "body",
            ParameterType::Headers => "headers",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseField {
    pub key: String,
    pub value: String,
}

impl ResponseField {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseTemplate {
    pub status_code: u16,
    #[serde(default)]
    pub fields: Vec<ResponseField>,
}

impl ResponseTemplate {
    pub fn default_success() -> Self {
        Self {
            status_code: 200,
            fields: vec![
                ResponseField::new("message", "Success"),
                ResponseField::new("data", "{}"),
            ],
        }
    }

    pub fn default_error() -> Self {
        Self {
            status_code: 500,
            fields: vec![ResponseField::new("error", "Internal server error")],
        }
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.fields.iter().any(|f| f.key == key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointData {
    pub method: HttpMethod,

    /// Segment appended to the resolved path of the parent route
    pub path: String,

    #[serde(default)]
    pub parameter_type: ParameterType,

    // Only the list matching `parameter_type` is active. The others are kept
    // so switching the type back restores them.
    #[serde(default)]
    pub route_params: Vec<String>,
    #[serde(default)]
    pub query_params: Vec<String>,
    #[serde(default)]
    pub body_params: Vec<String>,
    #[serde(default)]
    pub header_params: Vec<String>,

    pub success_response: ResponseTemplate,
    pub error_response: ResponseTemplate,
}

impl Default for EndpointData {
    fn default() -> Self {
        Self {
            method: HttpMethod::Get,
            path: DEFAULT_ENDPOINT_PATH.to_string(),
            parameter_type: ParameterType::None,
            route_params: Vec::new(),
            query_params: Vec::new(),
            body_params: Vec::new(),
            header_params: Vec::new(),
            success_response: ResponseTemplate::default_success(),
            error_response: ResponseTemplate::default_error(),
        }
    }
}

impl EndpointData {
    pub fn params(&self, source: ParameterType) -> Option<&Vec<String>> {
        match source {
            ParameterType::None => None,
            ParameterType::Route => Some(&self.route_params),
            ParameterType::Query => Some(&self.query_params),
            ParameterType::Body => Some(&self.body_params),
            ParameterType::Headers => Some(&self.header_params),
        }
    }

    pub fn params_mut(&mut self, source: ParameterType) -> Option<&mut Vec<String>> {
        match source {
            ParameterType::None => None,
            ParameterType::Route => Some(&mut self.route_params),
            ParameterType::Query => Some(&mut self.query_params),
            ParameterType::Body => Some(&mut self.body_params),
            ParameterType::Headers => Some(&mut self.header_params),
        }
    }

    /// Names from the currently selected source, empty when the type is `none`
    pub fn active_params(&self) -> &[String] {
        self.params(self.parameter_type)
            .map(|p| p.as_slice())
            .unwrap_or(&[])
    }

    pub fn response(&self, kind: ResponseKind) -> &ResponseTemplate {
        match kind {
            ResponseKind::Success => &self.success_response,
            ResponseKind::Error => &self.error_response,
        }
    }

    pub fn response_mut(&mut self, kind: ResponseKind) -> &mut ResponseTemplate {
        match kind {
            ResponseKind::Success => &mut self.success_response,
            ResponseKind::Error => &mut self.error_response,
        }
    }
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self.body {
            NodeBody::Route(_) => NodeKind::Route,
            NodeBody::Endpoint(_) => NodeKind::Endpoint,
        }
    }

    pub fn is_route(&self) -> bool {
        matches!(self.body, NodeBody::Route(_))
    }

    pub fn as_route(&self) -> Option<&RouteData> {
        match &self.body {
            NodeBody::Route(route) => Some(route),
            NodeBody::Endpoint(_) => None,
        }
    }

    pub fn as_route_mut(&mut self) -> Option<&mut RouteData> {
        match &mut self.body {
            NodeBody::Route(route) => Some(route),
            NodeBody::Endpoint(_) => None,
        }
    }

    pub fn as_endpoint(&self) -> Option<&EndpointData> {
        match &self.body {
            NodeBody::Endpoint(endpoint) => Some(endpoint),
            NodeBody::Route(_) => None,
        }
    }

    pub fn as_endpoint_mut(&mut self) -> Option<&mut EndpointData> {
        match &mut self.body {
            NodeBody::Endpoint(endpoint) => Some(endpoint),
            NodeBody::Route(_) => None,
        }
    }

    /// Label shown for the node: route name or `METHOD path`
    pub fn label(&self) -> String {
        match &self.body {
            NodeBody::Route(route) => route.name.clone(),
            NodeBody::Endpoint(endpoint) => format!("{} {}", endpoint.method, endpoint.path),
        }
    }
}

/// Partial update for PATCH-style edits.
/// Fields that do not apply to the node's variant are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_type: Option<ParameterType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expanded: Option<bool>,
}

impl Node {
    /// Shallow-merge the permitted fields of `update` into this node.
    pub fn apply_update(&mut self, update: &NodeUpdate) {
        if let Some(expanded) = update.expanded {
            self.expanded = expanded;
        }
        match &mut self.body {
            NodeBody::Route(route) => {
                if let Some(name) = &update.name {
                    route.name = name.clone();
                }
                if let Some(base_path) = &update.base_path {
                    route.base_path = base_path.clone();
                }
            }
            NodeBody::Endpoint(endpoint) => {
                if let Some(method) = update.method {
                    endpoint.method = method;
                }
                if let Some(path) = &update.path {
                    endpoint.path = path.clone();
                }
                if let Some(parameter_type) = update.parameter_type {
                    endpoint.parameter_type = parameter_type;
                }
            }
        }
    }
}
