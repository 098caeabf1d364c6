use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Json as RequestJson,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{ExportError, GraphError, MutationError};
use crate::logic::{
    export, GraphMutator, PathResolver, ResponseFieldUpdate, ValidationReport, Validator,
    Violation,
};
use crate::model::{
    ComponentGraph, ExportBundle, ExportOptions, Node, NodeId, NodeKind, NodeUpdate,
    ParameterType, ResponseKind, SessionId, TreeNode,
};
use crate::store::{EditorSession, SessionStore, SessionSummary, SharedSession};

pub type AppState<S> = Arc<S>;

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
            violations: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

/// A node together with the values derived from its position in the graph
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeResponse {
    #[serde(flatten)]
    pub node: Node,
    pub full_path: String,
    pub depth: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathResponse {
    pub id: NodeId,
    pub full_path: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteNodeResponse {
    pub removed: Vec<NodeId>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub changed: bool,
    pub session: SessionSummary,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNodeRequest {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub parent_id: Option<NodeId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveNodeRequest {
    /// `None` moves the node to the root
    #[serde(default)]
    pub target_id: Option<NodeId>,
}

#[derive(Debug, Deserialize)]
pub struct ExpandedRequest {
    pub expanded: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterRequest {
    pub parameter_type: ParameterType,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ResponseFieldRequest {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponseFieldRequest {
    /// Key of the field being edited
    pub key: String,
    #[serde(default)]
    pub new_key: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveResponseFieldRequest {
    pub key: String,
}

/// Status codes arrive as typed by the user, either as a number or as text
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StatusCodeInput {
    Number(i64),
    Text(String),
}

impl StatusCodeInput {
    fn as_raw(&self) -> String {
        match self {
            StatusCodeInput::Number(n) => n.to_string(),
            StatusCodeInput::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCodeRequest {
    pub status_code: StatusCodeInput,
}

fn not_found(message: &str) -> ApiError {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new(message)))
}

fn internal_error(err: anyhow::Error) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(&err.to_string())),
    )
}

fn mutation_error(err: MutationError) -> ApiError {
    let status = match &err {
        MutationError::NodeNotFound(_)
        | MutationError::TargetNotFound(_)
        | MutationError::FieldNotFound(_) => StatusCode::NOT_FOUND,
        e if e.is_structural() => StatusCode::CONFLICT,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, Json(ErrorResponse::new(&err.to_string())))
}

fn import_error(err: GraphError) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(&err.to_string())))
}

fn export_error(err: ExportError) -> ApiError {
    let message = err.to_string();
    let violations = match err {
        ExportError::Validation(violations) => violations,
        ExportError::Configuration(_) => Vec::new(),
    };
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorResponse {
            error: message,
            violations,
        }),
    )
}

async fn load_session<S: SessionStore>(
    store: &S,
    session_id: &SessionId,
) -> Result<SharedSession, ApiError> {
    match store.get_session(session_id).await {
        Ok(Some(session)) => Ok(session),
        Ok(None) => Err(not_found(&format!("Session '{}' not found", session_id))),
        Err(e) => Err(internal_error(e)),
    }
}

fn node_response(graph: &ComponentGraph, node_id: NodeId) -> Result<Json<NodeResponse>, ApiError> {
    let node = graph
        .get(node_id)
        .ok_or_else(|| not_found(&format!("Node {} not found", node_id)))?;
    Ok(Json(NodeResponse {
        node: node.clone(),
        full_path: PathResolver::full_path(graph, node),
        depth: graph.depth(node_id),
    }))
}

/// Apply one mutation to the session and answer with the node it touched
fn mutate_node<F>(
    session: &mut EditorSession,
    node_id: NodeId,
    mutation: F,
) -> Result<Json<NodeResponse>, ApiError>
where
    F: FnOnce(&ComponentGraph) -> Result<ComponentGraph, MutationError>,
{
    session.apply(mutation).map_err(mutation_error)?;
    node_response(session.graph(), node_id)
}

// Sessions

pub async fn create_session<S: SessionStore>(
    State(store): State<AppState<S>>,
) -> Result<(StatusCode, Json<SessionSummary>), ApiError> {
    let session = store
        .create_session(ComponentGraph::new())
        .await
        .map_err(internal_error)?;
    let summary = session.lock().summary();
    Ok((StatusCode::CREATED, Json(summary)))
}

pub async fn list_sessions<S: SessionStore>(
    State(store): State<AppState<S>>,
) -> Result<Json<ListResponse<SessionId>>, ApiError> {
    let items = store.list_sessions().await.map_err(internal_error)?;
    let total = items.len();
    Ok(Json(ListResponse { items, total }))
}

pub async fn get_session<S: SessionStore>(
    State(store): State<AppState<S>>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<SessionSummary>, ApiError> {
    let session = load_session(&*store, &session_id).await?;
    let summary = session.lock().summary();
    Ok(Json(summary))
}

pub async fn delete_session<S: SessionStore>(
    State(store): State<AppState<S>>,
    Path(session_id): Path<SessionId>,
) -> Result<StatusCode, ApiError> {
    match store.delete_session(&session_id).await {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err(not_found(&format!("Session '{}' not found", session_id))),
        Err(e) => Err(internal_error(e)),
    }
}

// Snapshot views

pub async fn get_graph<S: SessionStore>(
    State(store): State<AppState<S>>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<Vec<Node>>, ApiError> {
    let session = load_session(&*store, &session_id).await?;
    let nodes = session.lock().graph().to_nodes();
    Ok(Json(nodes))
}

pub async fn import_graph<S: SessionStore>(
    State(store): State<AppState<S>>,
    Path(session_id): Path<SessionId>,
    RequestJson(nodes): RequestJson<Vec<Node>>,
) -> Result<Json<SessionSummary>, ApiError> {
    let shared = load_session(&*store, &session_id).await?;
    let mut session = shared.lock();
    if let Err(e) = session.import(nodes) {
        log::warn!("Rejected graph import for session {}: {}", session_id, e);
        return Err(import_error(e));
    }
    log::info!(
        "Imported {} node(s) into session {}",
        session.graph().len(),
        session_id
    );
    Ok(Json(session.summary()))
}

pub async fn get_tree<S: SessionStore>(
    State(store): State<AppState<S>>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<Vec<TreeNode>>, ApiError> {
    let session = load_session(&*store, &session_id).await?;
    let forest = TreeNode::forest(session.lock().graph());
    Ok(Json(forest))
}

// Nodes

pub async fn create_node<S: SessionStore>(
    State(store): State<AppState<S>>,
    Path(session_id): Path<SessionId>,
    RequestJson(request): RequestJson<CreateNodeRequest>,
) -> Result<(StatusCode, Json<NodeResponse>), ApiError> {
    let shared = load_session(&*store, &session_id).await?;
    let mut session = shared.lock();
    let node_id = match request.parent_id {
        Some(parent_id) => session
            .apply_with(|g| GraphMutator::create_under_route(g, parent_id, request.kind))
            .map_err(mutation_error)?,
        None => session
            .apply_with(|g| Ok(GraphMutator::create_at_root(g, request.kind)))
            .map_err(mutation_error)?,
    };
    let node = node_response(session.graph(), node_id)?;
    Ok((StatusCode::CREATED, node))
}

pub async fn get_node<S: SessionStore>(
    State(store): State<AppState<S>>,
    Path((session_id, node_id)): Path<(SessionId, NodeId)>,
) -> Result<Json<NodeResponse>, ApiError> {
    let shared = load_session(&*store, &session_id).await?;
    let session = shared.lock();
    node_response(session.graph(), node_id)
}

pub async fn update_node<S: SessionStore>(
    State(store): State<AppState<S>>,
    Path((session_id, node_id)): Path<(SessionId, NodeId)>,
    RequestJson(update): RequestJson<NodeUpdate>,
) -> Result<Json<NodeResponse>, ApiError> {
    let shared = load_session(&*store, &session_id).await?;
    let mut session = shared.lock();
    mutate_node(&mut session, node_id, |g| {
        GraphMutator::update_fields(g, node_id, &update)
    })
}

pub async fn set_node_expanded<S: SessionStore>(
    State(store): State<AppState<S>>,
    Path((session_id, node_id)): Path<(SessionId, NodeId)>,
    RequestJson(request): RequestJson<ExpandedRequest>,
) -> Result<Json<NodeResponse>, ApiError> {
    let shared = load_session(&*store, &session_id).await?;
    let mut session = shared.lock();
    mutate_node(&mut session, node_id, |g| {
        GraphMutator::set_expanded(g, node_id, request.expanded)
    })
}

pub async fn delete_node<S: SessionStore>(
    State(store): State<AppState<S>>,
    Path((session_id, node_id)): Path<(SessionId, NodeId)>,
) -> Result<Json<DeleteNodeResponse>, ApiError> {
    let shared = load_session(&*store, &session_id).await?;
    let mut session = shared.lock();
    let removed = session
        .apply_with(|g| GraphMutator::delete_cascade(g, node_id))
        .map_err(mutation_error)?;
    Ok(Json(DeleteNodeResponse { removed }))
}

pub async fn move_node<S: SessionStore>(
    State(store): State<AppState<S>>,
    Path((session_id, node_id)): Path<(SessionId, NodeId)>,
    RequestJson(request): RequestJson<MoveNodeRequest>,
) -> Result<Json<NodeResponse>, ApiError> {
    let shared = load_session(&*store, &session_id).await?;
    let mut session = shared.lock();
    mutate_node(&mut session, node_id, |g| match request.target_id {
        Some(target_id) => GraphMutator::move_under_route(g, node_id, target_id),
        None => GraphMutator::move_to_root(g, node_id),
    })
}

pub async fn get_node_path<S: SessionStore>(
    State(store): State<AppState<S>>,
    Path((session_id, node_id)): Path<(SessionId, NodeId)>,
) -> Result<Json<PathResponse>, ApiError> {
    let session = load_session(&*store, &session_id).await?;
    let full_path = PathResolver::path_of(session.lock().graph(), node_id)
        .ok_or_else(|| not_found(&format!("Node {} not found", node_id)))?;
    Ok(Json(PathResponse {
        id: node_id,
        full_path,
    }))
}

// Endpoint details

pub async fn add_parameter<S: SessionStore>(
    State(store): State<AppState<S>>,
    Path((session_id, node_id)): Path<(SessionId, NodeId)>,
    RequestJson(request): RequestJson<ParameterRequest>,
) -> Result<Json<NodeResponse>, ApiError> {
    let shared = load_session(&*store, &session_id).await?;
    let mut session = shared.lock();
    mutate_node(&mut session, node_id, |g| {
        GraphMutator::add_parameter(g, node_id, request.parameter_type, &request.name)
    })
}

pub async fn remove_parameter<S: SessionStore>(
    State(store): State<AppState<S>>,
    Path((session_id, node_id)): Path<(SessionId, NodeId)>,
    RequestJson(request): RequestJson<ParameterRequest>,
) -> Result<Json<NodeResponse>, ApiError> {
    let shared = load_session(&*store, &session_id).await?;
    let mut session = shared.lock();
    mutate_node(&mut session, node_id, |g| {
        GraphMutator::remove_parameter(g, node_id, request.parameter_type, &request.name)
    })
}

pub async fn add_response_field<S: SessionStore>(
    State(store): State<AppState<S>>,
    Path((session_id, node_id, kind)): Path<(SessionId, NodeId, ResponseKind)>,
    RequestJson(request): RequestJson<ResponseFieldRequest>,
) -> Result<Json<NodeResponse>, ApiError> {
    let shared = load_session(&*store, &session_id).await?;
    let mut session = shared.lock();
    mutate_node(&mut session, node_id, |g| {
        GraphMutator::add_response_field(g, node_id, kind, &request.key, &request.value)
    })
}

pub async fn update_response_field<S: SessionStore>(
    State(store): State<AppState<S>>,
    Path((session_id, node_id, kind)): Path<(SessionId, NodeId, ResponseKind)>,
    RequestJson(request): RequestJson<UpdateResponseFieldRequest>,
) -> Result<Json<NodeResponse>, ApiError> {
    let update = ResponseFieldUpdate {
        key: request.new_key,
        value: request.value,
    };
    let shared = load_session(&*store, &session_id).await?;
    let mut session = shared.lock();
    mutate_node(&mut session, node_id, |g| {
        GraphMutator::update_response_field(g, node_id, kind, &request.key, &update)
    })
}

pub async fn remove_response_field<S: SessionStore>(
    State(store): State<AppState<S>>,
    Path((session_id, node_id, kind)): Path<(SessionId, NodeId, ResponseKind)>,
    RequestJson(request): RequestJson<RemoveResponseFieldRequest>,
) -> Result<Json<NodeResponse>, ApiError> {
    let shared = load_session(&*store, &session_id).await?;
    let mut session = shared.lock();
    mutate_node(&mut session, node_id, |g| {
        GraphMutator::remove_response_field(g, node_id, kind, &request.key)
    })
}

pub async fn update_status_code<S: SessionStore>(
    State(store): State<AppState<S>>,
    Path((session_id, node_id, kind)): Path<(SessionId, NodeId, ResponseKind)>,
    RequestJson(request): RequestJson<StatusCodeRequest>,
) -> Result<Json<NodeResponse>, ApiError> {
    let raw = request.status_code.as_raw();
    let shared = load_session(&*store, &session_id).await?;
    let mut session = shared.lock();
    mutate_node(&mut session, node_id, |g| {
        GraphMutator::update_status_code(g, node_id, kind, &raw)
    })
}

// History

pub async fn undo<S: SessionStore>(
    State(store): State<AppState<S>>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let shared = load_session(&*store, &session_id).await?;
    let mut session = shared.lock();
    let changed = session.undo();
    Ok(Json(HistoryResponse {
        changed,
        session: session.summary(),
    }))
}

pub async fn redo<S: SessionStore>(
    State(store): State<AppState<S>>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let shared = load_session(&*store, &session_id).await?;
    let mut session = shared.lock();
    let changed = session.redo();
    Ok(Json(HistoryResponse {
        changed,
        session: session.summary(),
    }))
}

// Validation and export

pub async fn validate_session<S: SessionStore>(
    State(store): State<AppState<S>>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<ValidationReport>, ApiError> {
    let session = load_session(&*store, &session_id).await?;
    let report = Validator::report(session.lock().graph());
    Ok(Json(report))
}

pub async fn export_session<S: SessionStore>(
    State(store): State<AppState<S>>,
    Path(session_id): Path<SessionId>,
    RequestJson(options): RequestJson<ExportOptions>,
) -> Result<Json<ExportBundle>, ApiError> {
    let session = load_session(&*store, &session_id).await?;
    let graph = session.lock().graph().clone();
    export(&graph, &options).map(Json).map_err(export_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeId;

    #[test]
    fn mutation_errors_map_to_status_codes() {
        let cases = [
            (MutationError::NodeNotFound(NodeId(1)), StatusCode::NOT_FOUND),
            (MutationError::TargetNotFound(NodeId(1)), StatusCode::NOT_FOUND),
            (MutationError::SelfNesting(NodeId(1)), StatusCode::CONFLICT),
            (
                MutationError::CircularNesting {
                    moved: NodeId(1),
                    target: NodeId(2),
                },
                StatusCode::CONFLICT,
            ),
            (
                MutationError::InvalidStatusCode("abc".to_string()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (MutationError::NotAnEndpoint(NodeId(1)), StatusCode::UNPROCESSABLE_ENTITY),
        ];
        for (err, expected) in cases {
            assert_eq!(mutation_error(err).0, expected);
        }
    }

    #[test]
    fn status_code_input_accepts_numbers_and_text() {
        let number: StatusCodeRequest = serde_json::from_str(r#"{"statusCode": 201}"#).unwrap();
        assert_eq!(number.status_code.as_raw(), "201");

        let text: StatusCodeRequest = serde_json::from_str(r#"{"statusCode": "abc"}"#).unwrap();
        assert_eq!(text.status_code.as_raw(), "abc");
    }

    #[test]
    fn validation_export_error_carries_violations() {
        let violation = Violation {
            kind: crate::logic::ViolationKind::EmptyRoute,
            message: "Empty route".to_string(),
        };
        let (status, Json(body)) = export_error(ExportError::Validation(vec![violation]));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.violations.len(), 1);
    }
}
