use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::api::handlers;
use crate::store::SessionStore;

pub fn create_router<S: SessionStore + 'static>() -> Router<Arc<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Sessions
        .route(
            "/sessions",
            get(handlers::list_sessions::<S>).post(handlers::create_session::<S>),
        )
        .route(
            "/sessions/:session_id",
            get(handlers::get_session::<S>).delete(handlers::delete_session::<S>),
        )
        // Snapshot views
        .route(
            "/sessions/:session_id/graph",
            get(handlers::get_graph::<S>).put(handlers::import_graph::<S>),
        )
        .route("/sessions/:session_id/tree", get(handlers::get_tree::<S>))
        // Nodes
        .route(
            "/sessions/:session_id/nodes",
            post(handlers::create_node::<S>),
        )
        .route(
            "/sessions/:session_id/nodes/:node_id",
            get(handlers::get_node::<S>)
                .patch(handlers::update_node::<S>)
                .delete(handlers::delete_node::<S>),
        )
        .route(
            "/sessions/:session_id/nodes/:node_id/expanded",
            put(handlers::set_node_expanded::<S>),
        )
        .route(
            "/sessions/:session_id/nodes/:node_id/move",
            post(handlers::move_node::<S>),
        )
        .route(
            "/sessions/:session_id/nodes/:node_id/path",
            get(handlers::get_node_path::<S>),
        )
        // Endpoint details
        .route(
            "/sessions/:session_id/nodes/:node_id/parameters",
            post(handlers::add_parameter::<S>).delete(handlers::remove_parameter::<S>),
        )
        .route(
            "/sessions/:session_id/nodes/:node_id/responses/:kind/fields",
            post(handlers::add_response_field::<S>)
                .patch(handlers::update_response_field::<S>)
                .delete(handlers::remove_response_field::<S>),
        )
        .route(
            "/sessions/:session_id/nodes/:node_id/responses/:kind/status",
            put(handlers::update_status_code::<S>),
        )
        // History
        .route("/sessions/:session_id/undo", post(handlers::undo::<S>))
        .route("/sessions/:session_id/redo", post(handlers::redo::<S>))
        // Validation and export
        .route(
            "/sessions/:session_id/validate",
            get(handlers::validate_session::<S>),
        )
        .route(
            "/sessions/:session_id/export",
            post(handlers::export_session::<S>),
        )
}
