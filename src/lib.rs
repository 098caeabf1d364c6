pub mod api;
pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

pub use error::{ConfigurationError, ExportError, GraphError, MutationError};

pub use logic::{
    export, CodeEmitter, GraphMutator, PathResolver, ValidationReport, Validator, Violation,
    ViolationKind,
};

// Export all model types
pub use model::*;

// Export store types
pub use store::{EditorSession, MemorySessionStore, SessionStore};

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;

/// Build the HTTP application for `store`, serving the editor front-end
/// from `server.static_dir` when one is configured.
pub fn build_app<S: SessionStore + 'static>(store: Arc<S>, config: &AppConfig) -> axum::Router {
    let router = api::routes::create_router::<S>();
    let router = match &config.server.static_dir {
        Some(dir) => {
            log::info!("Serving editor front-end from {}", dir);
            router.fallback_service(tower_http::services::ServeDir::new(dir))
        }
        None => router,
    };
    router.with_state(store)
}

/// Drop idle sessions on a fixed interval for as long as the store lives
pub fn spawn_session_eviction(store: Arc<MemorySessionStore>, every: Duration) {
    let store = Arc::downgrade(&store);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let Some(store) = store.upgrade() else {
                break;
            };
            let evicted = store.evict_expired().await;
            if evicted > 0 {
                log::info!("Evicted {} idle session(s)", evicted);
            }
        }
    });
}

/// Bind the configured address and serve until the process stops
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    use axum::serve;
    use tokio::net::TcpListener;

    let store = Arc::new(MemorySessionStore::new(
        config.session_ttl(),
        config.editor.history_limit,
    ));
    spawn_session_eviction(store.clone(), config.eviction_interval());

    if std::env::var("LOAD_SEED_DATA").unwrap_or_default() == "true" {
        let id = seed::load_seed_data(&*store).await?;
        log::info!("Loaded seed data into session {}", id);
    }

    let app = build_app(store, &config);

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    log::info!("route-forge editor running on http://{}", bind_address);

    serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_wire_format_uses_camel_case() {
        let (graph, api) = GraphMutator::create_at_root(&ComponentGraph::new(), NodeKind::Route);
        let (graph, _) = GraphMutator::create_under_route(&graph, api, NodeKind::Endpoint).unwrap();

        let json = serde_json::to_value(graph.to_nodes()).unwrap();
        let route = &json[0];
        assert_eq!(route["type"], "route");
        assert_eq!(route["basePath"], "/api");
        assert!(route["parentId"].is_null());
        assert_eq!(route["childEndpointIds"], serde_json::json!([2]));

        let endpoint = &json[1];
        assert_eq!(endpoint["type"], "endpoint");
        assert_eq!(endpoint["method"], "GET");
        assert_eq!(endpoint["parentId"], 1);
        assert_eq!(endpoint["parameterType"], "none");
        assert_eq!(endpoint["successResponse"]["statusCode"], 200);
    }

    #[test]
    fn node_list_survives_json() {
        let graph = seed::sample_graph().unwrap();
        let json = serde_json::to_string(&graph.to_nodes()).unwrap();
        let nodes: Vec<Node> = serde_json::from_str(&json).unwrap();
        let restored = ComponentGraph::from_nodes(nodes).unwrap();
        assert_eq!(restored, graph);
    }
}
