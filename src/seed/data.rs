use crate::error::MutationError;
use crate::logic::GraphMutator;
use crate::model::{
    ComponentGraph, HttpMethod, NodeId, NodeKind, NodeUpdate, ParameterType, ResponseKind,
    SessionId,
};
use crate::store::SessionStore;
use anyhow::Result;

/// Open a session holding the sample bike shop API
pub async fn load_seed_data<S: SessionStore>(store: &S) -> Result<SessionId> {
    let graph = sample_graph()?;
    let session = store.create_session(graph).await?;
    let id = session.lock().id.clone();
    log::info!("Seed session {} ready", id);
    Ok(id)
}

/// A small catalog API that passes validation:
///
/// ```text
/// /api            Tienda
///   GET  /bikes
///   POST /bikes
///   /api/orders   Pedidos
///     GET    /:id
///     DELETE /:id
/// ```
pub fn sample_graph() -> Result<ComponentGraph, MutationError> {
    let graph = ComponentGraph::new();

    let (graph, shop) = GraphMutator::create_at_root(&graph, NodeKind::Route);
    let graph = GraphMutator::update_fields(
        &graph,
        shop,
        &NodeUpdate {
            name: Some("Tienda".to_string()),
            ..Default::default()
        },
    )?;

    let (graph, list_bikes) = add_endpoint(&graph, shop, HttpMethod::Get, "/bikes")?;
    let graph = GraphMutator::update_fields(
        &graph,
        list_bikes,
        &NodeUpdate {
            parameter_type: Some(ParameterType::Query),
            ..Default::default()
        },
    )?;
    let graph = GraphMutator::add_parameter(&graph, list_bikes, ParameterType::Query, "brand")?;
    let graph = GraphMutator::add_parameter(&graph, list_bikes, ParameterType::Query, "maxPrice")?;
    let graph = GraphMutator::add_response_field(&graph, list_bikes, ResponseKind::Success, "total", "0")?;

    let (graph, create_bike) = add_endpoint(&graph, shop, HttpMethod::Post, "/bikes")?;
    let graph = GraphMutator::update_fields(
        &graph,
        create_bike,
        &NodeUpdate {
            parameter_type: Some(ParameterType::Body),
            ..Default::default()
        },
    )?;
    let graph = GraphMutator::add_parameter(&graph, create_bike, ParameterType::Body, "model")?;
    let graph = GraphMutator::add_parameter(&graph, create_bike, ParameterType::Body, "price")?;
    let graph = GraphMutator::update_status_code(&graph, create_bike, ResponseKind::Success, "201")?;
    let graph = GraphMutator::update_status_code(&graph, create_bike, ResponseKind::Error, "400")?;

    let (graph, orders) = GraphMutator::create_under_route(&graph, shop, NodeKind::Route)?;
    let graph = GraphMutator::update_fields(
        &graph,
        orders,
        &NodeUpdate {
            name: Some("Pedidos".to_string()),
            base_path: Some("/orders".to_string()),
            ..Default::default()
        },
    )?;

    let (graph, get_order) = add_endpoint(&graph, orders, HttpMethod::Get, "/:id")?;
    let graph = with_route_param(&graph, get_order, "id")?;
    let graph = GraphMutator::update_status_code(&graph, get_order, ResponseKind::Error, "404")?;

    let (graph, delete_order) = add_endpoint(&graph, orders, HttpMethod::Delete, "/:id")?;
    let graph = with_route_param(&graph, delete_order, "id")?;

    Ok(graph)
}

fn add_endpoint(
    graph: &ComponentGraph,
    route: NodeId,
    method: HttpMethod,
    path: &str,
) -> Result<(ComponentGraph, NodeId), MutationError> {
    let (graph, id) = GraphMutator::create_under_route(graph, route, NodeKind::Endpoint)?;
    let graph = GraphMutator::update_fields(
        &graph,
        id,
        &NodeUpdate {
            method: Some(method),
            path: Some(path.to_string()),
            ..Default::default()
        },
    )?;
    Ok((graph, id))
}

fn with_route_param(
    graph: &ComponentGraph,
    endpoint: NodeId,
    name: &str,
) -> Result<ComponentGraph, MutationError> {
    let graph = GraphMutator::update_fields(
        graph,
        endpoint,
        &NodeUpdate {
            parameter_type: Some(ParameterType::Route),
            ..Default::default()
        },
    )?;
    GraphMutator::add_parameter(&graph, endpoint, ParameterType::Route, name)
}
