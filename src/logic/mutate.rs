use serde::{Deserialize, Serialize};

use crate::error::MutationError;
use crate::model::{
    ComponentGraph, EndpointData, Node, NodeBody, NodeId, NodeKind, NodeUpdate, ParameterType,
    ResponseField, ResponseKind, RouteData, NESTED_ROUTE_BASE_PATH, ROOT_ROUTE_BASE_PATH,
};

pub type MutationResult<T = ComponentGraph> = Result<T, MutationError>;

/// Partial edit of a single response field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseFieldUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// The only writer of a [`ComponentGraph`].
///
/// Every operation reads the given snapshot and returns a new one; the input
/// is never touched. A rejected operation returns an error and produces no
/// snapshot at all, so the caller keeps the graph it had.
pub struct GraphMutator;

impl GraphMutator {
    pub fn create_at_root(graph: &ComponentGraph, kind: NodeKind) -> (ComponentGraph, NodeId) {
        let mut next = graph.clone();
        let id = next.allocate_id();
        next.insert(new_node(id, None, 0, kind, ROOT_ROUTE_BASE_PATH));
        log::debug!("Created {} {} at root", kind, id);
        (next, id)
    }

    pub fn create_under_route(
        graph: &ComponentGraph,
        route_id: NodeId,
        kind: NodeKind,
    ) -> MutationResult<(ComponentGraph, NodeId)> {
        let parent_level = graph
            .get(route_id)
            .filter(|n| n.is_route())
            .map(|n| n.level)
            .ok_or(MutationError::TargetNotFound(route_id))?;

        let mut next = graph.clone();
        let id = next.allocate_id();
        next.insert(new_node(
            id,
            Some(route_id),
            parent_level + 1,
            kind,
            NESTED_ROUTE_BASE_PATH,
        ));
        attach(&mut next, route_id, id, kind);
        log::debug!("Created {} {} under route {}", kind, id, route_id);
        Ok((next, id))
    }

    /// Detach a node from its parent and place it at the forest root.
    /// Descendants of a moved route keep their recorded `level`.
    pub fn move_to_root(graph: &ComponentGraph, node_id: NodeId) -> MutationResult {
        let node = graph
            .get(node_id)
            .ok_or(MutationError::NodeNotFound(node_id))?;
        let kind = node.kind();

        let mut next = graph.clone();
        detach(&mut next, node_id, kind);
        if let Some(node) = next.get_mut(node_id) {
            node.parent_id = None;
            node.level = 0;
        }
        log::debug!("Moved {} {} to root", kind, node_id);
        Ok(next)
    }

    /// Re-parent a node under `target_id`.
    ///
    /// A route may not be moved into its own subtree: if the route appears in
    /// the target's ancestor chain the move is refused with
    /// [`MutationError::CircularNesting`].
    pub fn move_under_route(
        graph: &ComponentGraph,
        node_id: NodeId,
        target_id: NodeId,
    ) -> MutationResult {
        let node = graph
            .get(node_id)
            .ok_or(MutationError::NodeNotFound(node_id))?;
        let target_level = graph
            .get(target_id)
            .filter(|n| n.is_route())
            .map(|n| n.level)
            .ok_or(MutationError::TargetNotFound(target_id))?;
        if node_id == target_id {
            return Err(MutationError::SelfNesting(node_id));
        }

        let kind = node.kind();
        if kind == NodeKind::Route
            && (graph.is_ancestor(node_id, target_id)
                || graph.descendants(node_id).contains(&target_id))
        {
            log::warn!(
                "Rejected move of route {} under its descendant {}",
                node_id,
                target_id
            );
            return Err(MutationError::CircularNesting {
                moved: node_id,
                target: target_id,
            });
        }

        let mut next = graph.clone();
        detach(&mut next, node_id, kind);
        attach(&mut next, target_id, node_id, kind);
        if let Some(node) = next.get_mut(node_id) {
            node.parent_id = Some(target_id);
            node.level = target_level + 1;
        }
        log::debug!("Moved {} {} under route {}", kind, node_id, target_id);
        Ok(next)
    }

    /// Remove a node. A route takes every transitive descendant with it.
    /// Returns the new snapshot and the ids that were removed.
    pub fn delete_cascade(
        graph: &ComponentGraph,
        node_id: NodeId,
    ) -> MutationResult<(ComponentGraph, Vec<NodeId>)> {
        let node = graph
            .get(node_id)
            .ok_or(MutationError::NodeNotFound(node_id))?;
        let kind = node.kind();

        let mut removed = vec![node_id];
        if kind == NodeKind::Route {
            removed.extend(graph.descendants(node_id));
        }

        let mut next = graph.clone();
        detach(&mut next, node_id, kind);
        for id in &removed {
            next.remove(*id);
        }
        log::debug!("Deleted {} {} ({} node(s))", kind, node_id, removed.len());
        Ok((next, removed))
    }

    pub fn update_fields(
        graph: &ComponentGraph,
        node_id: NodeId,
        update: &NodeUpdate,
    ) -> MutationResult {
        modify_node(graph, node_id, |node| {
            node.apply_update(update);
            Ok(())
        })
    }

    pub fn set_expanded(graph: &ComponentGraph, node_id: NodeId, expanded: bool) -> MutationResult {
        modify_node(graph, node_id, |node| {
            node.expanded = expanded;
            Ok(())
        })
    }

    /// Append a parameter name to one of the endpoint's sets. Blank names,
    /// names already present and the `none` source leave the graph as is.
    pub fn add_parameter(
        graph: &ComponentGraph,
        node_id: NodeId,
        source: ParameterType,
        name: &str,
    ) -> MutationResult {
        modify_endpoint(graph, node_id, |endpoint| {
            if name.trim().is_empty() {
                return Ok(());
            }
            if let Some(params) = endpoint.params_mut(source) {
                if !params.iter().any(|p| p == name) {
                    params.push(name.to_string());
                }
            }
            Ok(())
        })
    }

    pub fn remove_parameter(
        graph: &ComponentGraph,
        node_id: NodeId,
        source: ParameterType,
        name: &str,
    ) -> MutationResult {
        modify_endpoint(graph, node_id, |endpoint| {
            if let Some(params) = endpoint.params_mut(source) {
                params.retain(|p| p != name);
            }
            Ok(())
        })
    }

    /// Append a field to a response template. Empty keys and keys already in
    /// the template leave the graph as is.
    pub fn add_response_field(
        graph: &ComponentGraph,
        node_id: NodeId,
        kind: ResponseKind,
        key: &str,
        value: &str,
    ) -> MutationResult {
        modify_endpoint(graph, node_id, |endpoint| {
            let response = endpoint.response_mut(kind);
            if !key.trim().is_empty() && !response.has_key(key) {
                response.fields.push(ResponseField::new(key, value));
            }
            Ok(())
        })
    }

    pub fn remove_response_field(
        graph: &ComponentGraph,
        node_id: NodeId,
        kind: ResponseKind,
        key: &str,
    ) -> MutationResult {
        modify_endpoint(graph, node_id, |endpoint| {
            endpoint.response_mut(kind).fields.retain(|f| f.key != key);
            Ok(())
        })
    }

    /// Edit the field currently stored under `key`. Renaming it to an empty
    /// key or to a key held by another field is refused.
    pub fn update_response_field(
        graph: &ComponentGraph,
        node_id: NodeId,
        kind: ResponseKind,
        key: &str,
        update: &ResponseFieldUpdate,
    ) -> MutationResult {
        modify_endpoint(graph, node_id, |endpoint| {
            let response = endpoint.response_mut(kind);
            let index = response
                .fields
                .iter()
                .position(|f| f.key == key)
                .ok_or_else(|| MutationError::FieldNotFound(key.to_string()))?;

            if let Some(new_key) = &update.key {
                if new_key.trim().is_empty() {
                    return Err(MutationError::InvalidFieldKey);
                }
                if new_key != key && response.has_key(new_key) {
                    return Err(MutationError::DuplicateFieldKey(new_key.clone()));
                }
            }

            let field = &mut response.fields[index];
            if let Some(new_key) = &update.key {
                field.key = new_key.clone();
            }
            if let Some(value) = &update.value {
                field.value = value.clone();
            }
            Ok(())
        })
    }

    /// Set a status code from raw user input. The text must be an integer in
    /// `100..=599`; anything else is refused rather than coerced.
    pub fn update_status_code(
        graph: &ComponentGraph,
        node_id: NodeId,
        kind: ResponseKind,
        raw: &str,
    ) -> MutationResult {
        let status_code = parse_status_code(raw)?;
        modify_endpoint(graph, node_id, |endpoint| {
            endpoint.response_mut(kind).status_code = status_code;
            Ok(())
        })
    }
}

pub fn parse_status_code(raw: &str) -> Result<u16, MutationError> {
    raw.trim()
        .parse::<u16>()
        .ok()
        .filter(|code| (100..=599).contains(code))
        .ok_or_else(|| MutationError::InvalidStatusCode(raw.to_string()))
}

fn new_node(
    id: NodeId,
    parent_id: Option<NodeId>,
    level: u32,
    kind: NodeKind,
    route_base_path: &str,
) -> Node {
    let body = match kind {
        NodeKind::Route => NodeBody::Route(RouteData::new(route_base_path)),
        NodeKind::Endpoint => NodeBody::Endpoint(EndpointData::default()),
    };
    Node {
        id,
        parent_id,
        level,
        expanded: true,
        body,
    }
}

/// Strip `node_id` from the child list of its current parent, if any
fn detach(graph: &mut ComponentGraph, node_id: NodeId, kind: NodeKind) {
    let Some(parent_id) = graph.get(node_id).and_then(|n| n.parent_id) else {
        return;
    };
    if let Some(route) = graph.get_mut(parent_id).and_then(Node::as_route_mut) {
        route.children_mut(kind).retain(|c| *c != node_id);
    }
}

/// Append `node_id` to the matching child list of `route_id` unless present
fn attach(graph: &mut ComponentGraph, route_id: NodeId, node_id: NodeId, kind: NodeKind) {
    if let Some(route) = graph.get_mut(route_id).and_then(Node::as_route_mut) {
        let children = route.children_mut(kind);
        if !children.contains(&node_id) {
            children.push(node_id);
        }
    }
}

fn modify_node<F>(graph: &ComponentGraph, node_id: NodeId, edit: F) -> MutationResult
where
    F: FnOnce(&mut Node) -> Result<(), MutationError>,
{
    let mut next = graph.clone();
    let node = next
        .get_mut(node_id)
        .ok_or(MutationError::NodeNotFound(node_id))?;
    edit(node)?;
    Ok(next)
}

fn modify_endpoint<F>(graph: &ComponentGraph, node_id: NodeId, edit: F) -> MutationResult
where
    F: FnOnce(&mut EndpointData) -> Result<(), MutationError>,
{
    modify_node(graph, node_id, |node| {
        let endpoint = node
            .as_endpoint_mut()
            .ok_or(MutationError::NotAnEndpoint(node_id))?;
        edit(endpoint)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HttpMethod;

    /// api(/api) -> [ep(/example), v1(/subruta) -> [ep(/example)]]
    fn sample() -> (ComponentGraph, NodeId, NodeId, NodeId, NodeId) {
        let graph = ComponentGraph::new();
        let (graph, api) = GraphMutator::create_at_root(&graph, NodeKind::Route);
        let (graph, ep) = GraphMutator::create_under_route(&graph, api, NodeKind::Endpoint).unwrap();
        let (graph, v1) = GraphMutator::create_under_route(&graph, api, NodeKind::Route).unwrap();
        let (graph, inner) = GraphMutator::create_under_route(&graph, v1, NodeKind::Endpoint).unwrap();
        (graph, api, ep, v1, inner)
    }

    #[test]
    fn create_uses_factory_defaults() {
        let (graph, api, ep, v1, _) = sample();
        let api_node = graph.get(api).unwrap();
        assert_eq!(api_node.level, 0);
        assert_eq!(api_node.as_route().unwrap().base_path, "/api");
        assert_eq!(api_node.as_route().unwrap().name, "Nueva Ruta");

        let v1_node = graph.get(v1).unwrap();
        assert_eq!(v1_node.level, 1);
        assert_eq!(v1_node.as_route().unwrap().base_path, "/subruta");

        let endpoint = graph.endpoint(ep).unwrap();
        assert_eq!(endpoint.method, HttpMethod::Get);
        assert_eq!(endpoint.path, "/example");

        let route = graph.route(api).unwrap();
        assert_eq!(route.child_endpoint_ids, vec![ep]);
        assert_eq!(route.child_route_ids, vec![v1]);
        assert!(graph.check_integrity().is_ok());
    }

    #[test]
    fn create_under_missing_or_endpoint_target_fails() {
        let (graph, _, ep, _, _) = sample();
        assert_eq!(
            GraphMutator::create_under_route(&graph, NodeId(99), NodeKind::Route).unwrap_err(),
            MutationError::TargetNotFound(NodeId(99))
        );
        assert_eq!(
            GraphMutator::create_under_route(&graph, ep, NodeKind::Endpoint).unwrap_err(),
            MutationError::TargetNotFound(ep)
        );
    }

    #[test]
    fn input_snapshot_is_never_modified() {
        let (graph, api, ..) = sample();
        let before = graph.clone();
        let _ = GraphMutator::delete_cascade(&graph, api).unwrap();
        let _ = GraphMutator::move_to_root(&graph, api).unwrap();
        assert_eq!(graph, before);
    }

    #[test]
    fn move_to_root_detaches_without_touching_descendant_levels() {
        let (graph, api, _, v1, inner) = sample();
        let graph = GraphMutator::move_to_root(&graph, v1).unwrap();

        let v1_node = graph.get(v1).unwrap();
        assert_eq!(v1_node.parent_id, None);
        assert_eq!(v1_node.level, 0);
        assert!(graph.route(api).unwrap().child_route_ids.is_empty());
        assert_eq!(graph.get(inner).unwrap().level, 2);
        assert_eq!(graph.depth(inner), 1);
        assert!(graph.check_integrity().is_ok());
    }

    #[test]
    fn move_under_route_reparents_and_appends_once() {
        let (graph, api, ep, v1, _) = sample();
        let graph = GraphMutator::move_under_route(&graph, ep, v1).unwrap();
        let graph = GraphMutator::move_under_route(&graph, ep, v1).unwrap();

        assert!(graph.route(api).unwrap().child_endpoint_ids.is_empty());
        let v1_route = graph.route(v1).unwrap();
        assert_eq!(v1_route.child_endpoint_ids.iter().filter(|c| **c == ep).count(), 1);
        let ep_node = graph.get(ep).unwrap();
        assert_eq!(ep_node.parent_id, Some(v1));
        assert_eq!(ep_node.level, 2);
        assert!(graph.check_integrity().is_ok());
    }

    #[test]
    fn moving_route_into_its_subtree_is_rejected() {
        let (graph, api, _, v1, _) = sample();
        let err = GraphMutator::move_under_route(&graph, api, v1).unwrap_err();
        assert_eq!(
            err,
            MutationError::CircularNesting {
                moved: api,
                target: v1
            }
        );
        assert!(err.is_structural());
    }

    #[test]
    fn move_rejects_self_and_unknown_ids() {
        let (graph, api, ep, ..) = sample();
        assert_eq!(
            GraphMutator::move_under_route(&graph, api, api).unwrap_err(),
            MutationError::SelfNesting(api)
        );
        assert_eq!(
            GraphMutator::move_under_route(&graph, NodeId(77), api).unwrap_err(),
            MutationError::NodeNotFound(NodeId(77))
        );
        assert_eq!(
            GraphMutator::move_under_route(&graph, api, ep).unwrap_err(),
            MutationError::TargetNotFound(ep)
        );
        assert_eq!(
            GraphMutator::move_to_root(&graph, NodeId(77)).unwrap_err(),
            MutationError::NodeNotFound(NodeId(77))
        );
    }

    #[test]
    fn delete_route_cascades_to_all_descendants() {
        let (graph, api, ep, v1, inner) = sample();
        let (graph, loose) = GraphMutator::create_at_root(&graph, NodeKind::Endpoint);
        let (after, mut removed) = GraphMutator::delete_cascade(&graph, v1).unwrap();

        removed.sort();
        assert_eq!(removed, vec![v1, inner]);
        assert_eq!(after.len(), graph.len() - 2);
        assert!(after.contains(api) && after.contains(ep) && after.contains(loose));
        assert!(after.route(api).unwrap().child_route_ids.is_empty());
        assert!(after.check_integrity().is_ok());
    }

    #[test]
    fn delete_endpoint_strips_parent_reference() {
        let (graph, api, ep, ..) = sample();
        let (graph, removed) = GraphMutator::delete_cascade(&graph, ep).unwrap();
        assert_eq!(removed, vec![ep]);
        assert!(graph.route(api).unwrap().child_endpoint_ids.is_empty());
    }

    #[test]
    fn parameters_are_unique_and_ignore_blank_names() {
        let (graph, _, ep, ..) = sample();
        let once = GraphMutator::add_parameter(&graph, ep, ParameterType::Query, "page").unwrap();
        let twice = GraphMutator::add_parameter(&once, ep, ParameterType::Query, "page").unwrap();
        assert_eq!(once, twice);

        let blank = GraphMutator::add_parameter(&twice, ep, ParameterType::Query, "  ").unwrap();
        assert_eq!(blank, twice);

        let cased = GraphMutator::add_parameter(&twice, ep, ParameterType::Query, "Page").unwrap();
        assert_eq!(cased.endpoint(ep).unwrap().query_params, vec!["page", "Page"]);

        let removed = GraphMutator::remove_parameter(&cased, ep, ParameterType::Query, "page").unwrap();
        assert_eq!(removed.endpoint(ep).unwrap().query_params, vec!["Page"]);
    }

    #[test]
    fn parameters_on_route_are_rejected() {
        let (graph, api, ..) = sample();
        assert_eq!(
            GraphMutator::add_parameter(&graph, api, ParameterType::Body, "x").unwrap_err(),
            MutationError::NotAnEndpoint(api)
        );
    }

    #[test]
    fn response_fields_keep_unique_keys() {
        let (graph, _, ep, ..) = sample();
        let graph =
            GraphMutator::add_response_field(&graph, ep, ResponseKind::Success, "count", "0").unwrap();
        let again =
            GraphMutator::add_response_field(&graph, ep, ResponseKind::Success, "count", "1").unwrap();
        assert_eq!(graph, again);

        let err = GraphMutator::update_response_field(
            &graph,
            ep,
            ResponseKind::Success,
            "count",
            &ResponseFieldUpdate {
                key: Some("message".to_string()),
                value: None,
            },
        )
        .unwrap_err();
        assert_eq!(err, MutationError::DuplicateFieldKey("message".to_string()));

        let graph = GraphMutator::update_response_field(
            &graph,
            ep,
            ResponseKind::Success,
            "count",
            &ResponseFieldUpdate {
                key: Some("total".to_string()),
                value: Some("10".to_string()),
            },
        )
        .unwrap();
        let fields = &graph.endpoint(ep).unwrap().success_response.fields;
        assert_eq!(fields[2], ResponseField::new("total", "10"));

        let graph =
            GraphMutator::remove_response_field(&graph, ep, ResponseKind::Success, "message").unwrap();
        let keys: Vec<&str> = graph.endpoint(ep).unwrap().success_response.fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["data", "total"]);
    }

    #[test]
    fn status_code_input_is_validated() {
        let (graph, _, ep, ..) = sample();
        let graph =
            GraphMutator::update_status_code(&graph, ep, ResponseKind::Error, " 404 ").unwrap();
        assert_eq!(graph.endpoint(ep).unwrap().error_response.status_code, 404);

        for raw in ["", "abc", "12.5", "99", "600", "-200", "NaN"] {
            assert_eq!(
                GraphMutator::update_status_code(&graph, ep, ResponseKind::Error, raw).unwrap_err(),
                MutationError::InvalidStatusCode(raw.to_string())
            );
        }
    }
}
