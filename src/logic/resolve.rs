use crate::model::{ComponentGraph, Node, NodeBody, NodeId};

/// Computes the full URL path of a node from its ancestor chain.
///
/// Segments are concatenated exactly as written. No slash is inserted or
/// collapsed, so `/api` + `users` stays `/apiusers` and `/api/` + `/users`
/// stays `/api//users`.
pub struct PathResolver;

impl PathResolver {
    /// `basePath` of the route prefixed by the resolved path of its parent
    pub fn route_path(graph: &ComponentGraph, route: &Node) -> String {
        Self::full_path(graph, route)
    }

    /// `path` of the endpoint prefixed by the resolved path of its parent route
    pub fn endpoint_path(graph: &ComponentGraph, endpoint: &Node) -> String {
        Self::full_path(graph, endpoint)
    }

    /// Full path of any node that belongs to `graph`
    pub fn full_path(graph: &ComponentGraph, node: &Node) -> String {
        let mut path: String = graph
            .ancestors(node.id)
            .iter()
            .rev()
            .filter_map(|id| graph.get(*id))
            .map(segment)
            .collect();
        path.push_str(segment(node));
        path
    }

    pub fn path_of(graph: &ComponentGraph, id: NodeId) -> Option<String> {
        graph.get(id).map(|node| Self::full_path(graph, node))
    }
}

fn segment(node: &Node) -> &str {
    match &node.body {
        NodeBody::Route(route) => &route.base_path,
        NodeBody::Endpoint(endpoint) => &endpoint.path,
    }
}
