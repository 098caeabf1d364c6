use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashSet};

use crate::error::GraphError;
use crate::model::{EndpointData, Node, NodeBody, NodeId, NodeKind, RouteData};

/// Largest id accepted on import. Ids stay exact as JSON numbers in a
/// browser, and the allocator keeps room to grow past any imported id.
pub const MAX_NODE_ID: NodeId = NodeId((1 << 53) - 1);

/// Flat, addressable store of every route and endpoint in a project.
///
/// Readers only ever get shared references. Writes go through
/// [`GraphMutator`](crate::logic::GraphMutator), which works on a clone and
/// hands back the finished snapshot, so a reader never sees a half-applied
/// change.
///
/// Enumeration order is ascending id order. Ids are allocated monotonically,
/// so this is also creation order.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentGraph {
    nodes: BTreeMap<NodeId, Node>,
    next_id: u64,
}

impl Default for ComponentGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for ComponentGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.nodes.values())
    }
}

impl ComponentGraph {
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Build a graph from an uploaded node list, rejecting anything that breaks
    /// the structural invariants. Levels are recomputed from the parent chain.
    pub fn from_nodes(nodes: Vec<Node>) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        for node in nodes {
            let id = node.id;
            if id > MAX_NODE_ID {
                return Err(GraphError::IdOutOfRange(id));
            }
            if graph.nodes.insert(id, node).is_some() {
                return Err(GraphError::DuplicateNode(id));
            }
            graph.next_id = graph.next_id.max(id.0 + 1);
        }

        graph.check_integrity()?;

        let depths: Vec<(NodeId, u32)> = graph
            .nodes
            .keys()
            .map(|id| (*id, graph.depth(*id) as u32))
            .collect();
        for (id, depth) in depths {
            if let Some(node) = graph.nodes.get_mut(&id) {
                node.level = depth;
            }
        }

        Ok(graph)
    }

    pub fn to_nodes(&self) -> Vec<Node> {
        self.nodes.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn route(&self, id: NodeId) -> Option<&RouteData> {
        self.get(id).and_then(Node::as_route)
    }

    pub fn endpoint(&self, id: NodeId) -> Option<&EndpointData> {
        self.get(id).and_then(Node::as_endpoint)
    }

    /// All nodes in enumeration order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn routes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|n| n.is_route())
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|n| !n.is_route())
    }

    /// Nodes sitting at the forest root
    pub fn roots(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|n| n.parent_id.is_none())
    }

    /// Direct children of a route: endpoints first, then subroutes, each in
    /// list order. Unknown ids and endpoints have no children.
    pub fn children_of(&self, route_id: NodeId) -> Vec<&Node> {
        match self.route(route_id) {
            Some(route) => route
                .child_endpoint_ids
                .iter()
                .chain(route.child_route_ids.iter())
                .filter_map(|id| self.get(*id))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Parent chain of a node, nearest first.
    ///
    /// The walk stops at a missing parent or at the first repeated id, so it
    /// is bounded by the graph size even if parent links were inconsistent.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(id);

        let mut current = self.get(id).and_then(|n| n.parent_id);
        while let Some(parent_id) = current {
            if !visited.insert(parent_id) {
                break;
            }
            let Some(parent) = self.get(parent_id) else {
                break;
            };
            chain.push(parent_id);
            current = parent.parent_id;
        }

        chain
    }

    /// Whether `ancestor` appears in the parent chain of `id`
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.ancestors(id).contains(&ancestor)
    }

    /// Live depth of a node, independent of the cached `level`
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).len()
    }

    /// Every node reachable from a route through its child lists, excluding
    /// the route itself. Endpoints have no descendants.
    pub fn descendants(&self, route_id: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(route_id);

        let mut stack = vec![route_id];
        while let Some(current) = stack.pop() {
            let Some(route) = self.route(current) else {
                continue;
            };
            for child in route.child_endpoint_ids.iter().chain(&route.child_route_ids) {
                if visited.insert(*child) {
                    found.push(*child);
                    stack.push(*child);
                }
            }
        }

        found
    }

    /// Verify referential integrity, acyclicity and the uniqueness rules
    /// for child lists, parameter names and response keys.
    pub fn check_integrity(&self) -> Result<(), GraphError> {
        for node in self.nodes.values() {
            if let Some(parent_id) = node.parent_id {
                let parent = self.get(parent_id).ok_or(GraphError::MissingParent {
                    child: node.id,
                    parent: parent_id,
                })?;
                let route = parent.as_route().ok_or(GraphError::ParentNotRoute {
                    child: node.id,
                    parent: parent_id,
                })?;
                let listed = route
                    .children(node.kind())
                    .iter()
                    .filter(|c| **c == node.id)
                    .count();
                match listed {
                    0 => {
                        return Err(GraphError::UnlistedChild {
                            child: node.id,
                            parent: parent_id,
                        })
                    }
                    1 => {}
                    _ => {
                        return Err(GraphError::ChildMismatch {
                            route: parent_id,
                            child: node.id,
                        })
                    }
                }
            }

            match &node.body {
                NodeBody::Route(route) => self.check_route_children(node.id, route)?,
                NodeBody::Endpoint(endpoint) => check_endpoint_sets(node.id, endpoint)?,
            }
        }

        for id in self.nodes.keys() {
            // a chain that stops short of the root without a missing parent
            // can only have stopped on a repeated id
            let chain = self.ancestors(*id);
            let top = chain.last().copied().unwrap_or(*id);
            if self.get(top).and_then(|n| n.parent_id).is_some() {
                return Err(GraphError::Cycle(*id));
            }
        }

        Ok(())
    }

    fn check_route_children(&self, route_id: NodeId, route: &RouteData) -> Result<(), GraphError> {
        for kind in [NodeKind::Endpoint, NodeKind::Route] {
            for child_id in route.children(kind) {
                let child = self.get(*child_id).ok_or(GraphError::DanglingChild {
                    route: route_id,
                    child: *child_id,
                })?;
                if child.kind() != kind || child.parent_id != Some(route_id) {
                    return Err(GraphError::ChildMismatch {
                        route: route_id,
                        child: *child_id,
                    });
                }
            }
        }
        Ok(())
    }

    pub(crate) fn allocate_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Store a node whose id came from [`allocate_id`](Self::allocate_id)
    pub(crate) fn insert(&mut self, node: Node) {
        self.nodes.insert(node.id, node);
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: NodeId) -> Option<Node> {
        self.nodes.remove(&id)
    }
}

fn check_endpoint_sets(node_id: NodeId, endpoint: &EndpointData) -> Result<(), GraphError> {
    let lists = [
        &endpoint.route_params,
        &endpoint.query_params,
        &endpoint.body_params,
        &endpoint.header_params,
    ];
    for list in lists {
        let mut seen = HashSet::new();
        for name in list {
            if !seen.insert(name.as_str()) {
                return Err(GraphError::DuplicateParameter {
                    node: node_id,
                    name: name.clone(),
                });
            }
        }
    }

    for response in [&endpoint.success_response, &endpoint.error_response] {
        let mut seen = HashSet::new();
        for field in &response.fields {
            if !seen.insert(field.key.as_str()) {
                return Err(GraphError::DuplicateResponseKey {
                    node: node_id,
                    key: field.key.clone(),
                });
            }
        }
    }

    Ok(())
}
