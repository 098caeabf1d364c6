use serde::Serialize;
use std::collections::HashSet;

use crate::logic::PathResolver;
use crate::model::{ComponentGraph, Node, NodeId, NodeKind};

/// Nested, read-only view of the graph in display order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub label: String,
    pub full_path: String,
    /// Live depth, which can differ from a stale cached `level`
    pub depth: usize,
    pub expanded: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Roots in enumeration order; inside a route, endpoints come before subroutes.
    pub fn forest(graph: &ComponentGraph) -> Vec<TreeNode> {
        let mut visited = HashSet::new();
        graph
            .roots()
            .map(|root| Self::build(graph, root, 0, &mut visited))
            .collect()
    }

    fn build(
        graph: &ComponentGraph,
        node: &Node,
        depth: usize,
        visited: &mut HashSet<NodeId>,
    ) -> TreeNode {
        visited.insert(node.id);
        let children = graph
            .children_of(node.id)
            .into_iter()
            .filter(|child| !visited.contains(&child.id))
            .collect::<Vec<_>>()
            .into_iter()
            .map(|child| Self::build(graph, child, depth + 1, visited))
            .collect();

        TreeNode {
            id: node.id,
            kind: node.kind(),
            label: node.label(),
            full_path: PathResolver::full_path(graph, node),
            depth,
            expanded: node.expanded,
            children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::GraphMutator;

    #[test]
    fn forest_orders_endpoints_before_subroutes() {
        let graph = ComponentGraph::new();
        let (graph, api) = GraphMutator::create_at_root(&graph, NodeKind::Route);
        let (graph, sub) = GraphMutator::create_under_route(&graph, api, NodeKind::Route).unwrap();
        let (graph, ep) = GraphMutator::create_under_route(&graph, api, NodeKind::Endpoint).unwrap();
        let (graph, loose) = GraphMutator::create_at_root(&graph, NodeKind::Endpoint);

        let forest = TreeNode::forest(&graph);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].id, api);
        assert_eq!(forest[1].id, loose);

        let children: Vec<NodeId> = forest[0].children.iter().map(|c| c.id).collect();
        assert_eq!(children, vec![ep, sub]);
        assert_eq!(forest[0].children[1].full_path, "/api/subruta");
        assert_eq!(forest[0].children[1].depth, 1);
    }

    #[test]
    fn depth_reflects_moves_of_ancestors() {
        let graph = ComponentGraph::new();
        let (graph, api) = GraphMutator::create_at_root(&graph, NodeKind::Route);
        let (graph, sub) = GraphMutator::create_under_route(&graph, api, NodeKind::Route).unwrap();
        let (graph, ep) = GraphMutator::create_under_route(&graph, sub, NodeKind::Endpoint).unwrap();
        let graph = GraphMutator::move_to_root(&graph, sub).unwrap();

        let forest = TreeNode::forest(&graph);
        let moved = forest.iter().find(|n| n.id == sub).unwrap();
        assert_eq!(moved.children[0].id, ep);
        assert_eq!(moved.children[0].depth, 1);
        assert_eq!(graph.get(ep).unwrap().level, 2);
    }
}
