use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::logic::PathResolver;
use crate::model::{ComponentGraph, HttpMethod, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    /// Two or more routes share a base path under the same parent
    Route,
    /// Two or more endpoints share a method and full path
    Endpoint,
    /// A route with neither endpoints nor subroutes
    EmptyRoute,
    /// A nested route without endpoints of its own
    NestedRouteNoEndpoint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub valid: bool,
    pub violations: Vec<Violation>,
    pub route_count: usize,
    pub endpoint_count: usize,
}

/// Structural checks that must pass before code is emitted.
///
/// Checks run in a fixed order (duplicate routes, duplicate endpoints, empty
/// routes, nested routes without endpoints). Within each check, violations
/// follow the enumeration order of the graph, so the output is deterministic.
pub struct Validator;

impl Validator {
    pub fn validate(graph: &ComponentGraph) -> Vec<Violation> {
        let mut violations = Vec::new();

        Self::check_duplicate_routes(graph, &mut violations);
        Self::check_duplicate_endpoints(graph, &mut violations);
        Self::check_empty_routes(graph, &mut violations);
        Self::check_nested_routes_without_endpoints(graph, &mut violations);

        violations
    }

    pub fn report(graph: &ComponentGraph) -> ValidationReport {
        let violations = Self::validate(graph);
        ValidationReport {
            valid: violations.is_empty(),
            violations,
            route_count: graph.routes().count(),
            endpoint_count: graph.endpoints().count(),
        }
    }

    pub fn is_valid(graph: &ComponentGraph) -> bool {
        Self::validate(graph).is_empty()
    }

    fn check_duplicate_routes(graph: &ComponentGraph, violations: &mut Vec<Violation>) {
        let keys: Vec<(Option<NodeId>, &str)> = graph
            .routes()
            .filter_map(|node| {
                node.as_route()
                    .map(|route| (node.parent_id, route.base_path.as_str()))
            })
            .collect();
        let counts = keys.iter().counts();

        for key in keys.iter().unique() {
            let count = counts[key];
            if count < 2 {
                continue;
            }
            let (parent_id, base_path) = key;
            let parent_name = parent_id
                .and_then(|id| graph.route(id))
                .map(|route| route.name.as_str())
                .unwrap_or("root");
            violations.push(Violation {
                kind: ViolationKind::Route,
                message: format!(
                    "Duplicate route: base path '{}' is used by {} routes in '{}'",
                    base_path, count, parent_name
                ),
            });
        }
    }

    fn check_duplicate_endpoints(graph: &ComponentGraph, violations: &mut Vec<Violation>) {
        let keys: Vec<(HttpMethod, String)> = graph
            .endpoints()
            .filter_map(|node| {
                node.as_endpoint()
                    .map(|endpoint| (endpoint.method, PathResolver::endpoint_path(graph, node)))
            })
            .collect();
        let counts = keys.iter().counts();

        for key in keys.iter().unique() {
            let count = counts[key];
            if count < 2 {
                continue;
            }
            let (method, path) = key;
            violations.push(Violation {
                kind: ViolationKind::Endpoint,
                message: format!(
                    "Duplicate endpoint: {} {} is defined {} times",
                    method, path, count
                ),
            });
        }
    }

    fn check_empty_routes(graph: &ComponentGraph, violations: &mut Vec<Violation>) {
        for node in graph.routes() {
            let Some(route) = node.as_route() else {
                continue;
            };
            if route.is_empty() {
                violations.push(Violation {
                    kind: ViolationKind::EmptyRoute,
                    message: format!(
                        "Empty route: '{}' ({}) has no endpoints or subroutes",
                        PathResolver::route_path(graph, node),
                        route.name
                    ),
                });
            }
        }
    }

    fn check_nested_routes_without_endpoints(
        graph: &ComponentGraph,
        violations: &mut Vec<Violation>,
    ) {
        for node in graph.routes().filter(|n| n.parent_id.is_some()) {
            let Some(route) = node.as_route() else {
                continue;
            };
            if route.child_endpoint_ids.is_empty() {
                violations.push(Violation {
                    kind: ViolationKind::NestedRouteNoEndpoint,
                    message: format!(
                        "Nested route '{}' has no endpoints of its own",
                        PathResolver::route_path(graph, node)
                    ),
                });
            }
        }
    }
}
