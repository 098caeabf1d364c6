use route_forge::logic::emit::database;
use route_forge::{
    export, CodeEmitter, ComponentGraph, DatabaseType, DbConfig, ExportOptions, GraphMutator,
    HttpMethod, MutationError, NodeId, NodeKind, NodeUpdate, ParameterType, PathResolver,
    ResponseKind, Validator, ViolationKind,
};

/// Small deterministic generator so the property checks cover many shapes
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound.max(1)
    }
}

fn random_graph(seed: u64, size: usize) -> ComponentGraph {
    let mut rng = Lcg(seed);
    let mut graph = ComponentGraph::new();

    for i in 0..size {
        let routes: Vec<NodeId> = graph.routes().map(|n| n.id).collect();
        let kind = if rng.next(3) == 0 {
            NodeKind::Endpoint
        } else {
            NodeKind::Route
        };
        let id = if routes.is_empty() || rng.next(4) == 0 {
            let (next, id) = GraphMutator::create_at_root(&graph, kind);
            graph = next;
            id
        } else {
            let parent = routes[rng.next(routes.len())];
            let (next, id) = GraphMutator::create_under_route(&graph, parent, kind).unwrap();
            graph = next;
            id
        };

        let update = match kind {
            NodeKind::Route => NodeUpdate {
                base_path: Some(format!("/r{}", i % 4)),
                ..Default::default()
            },
            NodeKind::Endpoint => NodeUpdate {
                path: Some(format!("/e{}", i % 3)),
                ..Default::default()
            },
        };
        graph = GraphMutator::update_fields(&graph, id, &update).unwrap();
    }
    graph
}

fn concatenated_path(graph: &ComponentGraph, id: NodeId) -> String {
    let mut chain = graph.ancestors(id);
    chain.reverse();
    chain.push(id);
    chain
        .into_iter()
        .filter_map(|id| graph.get(id))
        .map(|node| match (node.as_route(), node.as_endpoint()) {
            (Some(route), _) => route.base_path.clone(),
            (_, Some(endpoint)) => endpoint.path.clone(),
            _ => String::new(),
        })
        .collect()
}

#[test]
fn paths_are_literal_concatenations() {
    for seed in 0..20 {
        let graph = random_graph(seed, 25);
        for node in graph.nodes() {
            assert_eq!(
                PathResolver::full_path(&graph, node),
                concatenated_path(&graph, node.id)
            );
        }
    }
}

#[test]
fn moving_a_route_into_its_subtree_is_always_rejected() {
    for seed in 0..20 {
        let graph = random_graph(seed, 25);
        for route in graph.routes() {
            for descendant in graph.descendants(route.id) {
                if !graph.get(descendant).is_some_and(|n| n.is_route()) {
                    continue;
                }
                let before = serde_json::to_string(&graph).unwrap();
                let result = GraphMutator::move_under_route(&graph, route.id, descendant);
                assert!(matches!(result, Err(MutationError::CircularNesting { .. })));
                assert_eq!(serde_json::to_string(&graph).unwrap(), before);
            }
        }
    }
}

#[test]
fn cascade_delete_removes_exactly_the_subtree() {
    for seed in 0..20 {
        let graph = random_graph(seed, 25);
        for route in graph.routes() {
            let mut expected = graph.descendants(route.id);
            expected.push(route.id);

            let (next, removed) = GraphMutator::delete_cascade(&graph, route.id).unwrap();
            assert_eq!(next.len(), graph.len() - expected.len());
            assert_eq!(removed.len(), expected.len());
            for id in &expected {
                assert!(!next.contains(*id));
            }
            for node in graph.nodes().filter(|n| !expected.contains(&n.id)) {
                let survivor = next.get(node.id).unwrap();
                assert_eq!(survivor.parent_id, node.parent_id);
                if Some(node.id) != route.parent_id {
                    assert_eq!(survivor.body, node.body);
                }
            }
        }
    }
}

#[test]
fn additions_are_idempotent() {
    let (graph, ep) = GraphMutator::create_at_root(&ComponentGraph::new(), NodeKind::Endpoint);

    let once = GraphMutator::add_parameter(&graph, ep, ParameterType::Headers, "X-Token").unwrap();
    let twice = GraphMutator::add_parameter(&once, ep, ParameterType::Headers, "X-Token").unwrap();
    assert_eq!(once, twice);

    let once = GraphMutator::add_response_field(&graph, ep, ResponseKind::Error, "code", "E1").unwrap();
    let twice = GraphMutator::add_response_field(&once, ep, ResponseKind::Error, "code", "E1").unwrap();
    assert_eq!(once, twice);
}

#[test]
fn validation_is_deterministic() {
    for seed in 0..20 {
        let graph = random_graph(seed, 30);
        let copy = ComponentGraph::from_nodes(graph.to_nodes()).unwrap();
        assert_eq!(Validator::validate(&graph), Validator::validate(&copy));
    }
}

#[test]
fn scenario_a_endpoint_moved_under_route() {
    let (graph, api) = GraphMutator::create_at_root(&ComponentGraph::new(), NodeKind::Route);
    let (graph, ep) = GraphMutator::create_at_root(&graph, NodeKind::Endpoint);
    let graph = GraphMutator::update_fields(
        &graph,
        ep,
        &NodeUpdate {
            method: Some(HttpMethod::Get),
            path: Some("/users".to_string()),
            ..Default::default()
        },
    )
    .unwrap();

    let graph = GraphMutator::move_under_route(&graph, ep, api).unwrap();
    let endpoint = graph.get(ep).unwrap();
    assert_eq!(PathResolver::endpoint_path(&graph, endpoint), "/api/users");
}

#[test]
fn scenario_b_duplicate_root_routes() {
    let (graph, _) = GraphMutator::create_at_root(&ComponentGraph::new(), NodeKind::Route);
    let (graph, _) = GraphMutator::create_at_root(&graph, NodeKind::Route);

    let violations = Validator::validate(&graph);
    let duplicates: Vec<_> = violations
        .iter()
        .filter(|v| v.kind == ViolationKind::Route)
        .collect();
    assert_eq!(duplicates.len(), 1);
    assert!(duplicates[0].message.contains("2 routes"));
}

#[test]
fn scenario_c_deep_circular_nesting() {
    let (graph, a) = GraphMutator::create_at_root(&ComponentGraph::new(), NodeKind::Route);
    let (graph, b) = GraphMutator::create_under_route(&graph, a, NodeKind::Route).unwrap();
    let (graph, c) = GraphMutator::create_under_route(&graph, b, NodeKind::Route).unwrap();

    for target in [b, c] {
        let result = GraphMutator::move_under_route(&graph, a, target);
        assert_eq!(
            result,
            Err(MutationError::CircularNesting { moved: a, target })
        );
    }
    assert_eq!(graph.get(a).unwrap().parent_id, None);
    assert_eq!(graph.route(a).unwrap().child_route_ids, vec![b]);
}

#[test]
fn scenario_d_response_literal_keeps_field_order() {
    let (graph, api) = GraphMutator::create_at_root(&ComponentGraph::new(), NodeKind::Route);
    let (graph, _) = GraphMutator::create_under_route(&graph, api, NodeKind::Endpoint).unwrap();

    let source = CodeEmitter::server_source(&graph, &ExportOptions::default());
    assert!(source.contains("res.status(200).json({ \"message\": \"Success\", \"data\": {} });"));
}

#[test]
fn scenario_e_mongodb_with_env() {
    let (graph, api) = GraphMutator::create_at_root(&ComponentGraph::new(), NodeKind::Route);
    let (graph, _) = GraphMutator::create_under_route(&graph, api, NodeKind::Endpoint).unwrap();
    let options = ExportOptions {
        use_env: true,
        db: DbConfig::enabled(DatabaseType::Mongodb),
        ..Default::default()
    };

    let bundle = export(&graph, &options).unwrap();
    assert_eq!(
        bundle.env.as_deref(),
        Some("PORT=3000\nMONGODB_URI=\nMONGODB_DB=\n")
    );

    for db_type in DatabaseType::ALL {
        let connector = database::template(db_type).connector;
        assert_eq!(
            bundle.server.contains(connector),
            db_type == DatabaseType::Mongodb,
            "{:?}",
            db_type
        );
    }
}
