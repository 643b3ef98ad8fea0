/// Property-based tests for the acyclic graph
///
/// Random edge sequences are fed to the graph; whatever is accepted must
/// keep it acyclic and every traversal must agree with the accepted edges.

use ferrous_ioc::graph::{AcyclicGraph, GraphError, Vertex};
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone)]
struct Node(u8);

impl Vertex for Node {
    type Id = u8;
    fn id(&self) -> u8 {
        self.0
    }
}

fn graph_with(vertices: u8) -> AcyclicGraph<Node> {
    let graph = AcyclicGraph::new();
    for id in 0..vertices {
        graph.add_vertex(Node(id)).unwrap();
    }
    graph
}

fn position_of(order: &[u8], id: u8) -> usize {
    order.iter().position(|&v| v == id).unwrap()
}

proptest! {
    #[test]
    fn accepted_edges_keep_graph_acyclic(
        vertices in 1u8..16,
        edges in prop::collection::vec((0u8..16, 0u8..16), 0..64),
    ) {
        let graph = graph_with(vertices);
        let mut accepted: HashSet<(u8, u8)> = HashSet::new();

        for (from, to) in edges {
            let (from, to) = (from % vertices, to % vertices);
            match graph.add_edge(&from, &to) {
                Ok(()) => {
                    prop_assert!(accepted.insert((from, to)));
                }
                Err(GraphError::EdgeExists { .. }) => {
                    prop_assert!(accepted.contains(&(from, to)));
                }
                Err(GraphError::EdgeCycle { .. }) => {
                    prop_assert!(!accepted.contains(&(from, to)));
                }
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
            }
        }

        prop_assert_eq!(graph.size(), accepted.len());

        // A complete topological order exists and respects every edge
        let order: Vec<u8> = graph.topological().collect::<Result<_, _>>().unwrap();
        prop_assert_eq!(order.len(), vertices as usize);
        for &(from, to) in &accepted {
            prop_assert!(position_of(&order, from) < position_of(&order, to));
        }
    }

    #[test]
    fn restricted_orders_cover_reachability(
        vertices in 2u8..12,
        edges in prop::collection::vec((0u8..12, 0u8..12), 0..40),
        pick in 0u8..12,
    ) {
        let graph = graph_with(vertices);
        for (from, to) in edges {
            let _ = graph.add_edge(&(from % vertices), &(to % vertices));
        }
        let pick = pick % vertices;

        let descendants: Vec<u8> = graph
            .topological_from(&pick)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        let reached: HashSet<u8> = graph.bfs_from(&pick).unwrap().collect();
        prop_assert_eq!(descendants[0], pick);
        prop_assert_eq!(descendants.iter().copied().collect::<HashSet<_>>(), reached);

        let ancestors: Vec<u8> = graph
            .topological_to(&pick)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        prop_assert_eq!(*ancestors.last().unwrap(), pick);
        for id in &ancestors {
            let from_ancestor: HashSet<u8> = graph.bfs_from(id).unwrap().collect();
            prop_assert!(from_ancestor.contains(&pick));
        }
    }
}

#[test]
fn test_missing_vertices_are_reported() {
    let graph = graph_with(2);
    assert!(matches!(
        graph.add_edge(&0, &9),
        Err(GraphError::MissingVertex(_))
    ));
    assert!(matches!(
        graph.add_vertex(Node(1)),
        Err(GraphError::DuplicateVertex(_))
    ));
    assert!(graph.topological_to(&9).is_err());
    assert!(!graph.remove_edge(&0, &1));
}

#[test]
fn test_degrees_roots_and_parents() {
    let graph = graph_with(4);
    graph.add_edge(&0, &1).unwrap();
    graph.add_edge(&0, &2).unwrap();
    graph.add_edge(&1, &3).unwrap();
    graph.add_edge(&2, &3).unwrap();

    assert_eq!(graph.roots(), vec![0]);
    assert_eq!(graph.children(&0).unwrap(), vec![1, 2]);
    assert_eq!(graph.parents(&3).unwrap(), vec![1, 2]);
    assert!(graph.is_root(&0).unwrap());
    assert!(graph.is_leaf(&3).unwrap());

    let degrees = graph.degrees();
    assert_eq!(degrees[&3].incoming, 2);
    assert_eq!(degrees[&0].outgoing, 2);

    let bfs: Vec<u8> = graph.bfs().collect();
    assert_eq!(bfs, vec![0, 1, 2, 3]);

    assert!(graph.remove_edge(&2, &3));
    assert_eq!(graph.size(), 3);
    graph.clear();
    assert_eq!(graph.order(), 0);
}
