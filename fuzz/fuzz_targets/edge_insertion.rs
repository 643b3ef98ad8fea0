#![no_main]

use ferrous_ioc::graph::{AcyclicGraph, GraphError, Vertex};
use libfuzzer_sys::fuzz_target;

#[derive(Clone)]
struct Node(u8);

impl Vertex for Node {
    type Id = u8;
    fn id(&self) -> u8 {
        self.0
    }
}

const VERTICES: u8 = 32;

fuzz_target!(|data: &[u8]| {
    let graph = AcyclicGraph::new();
    for id in 0..VERTICES {
        graph.add_vertex(Node(id)).unwrap();
    }

    // Byte pairs are edges; a third byte with the high bit set removes instead
    let mut accepted = 0usize;
    for chunk in data.chunks_exact(3) {
        let (from, to) = (chunk[0] % VERTICES, chunk[1] % VERTICES);
        if chunk[2] & 0x80 != 0 {
            if graph.remove_edge(&from, &to) {
                accepted -= 1;
            }
            continue;
        }
        match graph.add_edge(&from, &to) {
            Ok(()) => accepted += 1,
            Err(GraphError::EdgeExists { .. }) | Err(GraphError::EdgeCycle { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(graph.size(), accepted);
    let order: Vec<u8> = graph
        .topological()
        .collect::<Result<_, _>>()
        .expect("accepted edges must leave the graph acyclic");
    assert_eq!(order.len(), VERTICES as usize);
});
