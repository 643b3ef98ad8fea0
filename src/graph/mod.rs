//! Generic directed acyclic graph with cycle-safe edge insertion.
//!
//! Nodes live in a flat arena indexed by a stable id; edges are adjacency
//! lists of arena indices. Every mutation and lookup takes the single
//! reader-writer lock guarding the whole graph, and traversals snapshot the
//! adjacency under the read lock before handing back a lazy iterator.

use std::fmt;
use std::hash::Hash;

use ahash::AHashMap;
use parking_lot::RwLock;
use smallvec::SmallVec;
use thiserror::Error;

mod traverse;

pub use traverse::{Bfs, Topological};
use traverse::Snapshot;

/// Payload stored in an [`AcyclicGraph`].
///
/// The id must be derived from the payload itself so that inserting the same
/// logical vertex twice is detected.
pub trait Vertex {
    /// Stable identifier of the vertex
    type Id: Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static;

    /// Id of this payload.
    fn id(&self) -> Self::Id;
}

pub(crate) type Children = SmallVec<[usize; 4]>;

/// Errors raised by graph mutation and traversal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A vertex with the same id is already stored
    #[error("vertex '{0}' already exists in graph")]
    DuplicateVertex(String),
    /// Referenced vertex does not exist
    #[error("no vertex with id '{0}'")]
    MissingVertex(String),
    /// The edge is already present
    #[error("edge '{from}' -> '{to}' already exists")]
    EdgeExists { from: String, to: String },
    /// The edge would close a cycle and was rolled back
    #[error("edge '{from}' -> '{to}' would create a cycle")]
    EdgeCycle { from: String, to: String },
    /// Topological traversal could not visit every vertex
    #[error("graph has a cycle, topological traversal visited {visited} of {total} vertices")]
    Cycle { visited: usize, total: usize },
}

/// In/out edge counts of a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Degree {
    /// Number of edges pointing at the vertex
    pub incoming: usize,
    /// Number of edges leaving the vertex
    pub outgoing: usize,
}

/// A vertex and its ordered children.
#[derive(Debug, Clone)]
pub struct GraphNode<T: Vertex> {
    id: T::Id,
    value: T,
    children: Children,
}

impl<T: Vertex> GraphNode<T> {
    pub fn id(&self) -> T::Id {
        self.id
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// True when no edge leaves this vertex.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

struct GraphInner<T: Vertex> {
    nodes: Vec<GraphNode<T>>,
    index: AHashMap<T::Id, usize>,
    size: usize,
}

impl<T: Vertex> GraphInner<T> {
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: AHashMap::new(),
            size: 0,
        }
    }

    fn position(&self, id: &T::Id) -> Result<usize, GraphError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::MissingVertex(id.to_string()))
    }

    /// Depth-first search from `start` tracking the recursion stack.
    fn has_cycle_from(&self, start: usize) -> bool {
        let mut visited = vec![false; self.nodes.len()];
        let mut on_stack = vec![false; self.nodes.len()];
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        visited[start] = true;
        on_stack[start] = true;

        while let Some(frame) = stack.last_mut() {
            let (node, next) = *frame;
            match self.nodes[node].children.get(next) {
                Some(&child) => {
                    frame.1 += 1;
                    if on_stack[child] {
                        return true;
                    }
                    if !visited[child] {
                        visited[child] = true;
                        on_stack[child] = true;
                        stack.push((child, 0));
                    }
                }
                None => {
                    on_stack[node] = false;
                    stack.pop();
                }
            }
        }
        false
    }

    fn in_degrees(&self) -> Vec<usize> {
        let mut in_degree = vec![0; self.nodes.len()];
        for node in &self.nodes {
            for &child in &node.children {
                in_degree[child] += 1;
            }
        }
        in_degree
    }

    fn snapshot(&self) -> Snapshot<T::Id> {
        Snapshot {
            ids: self.nodes.iter().map(|n| n.id).collect(),
            children: self.nodes.iter().map(|n| n.children.clone()).collect(),
        }
    }
}

/// Directed acyclic graph guarded by one reader-writer lock.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::graph::{AcyclicGraph, GraphError, Vertex};
///
/// struct Task(&'static str);
/// impl Vertex for Task {
///     type Id = &'static str;
///     fn id(&self) -> &'static str { self.0 }
/// }
///
/// let graph = AcyclicGraph::new();
/// graph.add_vertex(Task("fetch")).unwrap();
/// graph.add_vertex(Task("parse")).unwrap();
/// graph.add_edge(&"fetch", &"parse").unwrap();
///
/// assert!(matches!(graph.add_edge(&"parse", &"fetch"), Err(GraphError::EdgeCycle { .. })));
///
/// let order: Vec<_> = graph.topological().collect::<Result<_, _>>().unwrap();
/// assert_eq!(order, vec!["fetch", "parse"]);
/// ```
pub struct AcyclicGraph<T: Vertex> {
    inner: RwLock<GraphInner<T>>,
}

impl<T: Vertex> Default for AcyclicGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Vertex> fmt::Debug for AcyclicGraph<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("AcyclicGraph")
            .field("order", &inner.nodes.len())
            .field("size", &inner.size)
            .finish()
    }
}

impl<T: Vertex> AcyclicGraph<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(GraphInner::new()),
        }
    }

    /// Adds a vertex, returning its id.
    ///
    /// Fails with [`GraphError::DuplicateVertex`] if a vertex with the same id
    /// is already present; the existing vertex is left untouched.
    pub fn add_vertex(&self, value: T) -> Result<T::Id, GraphError> {
        let id = value.id();
        let mut inner = self.inner.write();
        if inner.index.contains_key(&id) {
            return Err(GraphError::DuplicateVertex(id.to_string()));
        }
        let position = inner.nodes.len();
        inner.nodes.push(GraphNode {
            id,
            value,
            children: Children::new(),
        });
        inner.index.insert(id, position);
        Ok(id)
    }

    /// Adds the directed edge `from -> to`.
    ///
    /// The edge is appended and the subgraph reachable from `from` is checked
    /// for a cycle. On a cycle the edge is removed again and
    /// [`GraphError::EdgeCycle`] is returned, so the graph stays acyclic.
    pub fn add_edge(&self, from: &T::Id, to: &T::Id) -> Result<(), GraphError> {
        let mut inner = self.inner.write();
        let from_idx = inner.position(from)?;
        let to_idx = inner.position(to)?;

        if inner.nodes[from_idx].children.contains(&to_idx) {
            return Err(GraphError::EdgeExists {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        inner.nodes[from_idx].children.push(to_idx);
        if inner.has_cycle_from(from_idx) {
            inner.nodes[from_idx].children.pop();
            return Err(GraphError::EdgeCycle {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        inner.size += 1;
        Ok(())
    }

    /// Removes the edge `from -> to`. Returns false if it did not exist.
    pub fn remove_edge(&self, from: &T::Id, to: &T::Id) -> bool {
        let mut inner = self.inner.write();
        let (Ok(from_idx), Ok(to_idx)) = (inner.position(from), inner.position(to)) else {
            return false;
        };
        let children = &mut inner.nodes[from_idx].children;
        match children.iter().position(|&c| c == to_idx) {
            Some(pos) => {
                children.remove(pos);
                inner.size -= 1;
                true
            }
            None => false,
        }
    }

    /// Returns a clone of the payload stored under `id`.
    pub fn get(&self, id: &T::Id) -> Option<T>
    where
        T: Clone,
    {
        let inner = self.inner.read();
        inner
            .index
            .get(id)
            .map(|&position| inner.nodes[position].value.clone())
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.inner.read().index.contains_key(id)
    }

    /// All payloads in insertion order.
    pub fn vertices(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.inner.read().nodes.iter().map(|n| n.value.clone()).collect()
    }

    /// Number of vertices.
    pub fn order(&self) -> usize {
        self.inner.read().nodes.len()
    }

    /// Number of edges.
    pub fn size(&self) -> usize {
        self.inner.read().size
    }

    /// Ids of the direct children of `id`, in edge insertion order.
    pub fn children(&self, id: &T::Id) -> Result<Vec<T::Id>, GraphError> {
        let inner = self.inner.read();
        let position = inner.position(id)?;
        Ok(inner.nodes[position]
            .children
            .iter()
            .map(|&c| inner.nodes[c].id)
            .collect())
    }

    /// Ids of the vertices with an edge into `id`.
    pub fn parents(&self, id: &T::Id) -> Result<Vec<T::Id>, GraphError> {
        let inner = self.inner.read();
        let position = inner.position(id)?;
        Ok(inner
            .nodes
            .iter()
            .filter(|n| n.children.contains(&position))
            .map(|n| n.id)
            .collect())
    }

    /// True when no edge leaves `id`.
    pub fn is_leaf(&self, id: &T::Id) -> Result<bool, GraphError> {
        let inner = self.inner.read();
        let position = inner.position(id)?;
        Ok(inner.nodes[position].is_leaf())
    }

    /// True when no edge points at `id`.
    pub fn is_root(&self, id: &T::Id) -> Result<bool, GraphError> {
        let inner = self.inner.read();
        let position = inner.position(id)?;
        Ok(!inner.nodes.iter().any(|n| n.children.contains(&position)))
    }

    /// Ids of every in-degree-0 vertex, in insertion order.
    pub fn roots(&self) -> Vec<T::Id> {
        let inner = self.inner.read();
        inner
            .in_degrees()
            .iter()
            .zip(&inner.nodes)
            .filter(|(&degree, _)| degree == 0)
            .map(|(_, node)| node.id)
            .collect()
    }

    /// In/out degree of every vertex, computed in one pass.
    pub fn degrees(&self) -> AHashMap<T::Id, Degree> {
        let inner = self.inner.read();
        inner
            .in_degrees()
            .into_iter()
            .zip(&inner.nodes)
            .map(|(incoming, node)| {
                (
                    node.id,
                    Degree {
                        incoming,
                        outgoing: node.children.len(),
                    },
                )
            })
            .collect()
    }

    /// Breadth-first traversal of the whole graph, seeded from every root.
    pub fn bfs(&self) -> Bfs<T::Id> {
        let inner = self.inner.read();
        let seeds: Vec<usize> = inner
            .in_degrees()
            .iter()
            .enumerate()
            .filter(|(_, &degree)| degree == 0)
            .map(|(position, _)| position)
            .collect();
        inner.snapshot().bfs(seeds)
    }

    /// Breadth-first traversal starting at `start`.
    pub fn bfs_from(&self, start: &T::Id) -> Result<Bfs<T::Id>, GraphError> {
        let inner = self.inner.read();
        let position = inner.position(start)?;
        Ok(inner.snapshot().bfs(vec![position]))
    }

    /// Kahn's topological order over the whole graph.
    ///
    /// Yields `Err(GraphError::Cycle)` as the final item if some vertex could
    /// not be reached with in-degree zero.
    pub fn topological(&self) -> Topological<T::Id> {
        self.inner.read().snapshot().topological(None)
    }

    /// Topological order over `start` and everything reachable from it.
    pub fn topological_from(&self, start: &T::Id) -> Result<Topological<T::Id>, GraphError> {
        let inner = self.inner.read();
        let position = inner.position(start)?;
        let snapshot = inner.snapshot();
        let members = snapshot.reachable_from(position);
        Ok(snapshot.topological(Some(members)))
    }

    /// Topological order over `target` and everything that can reach it.
    ///
    /// The last item is always `target`.
    pub fn topological_to(&self, target: &T::Id) -> Result<Topological<T::Id>, GraphError> {
        let inner = self.inner.read();
        let position = inner.position(target)?;
        let snapshot = inner.snapshot();
        let members = snapshot.reaching(position);
        Ok(snapshot.topological(Some(members)))
    }

    /// Drops every vertex and edge.
    pub fn clear(&self) {
        *self.inner.write() = GraphInner::new();
    }
}
