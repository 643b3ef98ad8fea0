//! Service registry: the domain view of the dependency graph.
//!
//! Maps specifications to [`ServiceNode`]s, creates placeholders for
//! dependencies that are not bound yet and turns graph errors into
//! [`DiError`]s. Edges always run from the dependency to the dependent, so a
//! topological walk of the graph is directly a valid build order.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{DiError, DiResult};
use crate::factory::Factory;
use crate::graph::{AcyclicGraph, GraphError, Topological};
use crate::key::{Key, ServiceId};
use crate::lifetime::Lifetime;
use crate::service::ServiceNode;

/// Registry of every specification known to a container.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    graph: AcyclicGraph<Arc<ServiceNode>>,
    // Serialises bind so its edge bookkeeping sees a stable node
    binding: Mutex<()>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the node for `key`, creating an unbound placeholder if needed.
    pub fn ensure_node(&self, key: Key) -> DiResult<Arc<ServiceNode>> {
        if let Some(node) = self.lookup(&key) {
            return Ok(node);
        }

        let node = Arc::new(ServiceNode::placeholder(key));
        match self.graph.add_vertex(node.clone()) {
            Ok(_) => {
                tracing::trace!(spec = key.display_name(), id = %node.id(), "created placeholder");
                Ok(node)
            }
            // Lost a race against another registration of the same key
            Err(GraphError::DuplicateVertex(_)) => self
                .lookup(&key)
                .ok_or_else(|| DiError::Unknown(format!("vertex for '{key}' vanished"))),
            Err(e) => Err(DiError::Unknown(e.to_string())),
        }
    }

    /// Binds `factory` to the specification `key`.
    ///
    /// The factory must provide exactly `key`. For every declared dependency
    /// a node is ensured and a `dependency -> key` edge added. If any edge is
    /// rejected, the edges added by this call are removed again and the
    /// binding is left as it was.
    ///
    /// Rebinding a bound specification replaces its factory and drops the
    /// edges of dependencies the new factory no longer declares. A static
    /// service that was already created cannot be rebound.
    pub fn bind(&self, key: Key, lifetime: Lifetime, factory: Factory) -> DiResult<Arc<ServiceNode>> {
        if factory.provides() != key {
            return Err(DiError::Service {
                spec: key.display_name(),
                provided: factory.provides().display_name(),
            });
        }

        let _guard = self.binding.lock();
        let node = self.ensure_node(key)?;
        if node.is_created() {
            return Err(DiError::AlreadyCreated(key.display_name()));
        }

        // Rebinding keeps edges the new factory still declares
        let previous = node.dependencies();
        let mut retained: Vec<Key> = Vec::new();
        let mut linked: Vec<ServiceId> = Vec::with_capacity(factory.dependencies().len());
        for dependency in factory.dependencies() {
            if previous.contains(dependency) && !retained.contains(dependency) {
                retained.push(*dependency);
                continue;
            }
            let linked_result = self
                .ensure_node(*dependency)
                .and_then(|dep_node| self.link(&dep_node, &node));
            match linked_result {
                Ok(dep_id) => linked.push(dep_id),
                Err(e) => {
                    for dep_id in &linked {
                        self.graph.remove_edge(dep_id, &node.id());
                    }
                    tracing::debug!(spec = key.display_name(), error = %e, "registration rejected");
                    return Err(e);
                }
            }
        }

        for stale in previous.iter().filter(|k| !factory.dependencies().contains(k)) {
            self.graph.remove_edge(&stale.service_id(), &node.id());
        }

        tracing::debug!(
            spec = key.display_name(),
            %lifetime,
            dependencies = factory.dependencies().len(),
            "bound service"
        );
        node.bind(lifetime, factory);
        self.refresh_shape();
        Ok(node)
    }

    fn link(&self, dependency: &Arc<ServiceNode>, dependent: &Arc<ServiceNode>) -> DiResult<ServiceId> {
        let spec = dependent.key().display_name();
        let dependency_name = dependency.key().display_name();
        match self.graph.add_edge(&dependency.id(), &dependent.id()) {
            Ok(()) => Ok(dependency.id()),
            Err(source @ GraphError::EdgeCycle { .. }) => Err(DiError::CircularDependency {
                spec,
                dependency: dependency_name,
                source,
            }),
            Err(source @ GraphError::EdgeExists { .. }) => Err(DiError::DuplicateEdge {
                spec,
                dependency: dependency_name,
                vertex: dependent.id(),
                source,
            }),
            Err(other) => Err(DiError::Unknown(other.to_string())),
        }
    }

    /// Direct lookup by specification.
    pub fn lookup(&self, key: &Key) -> Option<Arc<ServiceNode>> {
        self.graph.get(&key.service_id())
    }

    /// Lookup by vertex id.
    pub fn node(&self, id: &ServiceId) -> Option<Arc<ServiceNode>> {
        self.graph.get(id)
    }

    /// Every node, dependencies before dependents.
    pub fn build_order(&self) -> DiResult<Vec<Arc<ServiceNode>>> {
        self.refresh_shape();
        self.collect(self.graph.topological())
    }

    /// `key` and everything it transitively depends on, dependencies first.
    pub fn order_for(&self, key: &Key) -> DiResult<Vec<Arc<ServiceNode>>> {
        let traversal = self
            .graph
            .topological_to(&key.service_id())
            .map_err(|_| DiError::NotFound(key.display_name()))?;
        self.collect(traversal)
    }

    fn collect(&self, traversal: Topological<ServiceId>) -> DiResult<Vec<Arc<ServiceNode>>> {
        let mut nodes = Vec::with_capacity(traversal.expected_len());
        for id in traversal {
            let id = id.map_err(|e| DiError::Unknown(e.to_string()))?;
            let node = self
                .node(&id)
                .ok_or_else(|| DiError::Unknown(format!("vertex {id} missing during traversal")))?;
            nodes.push(node);
        }
        Ok(nodes)
    }

    /// Recomputes the leaf/root flags of every node from the graph.
    pub fn refresh_shape(&self) {
        let degrees = self.graph.degrees();
        for node in self.graph.vertices() {
            if let Some(degree) = degrees.get(&node.id()) {
                node.set_shape(degree.incoming == 0, degree.outgoing == 0);
            }
        }
    }

    /// Specifications the service `key` depends on.
    pub fn dependencies_of(&self, key: &Key) -> DiResult<Vec<Key>> {
        self.neighbours(self.graph.parents(&key.service_id()), key)
    }

    /// Specifications that depend on the service `key`.
    pub fn dependents_of(&self, key: &Key) -> DiResult<Vec<Key>> {
        self.neighbours(self.graph.children(&key.service_id()), key)
    }

    fn neighbours(&self, ids: Result<Vec<ServiceId>, GraphError>, key: &Key) -> DiResult<Vec<Key>> {
        let ids = ids.map_err(|_| DiError::NotFound(key.display_name()))?;
        Ok(ids
            .iter()
            .filter_map(|id| self.node(id))
            .map(|node| node.key())
            .collect())
    }

    /// Every node in registration order.
    pub fn nodes(&self) -> Vec<Arc<ServiceNode>> {
        self.graph.vertices()
    }

    /// Number of specifications, placeholders included.
    pub fn len(&self) -> usize {
        self.graph.order()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of dependency edges.
    pub fn edge_count(&self) -> usize {
        self.graph.size()
    }

    /// The underlying graph.
    pub fn graph(&self) -> &AcyclicGraph<Arc<ServiceNode>> {
        &self.graph
    }

    /// Drops every node and edge.
    pub fn clear(&self) {
        self.graph.clear();
    }
}
