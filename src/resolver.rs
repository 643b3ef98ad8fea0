//! Lifecycle resolution: the static build pass and transient construction.
//!
//! Per node the lifecycle is `Placeholder → Bound → Created`, where only
//! static services ever reach `Created`. Transient services are constructed
//! from their dependency subgraph on every resolution, with a per-call memo
//! so a transient shared by several consumers is built once per call.

use std::sync::Arc;

use ahash::{AHashMap, AHashSet};

use crate::error::{DiError, DiResult};
use crate::factory::AnyArc;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::registry::ServiceRegistry;
use crate::service::{Binding, ServiceNode};

/// Drives construction over a [`ServiceRegistry`].
pub struct LifecycleResolver<'r> {
    registry: &'r ServiceRegistry,
}

impl<'r> LifecycleResolver<'r> {
    pub fn new(registry: &'r ServiceRegistry) -> Self {
        Self { registry }
    }

    /// Creates every static service not created yet, in dependency order.
    ///
    /// Returns the number of services created by this call. The first error
    /// aborts the pass; services created before it stay cached, and a later
    /// call resumes with the ones still missing.
    pub fn build(&self) -> DiResult<usize> {
        let order = self.registry.build_order()?;
        tracing::debug!(services = order.len(), "building static services");

        let mut created = 0;
        for node in &order {
            let Some(binding) = node.binding() else {
                // Only fails once something actually needs it
                continue;
            };

            match (binding.lifetime, node.is_created()) {
                (Lifetime::Transient, false) => continue,
                (Lifetime::Transient, true) => {
                    return Err(DiError::Unknown(format!(
                        "transient service '{}' holds a cached instance",
                        node.key()
                    )));
                }
                (Lifetime::Static, true) => {
                    tracing::trace!(spec = node.key().display_name(), "already created");
                }
                (Lifetime::Static, false) => {
                    self.create_static(node, &binding)?;
                    created += 1;
                }
            }
        }

        tracing::debug!(created, "static build complete");
        Ok(created)
    }

    fn create_static(&self, node: &Arc<ServiceNode>, binding: &Binding) -> DiResult<()> {
        if node.is_leaf() != binding.factory.is_leaf() {
            return Err(DiError::Unknown(format!(
                "service '{}' is neither clearly a leaf nor a branch",
                node.key()
            )));
        }

        #[cfg(feature = "diagnostics")]
        let started = std::time::Instant::now();

        let instance = if node.is_leaf() {
            binding.factory.invoke(&[])?
        } else {
            let arguments = binding
                .factory
                .dependencies()
                .iter()
                .map(|key| self.static_argument(key))
                .collect::<DiResult<Vec<_>>>()?;
            binding.factory.invoke(&arguments)?
        };
        node.store_instance(instance)?;

        #[cfg(feature = "diagnostics")]
        tracing::debug!(
            spec = node.key().display_name(),
            elapsed = ?started.elapsed(),
            "created static service"
        );
        #[cfg(not(feature = "diagnostics"))]
        tracing::trace!(spec = node.key().display_name(), "created static service");

        Ok(())
    }

    fn static_argument(&self, key: &Key) -> DiResult<AnyArc> {
        let node = self.bound_node(key)?;
        self.resolve_node(&node, || {
            DiError::Unknown(format!(
                "static dependency '{key}' was not created before its dependents"
            ))
        })
    }

    /// Resolves `key`: the cached singleton for a static service, a freshly
    /// constructed instance for a transient one.
    pub fn inject(&self, key: &Key) -> DiResult<AnyArc> {
        let node = self.bound_node(key)?;
        self.resolve_node(&node, || DiError::NotBuilt(key.display_name()))
    }

    fn bound_node(&self, key: &Key) -> DiResult<Arc<ServiceNode>> {
        self.registry
            .lookup(key)
            .ok_or(DiError::NotFound(key.display_name()))
    }

    fn resolve_node<M>(&self, node: &Arc<ServiceNode>, missing_static: M) -> DiResult<AnyArc>
    where
        M: FnOnce() -> DiError,
    {
        let binding = node.binding().ok_or(DiError::Injector {
            spec: node.key().display_name(),
        })?;
        match binding.lifetime {
            Lifetime::Static => node.instance().cloned().ok_or_else(missing_static),
            Lifetime::Transient => self.build_transient(node),
        }
    }

    /// Constructs `target` together with the transient services it needs.
    ///
    /// Walks the topological order of `target`'s dependency subgraph. Static
    /// services contribute their cached singleton and are not expanded
    /// further; transient services are built from memoised arguments.
    pub fn build_transient(&self, target: &Arc<ServiceNode>) -> DiResult<AnyArc> {
        let order = self.registry.order_for(&target.key())?;
        let demanded = self.demand(target)?;
        let mut memo: AHashMap<Key, AnyArc> = AHashMap::with_capacity(demanded.len());

        for node in order.iter().filter(|n| demanded.contains(&n.key())) {
            let spec = node.key().display_name();
            let binding = node.binding().ok_or(DiError::Injector { spec })?;
            let instance = match binding.lifetime {
                Lifetime::Static => node.instance().cloned().ok_or(DiError::NotBuilt(spec))?,
                Lifetime::Transient => {
                    let arguments = binding
                        .factory
                        .dependencies()
                        .iter()
                        .map(|key| {
                            memo.get(key).cloned().ok_or_else(|| {
                                DiError::Unknown(format!(
                                    "'{key}' was not constructed before '{spec}'"
                                ))
                            })
                        })
                        .collect::<DiResult<Vec<_>>>()?;
                    binding.factory.invoke(&arguments)?
                }
            };
            memo.insert(node.key(), instance);
        }

        tracing::trace!(
            spec = target.key().display_name(),
            constructed = memo.len(),
            "resolved transient service"
        );
        memo.remove(&target.key()).ok_or_else(|| {
            DiError::Unknown(format!("transient service '{}' was not constructed", target.key()))
        })
    }

    /// Specifications a transient construction of `target` touches.
    fn demand(&self, target: &Arc<ServiceNode>) -> DiResult<AHashSet<Key>> {
        let mut demanded = AHashSet::new();
        demanded.insert(target.key());
        let mut pending = vec![target.clone()];

        while let Some(node) = pending.pop() {
            let Some(binding) = node.binding() else {
                continue;
            };
            if binding.lifetime == Lifetime::Static {
                continue;
            }
            for dependency in binding.factory.dependencies() {
                if demanded.insert(*dependency) {
                    pending.push(self.bound_node(dependency)?);
                }
            }
        }
        Ok(demanded)
    }
}
