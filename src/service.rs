//! Service nodes stored in the dependency graph.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use crate::error::{DiError, DiResult};
use crate::factory::{AnyArc, Factory};
use crate::graph::Vertex;
use crate::key::{Key, ServiceId};
use crate::lifetime::Lifetime;

/// Lifecycle state of a service node.
///
/// `Placeholder → Bound → Created`. Only static services reach `Created`;
/// transient services stay `Bound` and are rebuilt on every resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "graph-export", derive(serde::Serialize, serde::Deserialize))]
pub enum ServiceState {
    /// Referenced as a dependency, no factory attached yet
    Placeholder,
    /// Factory and lifetime attached
    Bound,
    /// Static instance built and cached
    Created,
}

#[derive(Clone)]
pub(crate) struct Binding {
    pub(crate) lifetime: Lifetime,
    pub(crate) factory: Factory,
}

/// One specification in the service graph.
///
/// Nodes are shared as `Arc<ServiceNode>`; all mutable state sits behind
/// interior mutability so the graph lock is never held while a factory runs.
pub struct ServiceNode {
    id: ServiceId,
    key: Key,
    binding: RwLock<Option<Binding>>,
    instance: OnceCell<AnyArc>,
    leaf: AtomicBool,
    root: AtomicBool,
}

impl ServiceNode {
    pub(crate) fn placeholder(key: Key) -> Self {
        Self {
            id: key.service_id(),
            key,
            binding: RwLock::new(None),
            instance: OnceCell::new(),
            leaf: AtomicBool::new(true),
            root: AtomicBool::new(true),
        }
    }

    pub fn id(&self) -> ServiceId {
        self.id
    }

    /// Specification identity.
    pub fn key(&self) -> Key {
        self.key
    }

    /// Lifetime of the bound factory, `None` for a placeholder.
    pub fn lifetime(&self) -> Option<Lifetime> {
        self.binding.read().as_ref().map(|b| b.lifetime)
    }

    pub fn state(&self) -> ServiceState {
        if self.instance.get().is_some() {
            ServiceState::Created
        } else if self.binding.read().is_some() {
            ServiceState::Bound
        } else {
            ServiceState::Placeholder
        }
    }

    pub fn is_created(&self) -> bool {
        self.instance.get().is_some()
    }

    /// True when the service has no dependencies.
    ///
    /// Dependency edges point from the dependency to the dependent, so this is
    /// a vertex without incoming edges.
    pub fn is_leaf(&self) -> bool {
        self.leaf.load(Ordering::Acquire)
    }

    /// True when no other service depends on this one.
    pub fn is_root(&self) -> bool {
        self.root.load(Ordering::Acquire)
    }

    /// Declared dependencies of the bound factory.
    pub fn dependencies(&self) -> Vec<Key> {
        self.binding
            .read()
            .as_ref()
            .map(|b| b.factory.dependencies().to_vec())
            .unwrap_or_default()
    }

    pub(crate) fn binding(&self) -> Option<Binding> {
        self.binding.read().clone()
    }

    pub(crate) fn bind(&self, lifetime: Lifetime, factory: Factory) {
        *self.binding.write() = Some(Binding { lifetime, factory });
    }

    pub(crate) fn instance(&self) -> Option<&AnyArc> {
        self.instance.get()
    }

    pub(crate) fn store_instance(&self, instance: AnyArc) -> DiResult<()> {
        self.instance.set(instance).map_err(|_| {
            DiError::Unknown(format!(
                "static service '{}' was created twice",
                self.key.display_name()
            ))
        })
    }

    pub(crate) fn set_shape(&self, leaf: bool, root: bool) {
        self.leaf.store(leaf, Ordering::Release);
        self.root.store(root, Ordering::Release);
    }
}

impl Vertex for Arc<ServiceNode> {
    type Id = ServiceId;

    fn id(&self) -> ServiceId {
        self.id
    }
}

impl fmt::Debug for ServiceNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceNode")
            .field("id", &self.id)
            .field("spec", &self.key.display_name())
            .field("lifetime", &self.lifetime())
            .field("state", &self.state())
            .field("leaf", &self.is_leaf())
            .field("root", &self.is_root())
            .finish()
    }
}

impl fmt::Display for ServiceNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lifetime() {
            Some(lifetime) => write!(f, "{}:{}", lifetime, self.key),
            None => write!(f, "Unbound:{}", self.key),
        }
    }
}
