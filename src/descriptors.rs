//! Service descriptors for introspection and diagnostics.

use std::fmt;
use std::sync::Arc;

use crate::key::{Key, ServiceId};
use crate::lifetime::Lifetime;
use crate::registry::ServiceRegistry;
use crate::service::{ServiceNode, ServiceState};

/// Snapshot of one service node.
///
/// Descriptors are detached copies: they do not change when the container
/// does, and they carry no instances.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{Container, Key, Lifetime, ServiceState};
/// use std::sync::Arc;
///
/// trait Config: Send + Sync {}
/// trait Server: Send + Sync {}
/// struct Env;
/// impl Config for Env {}
/// struct Http(Arc<dyn Config>);
/// impl Server for Http {}
///
/// let container = Container::new();
/// container
///     .add_transient(|config: Arc<dyn Config>| Arc::new(Http(config)) as Arc<dyn Server>)
///     .unwrap();
///
/// let descriptors = container.descriptors();
/// let server = descriptors.iter().find(|d| d.key == Key::of::<dyn Server>()).unwrap();
/// assert_eq!(server.lifetime, Some(Lifetime::Transient));
/// assert_eq!(server.dependencies, vec![Key::of::<dyn Config>()]);
/// assert!(server.is_root);
///
/// // Referenced but never bound
/// let config = descriptors.iter().find(|d| d.key == Key::of::<dyn Config>()).unwrap();
/// assert_eq!(config.state, ServiceState::Placeholder);
/// assert!(config.is_leaf);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// Specification
    pub key: Key,
    /// Vertex id in the service graph
    pub id: ServiceId,
    /// `None` while the node is a placeholder
    pub lifetime: Option<Lifetime>,
    pub state: ServiceState,
    /// Specifications this one depends on
    pub dependencies: Vec<Key>,
    /// Specifications that depend on this one
    pub dependents: Vec<Key>,
    /// No dependencies
    pub is_leaf: bool,
    /// No dependents
    pub is_root: bool,
}

impl ServiceDescriptor {
    pub(crate) fn describe(registry: &ServiceRegistry, node: &Arc<ServiceNode>) -> Self {
        let key = node.key();
        Self {
            key,
            id: node.id(),
            lifetime: node.lifetime(),
            state: node.state(),
            dependencies: registry.dependencies_of(&key).unwrap_or_default(),
            dependents: registry.dependents_of(&key).unwrap_or_default(),
            is_leaf: node.is_leaf(),
            is_root: node.is_root(),
        }
    }

    /// Type name of the specification.
    pub fn type_name(&self) -> &'static str {
        self.key.display_name()
    }

    pub fn is_bound(&self) -> bool {
        self.lifetime.is_some()
    }
}

/// `Node <lifetime>:<spec> -> [<dependents>]`, or `(Leaf Node)` when nothing
/// depends on it.
impl fmt::Display for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lifetime {
            Some(lifetime) => write!(f, "Node {}:{}", lifetime, self.key)?,
            None => write!(f, "Node Unbound:{}", self.key)?,
        }
        if self.dependents.is_empty() {
            return write!(f, " (Leaf Node)");
        }
        write!(f, " -> [")?;
        for (i, dependent) in self.dependents.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{dependent}")?;
        }
        write!(f, "]")
    }
}
