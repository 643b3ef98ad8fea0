//! Error types for the dependency injection container.

use std::sync::Arc;

use thiserror::Error;

use crate::graph::GraphError;
use crate::key::ServiceId;

/// Boxed error returned by fallible factories.
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Dependency injection errors
///
/// Registration-time errors (`InvalidLifetime`, `Service`,
/// `CircularDependency`, `DuplicateEdge`) are returned synchronously and
/// leave the graph acyclic. Build-time errors abort the remainder of the
/// build; singletons already created stay cached.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{Container, DiError};
///
/// struct Unregistered;
///
/// let container = Container::new();
/// match container.inject::<Unregistered>() {
///     Err(DiError::NotFound(name)) => assert!(name.ends_with("Unregistered")),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Error, Debug, Clone)]
pub enum DiError {
    /// Lifetime tag is neither `Static` nor `Transient`
    #[error("[{spec}] Invalid lifetime '{tag}'. Valid lifetimes are: Static and Transient")]
    InvalidLifetime { spec: &'static str, tag: String },

    /// No callable factory is bound for the specification
    #[error("[{spec}] No callable factory is bound for this specification")]
    Injector { spec: &'static str },

    /// Factory produces something other than the specification
    #[error("[{spec}] Factory provides '{provided}' which does not satisfy the specification")]
    Service {
        spec: &'static str,
        provided: &'static str,
    },

    /// Dependency edge would close a cycle
    #[error("[{spec}] Circular dependency detected through '{dependency}'")]
    CircularDependency {
        spec: &'static str,
        dependency: &'static str,
        #[source]
        source: GraphError,
    },

    /// Dependency edge already exists
    #[error("[{spec}] Duplicate dependency on '{dependency}' (vertex {vertex})")]
    DuplicateEdge {
        spec: &'static str,
        dependency: &'static str,
        vertex: ServiceId,
        #[source]
        source: GraphError,
    },

    /// Internal invariant violation
    #[error("Unknown error occurred: {0}")]
    Unknown(String),

    /// Specification was never referenced
    #[error("Service not found: {0}")]
    NotFound(&'static str),

    /// Static specification resolved before `build()` created it
    #[error("Static service not built yet: {0}")]
    NotBuilt(&'static str),

    /// Stored instance could not be downcast
    #[error("Type mismatch for: {0}")]
    TypeMismatch(&'static str),

    /// Static instance already exists, the binding is sealed
    #[error("Static service already created, cannot rebind: {0}")]
    AlreadyCreated(&'static str),

    /// A fallible factory returned an error
    #[error("Factory for '{spec}' failed - error: {error}")]
    FactoryFailed {
        spec: &'static str,
        error: Arc<DynError>,
    },
}

impl DiError {
    /// True for the errors `register` can return.
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            DiError::InvalidLifetime { .. }
                | DiError::Service { .. }
                | DiError::CircularDependency { .. }
                | DiError::DuplicateEdge { .. }
                | DiError::AlreadyCreated(_)
        )
    }
}

/// Result type for DI operations
///
/// A convenience type alias for `Result<T, DiError>` used throughout the crate.
pub type DiResult<T> = Result<T, DiError>;
