//! The container: registration, build and injection in one context object.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::descriptors::ServiceDescriptor;
use crate::error::{DiError, DiResult, DynError};
use crate::factory::{downcast_instance, Dependencies, Factory};
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::registry::ServiceRegistry;
use crate::resolver::LifecycleResolver;

/// Dependency injection container.
///
/// Register every service, call [`build`](Container::build) once, then
/// [`inject`](Container::inject). Registration rejects cycles, duplicate
/// dependencies and mismatched factories on the spot, so a container that
/// accepted all registrations always has a valid build order.
///
/// All methods take `&self`; the container is `Send + Sync` and can be shared
/// between threads. Registration sequences and `build` are not atomic as a
/// whole, so finish registering before building.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{Container, Lifetime};
/// use std::sync::Arc;
///
/// trait Database: Send + Sync {
///     fn url(&self) -> &str;
/// }
/// trait UserService: Send + Sync {
///     fn database(&self) -> &Arc<dyn Database>;
/// }
///
/// struct Postgres;
/// impl Database for Postgres {
///     fn url(&self) -> &str { "postgres://localhost" }
/// }
///
/// struct Users(Arc<dyn Database>);
/// impl UserService for Users {
///     fn database(&self) -> &Arc<dyn Database> { &self.0 }
/// }
///
/// let container = Container::new();
/// container
///     .add_static(|()| Arc::new(Postgres) as Arc<dyn Database>)
///     .unwrap();
/// container
///     .register(Lifetime::Transient, |db: Arc<dyn Database>| {
///         Arc::new(Users(db)) as Arc<dyn UserService>
///     })
///     .unwrap();
///
/// container.build().unwrap();
///
/// let users = container.inject::<dyn UserService>().unwrap();
/// let db = container.inject::<dyn Database>().unwrap();
/// assert_eq!(users.database().url(), "postgres://localhost");
/// assert!(Arc::ptr_eq(users.database(), &db));
/// ```
#[derive(Default)]
pub struct Container {
    registry: ServiceRegistry,
    built: AtomicBool,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    // ----- Registration -----

    /// Registers `factory` for the specification `S` with the given lifetime.
    ///
    /// The factory's argument type declares its dependencies: `()`, a single
    /// `Arc<A>` or a tuple of `Arc`s.
    pub fn register<S, D, F>(&self, lifetime: Lifetime, factory: F) -> DiResult<()>
    where
        S: ?Sized + Send + Sync + 'static,
        D: Dependencies,
        F: Fn(D) -> Arc<S> + Send + Sync + 'static,
    {
        self.bind(Key::of::<S>(), lifetime, Factory::new(factory))
    }

    /// Registers a fallible factory. A factory error fails the build (static)
    /// or the injection (transient) with [`DiError::FactoryFailed`].
    pub fn try_register<S, D, F, E>(&self, lifetime: Lifetime, factory: F) -> DiResult<()>
    where
        S: ?Sized + Send + Sync + 'static,
        D: Dependencies,
        F: Fn(D) -> Result<Arc<S>, E> + Send + Sync + 'static,
        E: Into<DynError>,
    {
        self.bind(Key::of::<S>(), lifetime, Factory::try_new(factory))
    }

    /// Registers a static service, built once during [`build`](Container::build).
    pub fn add_static<S, D, F>(&self, factory: F) -> DiResult<()>
    where
        S: ?Sized + Send + Sync + 'static,
        D: Dependencies,
        F: Fn(D) -> Arc<S> + Send + Sync + 'static,
    {
        self.register(Lifetime::Static, factory)
    }

    /// Registers a transient service, built on every injection.
    pub fn add_transient<S, D, F>(&self, factory: F) -> DiResult<()>
    where
        S: ?Sized + Send + Sync + 'static,
        D: Dependencies,
        F: Fn(D) -> Arc<S> + Send + Sync + 'static,
    {
        self.register(Lifetime::Transient, factory)
    }

    /// Registers a prebuilt factory under a specification known only at
    /// runtime.
    ///
    /// The lifetime is given as a tag (`"Static"` or `"Transient"`, case
    /// insensitive) and the factory must provide exactly `spec`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ferrous_ioc::{Container, DiError, Factory, Key};
    /// use std::sync::Arc;
    ///
    /// trait Cache: Send + Sync {}
    /// trait Queue: Send + Sync {}
    /// struct Memory;
    /// impl Cache for Memory {}
    ///
    /// let container = Container::new();
    /// let factory = Factory::new(|()| Arc::new(Memory) as Arc<dyn Cache>);
    ///
    /// let wrong_tag = container.register_erased("Forever", Key::of::<dyn Cache>(), factory.clone());
    /// assert!(matches!(wrong_tag, Err(DiError::InvalidLifetime { .. })));
    ///
    /// let wrong_spec = container.register_erased("Static", Key::of::<dyn Queue>(), factory.clone());
    /// assert!(matches!(wrong_spec, Err(DiError::Service { .. })));
    ///
    /// container.register_erased("Static", Key::of::<dyn Cache>(), factory).unwrap();
    /// ```
    pub fn register_erased(&self, lifetime: &str, spec: Key, factory: Factory) -> DiResult<()> {
        let lifetime = lifetime
            .parse::<Lifetime>()
            .map_err(|e| DiError::InvalidLifetime {
                spec: spec.display_name(),
                tag: e.0,
            })?;
        self.bind(spec, lifetime, factory)
    }

    fn bind(&self, key: Key, lifetime: Lifetime, factory: Factory) -> DiResult<()> {
        self.registry.bind(key, lifetime, factory).map(|_| ())
    }

    // ----- Lifecycle -----

    /// Creates every static service in dependency order.
    ///
    /// The first failure aborts the build; static services created before it
    /// stay cached. Calling `build` again creates only what is still missing.
    pub fn build(&self) -> DiResult<()> {
        LifecycleResolver::new(&self.registry).build()?;
        self.built.store(true, Ordering::Release);
        Ok(())
    }

    /// True once a [`build`](Container::build) call has succeeded.
    pub fn is_built(&self) -> bool {
        self.built.load(Ordering::Acquire)
    }

    /// Resolves the specification `S`.
    ///
    /// Static services return the instance created by `build`
    /// ([`DiError::NotBuilt`] before that). Transient services are constructed
    /// on every call.
    pub fn inject<S>(&self) -> DiResult<Arc<S>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let instance = LifecycleResolver::new(&self.registry).inject(&Key::of::<S>())?;
        downcast_instance::<S>(&instance)
    }

    /// Discards every registration and instance.
    pub fn clear(&self) {
        tracing::debug!(services = self.registry.len(), "clearing container");
        self.registry.clear();
        self.built.store(false, Ordering::Release);
    }

    // ----- Introspection -----

    /// True if `S` is registered or referenced as a dependency.
    pub fn contains<S: ?Sized + 'static>(&self) -> bool {
        self.registry.lookup(&Key::of::<S>()).is_some()
    }

    /// Number of known specifications, placeholders included.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// The service registry backing this container.
    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Describes every node in registration order.
    pub fn descriptors(&self) -> Vec<ServiceDescriptor> {
        self.registry.refresh_shape();
        self.registry
            .nodes()
            .iter()
            .map(|node| ServiceDescriptor::describe(&self.registry, node))
            .collect()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("services", &self.registry.len())
            .field("dependencies", &self.registry.edge_count())
            .field("built", &self.is_built())
            .finish()
    }
}

/// Renders the dependency structure, one line per specification.
impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Service Graph ---")?;
        for descriptor in self.descriptors() {
            writeln!(f, "{descriptor}")?;
        }
        write!(f, "---------------------")
    }
}
