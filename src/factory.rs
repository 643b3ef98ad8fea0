//! Factories and their explicit dependency declarations.
//!
//! A factory states the specifications it consumes through its argument type.
//! The argument type implements [`Dependencies`]: `()` for no dependencies, a
//! single `Arc<A>`, or a tuple `(Arc<A>, Arc<B>, ..)` of up to eight entries.
//! The declared key list is what drives edge creation in the service graph.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use smallvec::{smallvec, SmallVec};

use crate::error::{DiError, DiResult, DynError};
use crate::key::Key;

/// Type-erased instance; holds an `Arc<S>` for specification `S`.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

type Ctor = dyn Fn(&[AnyArc]) -> DiResult<AnyArc> + Send + Sync;

/// Key list of a factory's dependencies.
pub type DependencyKeys = SmallVec<[Key; 4]>;

/// Structural declaration of what a factory needs.
///
/// `keys()` lists the specifications in argument order and
/// `from_instances` rebuilds the typed arguments from resolved instances in
/// that same order.
pub trait Dependencies: Sized + 'static {
    /// Specifications consumed, in argument order
    fn keys() -> DependencyKeys;

    /// Builds the typed arguments from resolved instances.
    fn from_instances(instances: &[AnyArc]) -> DiResult<Self>;
}

pub(crate) fn erase<S: ?Sized + Send + Sync + 'static>(value: Arc<S>) -> AnyArc {
    Arc::new(value)
}

pub(crate) fn downcast_instance<S: ?Sized + Send + Sync + 'static>(
    instance: &AnyArc,
) -> DiResult<Arc<S>> {
    instance
        .downcast_ref::<Arc<S>>()
        .cloned()
        .ok_or(DiError::TypeMismatch(type_name::<S>()))
}

fn argument(instances: &[AnyArc], index: usize) -> DiResult<&AnyArc> {
    instances
        .get(index)
        .ok_or_else(|| DiError::Unknown(format!("factory argument {index} was not resolved")))
}

impl Dependencies for () {
    fn keys() -> DependencyKeys {
        SmallVec::new()
    }

    fn from_instances(_: &[AnyArc]) -> DiResult<Self> {
        Ok(())
    }
}

impl<A: ?Sized + Send + Sync + 'static> Dependencies for Arc<A> {
    fn keys() -> DependencyKeys {
        smallvec![Key::of::<A>()]
    }

    fn from_instances(instances: &[AnyArc]) -> DiResult<Self> {
        downcast_instance::<A>(argument(instances, 0)?)
    }
}

macro_rules! tuple_dependencies {
    ($($name:ident : $index:tt),+) => {
        impl<$($name: ?Sized + Send + Sync + 'static),+> Dependencies for ($(Arc<$name>,)+) {
            fn keys() -> DependencyKeys {
                smallvec![$(Key::of::<$name>()),+]
            }

            fn from_instances(instances: &[AnyArc]) -> DiResult<Self> {
                Ok(($(downcast_instance::<$name>(argument(instances, $index)?)?,)+))
            }
        }
    };
}

tuple_dependencies!(A: 0);
tuple_dependencies!(A: 0, B: 1);
tuple_dependencies!(A: 0, B: 1, C: 2);
tuple_dependencies!(A: 0, B: 1, C: 2, D: 3);
tuple_dependencies!(A: 0, B: 1, C: 2, D: 3, E: 4);
tuple_dependencies!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
tuple_dependencies!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
tuple_dependencies!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);

/// Type-erased constructor for one specification.
///
/// Records the specification it provides and the specifications it needs.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{Factory, Key};
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync {}
/// trait Scheduler: Send + Sync {}
/// struct Cron(Arc<dyn Clock>);
/// impl Scheduler for Cron {}
///
/// let factory = Factory::new(|clock: Arc<dyn Clock>| Arc::new(Cron(clock)) as Arc<dyn Scheduler>);
/// assert_eq!(factory.provides(), Key::of::<dyn Scheduler>());
/// assert_eq!(factory.dependencies(), &[Key::of::<dyn Clock>()]);
/// assert!(!factory.is_leaf());
/// ```
#[derive(Clone)]
pub struct Factory {
    provides: Key,
    dependencies: DependencyKeys,
    ctor: Arc<Ctor>,
}

impl Factory {
    /// Wraps an infallible factory producing `Arc<S>`.
    pub fn new<S, D, F>(factory: F) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
        D: Dependencies,
        F: Fn(D) -> Arc<S> + Send + Sync + 'static,
    {
        let ctor = move |instances: &[AnyArc]| -> DiResult<AnyArc> {
            let arguments = D::from_instances(instances)?;
            Ok(erase(factory(arguments)))
        };
        Self {
            provides: Key::of::<S>(),
            dependencies: D::keys(),
            ctor: Arc::new(ctor),
        }
    }

    /// Wraps a fallible factory. Its error surfaces as
    /// [`DiError::FactoryFailed`].
    pub fn try_new<S, D, F, E>(factory: F) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
        D: Dependencies,
        F: Fn(D) -> Result<Arc<S>, E> + Send + Sync + 'static,
        E: Into<DynError>,
    {
        let ctor = move |instances: &[AnyArc]| -> DiResult<AnyArc> {
            let arguments = D::from_instances(instances)?;
            factory(arguments)
                .map(erase)
                .map_err(|e| DiError::FactoryFailed {
                    spec: type_name::<S>(),
                    error: Arc::new(e.into()),
                })
        };
        Self {
            provides: Key::of::<S>(),
            dependencies: D::keys(),
            ctor: Arc::new(ctor),
        }
    }

    /// Specification this factory produces.
    pub fn provides(&self) -> Key {
        self.provides
    }

    /// Specifications this factory consumes, in argument order.
    pub fn dependencies(&self) -> &[Key] {
        &self.dependencies
    }

    /// True when the factory takes no arguments.
    pub fn is_leaf(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub(crate) fn invoke(&self, arguments: &[AnyArc]) -> DiResult<AnyArc> {
        if arguments.len() != self.dependencies.len() {
            return Err(DiError::Unknown(format!(
                "factory for '{}' expects {} arguments, got {}",
                self.provides,
                self.dependencies.len(),
                arguments.len()
            )));
        }
        (self.ctor)(arguments)
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("provides", &self.provides.display_name())
            .field(
                "dependencies",
                &self
                    .dependencies
                    .iter()
                    .map(Key::display_name)
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
