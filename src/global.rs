//! Process-wide container.
//!
//! A thin facade over a lazily created [`Container`] for applications that
//! want one shared injector. Everything here forwards to [`global()`].
//!
//! # Examples
//!
//! ```rust
//! use ferrous_ioc::{global, Lifetime};
//! use std::sync::Arc;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//! struct English;
//! impl Greeter for English {
//!     fn greet(&self) -> String { "hello".into() }
//! }
//!
//! global::register(Lifetime::Static, |()| Arc::new(English) as Arc<dyn Greeter>).unwrap();
//! global::build().unwrap();
//! assert_eq!(global::inject::<dyn Greeter>().unwrap().greet(), "hello");
//! global::clear();
//! ```

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::container::Container;
use crate::error::DiResult;
use crate::factory::Dependencies;
use crate::lifetime::Lifetime;

static GLOBAL_CONTAINER: Lazy<Container> = Lazy::new(|| {
    tracing::debug!("initializing global container");
    Container::new()
});

/// The process-wide container, created on first use.
pub fn global() -> &'static Container {
    &GLOBAL_CONTAINER
}

/// See [`Container::register`].
pub fn register<S, D, F>(lifetime: Lifetime, factory: F) -> DiResult<()>
where
    S: ?Sized + Send + Sync + 'static,
    D: Dependencies,
    F: Fn(D) -> Arc<S> + Send + Sync + 'static,
{
    global().register(lifetime, factory)
}

/// See [`Container::build`].
pub fn build() -> DiResult<()> {
    global().build()
}

/// See [`Container::inject`].
pub fn inject<S>() -> DiResult<Arc<S>>
where
    S: ?Sized + Send + Sync + 'static,
{
    global().inject::<S>()
}

/// See [`Container::clear`].
pub fn clear() {
    global().clear()
}
