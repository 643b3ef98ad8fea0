//! # ferrous-ioc
//!
//! Graph-based dependency injection with build-time cycle rejection.
//!
//! Services are registered against a *specification* (usually a trait object
//! type) with a factory whose argument type declares what it needs. Every
//! registration adds `dependency -> dependent` edges to an acyclic graph and
//! is refused on the spot if it would close a cycle.
//!
//! ## Features
//!
//! - **Two lifetimes**: `Static` services are built once by [`Container::build`]
//!   in dependency order; `Transient` services are rebuilt on every injection
//! - **Explicit dependencies**: factories take `()`, `Arc<A>` or a tuple of
//!   `Arc`s, so the graph is known before anything is constructed
//! - **Cycle rejection at registration**: the graph never holds a cycle
//! - **Thread-safe**: the container is `Send + Sync` and every method takes `&self`
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_ioc::{Container, Lifetime};
//! use std::sync::Arc;
//!
//! trait ISpecA: Send + Sync {
//!     fn name(&self) -> &str;
//! }
//! trait ISpecB: Send + Sync {
//!     fn a(&self) -> &Arc<dyn ISpecA>;
//! }
//!
//! struct A;
//! impl ISpecA for A {
//!     fn name(&self) -> &str { "a" }
//! }
//! struct B(Arc<dyn ISpecA>);
//! impl ISpecB for B {
//!     fn a(&self) -> &Arc<dyn ISpecA> { &self.0 }
//! }
//!
//! let container = Container::new();
//! container.register(Lifetime::Static, |()| Arc::new(A) as Arc<dyn ISpecA>).unwrap();
//! container
//!     .register(Lifetime::Static, |a: Arc<dyn ISpecA>| Arc::new(B(a)) as Arc<dyn ISpecB>)
//!     .unwrap();
//! container.build().unwrap();
//!
//! let b = container.inject::<dyn ISpecB>().unwrap();
//! let a = container.inject::<dyn ISpecA>().unwrap();
//! assert!(Arc::ptr_eq(b.a(), &a));
//! assert_eq!(b.a().name(), "a");
//! ```
//!
//! ## Cycles
//!
//! ```rust
//! use ferrous_ioc::{Container, DiError};
//! use std::sync::Arc;
//!
//! trait X: Send + Sync {}
//! trait Y: Send + Sync {}
//! struct ImplX;
//! impl X for ImplX {}
//! struct ImplY;
//! impl Y for ImplY {}
//!
//! let container = Container::new();
//! container.add_static(|_y: Arc<dyn Y>| Arc::new(ImplX) as Arc<dyn X>).unwrap();
//! let err = container
//!     .add_static(|_x: Arc<dyn X>| Arc::new(ImplY) as Arc<dyn Y>)
//!     .unwrap_err();
//! assert!(matches!(err, DiError::CircularDependency { .. }));
//! ```
//!
//! ## Cargo features
//!
//! - `global` (default): the process-wide container in [`global`]
//! - `graph-export`: JSON, DOT and Mermaid export of the service graph
//! - `diagnostics`: per-service timing in build logs

pub mod container;
pub mod descriptors;
pub mod error;
pub mod factory;
pub mod graph;
pub mod key;
pub mod lifetime;
pub mod registry;
pub mod resolver;
pub mod service;

#[cfg(feature = "global")]
pub mod global;

#[cfg(feature = "graph-export")]
pub mod graph_export;

pub use container::Container;
pub use descriptors::ServiceDescriptor;
pub use error::{DiError, DiResult, DynError};
pub use factory::{AnyArc, Dependencies, DependencyKeys, Factory};
pub use graph::{AcyclicGraph, GraphError, Vertex};
pub use key::{Key, ServiceId};
pub use lifetime::{Lifetime, ParseLifetimeError};
pub use registry::ServiceRegistry;
pub use resolver::LifecycleResolver;
pub use service::{ServiceNode, ServiceState};

#[cfg(feature = "global")]
pub use global::global;
