//! Tests for the process-wide container
//!
//! Every test mutates the same global state, so they run serially.

#![cfg(feature = "global")]

use ferrous_ioc::{global, DiError, Lifetime};
use serial_test::serial;
use std::sync::Arc;

trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

struct Fixed(u64);
impl Clock for Fixed {
    fn now(&self) -> u64 {
        self.0
    }
}

#[test]
#[serial]
fn test_global_register_build_inject() {
    global::clear();
    global::register(Lifetime::Static, |()| Arc::new(Fixed(42)) as Arc<dyn Clock>).unwrap();
    global::build().unwrap();

    let first = global::inject::<dyn Clock>().unwrap();
    let second = global::inject::<dyn Clock>().unwrap();
    assert_eq!(first.now(), 42);
    assert!(Arc::ptr_eq(&first, &second));
    assert!(global::global().is_built());
    global::clear();
}

#[test]
#[serial]
fn test_global_is_one_instance() {
    assert!(std::ptr::eq(global::global(), ferrous_ioc::global()));
}

#[test]
#[serial]
fn test_global_clear_resets_state() {
    global::clear();
    global::register(Lifetime::Transient, |()| Arc::new(Fixed(1)) as Arc<dyn Clock>).unwrap();
    assert!(global::inject::<dyn Clock>().is_ok());

    global::clear();
    assert!(global::global().is_empty());
    assert!(matches!(
        global::inject::<dyn Clock>(),
        Err(DiError::NotFound(_))
    ));
}
