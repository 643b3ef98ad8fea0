use ferrous_ioc::{Container, DiError, Lifetime, ServiceState};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

trait ISpecA: Send + Sync {
    fn value(&self) -> u32;
}

trait ISpecB: Send + Sync {
    fn a(&self) -> &Arc<dyn ISpecA>;
}

struct SpecA(u32);
impl ISpecA for SpecA {
    fn value(&self) -> u32 {
        self.0
    }
}

struct SpecB(Arc<dyn ISpecA>);
impl ISpecB for SpecB {
    fn a(&self) -> &Arc<dyn ISpecA> {
        &self.0
    }
}

#[test]
fn test_static_chain_shares_dependency() {
    let container = Container::new();
    container
        .register(Lifetime::Static, |()| Arc::new(SpecA(7)) as Arc<dyn ISpecA>)
        .unwrap();
    container
        .register(Lifetime::Static, |a: Arc<dyn ISpecA>| {
            Arc::new(SpecB(a)) as Arc<dyn ISpecB>
        })
        .unwrap();

    container.build().unwrap();
    assert!(container.is_built());

    let b = container.inject::<dyn ISpecB>().unwrap();
    let a = container.inject::<dyn ISpecA>().unwrap();
    assert_eq!(b.a().value(), 7);
    assert!(Arc::ptr_eq(b.a(), &a));
}

#[test]
fn test_static_injects_same_instance() {
    let container = Container::new();
    container
        .add_static(|()| Arc::new(SpecA(1)) as Arc<dyn ISpecA>)
        .unwrap();
    container.build().unwrap();

    let first = container.inject::<dyn ISpecA>().unwrap();
    let second = container.inject::<dyn ISpecA>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_transient_creates_new_instances() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let container = Container::new();
    container
        .add_transient(move |()| {
            let n = counter.fetch_add(1, Ordering::SeqCst) as u32;
            Arc::new(SpecA(n)) as Arc<dyn ISpecA>
        })
        .unwrap();

    // Transients need no build
    let first = container.inject::<dyn ISpecA>().unwrap();
    let second = container.inject::<dyn ISpecA>().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first.value(), 0);
    assert_eq!(second.value(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_build_never_constructs_transients() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let container = Container::new();
    container
        .add_transient(move |()| {
            counter.fetch_add(1, Ordering::SeqCst);
            Arc::new(SpecA(0)) as Arc<dyn ISpecA>
        })
        .unwrap();

    container.build().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_concrete_types_work_as_specifications() {
    struct Config {
        port: u16,
    }
    struct Server {
        config: Arc<Config>,
    }

    let container = Container::new();
    container
        .add_static(|()| Arc::new(Config { port: 8080 }))
        .unwrap();
    container
        .add_static(|config: Arc<Config>| Arc::new(Server { config }))
        .unwrap();
    container.build().unwrap();

    let server = container.inject::<Server>().unwrap();
    assert_eq!(server.config.port, 8080);
}

#[test]
fn test_static_before_build_is_not_built() {
    let container = Container::new();
    container
        .add_static(|()| Arc::new(SpecA(1)) as Arc<dyn ISpecA>)
        .unwrap();

    match container.inject::<dyn ISpecA>() {
        Err(DiError::NotBuilt(name)) => assert!(name.contains("ISpecA")),
        other => panic!("expected NotBuilt, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_unknown_specification_is_not_found() {
    let container = Container::new();
    assert!(matches!(
        container.inject::<dyn ISpecA>(),
        Err(DiError::NotFound(_))
    ));
}

#[test]
fn test_placeholder_injects_as_injector_error() {
    let container = Container::new();
    container
        .add_transient(|a: Arc<dyn ISpecA>| Arc::new(SpecB(a)) as Arc<dyn ISpecB>)
        .unwrap();

    assert!(container.contains::<dyn ISpecA>());
    assert!(matches!(
        container.inject::<dyn ISpecA>(),
        Err(DiError::Injector { .. })
    ));
    assert!(matches!(
        container.inject::<dyn ISpecB>(),
        Err(DiError::Injector { .. })
    ));
}

#[test]
fn test_clear_forgets_everything() {
    let container = Container::new();
    container
        .add_static(|()| Arc::new(SpecA(1)) as Arc<dyn ISpecA>)
        .unwrap();
    container.build().unwrap();
    assert_eq!(container.len(), 1);

    container.clear();
    assert!(container.is_empty());
    assert!(!container.is_built());
    assert!(matches!(
        container.inject::<dyn ISpecA>(),
        Err(DiError::NotFound(_))
    ));

    // Usable again after clearing
    container
        .add_static(|()| Arc::new(SpecA(2)) as Arc<dyn ISpecA>)
        .unwrap();
    container.build().unwrap();
    assert_eq!(container.inject::<dyn ISpecA>().unwrap().value(), 2);
}

#[test]
fn test_descriptors_and_dump() {
    let container = Container::new();
    container
        .add_static(|()| Arc::new(SpecA(1)) as Arc<dyn ISpecA>)
        .unwrap();
    container
        .add_transient(|a: Arc<dyn ISpecA>| Arc::new(SpecB(a)) as Arc<dyn ISpecB>)
        .unwrap();
    container.build().unwrap();

    let descriptors = container.descriptors();
    assert_eq!(descriptors.len(), 2);

    let a = descriptors
        .iter()
        .find(|d| d.type_name().contains("ISpecA"))
        .unwrap();
    assert_eq!(a.state, ServiceState::Created);
    assert!(a.is_leaf);
    assert!(!a.is_root);

    let b = descriptors
        .iter()
        .find(|d| d.type_name().contains("ISpecB"))
        .unwrap();
    assert_eq!(b.state, ServiceState::Bound);
    assert_eq!(b.lifetime, Some(Lifetime::Transient));
    assert!(!b.is_leaf);
    assert!(b.is_root);

    let dump = container.to_string();
    assert!(dump.starts_with("--- Service Graph ---"));
    let line_a = dump.lines().find(|l| l.contains("ISpecA ->")).unwrap();
    assert!(line_a.starts_with("Node Static:"));
    assert!(line_a.ends_with("ISpecB]"));
    let line_b = dump.lines().find(|l| l.starts_with("Node Transient:")).unwrap();
    assert!(line_b.ends_with("ISpecB (Leaf Node)"));
}
