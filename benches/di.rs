use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ferrous_ioc::*;
use std::sync::Arc;

trait Leaf: Send + Sync {
    fn value(&self) -> u64;
}
trait Left: Send + Sync {}
trait Right: Send + Sync {}
trait Top: Send + Sync {}

struct LeafImpl([u64; 8]);
impl Leaf for LeafImpl {
    fn value(&self) -> u64 {
        self.0[0]
    }
}
struct LeftImpl(#[allow(dead_code)] Arc<dyn Leaf>);
impl Left for LeftImpl {}
struct RightImpl(#[allow(dead_code)] Arc<dyn Leaf>);
impl Right for RightImpl {}
struct TopImpl(#[allow(dead_code)] Arc<dyn Left>, #[allow(dead_code)] Arc<dyn Right>);
impl Top for TopImpl {}

fn diamond(lifetime: Lifetime) -> Container {
    let container = Container::new();
    container
        .register(lifetime, |()| Arc::new(LeafImpl([1; 8])) as Arc<dyn Leaf>)
        .unwrap();
    container
        .register(lifetime, |l: Arc<dyn Leaf>| Arc::new(LeftImpl(l)) as Arc<dyn Left>)
        .unwrap();
    container
        .register(lifetime, |l: Arc<dyn Leaf>| Arc::new(RightImpl(l)) as Arc<dyn Right>)
        .unwrap();
    container
        .register(lifetime, |(l, r): (Arc<dyn Left>, Arc<dyn Right>)| {
            Arc::new(TopImpl(l, r)) as Arc<dyn Top>
        })
        .unwrap();
    container
}

// ===== Micro Benchmarks =====

fn bench_static_hit(c: &mut Criterion) {
    let container = diamond(Lifetime::Static);
    container.build().unwrap();

    c.bench_function("static_hit", |b| {
        b.iter(|| {
            let v = container.inject::<dyn Leaf>().unwrap();
            black_box(v.value());
        })
    });
}

fn bench_static_vs_transient(c: &mut Criterion) {
    let mut group = c.benchmark_group("static_vs_transient");

    let statics = diamond(Lifetime::Static);
    statics.build().unwrap();
    group.bench_function("static_diamond", |b| {
        b.iter(|| black_box(statics.inject::<dyn Top>().unwrap()))
    });

    let transients = diamond(Lifetime::Transient);
    group.bench_function("transient_diamond", |b| {
        b.iter(|| black_box(transients.inject::<dyn Top>().unwrap()))
    });

    group.finish();
}

fn bench_build_diamond(c: &mut Criterion) {
    c.bench_function("build_diamond", |b| {
        b.iter_batched(
            || diamond(Lifetime::Static),
            |container| {
                container.build().unwrap();
                black_box(container.len());
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

// ===== Graph Benchmarks =====

#[derive(Clone)]
struct Task(u32);

impl graph::Vertex for Task {
    type Id = u32;
    fn id(&self) -> u32 {
        self.0
    }
}

fn bench_chain_edges(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_add_edge");

    for size in [16u32, 128, 512] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || {
                    let graph = AcyclicGraph::new();
                    for id in 0..size {
                        graph.add_vertex(Task(id)).unwrap();
                    }
                    graph
                },
                |graph| {
                    for id in 1..size {
                        graph.add_edge(&(id - 1), &id).unwrap();
                    }
                    // Closing edge exercises the full cycle check
                    black_box(graph.add_edge(&(size - 1), &0).is_err());
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_topological(c: &mut Criterion) {
    let graph = AcyclicGraph::new();
    for id in 0..256u32 {
        graph.add_vertex(Task(id)).unwrap();
    }
    for id in 1..256u32 {
        graph.add_edge(&(id / 2), &id).unwrap();
    }

    c.bench_function("topological_256", |b| {
        b.iter(|| black_box(graph.topological().count()))
    });
}

criterion_group!(
    benches,
    bench_static_hit,
    bench_static_vs_transient,
    bench_build_diamond,
    bench_chain_edges,
    bench_topological
);
criterion_main!(benches);
