//! Benchmarks for measuring resolution overhead.
//!
//! These benchmarks measure the cost of collapsing entrypoint trees of
//! different shapes and of live-node detection, to track regressions in the
//! hot path of every request.

use axum_entrypoint::{
    Config, ContextSource, Entrypoint, Error, Node, PointerRegistry, Resolver, Route, RouteMap,
    get_live_nodes, render_hybrid, render_static,
};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn resolver() -> Resolver {
    Resolver::from_config(&Config::default()).unwrap()
}

fn route(s: &str) -> Route {
    s.parse().unwrap()
}

/// A flat map with `width` literal keys plus a wildcard fallback.
fn wide_map(width: usize) -> Entrypoint {
    let mut map = RouteMap::new();
    for i in 0..width {
        map = map.route(&format!("/page-{i}"), format!("Page {i}")).unwrap();
    }
    map.route("/*", "Fallback").unwrap().into()
}

/// Route maps nested `depth` levels deep, each consuming one segment.
fn deep_map(depth: usize) -> Entrypoint {
    let mut entrypoint: Entrypoint = "Leaf".into();
    for _ in 0..depth {
        entrypoint = RouteMap::new().route("/level/*", entrypoint).unwrap().into();
    }
    entrypoint
}

/// Benchmark: a plain leaf (baseline)
fn bench_leaf(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let resolver = resolver();
    let site: Entrypoint = "Home".into();

    c.bench_function("leaf", |b| {
        b.to_async(&rt).iter(|| async {
            let resolved = resolver
                .resolve_entrypoint_route(&site, Route::root(), ContextSource::Default, false)
                .await
                .unwrap();
            black_box(resolved)
        })
    });
}

/// Benchmark: presets wrapping a generator
fn bench_presets(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let resolver = resolver();
    let generator = Entrypoint::generator(|_cx, _params| async {
        Ok::<_, Error>(Entrypoint::from("generated"))
    });
    let site = render_static(render_hybrid(generator));

    c.bench_function("presets_with_generator", |b| {
        b.to_async(&rt).iter(|| async {
            let resolved = resolver
                .resolve_entrypoint_route(&site, Route::root(), ContextSource::Default, false)
                .await
                .unwrap();
            black_box(resolved)
        })
    });
}

/// Benchmark: key selection cost as the map grows
fn bench_map_width(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let resolver = resolver();
    let mut group = c.benchmark_group("map_width");

    for width in [1, 10, 100] {
        let site = wide_map(width);
        let target = route(&format!("/page-{}", width - 1));
        group.bench_with_input(BenchmarkId::new("keys", width), &site, |b, site| {
            b.to_async(&rt).iter(|| async {
                let resolved = resolver
                    .resolve_entrypoint_route(site, target.clone(), ContextSource::Default, false)
                    .await
                    .unwrap();
                black_box(resolved)
            })
        });
    }

    group.finish();
}

/// Benchmark: residual-route handling through nested maps
fn bench_map_depth(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let resolver = resolver();
    let mut group = c.benchmark_group("map_depth");

    for depth in [1, 4, 8] {
        let site = deep_map(depth);
        let target = route(&"/level".repeat(depth));
        group.bench_with_input(BenchmarkId::new("levels", depth), &site, |b, site| {
            b.to_async(&rt).iter(|| async {
                let resolved = resolver
                    .resolve_entrypoint_route(site, target.clone(), ContextSource::Default, false)
                    .await
                    .unwrap();
                black_box(resolved)
            })
        });
    }

    group.finish();
}

/// Benchmark: live-node detection over a list with every other item live
fn bench_live_nodes(c: &mut Criterion) {
    let registry = PointerRegistry::new();
    let items = (0..200).map(|i| {
        let item = Node::element("li");
        if i % 2 == 0 {
            item.child(registry.create(i as f64)).build()
        } else {
            item.child(format!("item {i}")).build()
        }
    });
    let list = Node::element("ul").children(items).build();

    c.bench_function("live_nodes_200", |b| {
        b.iter(|| black_box(get_live_nodes(&registry, &list, true)))
    });
}

criterion_group!(
    benches,
    bench_leaf,
    bench_presets,
    bench_map_width,
    bench_map_depth,
    bench_live_nodes,
);
criterion_main!(benches);
