use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use ferrous_activator::*;
use std::sync::Arc;

struct Config {
    retries: i32,
}

struct Repository {
    config: Arc<Config>,
}

struct Handler {
    repository: Arc<Repository>,
    name: String,
    limit: i32,
}

fn collection() -> ServiceCollection {
    let mut services = ServiceCollection::new();
    services
        .register_type(TypeDef::class::<Repository>().constructor(
            Signature::new().param::<Config>("config"),
            |args| Ok(Repository { config: args.get(0)? }),
        ))
        .register_type(
            TypeDef::class::<Handler>()
                .constructor(
                    Signature::new()
                        .param::<Repository>("repository")
                        .param::<String>("name")
                        .param_or("limit", 10i32),
                    |args| {
                        Ok(Handler {
                            repository: args.get(0)?,
                            name: args.cloned(1)?,
                            limit: args.cloned(2)?,
                        })
                    },
                )
                .constructor(Signature::new().param::<Repository>("repository"), |args| {
                    Ok(Handler {
                        repository: args.get(0)?,
                        name: String::new(),
                        limit: 0,
                    })
                }),
        );
    services.add(ServiceDescriptor::instance(Config { retries: 3 }), false);
    services.add(ServiceDescriptor::scoped::<Repository, Repository>(), false);
    services.add(ServiceDescriptor::transient::<Handler, Handler>(), false);
    services
}

// ===== Micro Benchmarks =====

fn bench_singleton_hit(c: &mut Criterion) {
    let provider = collection().build();
    let _ = provider.get::<Config>().unwrap();

    c.bench_function("singleton_hit", |b| {
        b.iter(|| {
            let config = provider.get::<Config>().unwrap();
            black_box(config.retries);
        })
    });
}

fn bench_transient_activation(c: &mut Criterion) {
    let provider = collection().build();
    let scope = provider.create_scope();

    c.bench_function("transient_activation", |b| {
        b.iter(|| {
            let handler = scope.get::<Handler>().unwrap();
            black_box(handler.limit);
        })
    });
}

fn bench_overload_selection(c: &mut Criterion) {
    let provider = collection().build();
    let scope = provider.create_scope();
    let mut group = c.benchmark_group("overload_selection");

    let inputs = [
        ("none", Arguments::new()),
        ("positional", Arguments::new().arg("orders")),
        ("named", Arguments::new().named("name", "orders").named("limit", 50)),
        ("converted", Arguments::new().arg("orders").named("limit", "50")),
    ];
    for (label, args) in inputs.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(label), args, |b, args| {
            b.iter(|| {
                let handler = scope.create::<Handler>(args).unwrap();
                black_box((handler.name.len(), Arc::strong_count(&handler.repository)));
            })
        });
    }
    group.finish();
}

fn bench_scope_lifecycle(c: &mut Criterion) {
    let provider = collection().build();

    c.bench_function("scope_lifecycle", |b| {
        b.iter(|| {
            let scope = provider.create_scope();
            let repository = scope.get::<Repository>().unwrap();
            black_box(repository.config.retries);
            scope.dispose().unwrap();
        })
    });
}

// ===== Macro Benchmarks =====

fn bench_cold_build(c: &mut Criterion) {
    c.bench_function("cold_build_and_resolve", |b| {
        b.iter_batched(
            collection,
            |services| {
                let provider = services.build();
                let scope = provider.create_scope();
                black_box(scope.get::<Handler>().unwrap().limit);
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_large_registry(c: &mut Criterion) {
    macro_rules! marker_types {
        ($($name:ident),*) => {
            $( struct $name; )*
            fn register_markers(services: &mut ServiceCollection) {
                $( services.add(ServiceDescriptor::singleton_factory(|_| Ok($name)), false); )*
            }
        };
    }
    marker_types!(M0, M1, M2, M3, M4, M5, M6, M7, M8, M9, M10, M11, M12, M13, M14, M15);

    let mut services = collection();
    register_markers(&mut services);
    let provider = services.build();

    c.bench_function("large_registry_lookup", |b| {
        b.iter(|| {
            black_box(provider.get::<M15>().unwrap());
            black_box(provider.get::<Config>().unwrap());
        })
    });
}

criterion_group!(
    micro_benches,
    bench_singleton_hit,
    bench_transient_activation,
    bench_overload_selection,
    bench_scope_lifecycle
);

criterion_group!(macro_benches, bench_cold_build, bench_large_registry);

criterion_main!(micro_benches, macro_benches);
