//! Benchmark harness for scope resolution.
//!
//! Run with: cargo bench -p lexenv_scope

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lexenv_core::{Interner, Modifiers, Name, TypeId};
use lexenv_scope::{ScopeArena, ScopeId, ScopeRef};

/// Build a chain of `depth` nested scopes with `width` bindings each, every
/// fourth scope entering a function boundary. Returns the innermost scope.
fn build_chain(arena: &mut ScopeArena, interner: &Interner, depth: usize, width: usize) -> ScopeId {
    let mut current = arena.push_root(false);
    for level in 0..depth {
        for slot in 0..width {
            let name = interner.intern(&format!("v{}_{}", level, slot));
            arena
                .allocate(ScopeRef::Scope(current), name, TypeId::INT, Modifiers::NONE)
                .unwrap();
        }
        current = arena
            .push_nested(ScopeRef::Scope(current), level % 4 == 3)
            .unwrap();
    }
    current
}

// ============================================================================
// Resolution Benchmarks
// ============================================================================

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");

    for depth in [4usize, 16, 64] {
        let interner = Interner::new();
        let mut arena = ScopeArena::new();
        let inner = ScopeRef::Scope(build_chain(&mut arena, &interner, depth, 8));
        let outermost = interner.intern("v0_7");
        let missing = interner.intern("missing");

        group.bench_with_input(BenchmarkId::new("outermost", depth), &depth, |b, _| {
            b.iter(|| black_box(arena.resolve(inner, black_box(outermost))));
        });
        group.bench_with_input(BenchmarkId::new("unbound", depth), &depth, |b, _| {
            b.iter(|| black_box(arena.resolve(inner, black_box(missing))));
        });
        group.bench_with_input(BenchmarkId::new("address_of", depth), &depth, |b, _| {
            b.iter(|| black_box(arena.address_of(inner, black_box(outermost))));
        });
    }

    group.finish();
}

// ============================================================================
// Allocation Benchmarks
// ============================================================================

fn bench_allocate(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocate");
    let interner = Interner::new();
    let names: Vec<Name> = (0..256).map(|i| interner.intern(&format!("n{}", i))).collect();

    group.bench_function("fill_256", |b| {
        b.iter(|| {
            let mut arena = ScopeArena::new();
            let root = ScopeRef::Scope(arena.push_root(false));
            for &name in &names {
                black_box(arena.allocate(root, name, TypeId::INT, Modifiers::NONE).unwrap());
            }
        });
    });

    group.bench_function("push_pop_pooled", |b| {
        let mut arena = ScopeArena::new();
        let root = arena.push_root(false);
        b.iter(|| {
            let block = arena.push_nested(ScopeRef::Scope(root), false).unwrap();
            for &name in names.iter().take(16) {
                arena
                    .allocate(ScopeRef::Scope(block), name, TypeId::INT, Modifiers::NONE)
                    .unwrap();
            }
            arena.release(block).unwrap();
        });
    });

    group.bench_function("flattened_over_global", |b| {
        let mut arena = ScopeArena::new();
        let global = arena.push_root(false);
        for &name in names.iter().take(128) {
            arena
                .allocate(ScopeRef::Scope(global), name, TypeId::OBJECT, Modifiers::HOST)
                .unwrap();
        }
        b.iter(|| {
            let program = arena.push_flattened(ScopeRef::Scope(global)).unwrap();
            for &name in names.iter().skip(64).take(128) {
                black_box(
                    arena
                        .allocate(ScopeRef::Scope(program), name, TypeId::INT, Modifiers::NONE)
                        .unwrap(),
                );
            }
            arena.release(program).unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_resolve, bench_allocate);
criterion_main!(benches);
