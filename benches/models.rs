//! Benchmarks for the string models.
//!
//! Measures the three models over representative memory shapes:
//! - Fully concrete strings (fast paths, no solver traffic)
//! - Symbolic bytes driving if-then-else tree construction
//! - The terminator scanners and registry dispatch on their own

extern crate binsym;

use binsym::{
    models::{self, scan_possible_zeros},
    AddressSpace, BitWidth, Expr, ExecutionState, ExhaustiveOracle, MemoryProtection,
    ModelRegistry, Value,
};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn state_with_bytes(bytes: &[u8]) -> (ExecutionState, u64) {
    let mut space = AddressSpace::new(BitWidth::W64);
    let base = space.map(bytes.len(), MemoryProtection::RW).unwrap();
    space.write_bytes(base, bytes).unwrap();
    (ExecutionState::new(space), base)
}

fn state_with_cells(cells: &[Value]) -> (ExecutionState, u64) {
    let mut space = AddressSpace::new(BitWidth::W64);
    let base = space.map(cells.len(), MemoryProtection::RW).unwrap();
    for (offset, cell) in cells.iter().enumerate() {
        space.write(base + offset as u64, cell).unwrap();
    }
    (ExecutionState::new(space), base)
}

fn concrete_string(length: usize) -> Vec<u8> {
    let mut bytes: Vec<u8> = (0..length).map(|i| b'a' + (i % 26) as u8).collect();
    bytes.push(0);
    bytes
}

/// A string of `length` bytes where every fourth byte is symbolic.
fn sparse_symbolic_string(length: usize) -> Vec<Value> {
    let mut cells: Vec<Value> = (0..length)
        .map(|i| {
            if i % 4 == 3 {
                Value::symbolic(Expr::variable(format!("s{i}"), BitWidth::BYTE))
            } else {
                Value::byte(b'a' + (i % 26) as u8)
            }
        })
        .collect();
    cells.push(Value::byte(0));
    cells
}

fn pointer(base: u64) -> Value {
    Value::concrete(BitWidth::W64, base)
}

/// Benchmark strlen over a 64-byte concrete string.
fn bench_strlen_concrete(c: &mut Criterion) {
    let (state, base) = state_with_bytes(&concrete_string(64));
    let oracle = ExhaustiveOracle::new();

    c.bench_function("strlen_concrete_64", |b| {
        b.iter(|| {
            let outcome = models::strlen(&state, &oracle, black_box(&pointer(base))).unwrap();
            black_box(outcome)
        });
    });
}

/// Benchmark strlen over a 16-byte string with four symbolic bytes, which
/// pays for both the oracle queries and the tree construction.
fn bench_strlen_symbolic(c: &mut Criterion) {
    let (state, base) = state_with_cells(&sparse_symbolic_string(16));
    let oracle = ExhaustiveOracle::new();

    c.bench_function("strlen_symbolic_16", |b| {
        b.iter(|| {
            let outcome = models::strlen(&state, &oracle, black_box(&pointer(base))).unwrap();
            black_box(outcome)
        });
    });
}

/// Benchmark strcmp over equal 64-byte strings, the full-walk worst case.
fn bench_strcmp_concrete_equal(c: &mut Criterion) {
    let text = concrete_string(64);
    let (mut state, a) = state_with_bytes(&text);
    let b_base = {
        let memory = state.memory_mut();
        let b_base = memory.map(text.len(), MemoryProtection::RW).unwrap();
        memory.write_bytes(b_base, &text).unwrap();
        b_base
    };
    let oracle = ExhaustiveOracle::new();

    c.bench_function("strcmp_concrete_equal_64", |b| {
        b.iter(|| {
            let outcome =
                models::strcmp(&state, &oracle, black_box(&pointer(a)), &pointer(b_base))
                    .unwrap();
            black_box(outcome)
        });
    });
}

/// Benchmark strcmp when a symbolic side folds into an if-then-else tree.
fn bench_strcmp_symbolic(c: &mut Criterion) {
    let (mut state, a) = state_with_cells(&sparse_symbolic_string(16));
    let other = concrete_string(16);
    let b_base = {
        let memory = state.memory_mut();
        let b_base = memory.map(other.len(), MemoryProtection::RW).unwrap();
        memory.write_bytes(b_base, &other).unwrap();
        b_base
    };
    let oracle = ExhaustiveOracle::new();

    c.bench_function("strcmp_symbolic_16", |b| {
        b.iter(|| {
            let outcome =
                models::strcmp(&state, &oracle, black_box(&pointer(a)), &pointer(b_base))
                    .unwrap();
            black_box(outcome)
        });
    });
}

/// Benchmark strcpy of a 64-byte concrete string, state cloned per iteration
/// to keep the destination pristine.
fn bench_strcpy_concrete(c: &mut Criterion) {
    let text = concrete_string(64);
    let (mut state, src) = state_with_bytes(&text);
    let dst = {
        let memory = state.memory_mut();
        let dst = memory.map(text.len(), MemoryProtection::RW).unwrap();
        memory.write_bytes(dst, &vec![0xEE; text.len()]).unwrap();
        dst
    };
    let oracle = ExhaustiveOracle::new();

    c.bench_function("strcpy_concrete_64", |b| {
        b.iter(|| {
            let mut run = state.clone();
            let outcome =
                models::strcpy(&mut run, &oracle, &pointer(dst), black_box(&pointer(src)))
                    .unwrap();
            black_box(outcome)
        });
    });
}

/// Benchmark strcpy over an ambiguous tail with four candidate terminators,
/// the heaviest tree-construction path.
fn bench_strcpy_ambiguous_tail(c: &mut Criterion) {
    let cells = sparse_symbolic_string(16);
    let (mut state, src) = state_with_cells(&cells);
    let dst = {
        let memory = state.memory_mut();
        let dst = memory.map(cells.len(), MemoryProtection::RW).unwrap();
        memory.write_bytes(dst, &vec![0xEE; cells.len()]).unwrap();
        dst
    };
    let oracle = ExhaustiveOracle::new();

    c.bench_function("strcpy_ambiguous_tail_16", |b| {
        b.iter(|| {
            let mut run = state.clone();
            let outcome =
                models::strcpy(&mut run, &oracle, &pointer(dst), black_box(&pointer(src)))
                    .unwrap();
            black_box(outcome)
        });
    });
}

/// Benchmark the candidate scanner over mixed content.
fn bench_scan_possible_zeros(c: &mut Criterion) {
    let (state, base) = state_with_cells(&sparse_symbolic_string(32));
    let oracle = ExhaustiveOracle::new();

    c.bench_function("scan_possible_zeros_32", |b| {
        b.iter(|| {
            let candidates = scan_possible_zeros(&state, &oracle, black_box(base)).unwrap();
            black_box(candidates)
        });
    });
}

/// Benchmark name lookup and invocation through the registry.
fn bench_registry_dispatch(c: &mut Criterion) {
    let registry = ModelRegistry::with_builtins();
    let (mut state, base) = state_with_bytes(b"benchmark\0");
    let oracle = ExhaustiveOracle::new();
    let args = [pointer(base)];

    c.bench_function("registry_dispatch_strlen", |b| {
        b.iter(|| {
            let outcome = registry
                .dispatch(black_box("strlen"), &mut state, &oracle, &args)
                .unwrap();
            black_box(outcome)
        });
    });
}

criterion_group!(
    benches,
    // strlen
    bench_strlen_concrete,
    bench_strlen_symbolic,
    // strcmp
    bench_strcmp_concrete_equal,
    bench_strcmp_symbolic,
    // strcpy
    bench_strcpy_concrete,
    bench_strcpy_ambiguous_tail,
    // scanners and dispatch
    bench_scan_possible_zeros,
    bench_registry_dispatch,
);
criterion_main!(benches);
