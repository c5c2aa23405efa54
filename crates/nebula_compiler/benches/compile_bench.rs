//! Benchmark harness for the Nebula compiler.
//!
//! Uses criterion for reliable benchmarking.
//! Run with: cargo bench -p nebula_compiler

use bumpalo::Bump;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nebula_binder::bind;
use nebula_compiler::{CompileOptions, Compiler};
use nebula_core::SourceText;
use nebula_emitter::Emitter;
use nebula_syntax::{parse_compilation_unit, Scanner};
use std::rc::Rc;

/// Small source for micro-benchmarks.
const SMALL_SOURCE: &str = r#"
namespace "bench";
func int add(int a, int b) {
    return a + b;
}
func int main() {
    return add(1, 2);
}
"#;

/// Medium source exercising loops, bundles and strings.
const MEDIUM_SOURCE: &str = r#"
namespace "game";
native int random(int max);

bundle Player { int health; int score; string name; }

func void hurt(Player p, int amount) {
    p.health = p.health - amount;
    if (p.health < 0) {
        p.health = 0;
    }
}

func string describe(Player p) {
    return p.name + " has " + string(p.health) + " health";
}

func int play(Player p, int rounds) {
    for (int i = 0; i < rounds; i += 1) {
        if (i % 3 == 0) {
            continue;
        }
        hurt(p, random(10));
        p.score = p.score + i * 2;
    }
    int total = 0;
    do {
        total += p.score;
    } while (total < 100);
    return total;
}

func void start() autoexec {
    Player p;
    p.health = 100;
    p.name = "player";
    play(p, 20);
    p notify "done";
}
"#;

/// Generate a large source with `functions` functions and `bundles` bundles.
fn generate_large_source(bundles: usize, functions: usize) -> String {
    let mut source = String::from("namespace \"large\";\n");

    for i in 0..bundles {
        source.push_str(&format!("bundle Bundle{i} {{ int a{i}; int b{i}; string c{i}; }}\n"));
    }

    for i in 0..functions {
        source.push_str(&format!(
            "func int func{i}(int x, int y) {{
    int total = {i};
    while (total < x * y) {{
        total += x;
        if (total % 7 == 0) {{
            break;
        }}
    }}
    return total;
}}\n\n"
        ));
    }

    source
}

fn in_memory() -> Compiler {
    Compiler::new(CompileOptions {
        emit: false,
        ..CompileOptions::default()
    })
}

// ============================================================================
// Scanner Benchmarks
// ============================================================================

fn bench_scanner(c: &mut Criterion) {
    let mut group = c.benchmark_group("scanner");

    let large = generate_large_source(50, 50);
    for (name, text) in [("small", SMALL_SOURCE), ("medium", MEDIUM_SOURCE), ("large", large.as_str())] {
        let source = SourceText::new("bench.nebula", text);
        group.bench_function(name, |b| {
            b.iter(|| {
                let arena = Bump::new();
                let _ = black_box(Scanner::new(&arena, black_box(&source)).scan_all());
            });
        });
    }

    group.finish();
}

// ============================================================================
// Parser Benchmarks
// ============================================================================

fn bench_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    let large = generate_large_source(50, 50);
    for (name, text) in [("small", SMALL_SOURCE), ("medium", MEDIUM_SOURCE), ("large", large.as_str())] {
        let source = Rc::new(SourceText::new("bench.nebula", text));
        group.bench_function(name, |b| {
            b.iter(|| {
                let arena = Bump::new();
                let _ = black_box(parse_compilation_unit(&arena, Rc::clone(&source)));
            });
        });
    }

    group.finish();
}

// ============================================================================
// Bind + Emit Benchmarks
// ============================================================================

fn bench_bind_and_emit(c: &mut Criterion) {
    let mut group = c.benchmark_group("bind_and_emit");

    let source = Rc::new(SourceText::new("game.nebula", MEDIUM_SOURCE));
    group.bench_function("bind", |b| {
        b.iter(|| {
            let arena = Bump::new();
            let (unit, _) = parse_compilation_unit(&arena, Rc::clone(&source));
            let _ = black_box(bind(&[unit], &[]));
        });
    });

    group.bench_function("emit", |b| {
        let arena = Bump::new();
        let (unit, _) = parse_compilation_unit(&arena, Rc::clone(&source));
        let Ok(units) = bind(&[unit], &[]) else {
            return;
        };
        let emitter = Emitter::default();
        b.iter(|| {
            let _ = black_box(emitter.emit(black_box(&units.programs[0])));
        });
    });

    group.finish();
}

// ============================================================================
// Full Pipeline Benchmarks
// ============================================================================

fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_pipeline");
    let compiler = in_memory();

    group.bench_function("medium_to_text", |b| {
        b.iter(|| {
            let source = Rc::new(SourceText::new("game.nebula", black_box(MEDIUM_SOURCE)));
            if let Ok(result) = compiler.compile_sources(vec![source], &[]) {
                for assembly in &result.programs {
                    let _ = black_box(assembly.to_text());
                    let _ = black_box(assembly.debug_file().to_json());
                }
            }
        });
    });

    group.finish();
}

// ============================================================================
// Scaling Benchmarks
// ============================================================================

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaling");
    let compiler = in_memory();

    for size in [10, 50, 100, 200] {
        let text = generate_large_source(size / 2, size);
        group.bench_with_input(BenchmarkId::new("bundles_and_functions", size), &text, |b, text| {
            b.iter(|| {
                let source = Rc::new(SourceText::new("large.nebula", text.as_str()));
                let _ = black_box(compiler.compile_sources(vec![source], &[]));
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_scanner,
    bench_parser,
    bench_bind_and_emit,
    bench_full_pipeline,
    bench_scaling,
);
criterion_main!(benches);
