use boardcheck::prelude::*;
use boardcheck::validate_design;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// A square grid of `side * side` parts, one GND net per row.
fn grid_design(side: usize) -> (Vec<Component>, Vec<Connection>) {
    let mut components = Vec::with_capacity(side * side);
    let mut connections = Vec::new();
    for row in 0..side {
        for col in 0..side {
            let reference = format!("U{}", row * side + col + 1);
            components.push(Component::new(reference, "ESP32").at(col as f64 * 50.0, row as f64 * 50.0));
        }
        for col in 1..side {
            connections.push(Connection::new(
                format!("U{}", row * side + 1),
                format!("U{}", row * side + col + 1),
                format!("GND_{}", row),
            ));
        }
    }
    (components, connections)
}

fn bench_validate_file(c: &mut Criterion) {
    let options = ValidationOptions::default();

    c.bench_function("validate_file", |b| {
        b.iter(|| {
            BoardCheckCore::validate_file(black_box(&fixture_path("tool_call.json")), black_box(&options))
        });
    });
}

fn bench_validate_design(c: &mut Criterion) {
    let (components, connections) = grid_design(12);
    let specs = PowerSpecs::with_active_current("1440");
    let rules = DrcRules::default();

    c.bench_function("validate_design_144", |b| {
        b.iter(|| {
            validate_design(
                black_box(&components),
                black_box(&connections),
                Some(&specs),
                &rules,
            )
        });
    });
}

criterion_group!(benches, bench_validate_file, bench_validate_design);
criterion_main!(benches);
