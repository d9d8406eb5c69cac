//! Benchmarks for nmrstar-rs
//!
//! Run with: cargo bench -p nmrstar-rs

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use nmrstar::{Document, Flavor};
use std::path::PathBuf;

/// Get path to test fixture
fn test_file_path() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("data");
    path.push("deposition.str");
    path
}

fn fixture_text() -> String {
    std::fs::read_to_string(test_file_path()).unwrap()
}

/// A larger synthetic document: one relaxation list per frequency with a
/// few hundred spins each.
fn synthetic_text(n_lists: usize, n_rows: usize) -> String {
    let mut text = String::from("data_bench\n");
    for list in 1..=n_lists {
        text.push_str(&format!("\nsave_auto_relaxation_list_{list}\n"));
        text.push_str("   _Auto_relaxation_list.Sf_category auto_relaxation\n");
        text.push_str(&format!("   _Auto_relaxation_list.ID {list}\n"));
        text.push_str("   _Auto_relaxation_list.Spectrometer_frequency_1H 600\n");
        text.push_str("   _Auto_relaxation_list.Relaxation_coherence_type Iz\n");
        text.push_str("   loop_\n");
        for tag in ["ID", "Comp_index_ID", "Comp_ID", "Atom_ID", "Auto_relaxation_val"] {
            text.push_str(&format!("      _Auto_relaxation.{tag}\n"));
        }
        text.push('\n');
        for row in 1..=n_rows {
            text.push_str(&format!("{row} {row} ALA N 1.{row}\n"));
        }
        text.push_str("   stop_\nsave_\n");
    }
    text
}

fn bench_parse_fixture(c: &mut Criterion) {
    let text = fixture_text();
    c.bench_function("parse_fixture", |b| {
        b.iter(|| Document::parse(black_box(&text)).unwrap());
    });
}

fn bench_parse_synthetic(c: &mut Criterion) {
    let text = synthetic_text(4, 500);
    c.bench_function("parse_synthetic_4x500", |b| {
        b.iter(|| Document::parse(black_box(&text)).unwrap());
    });
}

fn bench_serialize(c: &mut Criterion) {
    let doc = Document::parse(&synthetic_text(4, 500)).unwrap();
    c.bench_function("serialize_synthetic_4x500", |b| {
        b.iter(|| black_box(&doc).star_text(Flavor::NmrStar));
    });
}

criterion_group!(
    benches,
    bench_parse_fixture,
    bench_parse_synthetic,
    bench_serialize
);
criterion_main!(benches);
