// In benches/table_bench.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rbridge::record::ROOT_RECORD;
use rbridge::{table_from_collection, table_from_foreign_value, table_to_record_batch, ForeignValue};

struct Observation {
    id: i32,
    station: String,
    reading: f64,
    valid: Option<bool>,
}

rbridge::impl_record!(Observation {
    id: i32,
    station: String,
    reading: f64,
    valid: Option<bool>,
});

/// Generates `size` records with a small set of repeating station names and
/// an NA in every seventh `valid` cell.
fn generate_observations(size: usize) -> Vec<Observation> {
    let stations = ["north", "south", "east", "west"];
    (0..size)
        .map(|i| Observation {
            id: i as i32,
            station: stations[i % stations.len()].to_string(),
            reading: (i as f64) * 0.25,
            valid: if i % 7 == 0 { None } else { Some(i % 2 == 0) },
        })
        .collect()
}

/// A square numeric matrix with labeled rows.
fn generate_matrix(side: usize) -> ForeignValue {
    let values: Vec<f64> = (0..side * side).map(|i| i as f64).collect();
    let row_labels: Vec<String> = (0..side).map(|i| format!("r{}", i)).collect();
    ForeignValue::doubles(values)
        .with_attribute("dim", ForeignValue::integers(vec![side as i32, side as i32]))
        .with_attribute(
            "dimnames",
            ForeignValue::named_list(vec![
                ("".to_string(), ForeignValue::strings(row_labels)),
                ("".to_string(), ForeignValue::Null),
            ]),
        )
}

// --- Benchmark Suite ---

const BENCH_ROWS: usize = 10_000;

fn bench_table_conversions(c: &mut Criterion) {
    // --- Setup Data ---
    let records = generate_observations(BENCH_ROWS);
    let table = table_from_collection(&records, ROOT_RECORD).unwrap();
    let list = table.to_foreign_list().unwrap();
    let matrix = generate_matrix(100);

    let mut group = c.benchmark_group("Table Conversions");

    group.bench_function("collection -> table", |b| {
        b.iter(|| table_from_collection(black_box(&records), ROOT_RECORD).unwrap())
    });
    group.bench_function("table -> foreign list", |b| {
        b.iter(|| black_box(&table).to_foreign_list().unwrap())
    });
    group.bench_function("foreign list -> table", |b| {
        b.iter(|| table_from_foreign_value(black_box(&list)).unwrap())
    });
    group.bench_function("matrix -> table", |b| {
        b.iter(|| table_from_foreign_value(black_box(&matrix)).unwrap())
    });
    group.bench_function("table -> record batch", |b| {
        b.iter(|| table_to_record_batch(black_box(&table)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_table_conversions);
criterion_main!(benches);
