use super::*;
use arrow::array::Array;
use crate::record::ROOT_RECORD;
use crate::types::{CanonicalType, NA_LOGICAL};

struct Trade {
    id: i32,
    symbol: String,
    price: f64,
    settled: Option<bool>,
}

crate::impl_record!(Trade {
    id: i32,
    symbol: String,
    price: f64,
    settled: Option<bool>,
});

fn trades() -> Vec<Trade> {
    vec![
        Trade { id: 1, symbol: "ABC".into(), price: 10.5, settled: Some(true) },
        Trade { id: 2, symbol: "XYZ".into(), price: 99.0, settled: None },
        Trade { id: 3, symbol: "ABC".into(), price: 10.75, settled: Some(false) },
    ]
}

#[test]
fn test_collection_round_trips_through_foreign_list() {
    // 1. Arrange
    let table = table_from_collection(&trades(), ROOT_RECORD).unwrap();

    // 2. Act
    let list = table.to_foreign_list().unwrap();
    let restored = table_from_foreign_value(&list).unwrap();

    // 3. Assert
    let names = |t: &Table| -> Vec<String> {
        t.columns().iter().map(|c| c.name().to_string()).collect()
    };
    let types = |t: &Table| -> Vec<CanonicalType> {
        t.columns().iter().map(|c| c.canonical_type()).collect()
    };
    assert_eq!(table.name(), "Trade");
    assert_eq!(names(&restored), vec!["id", "symbol", "price", "settled"]);
    assert_eq!(types(&restored), types(&table));
    for (a, b) in table.columns().iter().zip(restored.columns()) {
        assert_eq!(a.data(), b.data());
    }
    assert_eq!(
        restored.column("settled").unwrap().data(),
        &VectorData::Logical(vec![1, NA_LOGICAL, 0])
    );
}

#[test]
fn test_collection_round_trips_through_data_frame() {
    let table = table_from_collection(&trades(), ROOT_RECORD).unwrap();

    let df = table.to_data_frame().unwrap();
    let restored = table_from_foreign_value(&df).unwrap();

    assert!(restored.row_labels().is_none());
    assert_eq!(restored.columns(), table.columns());
}

#[test]
fn test_data_frame_string_row_names_become_labels() {
    let df = ForeignValue::named_list(vec![(
        "n".to_string(),
        ForeignValue::integers(vec![4, 5]),
    )])
    .with_attribute("class", ForeignValue::string("data.frame"))
    .with_attribute("row.names", ForeignValue::strings(vec!["2001", "2002"]));

    let table = table_from_foreign_value(&df).unwrap();

    let labels = table.row_labels().unwrap();
    assert_eq!(labels.name(), ROW_NAMES_COLUMN);
    assert_eq!(labels.data(), &VectorData::Int32(vec![2001, 2002]));
}

#[test]
fn test_named_vector_names_become_label_column() {
    let value = ForeignValue::doubles(vec![0.25, 0.75])
        .with_attribute("names", ForeignValue::strings(vec!["p", "q"]));

    let table = table_from_foreign_value(&value).unwrap();

    assert_eq!(
        table.row_labels().unwrap().data(),
        &VectorData::Utf8(vec![Some("p".into()), Some("q".into())])
    );
    assert_eq!(table.columns()[0].name(), "Value");
    assert!(table.columns()[0].names().is_none());
}

#[test]
fn test_names_fallback_applies_to_one_dimensional_tables() {
    let value = ForeignValue::integers(vec![2, 1])
        .with_attribute("dim", ForeignValue::integers(vec![2]))
        .with_attribute(
            "dimnames",
            ForeignValue::named_list(vec![(
                "".to_string(),
                ForeignValue::strings(vec!["ABC", "XYZ"]),
            )]),
        );

    let table = table_from_foreign_value(&value).unwrap();

    assert_eq!(
        table.row_labels().unwrap().data(),
        &VectorData::Utf8(vec![Some("ABC".into()), Some("XYZ".into())])
    );
}

#[test]
fn test_matrix_dispatch() {
    let value = ForeignValue::doubles(vec![1.0, 2.0, 3.0, 4.0])
        .with_attribute("dim", ForeignValue::integers(vec![2, 2]));

    let table = table_from_named_foreign_value(Some("m"), &value).unwrap();

    assert_eq!(table.name(), "m");
    assert!(table.row_labels().is_none());
    let names: Vec<&str> = table.columns().iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["1", "2"]);
}

#[test]
fn test_null_is_unsupported() {
    assert!(matches!(
        table_from_foreign_value(&ForeignValue::Null),
        Err(BridgeError::UnsupportedType(_))
    ));
}

#[test]
fn test_empty_collection_is_schema_error() {
    let empty: Vec<Trade> = Vec::new();
    assert!(matches!(
        table_from_collection(&empty, ROOT_RECORD),
        Err(BridgeError::RecordSchemaError(_))
    ));
}

#[test]
fn test_collection_to_record_batch() {
    let table = table_from_collection(&trades(), ROOT_RECORD).unwrap();

    let batch = table_to_record_batch(&table).unwrap();

    assert_eq!(batch.num_rows(), 3);
    assert_eq!(batch.num_columns(), 4);
    assert_eq!(batch.column(3).null_count(), 1);
}
