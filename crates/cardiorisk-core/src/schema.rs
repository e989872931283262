//! Arrow schema for the model's training features.
//!
//! Column names and their order are part of the model contract: a record
//! built against any other layout is rejected at prediction time.

use arrow::datatypes::{DataType, Field, Schema};

/// Training feature names, in training order.
pub const FEATURE_NAMES: [&str; 13] = [
    "Age",
    "Sex",
    "Chest pain type",
    "BP",
    "Cholesterol",
    "FBS over 120",
    "EKG results",
    "Max HR",
    "Exercise angina",
    "ST depression",
    "Slope of ST",
    "Number of vessels fluro",
    "Thallium",
];

/// Name of the only fractional feature.
pub const ST_DEPRESSION: &str = "ST depression";

/// Schema for an encoded feature record.
///
/// Every column is non-nullable. `ST depression` is the only `Float64`
/// column; the rest are `Int64`.
pub fn feature_schema() -> Schema {
    Schema::new(
        FEATURE_NAMES
            .iter()
            .map(|&name| {
                let data_type = if name == ST_DEPRESSION {
                    DataType::Float64
                } else {
                    DataType::Int64
                };
                Field::new(name, data_type, false)
            })
            .collect::<Vec<_>>(),
    )
}
