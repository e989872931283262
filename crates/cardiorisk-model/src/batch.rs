//! Batch scoring of pre-encoded CSV datasets.
//!
//! Uploaded files are read as-is: no categorical decoding happens here, so
//! column names and codes must already match the training data. Scoring is
//! all-or-nothing; a schema problem yields an error and no partial output.

use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::compute::concat_batches;
use arrow::csv::reader::Format;
use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use tracing::info;

use crate::artifact::ClassLabel;
use crate::error::ModelError;
use crate::model::Model;
use crate::predict::Diagnosis;

pub const PREDICTION_COLUMN: &str = "Prediction";
pub const PROBABILITY_COLUMN: &str = "Probability";

/// Suggested file name for exported results.
pub const DOWNLOAD_FILE_NAME: &str = "predictions.csv";
pub const DOWNLOAD_MIME: &str = "text/csv";

/// Rows shown when previewing a dataset.
pub const PREVIEW_ROWS: usize = 5;

/// Result of scoring a dataset.
#[derive(Debug, Clone)]
pub struct ScoredBatch {
    /// Input columns followed by `Prediction` and, when supported, `Probability`.
    pub batch: RecordBatch,
    /// Rows predicted as disease present.
    pub positives: usize,
}

impl ScoredBatch {
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn has_probability(&self) -> bool {
        self.batch.column_by_name(PROBABILITY_COLUMN).is_some()
    }

    /// Render as CSV for download.
    pub fn to_csv(&self) -> Result<Vec<u8>, ModelError> {
        write_csv(&self.batch)
    }
}

// ── CSV I/O ──

/// Parse CSV bytes (header row required) into a single batch.
///
/// Column types are inferred from the data. Anything that cannot be parsed
/// as a table is a [`ModelError::FileRead`].
pub fn read_csv(bytes: &[u8]) -> Result<RecordBatch, ModelError> {
    let file_read = |e: arrow::error::ArrowError| ModelError::FileRead(e.to_string());

    let format = Format::default().with_header(true);
    let (schema, _) = format
        .infer_schema(Cursor::new(bytes), None)
        .map_err(file_read)?;
    if schema.fields().is_empty() {
        return Err(ModelError::FileRead("file has no columns".into()));
    }
    let schema = Arc::new(schema);

    let reader = ReaderBuilder::new(Arc::clone(&schema))
        .with_format(format)
        .build(Cursor::new(bytes))
        .map_err(file_read)?;
    let batches = reader
        .collect::<Result<Vec<_>, _>>()
        .map_err(file_read)?;
    concat_batches(&schema, &batches).map_err(file_read)
}

/// Read a CSV file from disk.
pub fn read_csv_file(path: &Path) -> Result<RecordBatch, ModelError> {
    let bytes =
        fs::read(path).map_err(|e| ModelError::FileRead(format!("{}: {e}", path.display())))?;
    read_csv(&bytes)
}

/// Serialize a batch as UTF-8 CSV with a header row and no index column.
pub fn write_csv(batch: &RecordBatch) -> Result<Vec<u8>, ModelError> {
    let mut buf = Vec::new();
    {
        let mut writer = WriterBuilder::new().with_header(true).build(&mut buf);
        writer.write(batch)?;
    }
    Ok(buf)
}

/// First `rows` rows, for display.
pub fn preview(batch: &RecordBatch, rows: usize) -> RecordBatch {
    batch.slice(0, rows.min(batch.num_rows()))
}

// ── Scoring ──

/// Score every row and append the result columns.
///
/// Input columns are carried over untouched. Any mismatch between the
/// dataset and the model's features is a [`ModelError::BatchSchema`].
pub fn score_batch(model: &Model, batch: &RecordBatch) -> Result<ScoredBatch, ModelError> {
    let (labels, proba) = model.score(batch)?;

    let positives = labels
        .iter()
        .filter(|l| Diagnosis::from_label(l).is_positive())
        .count();

    let schema = batch.schema();
    let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
    let mut columns: Vec<ArrayRef> = batch.columns().to_vec();

    let (prediction_type, predictions) = label_column(model.classes(), &labels);
    fields.push(Field::new(PREDICTION_COLUMN, prediction_type, false));
    columns.push(predictions);

    if let Some(proba) = proba {
        fields.push(Field::new(PROBABILITY_COLUMN, DataType::Float64, false));
        columns.push(Arc::new(Float64Array::from_iter_values(
            proba.iter().map(|p| p[1]),
        )));
    }

    let scored = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
    info!(
        rows = scored.num_rows(),
        positives,
        model = model.kind(),
        "batch scored"
    );
    Ok(ScoredBatch {
        batch: scored,
        positives,
    })
}

/// Integer classes become an `Int64` column; anything else is written as text.
fn label_column(classes: &[ClassLabel; 2], labels: &[ClassLabel]) -> (DataType, ArrayRef) {
    let ints: Option<Vec<i64>> = classes
        .iter()
        .all(|c| matches!(c, ClassLabel::Int(_)))
        .then(|| {
            labels
                .iter()
                .map(|l| match l {
                    ClassLabel::Int(v) => Some(*v),
                    ClassLabel::Text(_) => None,
                })
                .collect()
        })
        .flatten();
    match ints {
        Some(values) => (DataType::Int64, Arc::new(Int64Array::from(values))),
        None => {
            let values: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
            (DataType::Utf8, Arc::new(StringArray::from(values)))
        }
    }
}
