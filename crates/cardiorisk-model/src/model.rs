//! Loaded classifier exposing `predict` and `predict_proba` over Arrow batches.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use arrow::array::{Array, Float64Array};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;

use crate::artifact::{ClassLabel, ModelArtifact};
use crate::error::{ModelError, SchemaMismatch};

/// An immutable, loaded classifier.
///
/// Columns are matched to features by name. Every feature must be present,
/// numeric, and non-null, and the batch may hold no other columns.
#[derive(Debug)]
pub struct Model {
    artifact: ModelArtifact,
    source: PathBuf,
}

impl Model {
    /// Read and validate an artifact from disk.
    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        let deserialization = |reason: String| ModelError::Deserialization {
            path: path.to_path_buf(),
            reason,
        };
        let bytes = fs::read(path).map_err(|e| deserialization(e.to_string()))?;
        let artifact = ModelArtifact::from_json(&bytes).map_err(deserialization)?;
        Ok(Self {
            artifact,
            source: path.to_path_buf(),
        })
    }

    pub fn from_artifact(artifact: ModelArtifact, source: impl Into<PathBuf>) -> Self {
        Self {
            artifact,
            source: source.into(),
        }
    }

    /// Path the artifact was read from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn kind(&self) -> &'static str {
        self.artifact.estimator.kind()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.artifact.feature_names
    }

    /// `[negative, positive]` raw labels.
    pub fn classes(&self) -> &[ClassLabel; 2] {
        &self.artifact.classes
    }

    pub fn supports_proba(&self) -> bool {
        self.artifact.estimator.supports_proba()
    }

    /// Predicted raw label for every row.
    pub fn predict(&self, batch: &RecordBatch) -> Result<Vec<ClassLabel>, SchemaMismatch> {
        let rows = self.feature_rows(batch)?;
        Ok(self.labels(&rows))
    }

    /// Class probabilities for every row, or `None` if the estimator has no
    /// probability support.
    pub fn predict_proba(
        &self,
        batch: &RecordBatch,
    ) -> Result<Option<Vec<[f64; 2]>>, SchemaMismatch> {
        let rows = self.feature_rows(batch)?;
        Ok(self.probabilities(&rows))
    }

    /// Labels and, when supported, probabilities from a single pass over
    /// the batch.
    pub fn score(
        &self,
        batch: &RecordBatch,
    ) -> Result<(Vec<ClassLabel>, Option<Vec<[f64; 2]>>), SchemaMismatch> {
        let rows = self.feature_rows(batch)?;
        Ok((self.labels(&rows), self.probabilities(&rows)))
    }

    fn labels(&self, rows: &[Vec<f64>]) -> Vec<ClassLabel> {
        rows.iter()
            .map(|row| self.artifact.classes[self.artifact.estimator.predict_index(row)].clone())
            .collect()
    }

    fn probabilities(&self, rows: &[Vec<f64>]) -> Option<Vec<[f64; 2]>> {
        self.supports_proba()
            .then(|| rows.iter().map(|row| self.artifact.estimator.proba(row)).collect())
            .flatten()
    }

    /// Extract row-major `f64` features in training order.
    fn feature_rows(&self, batch: &RecordBatch) -> Result<Vec<Vec<f64>>, SchemaMismatch> {
        let names = &self.artifact.feature_names;
        let schema = batch.schema();

        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let col = batch
                .column_by_name(name)
                .ok_or_else(|| SchemaMismatch::MissingColumn(name.clone()))?;
            columns.push((name, col));
        }

        let mut seen = HashSet::with_capacity(names.len());
        for field in schema.fields() {
            let name = field.name();
            if !names.contains(name) {
                return Err(SchemaMismatch::UnexpectedColumn(name.clone()));
            }
            if !seen.insert(name) {
                return Err(SchemaMismatch::DuplicateColumn(name.clone()));
            }
        }

        let n = batch.num_rows();
        let mut rows = vec![Vec::with_capacity(names.len()); n];
        // Header-only input infers string columns; with no rows there is
        // nothing to convert.
        if n == 0 {
            return Ok(rows);
        }

        for (name, col) in columns {
            if !col.data_type().is_numeric() {
                return Err(SchemaMismatch::NonNumeric {
                    column: name.clone(),
                    data_type: col.data_type().to_string(),
                });
            }
            if let Some(row) = (0..n).find(|&i| col.is_null(i)) {
                return Err(SchemaMismatch::NullValue {
                    column: name.clone(),
                    row,
                });
            }
            let as_f64 = cast(col, &DataType::Float64).map_err(|e| SchemaMismatch::NonNumeric {
                column: name.clone(),
                data_type: e.to_string(),
            })?;
            let values = as_f64
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| SchemaMismatch::NonNumeric {
                    column: name.clone(),
                    data_type: col.data_type().to_string(),
                })?;
            for (row, &v) in rows.iter_mut().zip(values.values().iter()) {
                row.push(v);
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{logistic_artifact, svc_artifact};
    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use cardiorisk_core::ManualInput;
    use std::sync::Arc;

    fn model(artifact: ModelArtifact) -> Model {
        Model::from_artifact(artifact, "memory")
    }

    #[test]
    fn predicts_encoded_record() {
        let m = model(logistic_artifact());
        let batch = ManualInput::default().encode().to_record_batch().unwrap();
        let labels = m.predict(&batch).unwrap();
        assert_eq!(labels.len(), 1);
        let proba = m.predict_proba(&batch).unwrap().unwrap();
        let [p0, p1] = proba[0];
        assert!((p0 + p1 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn column_order_does_not_matter() {
        let m = model(logistic_artifact());
        let batch = ManualInput::default().encode().to_record_batch().unwrap();
        let reversed = batch
            .project(&(0..batch.num_columns()).rev().collect::<Vec<_>>())
            .unwrap();
        assert_eq!(
            m.predict_proba(&batch).unwrap(),
            m.predict_proba(&reversed).unwrap()
        );
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let m = model(logistic_artifact());
        let batch = ManualInput::default().encode().to_record_batch().unwrap();
        let idx = batch.schema().index_of("Thallium").unwrap();
        let keep: Vec<usize> = (0..batch.num_columns()).filter(|&i| i != idx).collect();
        let dropped = batch.project(&keep).unwrap();
        assert_eq!(
            m.predict(&dropped).unwrap_err(),
            SchemaMismatch::MissingColumn("Thallium".into())
        );
    }

    #[test]
    fn extra_column_is_rejected() {
        let m = model(svc_artifact());
        let batch = ManualInput::default().encode().to_record_batch().unwrap();
        let mut fields: Vec<Field> = batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.as_ref().clone())
            .collect();
        fields.push(Field::new("id", DataType::Int64, false));
        let mut columns = batch.columns().to_vec();
        columns.push(Arc::new(Int64Array::from(vec![7])));
        let widened = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).unwrap();
        assert_eq!(
            m.predict(&widened).unwrap_err(),
            SchemaMismatch::UnexpectedColumn("id".into())
        );
    }

    #[test]
    fn text_column_is_rejected() {
        let artifact = ModelArtifact {
            feature_names: vec!["Sex".into()],
            ..svc_artifact_one_feature()
        };
        let m = model(artifact);
        let schema = Schema::new(vec![Field::new("Sex", DataType::Utf8, false)]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(StringArray::from(vec!["Male"]))],
        )
        .unwrap();
        assert!(matches!(
            m.predict(&batch).unwrap_err(),
            SchemaMismatch::NonNumeric { column, .. } if column == "Sex"
        ));
    }

    #[test]
    fn null_cell_is_rejected() {
        let m = model(ModelArtifact {
            feature_names: vec!["Age".into()],
            ..svc_artifact_one_feature()
        });
        let schema = Schema::new(vec![Field::new("Age", DataType::Int64, true)]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(Int64Array::from(vec![Some(40), None]))],
        )
        .unwrap();
        assert_eq!(
            m.predict(&batch).unwrap_err(),
            SchemaMismatch::NullValue {
                column: "Age".into(),
                row: 1
            }
        );
    }

    #[test]
    fn repeated_feature_column_is_rejected() {
        let m = model(svc_artifact());
        let batch = ManualInput::default().encode().to_record_batch().unwrap();
        let age = batch.schema().index_of("Age").unwrap();
        let mut indices: Vec<usize> = (0..batch.num_columns()).collect();
        indices.push(age);
        let repeated = batch.project(&indices).unwrap();
        assert_eq!(
            m.predict(&repeated).unwrap_err(),
            SchemaMismatch::DuplicateColumn("Age".into())
        );
    }

    #[test]
    fn score_matches_predict_and_predict_proba() {
        let m = model(logistic_artifact());
        let batch = ManualInput::default().encode().to_record_batch().unwrap();
        let (labels, proba) = m.score(&batch).unwrap();
        assert_eq!(labels, m.predict(&batch).unwrap());
        assert_eq!(proba, m.predict_proba(&batch).unwrap());

        let (_, none) = model(svc_artifact()).score(&batch).unwrap();
        assert_eq!(none, None);
    }

    #[test]
    fn svc_has_no_probabilities() {
        let m = model(svc_artifact());
        let batch = ManualInput::default().encode().to_record_batch().unwrap();
        assert!(!m.supports_proba());
        assert_eq!(m.predict_proba(&batch).unwrap(), None);
        assert_eq!(m.predict(&batch).unwrap().len(), 1);
    }

    fn svc_artifact_one_feature() -> ModelArtifact {
        ModelArtifact {
            feature_names: vec!["x".into()],
            classes: [ClassLabel::Int(0), ClassLabel::Int(1)],
            estimator: crate::artifact::Estimator::LinearSvc {
                coefficients: vec![1.0],
                intercept: 0.0,
            },
        }
    }
}
