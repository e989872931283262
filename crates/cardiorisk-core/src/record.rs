//! Encoded feature record: one patient, in the model's numeric schema.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use serde::Serialize;

use crate::schema::{FEATURE_NAMES, feature_schema};

/// A single feature value as it appears in the training data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Int(i64),
    Float(f64),
}

impl FeatureValue {
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }
}

/// The thirteen training features for one patient.
///
/// Produced by [`ManualInput::encode`](crate::ManualInput::encode). Field
/// order follows [`FEATURE_NAMES`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureRecord {
    #[serde(rename = "Age")]
    pub age: i64,
    #[serde(rename = "Sex")]
    pub sex: i64,
    #[serde(rename = "Chest pain type")]
    pub chest_pain_type: i64,
    #[serde(rename = "BP")]
    pub bp: i64,
    #[serde(rename = "Cholesterol")]
    pub cholesterol: i64,
    #[serde(rename = "FBS over 120")]
    pub fbs_over_120: i64,
    #[serde(rename = "EKG results")]
    pub ekg_results: i64,
    #[serde(rename = "Max HR")]
    pub max_hr: i64,
    #[serde(rename = "Exercise angina")]
    pub exercise_angina: i64,
    #[serde(rename = "ST depression")]
    pub st_depression: f64,
    #[serde(rename = "Slope of ST")]
    pub slope_of_st: i64,
    #[serde(rename = "Number of vessels fluro")]
    pub vessels_fluro: i64,
    #[serde(rename = "Thallium")]
    pub thallium: i64,
}

impl FeatureRecord {
    /// Named values in training order.
    pub fn fields(&self) -> [(&'static str, FeatureValue); 13] {
        use FeatureValue::{Float, Int};
        let values = [
            Int(self.age),
            Int(self.sex),
            Int(self.chest_pain_type),
            Int(self.bp),
            Int(self.cholesterol),
            Int(self.fbs_over_120),
            Int(self.ekg_results),
            Int(self.max_hr),
            Int(self.exercise_angina),
            Float(self.st_depression),
            Int(self.slope_of_st),
            Int(self.vessels_fluro),
            Int(self.thallium),
        ];
        let mut out = [("", Int(0)); 13];
        for (slot, (name, value)) in out.iter_mut().zip(FEATURE_NAMES.iter().zip(values)) {
            *slot = (*name, value);
        }
        out
    }

    /// Build a single-row batch matching [`feature_schema`].
    pub fn to_record_batch(&self) -> Result<RecordBatch, ArrowError> {
        let columns: Vec<ArrayRef> = self
            .fields()
            .iter()
            .map(|(_, value)| -> ArrayRef {
                match *value {
                    FeatureValue::Int(v) => Arc::new(Int64Array::from(vec![v])),
                    FeatureValue::Float(v) => Arc::new(Float64Array::from(vec![v])),
                }
            })
            .collect();
        RecordBatch::try_new(Arc::new(feature_schema()), columns)
    }
}
