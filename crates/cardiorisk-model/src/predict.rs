//! Single-record prediction and its display formatting.

use std::fmt;

use cardiorisk_core::FeatureRecord;
use tracing::debug;

use crate::artifact::ClassLabel;
use crate::error::ModelError;
use crate::model::Model;

/// Canonical reading of the model's predicted label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Diagnosis {
    /// No heart disease predicted.
    Absence,
    /// Heart disease predicted.
    Presence,
}

impl Diagnosis {
    /// Map a raw artifact label onto a diagnosis.
    ///
    /// Integer `1`, and the strings `"Presence"` (any case) and `"1"`, mean
    /// disease present. Every other label means absent.
    pub fn from_label(label: &ClassLabel) -> Self {
        let positive = match label {
            ClassLabel::Int(v) => *v == 1,
            ClassLabel::Text(s) => {
                let s = s.trim();
                s.eq_ignore_ascii_case("presence") || s == "1"
            }
        };
        if positive {
            Self::Presence
        } else {
            Self::Absence
        }
    }

    pub fn is_positive(self) -> bool {
        self == Self::Presence
    }

    /// Verdict shown to the user.
    pub fn verdict(self) -> &'static str {
        match self {
            Self::Presence => "HEART DISEASE DETECTED",
            Self::Absence => "NORMAL",
        }
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verdict())
    }
}

/// Outcome of scoring one patient.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    /// Label exactly as the artifact names it.
    pub label: ClassLabel,
    pub diagnosis: Diagnosis,
    /// Positive-class probability; `None` when the model has no probability
    /// support.
    pub probability: Option<f64>,
}

impl PredictionResult {
    /// Risk as a percentage. Models without probability support report 0.
    pub fn risk_percent(&self) -> f64 {
        self.probability.unwrap_or(0.0) * 100.0
    }

    /// Risk with one decimal place, e.g. `73.4%`.
    pub fn risk_score(&self) -> String {
        format!("{:.1}%", self.risk_percent())
    }
}

/// Score one encoded record.
///
/// Any failure (for example an artifact trained on different columns) is a
/// [`ModelError::Prediction`]; the model stays usable for the next call.
pub fn predict_record(model: &Model, record: &FeatureRecord) -> Result<PredictionResult, ModelError> {
    let batch = record
        .to_record_batch()
        .map_err(|e| ModelError::Prediction(e.to_string()))?;

    let (labels, proba) = model
        .score(&batch)
        .map_err(|e| ModelError::Prediction(e.to_string()))?;
    let label = labels
        .into_iter()
        .next()
        .ok_or_else(|| ModelError::Prediction("model returned no prediction".into()))?;
    let probability = proba.and_then(|rows| rows.first().map(|p| p[1]));

    let diagnosis = Diagnosis::from_label(&label);
    debug!(%label, ?diagnosis, ?probability, "scored record");
    Ok(PredictionResult {
        label,
        diagnosis,
        probability,
    })
}
