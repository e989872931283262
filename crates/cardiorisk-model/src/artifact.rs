//! Serialized classifier formats and their per-row scoring.
//!
//! An artifact is a JSON document:
//!
//! ```json
//! {
//!   "feature_names": ["Age", "Sex", ...],
//!   "classes": [0, 1],
//!   "estimator": { "kind": "logistic_regression", "coefficients": [...], "intercept": -3.1 }
//! }
//! ```
//!
//! `classes[1]` is the positive class: probability vectors are
//! `[p(classes[0]), p(classes[1])]`. Loading never runs code from the file;
//! every supported estimator is plain data.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A raw class label as stored in the artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassLabel {
    Int(i64),
    Text(String),
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One node of a fitted decision tree, in pre-order.
///
/// Split nodes send a row left when `row[feature] <= threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Per-class training sample weight reaching this leaf.
    Leaf { value: [f64; 2] },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    /// Class probabilities at the leaf `row` falls into.
    fn proba(&self, row: &[f64]) -> [f64; 2] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                TreeNode::Leaf { value } => {
                    let total = value[0] + value[1];
                    return if total > 0.0 {
                        [value[0] / total, value[1] / total]
                    } else {
                        [0.5, 0.5]
                    };
                }
            }
        }
    }

    /// Children must point strictly forward, which also rules out cycles.
    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".into());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "node {i} splits on feature {feature}, but the model has {n_features}"
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {i} has non-finite threshold"));
                    }
                    for child in [*left, *right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(format!("node {i} has invalid child index {child}"));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.iter().any(|v| !v.is_finite() || *v < 0.0) {
                        return Err(format!("leaf {i} has invalid class weights"));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Supported estimator families.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    LogisticRegression {
        coefficients: Vec<f64>,
        intercept: f64,
    },
    /// Linear support vector classifier. Decision function only; no
    /// probability estimates.
    LinearSvc {
        coefficients: Vec<f64>,
        intercept: f64,
    },
    DecisionTree(Tree),
    RandomForest {
        trees: Vec<Tree>,
    },
}

impl Estimator {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LogisticRegression { .. } => "logistic_regression",
            Self::LinearSvc { .. } => "linear_svc",
            Self::DecisionTree(_) => "decision_tree",
            Self::RandomForest { .. } => "random_forest",
        }
    }

    pub fn supports_proba(&self) -> bool {
        !matches!(self, Self::LinearSvc { .. })
    }

    /// Index into `classes` of the predicted class.
    pub(crate) fn predict_index(&self, row: &[f64]) -> usize {
        match self {
            Self::LogisticRegression {
                coefficients,
                intercept,
            }
            | Self::LinearSvc {
                coefficients,
                intercept,
            } => usize::from(decision(coefficients, *intercept, row) > 0.0),
            Self::DecisionTree(_) | Self::RandomForest { .. } => {
                // Ties go to the first class.
                match self.proba(row) {
                    Some([p0, p1]) if p1 > p0 => 1,
                    _ => 0,
                }
            }
        }
    }

    /// `[p(classes[0]), p(classes[1])]`, or `None` without probability support.
    pub(crate) fn proba(&self, row: &[f64]) -> Option<[f64; 2]> {
        match self {
            Self::LogisticRegression {
                coefficients,
                intercept,
            } => {
                let p1 = sigmoid(decision(coefficients, *intercept, row));
                Some([1.0 - p1, p1])
            }
            Self::LinearSvc { .. } => None,
            Self::DecisionTree(tree) => Some(tree.proba(row)),
            Self::RandomForest { trees } => {
                let mut sum = [0.0, 0.0];
                for tree in trees {
                    let [p0, p1] = tree.proba(row);
                    sum[0] += p0;
                    sum[1] += p1;
                }
                let n = trees.len() as f64;
                Some([sum[0] / n, sum[1] / n])
            }
        }
    }

    fn validate(&self, n_features: usize) -> Result<(), String> {
        match self {
            Self::LogisticRegression {
                coefficients,
                intercept,
            }
            | Self::LinearSvc {
                coefficients,
                intercept,
            } => {
                if coefficients.len() != n_features {
                    return Err(format!(
                        "{} coefficients for {n_features} features",
                        coefficients.len()
                    ));
                }
                if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                    return Err("non-finite coefficient".into());
                }
                Ok(())
            }
            Self::DecisionTree(tree) => tree.validate(n_features),
            Self::RandomForest { trees } => {
                if trees.is_empty() {
                    return Err("random forest has no trees".into());
                }
                for (i, tree) in trees.iter().enumerate() {
                    tree.validate(n_features)
                        .map_err(|e| format!("tree {i}: {e}"))?;
                }
                Ok(())
            }
        }
    }
}

/// A complete, validated model document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Training column names, in training order.
    pub feature_names: Vec<String>,
    /// `[negative, positive]` raw labels.
    pub classes: [ClassLabel; 2],
    pub estimator: Estimator,
}

impl ModelArtifact {
    /// Parse and validate an artifact.
    pub fn from_json(bytes: &[u8]) -> Result<Self, String> {
        let artifact: Self = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.feature_names.is_empty() {
            return Err("artifact declares no features".into());
        }
        let mut seen = HashSet::new();
        for name in &self.feature_names {
            if !seen.insert(name.as_str()) {
                return Err(format!("duplicate feature name {name:?}"));
            }
        }
        if self.classes[0] == self.classes[1] {
            return Err(format!("both classes are labelled {}", self.classes[0]));
        }
        self.estimator.validate(self.feature_names.len())
    }
}

fn decision(coefficients: &[f64], intercept: f64, row: &[f64]) -> f64 {
    intercept + coefficients.iter().zip(row).map(|(c, x)| c * x).sum::<f64>()
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(neg: f64, pos: f64) -> TreeNode {
        TreeNode::Leaf { value: [neg, pos] }
    }

    fn split(feature: usize, threshold: f64, left: usize, right: usize) -> TreeNode {
        TreeNode::Split {
            feature,
            threshold,
            left,
            right,
        }
    }

    fn stump(threshold: f64) -> Tree {
        Tree {
            nodes: vec![split(0, threshold, 1, 2), leaf(9.0, 1.0), leaf(2.0, 8.0)],
        }
    }

    #[test]
    fn parses_logistic_regression() {
        let json = br#"{
            "feature_names": ["a", "b"],
            "classes": [0, 1],
            "estimator": { "kind": "logistic_regression", "coefficients": [1.0, -1.0], "intercept": 0.5 }
        }"#;
        let artifact = ModelArtifact::from_json(json).unwrap();
        assert_eq!(artifact.estimator.kind(), "logistic_regression");
        assert_eq!(artifact.classes, [ClassLabel::Int(0), ClassLabel::Int(1)]);
        assert!(artifact.estimator.supports_proba());
    }

    #[test]
    fn parses_string_labels_and_trees() {
        let json = br#"{
            "feature_names": ["a"],
            "classes": ["Absence", "Presence"],
            "estimator": { "kind": "decision_tree", "nodes": [
                { "type": "split", "feature": 0, "threshold": 1.5, "left": 1, "right": 2 },
                { "type": "leaf", "value": [3.0, 1.0] },
                { "type": "leaf", "value": [0.0, 4.0] }
            ] }
        }"#;
        let artifact = ModelArtifact::from_json(json).unwrap();
        assert_eq!(artifact.classes[1], ClassLabel::Text("Presence".into()));
        assert_eq!(artifact.estimator.proba(&[1.0]), Some([0.75, 0.25]));
        assert_eq!(artifact.estimator.predict_index(&[2.0]), 1);
    }

    #[test]
    fn rejects_garbage_and_wrong_class_count() {
        assert!(ModelArtifact::from_json(b"\x80\x04\x95 not json").is_err());
        let three = br#"{
            "feature_names": ["a"],
            "classes": [0, 1, 2],
            "estimator": { "kind": "linear_svc", "coefficients": [1.0], "intercept": 0.0 }
        }"#;
        assert!(ModelArtifact::from_json(three).is_err());
    }

    #[test]
    fn rejects_coefficient_count_mismatch() {
        let artifact = ModelArtifact {
            feature_names: vec!["a".into(), "b".into()],
            classes: [ClassLabel::Int(0), ClassLabel::Int(1)],
            estimator: Estimator::LogisticRegression {
                coefficients: vec![1.0],
                intercept: 0.0,
            },
        };
        let err = artifact.validate().unwrap_err();
        assert!(err.contains("1 coefficients for 2 features"), "{err}");
    }

    #[test]
    fn rejects_duplicate_features_and_classes() {
        let mut artifact = ModelArtifact {
            feature_names: vec!["a".into(), "a".into()],
            classes: [ClassLabel::Int(0), ClassLabel::Int(1)],
            estimator: Estimator::LinearSvc {
                coefficients: vec![1.0, 1.0],
                intercept: 0.0,
            },
        };
        assert!(artifact.validate().unwrap_err().contains("duplicate"));

        artifact.feature_names[1] = "b".into();
        artifact.classes[1] = ClassLabel::Int(0);
        assert!(artifact.validate().unwrap_err().contains("both classes"));
    }

    #[test]
    fn rejects_backward_tree_edges() {
        let tree = Tree {
            nodes: vec![split(0, 0.0, 1, 0), leaf(1.0, 0.0)],
        };
        let err = tree.validate(1).unwrap_err();
        assert!(err.contains("invalid child index 0"), "{err}");

        let out_of_range = Tree {
            nodes: vec![split(3, 0.0, 1, 2), leaf(1.0, 0.0), leaf(0.0, 1.0)],
        };
        assert!(out_of_range.validate(2).is_err());
    }

    #[test]
    fn logistic_regression_scores() {
        let est = Estimator::LogisticRegression {
            coefficients: vec![2.0],
            intercept: -2.0,
        };
        let [p0, p1] = est.proba(&[1.0]).unwrap();
        assert!((p1 - 0.5).abs() < 1e-12);
        assert!((p0 + p1 - 1.0).abs() < 1e-12);
        // Decision exactly zero is the negative class.
        assert_eq!(est.predict_index(&[1.0]), 0);
        assert_eq!(est.predict_index(&[1.5]), 1);
        assert!(est.proba(&[3.0]).unwrap()[1] > 0.98);
    }

    #[test]
    fn linear_svc_has_no_proba() {
        let est = Estimator::LinearSvc {
            coefficients: vec![1.0, 1.0],
            intercept: -1.0,
        };
        assert!(!est.supports_proba());
        assert_eq!(est.proba(&[1.0, 1.0]), None);
        assert_eq!(est.predict_index(&[1.0, 1.0]), 1);
        assert_eq!(est.predict_index(&[0.0, 0.5]), 0);
    }

    #[test]
    fn tree_goes_left_on_equal_threshold() {
        let tree = stump(5.0);
        assert_eq!(tree.proba(&[5.0]), [0.9, 0.1]);
        assert_eq!(tree.proba(&[5.1]), [0.2, 0.8]);
    }

    #[test]
    fn forest_averages_trees() {
        let est = Estimator::RandomForest {
            trees: vec![stump(5.0), stump(10.0)],
        };
        // 7.0: first tree goes right (0.8), second left (0.1).
        let [p0, p1] = est.proba(&[7.0]).unwrap();
        assert!((p1 - 0.45).abs() < 1e-12);
        assert!((p0 - 0.55).abs() < 1e-12);
        assert_eq!(est.predict_index(&[7.0]), 0);
        assert_eq!(est.predict_index(&[11.0]), 1);
    }

    #[test]
    fn class_label_display() {
        assert_eq!(ClassLabel::Int(1).to_string(), "1");
        assert_eq!(ClassLabel::Text("Presence".into()).to_string(), "Presence");
    }
}
