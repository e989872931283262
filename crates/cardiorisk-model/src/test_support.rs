//! Artifact fixtures over the real training schema.

use std::path::Path;

use cardiorisk_core::FEATURE_NAMES;

use crate::artifact::{ClassLabel, Estimator, ModelArtifact, Tree, TreeNode};

const CHEST_PAIN: usize = 2;
const THALLIUM: usize = 12;

fn feature_names() -> Vec<String> {
    FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
}

/// `z = 0.5 * chest_pain + thallium - 6`.
///
/// The default form scores about 7.6%; asymptomatic pain with a reversible
/// defect scores about 95.3%.
pub fn logistic_artifact() -> ModelArtifact {
    let mut coefficients = vec![0.0; FEATURE_NAMES.len()];
    coefficients[CHEST_PAIN] = 0.5;
    coefficients[THALLIUM] = 1.0;
    ModelArtifact {
        feature_names: feature_names(),
        classes: [ClassLabel::Int(0), ClassLabel::Int(1)],
        estimator: Estimator::LogisticRegression {
            coefficients,
            intercept: -6.0,
        },
    }
}

/// Positive exactly when thallium is above 5.
pub fn svc_artifact() -> ModelArtifact {
    let mut coefficients = vec![0.0; FEATURE_NAMES.len()];
    coefficients[THALLIUM] = 1.0;
    ModelArtifact {
        feature_names: feature_names(),
        classes: [ClassLabel::Int(0), ClassLabel::Int(1)],
        estimator: Estimator::LinearSvc {
            coefficients,
            intercept: -5.0,
        },
    }
}

/// Single split on thallium with string labels: normal thallium leaf is 20%
/// positive, defect leaf 75%.
pub fn tree_artifact() -> ModelArtifact {
    ModelArtifact {
        feature_names: feature_names(),
        classes: [
            ClassLabel::Text("Absence".into()),
            ClassLabel::Text("Presence".into()),
        ],
        estimator: Estimator::DecisionTree(Tree {
            nodes: vec![
                TreeNode::Split {
                    feature: THALLIUM,
                    threshold: 4.5,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: [8.0, 2.0] },
                TreeNode::Leaf { value: [1.0, 3.0] },
            ],
        }),
    }
}

pub fn write_artifact(path: &Path, artifact: &ModelArtifact) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, serde_json::to_vec_pretty(artifact).unwrap()).unwrap();
}
