//! Model bundle format
//!
//! Bundles are JSON files under the model directory. A file is either a
//! bare predictor object or a wrapper with optional companion parts
//! (scaler, feature columns, encoders, sub-models). Loading normalizes
//! both shapes into one canonical structure, so the rest of the code
//! never sees the on-disk variants.

use std::collections::HashMap;

use serde::Deserialize;

/// A node of a serialized decision tree. Trees are stored as flat arrays;
/// index 0 is the root, split nodes reference children by index.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// Class distribution for classifiers, single value for regressors.
        value: Vec<f64>,
    },
}

/// Walk a tree for an input vector and return the leaf value slice.
/// A well-formed tree reaches a leaf within `nodes.len()` steps; a bundle
/// whose child indices form a cycle returns empty instead of looping.
pub fn tree_leaf<'a>(nodes: &'a [TreeNode], x: &[f64]) -> &'a [f64] {
    let mut index = 0usize;
    for _ in 0..=nodes.len() {
        match nodes.get(index) {
            Some(TreeNode::Split { feature, threshold, left, right }) => {
                let value = x.get(*feature).copied().unwrap_or(0.0);
                index = if value <= *threshold { *left } else { *right };
            }
            Some(TreeNode::Leaf { value }) => return value,
            None => return &[],
        }
    }
    &[]
}

/// Serialized predictor parameters, tagged by model type.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum PredictorSpec {
    #[serde(rename = "logistic_regression")]
    Logistic { coefficients: Vec<f64>, intercept: f64 },

    #[serde(rename = "decision_tree")]
    DecisionTree { nodes: Vec<TreeNode> },

    #[serde(rename = "random_forest")]
    RandomForest { trees: Vec<Vec<TreeNode>> },

    #[serde(rename = "gradient_boosting")]
    GradientBoosting {
        base_score: f64,
        learning_rate: f64,
        trees: Vec<Vec<TreeNode>>,
    },

    #[serde(rename = "linear")]
    Linear { coefficients: Vec<f64>, intercept: f64 },
}

/// Standard scaler fitted at training time: `(x - mean) / scale`.
#[derive(Debug, Clone, Deserialize)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl Scaler {
    /// Transform a vector. Zero or missing scale entries pass the centered
    /// value through unscaled, mirroring the training-time behavior for
    /// constant columns.
    pub fn transform(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .enumerate()
            .map(|(i, &v)| {
                let mean = self.mean.get(i).copied().unwrap_or(0.0);
                let scale = self.scale.get(i).copied().unwrap_or(1.0);
                let scale = if scale > 0.0 { scale } else { 1.0 };
                (v - mean) / scale
            })
            .collect()
    }
}

/// Categorical encoder table. Either an ordered class list (code = index)
/// or an explicit value -> code mapping.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Encoder {
    Classes { classes: Vec<String> },
    Mapping { mapping: HashMap<String, i64> },
}

impl Encoder {
    /// Code of a categorical value. Unknown values map to 0 so inference
    /// stays available for categories unseen at training time.
    pub fn code(&self, raw: &str) -> i64 {
        match self {
            Encoder::Classes { classes } => classes
                .iter()
                .position(|c| c == raw)
                .map(|i| i as i64)
                .unwrap_or(0),
            Encoder::Mapping { mapping } => mapping.get(raw).copied().unwrap_or(0),
        }
    }
}

/// Optional companion parts of a wrapped bundle.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BundleParts {
    pub model: Option<PredictorSpec>,
    /// Named sub-models for multi-model packages (branch service).
    pub models: Option<HashMap<String, PredictorSpec>>,
    pub scaler: Option<Scaler>,
    pub feature_columns: Option<Vec<String>>,
    pub encoders: Option<HashMap<String, Encoder>>,
    pub target_labels: Option<Vec<String>>,
    pub best_model: Option<String>,
    pub timestamp: Option<String>,
}

/// On-disk bundle shape. Bare predictors are tried first (they carry a
/// `type` tag); anything else deserializes as a wrapper.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BundleFile {
    Bare(PredictorSpec),
    Wrapped(BundleParts),
}

impl BundleFile {
    /// Normalize either shape into canonical parts.
    pub fn into_parts(self) -> BundleParts {
        match self {
            BundleFile::Bare(spec) => BundleParts {
                model: Some(spec),
                ..Default::default()
            },
            BundleFile::Wrapped(parts) => parts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_bundle_normalizes() {
        let raw = json!({
            "type": "logistic_regression",
            "coefficients": [0.5, -0.25],
            "intercept": 0.1,
        });
        let parts = serde_json::from_value::<BundleFile>(raw).unwrap().into_parts();
        assert!(matches!(parts.model, Some(PredictorSpec::Logistic { .. })));
        assert!(parts.scaler.is_none());
        assert!(parts.feature_columns.is_none());
    }

    #[test]
    fn test_wrapped_bundle_normalizes() {
        let raw = json!({
            "model": { "type": "linear", "coefficients": [1.0], "intercept": 0.0 },
            "scaler": { "mean": [0.0], "scale": [2.0] },
            "feature_columns": ["Age"],
        });
        let parts = serde_json::from_value::<BundleFile>(raw).unwrap().into_parts();
        assert!(matches!(parts.model, Some(PredictorSpec::Linear { .. })));
        assert_eq!(parts.feature_columns.as_deref(), Some(&["Age".to_string()][..]));
        assert_eq!(parts.scaler.unwrap().transform(&[4.0]), vec![2.0]);
    }

    #[test]
    fn test_multi_model_bundle() {
        let raw = json!({
            "models": {
                "random_forest": { "type": "random_forest", "trees": [] },
            },
            "best_model": "random_forest",
            "encoders": {
                "Status": { "classes": ["Activated", "Terminated"] },
                "NPLStatus": { "mapping": { "N": 1, "P": 0 } },
            },
        });
        let parts = serde_json::from_value::<BundleFile>(raw).unwrap().into_parts();
        let models = parts.models.unwrap();
        assert!(models.contains_key("random_forest"));
        let encoders = parts.encoders.unwrap();
        assert_eq!(encoders["Status"].code("Terminated"), 1);
        assert_eq!(encoders["Status"].code("Unknown"), 0);
        assert_eq!(encoders["NPLStatus"].code("N"), 1);
    }

    #[test]
    fn test_tree_walk() {
        let nodes = vec![
            TreeNode::Split { feature: 0, threshold: 10.0, left: 1, right: 2 },
            TreeNode::Leaf { value: vec![8.0, 2.0] },
            TreeNode::Leaf { value: vec![1.0, 9.0] },
        ];
        assert_eq!(tree_leaf(&nodes, &[5.0]), &[8.0, 2.0]);
        assert_eq!(tree_leaf(&nodes, &[15.0]), &[1.0, 9.0]);
        // missing feature value walks left via 0.0
        assert_eq!(tree_leaf(&nodes, &[]), &[8.0, 2.0]);
    }

    #[test]
    fn test_tree_walk_cyclic_nodes_return_empty() {
        // self-referential root
        let nodes = vec![TreeNode::Split { feature: 0, threshold: 10.0, left: 0, right: 0 }];
        assert_eq!(tree_leaf(&nodes, &[5.0]), &[] as &[f64]);

        // two nodes pointing at each other
        let nodes = vec![
            TreeNode::Split { feature: 0, threshold: 10.0, left: 1, right: 1 },
            TreeNode::Split { feature: 0, threshold: 10.0, left: 0, right: 0 },
        ];
        assert_eq!(tree_leaf(&nodes, &[5.0]), &[] as &[f64]);
    }

    #[test]
    fn test_scaler_zero_scale_guard() {
        let scaler = Scaler { mean: vec![1.0, 1.0], scale: vec![0.0, 2.0] };
        assert_eq!(scaler.transform(&[3.0, 5.0]), vec![2.0, 2.0]);
    }
}
