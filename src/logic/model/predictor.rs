//! Predictors - in-process inference over loaded parameter bundles
//!
//! Capability is resolved once at load time: probabilistic models expose a
//! class distribution, deterministic models a single value. No per-request
//! capability sniffing.

use ndarray::ArrayView1;

use crate::logic::model::bundle::{tree_leaf, PredictorSpec, TreeNode};
use crate::logic::PipelineError;

/// Classifier with a class distribution.
#[derive(Debug, Clone)]
pub enum ProbabilisticModel {
    Logistic { coefficients: Vec<f64>, intercept: f64 },
    DecisionTree { nodes: Vec<TreeNode> },
    RandomForest { trees: Vec<Vec<TreeNode>> },
}

/// Regressor (or hard classifier) with a single output.
#[derive(Debug, Clone)]
pub enum DeterministicModel {
    Linear { coefficients: Vec<f64>, intercept: f64 },
    GradientBoosting {
        base_score: f64,
        learning_rate: f64,
        trees: Vec<Vec<TreeNode>>,
    },
}

/// A loaded predictor with its capability fixed at load time.
#[derive(Debug, Clone)]
pub enum Predictor {
    Probabilistic(ProbabilisticModel),
    Deterministic(DeterministicModel),
}

fn dot(coefficients: &[f64], x: &[f64]) -> Result<f64, PipelineError> {
    if coefficients.len() != x.len() {
        return Err(PipelineError::ShapeMismatch {
            expected: coefficients.len(),
            got: x.len(),
        });
    }
    Ok(ArrayView1::from(coefficients).dot(&ArrayView1::from(x)))
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Positive-class fraction of a classifier leaf distribution.
fn leaf_positive_fraction(value: &[f64]) -> f64 {
    match value {
        [] => 0.0,
        [single] => single.clamp(0.0, 1.0),
        counts => {
            let total: f64 = counts.iter().sum();
            if total > 0.0 {
                counts.get(1).copied().unwrap_or(0.0) / total
            } else {
                0.0
            }
        }
    }
}

impl ProbabilisticModel {
    /// Probability pair `(p_negative, p_positive)` for an input vector.
    pub fn predict_distribution(&self, x: &[f64]) -> Result<(f64, f64), PipelineError> {
        let positive = match self {
            ProbabilisticModel::Logistic { coefficients, intercept } => {
                sigmoid(dot(coefficients, x)? + intercept)
            }
            ProbabilisticModel::DecisionTree { nodes } => {
                leaf_positive_fraction(tree_leaf(nodes, x))
            }
            ProbabilisticModel::RandomForest { trees } => {
                if trees.is_empty() {
                    return Err(PipelineError::EmptyEnsemble);
                }
                let sum: f64 = trees
                    .iter()
                    .map(|tree| leaf_positive_fraction(tree_leaf(tree, x)))
                    .sum();
                sum / trees.len() as f64
            }
        };
        Ok((1.0 - positive, positive))
    }

    /// Hard class label: 1.0 when the positive class dominates.
    pub fn predict(&self, x: &[f64]) -> Result<f64, PipelineError> {
        let (_, positive) = self.predict_distribution(x)?;
        Ok(if positive >= 0.5 { 1.0 } else { 0.0 })
    }
}

impl DeterministicModel {
    pub fn predict(&self, x: &[f64]) -> Result<f64, PipelineError> {
        match self {
            DeterministicModel::Linear { coefficients, intercept } => {
                Ok(dot(coefficients, x)? + intercept)
            }
            DeterministicModel::GradientBoosting { base_score, learning_rate, trees } => {
                let boosted: f64 = trees
                    .iter()
                    .map(|tree| tree_leaf(tree, x).first().copied().unwrap_or(0.0))
                    .sum();
                Ok(base_score + learning_rate * boosted)
            }
        }
    }
}

impl Predictor {
    /// Resolve a serialized spec into a predictor with a fixed capability.
    pub fn from_spec(spec: PredictorSpec) -> Self {
        match spec {
            PredictorSpec::Logistic { coefficients, intercept } => {
                Predictor::Probabilistic(ProbabilisticModel::Logistic { coefficients, intercept })
            }
            PredictorSpec::DecisionTree { nodes } => {
                Predictor::Probabilistic(ProbabilisticModel::DecisionTree { nodes })
            }
            PredictorSpec::RandomForest { trees } => {
                Predictor::Probabilistic(ProbabilisticModel::RandomForest { trees })
            }
            PredictorSpec::GradientBoosting { base_score, learning_rate, trees } => {
                Predictor::Deterministic(DeterministicModel::GradientBoosting {
                    base_score,
                    learning_rate,
                    trees,
                })
            }
            PredictorSpec::Linear { coefficients, intercept } => {
                Predictor::Deterministic(DeterministicModel::Linear { coefficients, intercept })
            }
        }
    }

    pub fn is_probabilistic(&self) -> bool {
        matches!(self, Predictor::Probabilistic(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Predictor::Probabilistic(ProbabilisticModel::Logistic { .. }) => "logistic_regression",
            Predictor::Probabilistic(ProbabilisticModel::DecisionTree { .. }) => "decision_tree",
            Predictor::Probabilistic(ProbabilisticModel::RandomForest { .. }) => "random_forest",
            Predictor::Deterministic(DeterministicModel::Linear { .. }) => "linear",
            Predictor::Deterministic(DeterministicModel::GradientBoosting { .. }) => {
                "gradient_boosting"
            }
        }
    }

    /// Probability of the positive class, however the model expresses it.
    /// Deterministic outputs are clamped into [0, 1].
    pub fn positive_probability(&self, x: &[f64]) -> Result<f64, PipelineError> {
        match self {
            Predictor::Probabilistic(model) => Ok(model.predict_distribution(x)?.1),
            Predictor::Deterministic(model) => Ok(model.predict(x)?.clamp(0.0, 1.0)),
        }
    }

    /// Split-frequency feature importances for tree-based models.
    /// Normalized to sum to 1; None for models without tree structure.
    pub fn feature_importances(&self, feature_count: usize) -> Option<Vec<f64>> {
        let mut counts = vec![0.0f64; feature_count];
        let mut tally = |nodes: &[TreeNode]| {
            for node in nodes {
                if let TreeNode::Split { feature, .. } = node {
                    if let Some(slot) = counts.get_mut(*feature) {
                        *slot += 1.0;
                    }
                }
            }
        };
        match self {
            Predictor::Probabilistic(ProbabilisticModel::DecisionTree { nodes }) => tally(nodes),
            Predictor::Probabilistic(ProbabilisticModel::RandomForest { trees })
            | Predictor::Deterministic(DeterministicModel::GradientBoosting { trees, .. }) => {
                for tree in trees {
                    tally(tree);
                }
            }
            _ => return None,
        }
        let total: f64 = counts.iter().sum();
        if total > 0.0 {
            for c in &mut counts {
                *c /= total;
            }
        }
        Some(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(feature: usize, threshold: f64, left: usize, right: usize) -> TreeNode {
        TreeNode::Split { feature, threshold, left, right }
    }

    fn leaf(value: Vec<f64>) -> TreeNode {
        TreeNode::Leaf { value }
    }

    #[test]
    fn test_logistic_sigmoid_output() {
        let model = ProbabilisticModel::Logistic {
            coefficients: vec![1.0, -1.0],
            intercept: 0.0,
        };
        let (neg, pos) = model.predict_distribution(&[2.0, 2.0]).unwrap();
        assert!((pos - 0.5).abs() < 1e-12);
        assert!((neg + pos - 1.0).abs() < 1e-12);

        let (_, high) = model.predict_distribution(&[10.0, 0.0]).unwrap();
        assert!(high > 0.99);
    }

    #[test]
    fn test_logistic_shape_mismatch() {
        let model = ProbabilisticModel::Logistic {
            coefficients: vec![1.0, 2.0, 3.0],
            intercept: 0.0,
        };
        let err = model.predict_distribution(&[1.0]).unwrap_err();
        assert!(matches!(err, PipelineError::ShapeMismatch { expected: 3, got: 1 }));
    }

    #[test]
    fn test_decision_tree_distribution() {
        let model = ProbabilisticModel::DecisionTree {
            nodes: vec![
                split(0, 0.5, 1, 2),
                leaf(vec![9.0, 1.0]),
                leaf(vec![2.0, 8.0]),
            ],
        };
        let (_, low) = model.predict_distribution(&[0.0]).unwrap();
        let (_, high) = model.predict_distribution(&[1.0]).unwrap();
        assert!((low - 0.1).abs() < 1e-12);
        assert!((high - 0.8).abs() < 1e-12);
        assert_eq!(model.predict(&[1.0]).unwrap(), 1.0);
        assert_eq!(model.predict(&[0.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_random_forest_averages_trees() {
        let model = ProbabilisticModel::RandomForest {
            trees: vec![
                vec![leaf(vec![0.0, 1.0])],
                vec![leaf(vec![1.0, 0.0])],
            ],
        };
        let (_, pos) = model.predict_distribution(&[0.0]).unwrap();
        assert!((pos - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_gradient_boosting_sum() {
        let model = DeterministicModel::GradientBoosting {
            base_score: 100.0,
            learning_rate: 0.5,
            trees: vec![vec![leaf(vec![10.0])], vec![leaf(vec![4.0])]],
        };
        assert_eq!(model.predict(&[0.0]).unwrap(), 107.0);
    }

    #[test]
    fn test_capability_resolution() {
        let probabilistic = Predictor::from_spec(PredictorSpec::DecisionTree { nodes: vec![] });
        let deterministic = Predictor::from_spec(PredictorSpec::Linear {
            coefficients: vec![],
            intercept: 0.0,
        });
        assert!(probabilistic.is_probabilistic());
        assert!(!deterministic.is_probabilistic());
    }

    #[test]
    fn test_feature_importances_from_splits() {
        let predictor = Predictor::from_spec(PredictorSpec::DecisionTree {
            nodes: vec![
                split(0, 1.0, 1, 2),
                split(0, 0.5, 3, 4),
                leaf(vec![1.0, 0.0]),
                leaf(vec![1.0, 0.0]),
                split(2, 2.0, 5, 6),
                leaf(vec![0.0, 1.0]),
                leaf(vec![1.0, 1.0]),
            ],
        });
        let importances = predictor.feature_importances(3).unwrap();
        assert_eq!(importances, vec![2.0 / 3.0, 0.0, 1.0 / 3.0]);

        let linear = Predictor::from_spec(PredictorSpec::Linear {
            coefficients: vec![1.0],
            intercept: 0.0,
        });
        assert!(linear.feature_importances(1).is_none());
    }
}
