//! Model Registry - startup loading of all serialized bundles
//!
//! Built once at process start and shared read-only behind the app state.
//! Every bundle loads independently: a missing or corrupt file only
//! removes that entry, it never blocks the others or the process.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::logic::model::bundle::{BundleFile, Encoder, Scaler};
use crate::logic::model::predictor::Predictor;

/// Registry keys of the default-risk classifiers, best model first.
pub const DEFAULT_RISK_MODELS: &[&str] = &[
    "random_forest",
    "xgboost",
    "logistic_regression",
    "decision_tree",
];

/// Human-readable model name for responses.
pub fn display_name(model_name: &str) -> String {
    model_name
        .split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One loaded predictor with its companion parts.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub name: String,
    pub predictor: Predictor,
    pub scaler: Option<Scaler>,
    pub feature_columns: Option<Vec<String>>,
    pub loaded_at: DateTime<Utc>,
}

/// Multi-model package for the branch-performance service.
#[derive(Debug, Clone)]
pub struct BranchPackage {
    pub models: HashMap<String, Predictor>,
    pub scaler: Option<Scaler>,
    pub feature_columns: Vec<String>,
    pub encoders: HashMap<String, Encoder>,
    pub best_model: String,
    pub target_labels: Option<Vec<String>>,
    pub timestamp: Option<String>,
}

/// Load status of one registry entry, for the info endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    pub name: String,
    #[serde(rename = "type")]
    pub model_type: String,
    pub status: &'static str,
    pub probabilistic: bool,
    pub features_used: usize,
}

/// All loaded models, keyed by registry name. Immutable after load.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    default_risk: HashMap<String, LoadedModel>,
    impairment: Option<LoadedModel>,
    ecl: Option<LoadedModel>,
    branch: Option<BranchPackage>,
}

impl ModelRegistry {
    /// Load every known bundle under `model_dir`. Failures are logged and
    /// skipped; an empty directory yields an empty (but usable) registry.
    pub fn load(model_dir: &Path) -> Self {
        let mut registry = Self::default();

        for &name in DEFAULT_RISK_MODELS {
            match load_single(model_dir, &format!("{name}.json"), name) {
                Ok(model) => {
                    tracing::info!(model = name, "loaded default-risk model");
                    registry.default_risk.insert(name.to_string(), model);
                }
                Err(e) => tracing::warn!(model = name, error = %e, "model unavailable"),
            }
        }

        match load_single(model_dir, "impairment.json", "impairment") {
            Ok(model) => {
                tracing::info!("loaded impairment model");
                registry.impairment = Some(model);
            }
            Err(e) => tracing::warn!(error = %e, "impairment model unavailable"),
        }

        match load_single(model_dir, "ecl.json", "ecl") {
            Ok(model) => {
                tracing::info!("loaded ECL model");
                registry.ecl = Some(model);
            }
            Err(e) => tracing::warn!(error = %e, "ECL model unavailable"),
        }

        match load_branch_package(&model_dir.join("branch_package.json")) {
            Ok(package) => {
                tracing::info!(
                    models = package.models.len(),
                    best = %package.best_model,
                    "loaded branch performance package"
                );
                registry.branch = Some(package);
            }
            Err(e) => tracing::warn!(error = %e, "branch package unavailable"),
        }

        registry
    }

    pub fn default_risk_model(&self, name: &str) -> Option<&LoadedModel> {
        self.default_risk.get(name)
    }

    pub fn default_risk_loaded(&self) -> usize {
        self.default_risk.len()
    }

    pub fn impairment_model(&self) -> Option<&LoadedModel> {
        self.impairment.as_ref()
    }

    pub fn ecl_model(&self) -> Option<&LoadedModel> {
        self.ecl.as_ref()
    }

    pub fn branch_package(&self) -> Option<&BranchPackage> {
        self.branch.as_ref()
    }

    /// Load status per default-risk model, in registry order.
    pub fn default_risk_status(&self) -> Vec<ModelStatus> {
        DEFAULT_RISK_MODELS
            .iter()
            .map(|&name| match self.default_risk.get(name) {
                Some(model) => ModelStatus {
                    name: display_name(name),
                    model_type: model.predictor.type_name().to_string(),
                    status: "Loaded",
                    probabilistic: model.predictor.is_probabilistic(),
                    features_used: model
                        .feature_columns
                        .as_ref()
                        .map(|c| c.len())
                        .unwrap_or(crate::logic::features::DEFAULT_RISK_FEATURES.len()),
                },
                None => ModelStatus {
                    name: display_name(name),
                    model_type: "Not Available".to_string(),
                    status: "Failed to load",
                    probabilistic: false,
                    features_used: 0,
                },
            })
            .collect()
    }
}

fn load_single(model_dir: &Path, file_name: &str, name: &str) -> anyhow::Result<LoadedModel> {
    let path = model_dir.join(file_name);
    let contents = fs::read_to_string(&path)?;
    let parts = serde_json::from_str::<BundleFile>(&contents)?.into_parts();

    let spec = parts
        .model
        .ok_or_else(|| anyhow::anyhow!("bundle '{file_name}' carries no model"))?;

    Ok(LoadedModel {
        name: name.to_string(),
        predictor: Predictor::from_spec(spec),
        scaler: parts.scaler,
        feature_columns: parts.feature_columns,
        loaded_at: Utc::now(),
    })
}

fn load_branch_package(path: &Path) -> anyhow::Result<BranchPackage> {
    let contents = fs::read_to_string(path)?;
    let parts = serde_json::from_str::<BundleFile>(&contents)?.into_parts();

    let specs = parts
        .models
        .ok_or_else(|| anyhow::anyhow!("branch package carries no models"))?;
    if specs.is_empty() {
        anyhow::bail!("branch package model map is empty");
    }
    let feature_columns = parts
        .feature_columns
        .ok_or_else(|| anyhow::anyhow!("branch package carries no feature columns"))?;

    let models: HashMap<String, Predictor> = specs
        .into_iter()
        .map(|(name, spec)| (name, Predictor::from_spec(spec)))
        .collect();

    let best_model = parts
        .best_model
        .filter(|name| models.contains_key(name))
        .or_else(|| models.keys().next().cloned())
        .ok_or_else(|| anyhow::anyhow!("branch package model map is empty"))?;

    Ok(BranchPackage {
        models,
        scaler: parts.scaler,
        feature_columns,
        encoders: parts.encoders.unwrap_or_default(),
        best_model,
        target_labels: parts.target_labels,
        timestamp: parts.timestamp,
    })
}
