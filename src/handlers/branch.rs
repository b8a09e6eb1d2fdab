//! Branch-performance service handlers

use axum::extract::{Query, State};
use axum::Json;
use serde_json::json;

use crate::logic::model::predictor::Predictor;
use crate::logic::model::registry::BranchPackage;
use crate::logic::reconcile::reconcile;
use crate::logic::record::Record;
use crate::schemas::{
    BatchBranchRequest, BatchBranchResponse, BranchBatchItem, BranchPrediction, BranchRecord,
    ModelQuery,
};
use crate::{AppError, AppResult, AppState};

fn package(state: &AppState) -> AppResult<&BranchPackage> {
    state.registry.branch_package().ok_or_else(|| {
        AppError::ModelUnavailable("Branch models not loaded; prediction unavailable".to_string())
    })
}

fn select_model<'a>(
    package: &'a BranchPackage,
    query: &'a ModelQuery,
) -> AppResult<(&'a str, &'a Predictor)> {
    let name = query.model_name.as_deref().unwrap_or(&package.best_model);
    let model = package
        .models
        .get(name)
        .ok_or_else(|| AppError::ValidationError(format!("Model '{name}' not available")))?;
    Ok((name, model))
}

/// Decode a numeric class into its performance label.
fn decode_label(package: &BranchPackage, class: usize) -> String {
    match &package.target_labels {
        Some(labels) => labels
            .get(class)
            .cloned()
            .unwrap_or_else(|| class.to_string()),
        None => {
            if class == 0 {
                "Good".to_string()
            } else {
                "Poor".to_string()
            }
        }
    }
}

/// Reconcile, scale and classify one table of records.
fn classify(
    package: &BranchPackage,
    model: &Predictor,
    rows: &[Record],
) -> AppResult<Vec<(String, Option<f64>)>> {
    let table = reconcile(rows, &package.feature_columns, &package.encoders)?;

    table
        .into_iter()
        .map(|features| {
            let features = match &package.scaler {
                Some(scaler) => scaler.transform(&features),
                None => features,
            };
            match model {
                Predictor::Probabilistic(classifier) => {
                    let (negative, positive) = classifier.predict_distribution(&features)?;
                    let class = usize::from(positive >= 0.5);
                    let confidence = negative.max(positive);
                    Ok((decode_label(package, class), Some(confidence)))
                }
                Predictor::Deterministic(regressor) => {
                    let class = regressor.predict(&features)?.round().max(0.0) as usize;
                    Ok((decode_label(package, class), None))
                }
            }
        })
        .collect::<Result<Vec<_>, crate::logic::PipelineError>>()
        .map_err(AppError::from)
}

/// Classify a single branch loan record.
pub async fn predict(
    State(state): State<AppState>,
    Query(query): Query<ModelQuery>,
    Json(record): Json<BranchRecord>,
) -> AppResult<Json<BranchPrediction>> {
    let package = package(&state)?;
    let (name, model) = select_model(package, &query)?;

    let rows = vec![record.to_record()];
    let mut results = classify(package, model, &rows)?;
    let (prediction, confidence) = results
        .pop()
        .ok_or_else(|| AppError::InternalError("empty classification result".to_string()))?;

    Ok(Json(BranchPrediction {
        prediction,
        confidence,
        model_used: name.to_string(),
    }))
}

/// Classify a batch of branch loan records.
pub async fn predict_batch(
    State(state): State<AppState>,
    Query(query): Query<ModelQuery>,
    Json(batch): Json<BatchBranchRequest>,
) -> AppResult<Json<BatchBranchResponse>> {
    let package = package(&state)?;
    let (name, model) = select_model(package, &query)?;

    let rows: Vec<Record> = batch.data.iter().map(BranchRecord::to_record).collect();
    let results = classify(package, model, &rows)?;

    let predictions = results
        .into_iter()
        .enumerate()
        .map(|(record_id, (prediction, confidence))| BranchBatchItem {
            record_id,
            prediction,
            confidence,
        })
        .collect::<Vec<_>>();

    Ok(Json(BatchBranchResponse {
        total_records: predictions.len(),
        predictions,
        model_used: name.to_string(),
    }))
}

/// Package metadata: available models, best model, trained columns.
pub async fn model_info(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    let package = package(&state)?;
    let mut available: Vec<&String> = package.models.keys().collect();
    available.sort();

    Ok(Json(json!({
        "available_models": available,
        "best_model": package.best_model,
        "feature_columns": package.feature_columns,
        "timestamp": package.timestamp,
    })))
}

/// Split-frequency feature importances of a tree-based model, sorted
/// descending.
pub async fn feature_importance(
    State(state): State<AppState>,
    Query(query): Query<ModelQuery>,
) -> AppResult<Json<Vec<(String, f64)>>> {
    let package = package(&state)?;
    let (name, model) = select_model(package, &query)?;

    let importances = model
        .feature_importances(package.feature_columns.len())
        .ok_or_else(|| {
            AppError::NotFound(format!("Model '{name}' does not expose feature importances"))
        })?;

    let mut pairs: Vec<(String, f64)> = package
        .feature_columns
        .iter()
        .cloned()
        .zip(importances)
        .collect();
    pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    Ok(Json(pairs))
}
