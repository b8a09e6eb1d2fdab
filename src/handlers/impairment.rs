//! Impairment/ECL service handlers
//!
//! Regressors have no rule-based fallback: without a loaded model and
//! scaler the service answers 503 rather than inventing monetary values.

use axum::{extract::State, Json};
use serde_json::json;

use crate::logic::features::{assemble, impairment, IMPAIRMENT_FEATURES};
use crate::logic::model::registry::LoadedModel;
use crate::schemas::{BatchImpairmentResponse, BatchLoanInput, ImpairmentPrediction, LoanInput};
use crate::{AppError, AppResult, AppState};

const IMPAIRMENT_MODEL_LABEL: &str = "Gradient Boosting";
const ECL_MODEL_LABEL: &str = "Stacking Ensemble";

fn regressor_predict(model: &LoadedModel, loan: &LoanInput) -> AppResult<f64> {
    let engineered = impairment::engineer(&loan.to_record());
    let features = assemble(&engineered, IMPAIRMENT_FEATURES);
    // Models were trained on scaled data; an unscaled vector would be
    // silently wrong, so a missing scaler makes the model unavailable.
    let scaler = model.scaler.as_ref().ok_or_else(|| {
        AppError::ModelUnavailable(format!("Model '{}' has no scaler; prediction unavailable", model.name))
    })?;
    let scaled = scaler.transform(&features);

    match &model.predictor {
        crate::logic::model::predictor::Predictor::Deterministic(regressor) => {
            Ok(regressor.predict(&scaled)?)
        }
        crate::logic::model::predictor::Predictor::Probabilistic(_) => Err(
            AppError::ModelUnavailable(format!("Model '{}' is not a regressor", model.name)),
        ),
    }
}

fn predict_loan(state: &AppState, loan: &LoanInput) -> AppResult<ImpairmentPrediction> {
    let impairment_model = state.registry.impairment_model().ok_or_else(|| {
        AppError::ModelUnavailable("Impairment model not loaded; prediction unavailable".to_string())
    })?;
    let ecl_model = state.registry.ecl_model().ok_or_else(|| {
        AppError::ModelUnavailable("ECL model not loaded; prediction unavailable".to_string())
    })?;

    Ok(ImpairmentPrediction {
        impairment: regressor_predict(impairment_model, loan)?,
        ecl_1yr: regressor_predict(ecl_model, loan)?,
        impairment_model: IMPAIRMENT_MODEL_LABEL,
        ecl_model: ECL_MODEL_LABEL,
    })
}

/// Predict impairment and 1-year ECL for a single loan.
pub async fn predict(
    State(state): State<AppState>,
    Json(loan): Json<LoanInput>,
) -> AppResult<Json<ImpairmentPrediction>> {
    Ok(Json(predict_loan(&state, &loan)?))
}

/// Predict impairment and 1-year ECL for a batch of loans.
pub async fn predict_batch(
    State(state): State<AppState>,
    Json(batch): Json<BatchLoanInput>,
) -> AppResult<Json<BatchImpairmentResponse>> {
    let predictions = batch
        .loans
        .iter()
        .map(|loan| predict_loan(&state, loan))
        .collect::<AppResult<Vec<_>>>()?;

    let total_loans = predictions.len();
    let total_impairment: f64 = predictions.iter().map(|p| p.impairment).sum();
    let total_ecl: f64 = predictions.iter().map(|p| p.ecl_1yr).sum();
    let count = total_loans.max(1) as f64;

    Ok(Json(BatchImpairmentResponse {
        predictions,
        total_loans,
        average_impairment: total_impairment / count,
        average_ecl: total_ecl / count,
        total_impairment,
        total_ecl,
    }))
}

/// Static metrics of the impairment and ECL models.
pub async fn models_info(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "impairment_model": {
            "name": IMPAIRMENT_MODEL_LABEL,
            "loaded": state.registry.impairment_model().is_some(),
            "r2_score": 0.995887,
            "rmse": 11870.69,
            "mae": 3960.25,
        },
        "ecl_model": {
            "name": ECL_MODEL_LABEL,
            "loaded": state.registry.ecl_model().is_some(),
            "r2_score": 0.928455,
            "rmse": 5562.26,
            "mae": 1899.75,
        },
        "features_used": IMPAIRMENT_FEATURES.len(),
        "training_samples": 99888,
    }))
}
