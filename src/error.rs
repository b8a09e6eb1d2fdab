//! Error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::logic::PipelineError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Client-correctable errors
    MissingColumn(String),
    ValidationError(String),
    NotFound(String),

    // Degraded-service errors
    ModelUnavailable(String),

    // Generic errors
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::MissingColumn(column) => (
                StatusCode::BAD_REQUEST,
                format!("Missing required input column for prediction: '{column}'"),
            ),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::ModelUnavailable(msg) => {
                tracing::warn!("model unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, msg.clone())
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::MissingColumn(column) => AppError::MissingColumn(column),
            other => AppError::InternalError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_maps_to_client_error() {
        let err = AppError::from(PipelineError::MissingColumn("Arrears_Ratio".to_string()));
        assert!(matches!(err, AppError::MissingColumn(ref c) if c == "Arrears_Ratio"));
    }

    #[test]
    fn test_other_pipeline_errors_map_to_internal() {
        let err = AppError::from(PipelineError::ShapeMismatch { expected: 26, got: 3 });
        assert!(matches!(err, AppError::InternalError(_)));

        let err = AppError::from(PipelineError::EmptyEnsemble);
        assert!(matches!(err, AppError::InternalError(_)));
    }
}
