//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct ModelsLoaded {
    default_risk: usize,
    impairment: bool,
    ecl: bool,
    branch: bool,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    models_loaded: ModelsLoaded,
}

/// Liveness probe with per-service model availability.
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let registry = &state.registry;
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        models_loaded: ModelsLoaded {
            default_risk: registry.default_risk_loaded(),
            impairment: registry.impairment_model().is_some(),
            ecl: registry.ecl_model().is_some(),
            branch: registry.branch_package().is_some(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::logic::model::ModelRegistry;
    use std::sync::Arc;

    fn empty_state() -> AppState {
        AppState {
            registry: Arc::new(ModelRegistry::default()),
            config: Config {
                port: 8080,
                model_dir: "models".into(),
                environment: "test".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_health_reports_model_availability() {
        let Json(response) = check(State(empty_state())).await;
        let body = serde_json::to_value(&response).unwrap();

        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["models_loaded"]["default_risk"], 0);
        assert_eq!(body["models_loaded"]["impairment"], false);
        assert_eq!(body["models_loaded"]["ecl"], false);
        assert_eq!(body["models_loaded"]["branch"], false);
    }
}
