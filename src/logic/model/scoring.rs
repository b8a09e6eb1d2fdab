//! Default-risk scoring - one derived record through one named model
//!
//! Assembles the model's feature vector, runs inference, calibrates the
//! raw probability into the business bands, and attaches category and
//! confidence. Any model failure degrades to the rule-based scorer
//! instead of failing the request; the outcome carries a source tag so
//! callers can tell the two apart.

use serde::Serialize;

use crate::logic::calibrate::{calibrate, confidence, risk_category, RiskCategory};
use crate::logic::features::{assemble, DEFAULT_RISK_FEATURES};
use crate::logic::model::fallback::{rule_based_confidence, rule_based_score};
use crate::logic::model::registry::ModelRegistry;
use crate::logic::record::Record;

/// Whether an outcome came from a loaded model or the rule-based scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    Model,
    RuleBased,
}

/// Calibrated scoring outcome for one record and one model name.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreOutcome {
    pub pd: f64,
    pub risk_category: RiskCategory,
    pub confidence: f64,
    pub model_used: String,
    pub source: ScoreSource,
}

/// Score a derived record with the named default-risk model.
///
/// Missing model, shape mismatch, any inference failure: the rule-based
/// path answers instead, tagged [`ScoreSource::RuleBased`].
pub fn score_default_risk(
    registry: &ModelRegistry,
    record: &Record,
    model_name: &str,
) -> ScoreOutcome {
    if let Some(model) = registry.default_risk_model(model_name) {
        let features = match &model.feature_columns {
            Some(columns) => assemble(record, columns),
            None => assemble(record, DEFAULT_RISK_FEATURES),
        };
        let features = match &model.scaler {
            Some(scaler) => scaler.transform(&features),
            None => features,
        };

        match model.predictor.positive_probability(&features) {
            Ok(raw) => {
                let raw_pd = raw.clamp(0.01, 0.99);
                let pd = calibrate(raw_pd, record);
                return ScoreOutcome {
                    pd,
                    risk_category: risk_category(pd),
                    confidence: confidence(pd, model_name),
                    model_used: model_name.to_string(),
                    source: ScoreSource::Model,
                };
            }
            Err(e) => {
                tracing::error!(model = model_name, error = %e, "inference failed, using rule-based scorer");
            }
        }
    }

    let raw_pd = rule_based_score(record);
    let pd = calibrate(raw_pd, record);
    ScoreOutcome {
        pd,
        risk_category: risk_category(pd),
        confidence: rule_based_confidence(model_name),
        model_used: model_name.to_string(),
        source: ScoreSource::RuleBased,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::derive;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        let mut r = Record::new();
        r.merge_value(value);
        r
    }

    #[test]
    fn test_missing_model_degrades_to_rule_based() {
        let registry = ModelRegistry::default();
        let derived = derive(&record(json!({
            "ArrearsCapital": 0,
            "ArrearsOD": 0,
            "NoOfRentalInArrears": 0,
            "onTimePaymentPercentage": 95,
        })));
        let outcome = score_default_risk(&registry, &derived, "random_forest");

        assert_eq!(outcome.source, ScoreSource::RuleBased);
        assert_eq!(outcome.model_used, "random_forest");
        assert_eq!(outcome.confidence, 0.65);
        assert!((0.01..=0.99).contains(&outcome.pd));
    }

    #[test]
    fn test_clean_record_rule_based_lands_low() {
        let registry = ModelRegistry::default();
        let derived = derive(&record(json!({
            "ArrearsCapital": 0,
            "ArrearsOD": 0,
            "NoOfRentalInArrears": 0,
            "onTimePaymentPercentage": 95,
        })));
        let outcome = score_default_risk(&registry, &derived, "logistic_regression");
        assert_eq!(outcome.risk_category, RiskCategory::Low);
        assert!((0.08..=0.15).contains(&outcome.pd), "pd {} outside low band", outcome.pd);
    }

    #[test]
    fn test_distressed_record_rule_based_lands_high() {
        let registry = ModelRegistry::default();
        let derived = derive(&record(json!({
            "ArrearsCapital": 50000,
            "NoOfRentalInArrears": 7,
            "onTimePaymentPercentage": 30,
            "FacilityAmount": 100000,
        })));
        let outcome = score_default_risk(&registry, &derived, "random_forest");
        assert_eq!(outcome.risk_category, RiskCategory::High);
        assert!((0.85..=0.92).contains(&outcome.pd), "pd {} outside high band", outcome.pd);
    }
}
