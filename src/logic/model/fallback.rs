//! Rule-based fallback scorer
//!
//! Keeps the default-risk service answering when a model failed to load:
//! an arrears-weighted linear score with bounded random jitter. Degraded
//! results are tagged so callers can tell them from model-backed ones.

use rand::Rng;

use crate::logic::record::Record;

/// Raw rule-based probability for a derived record, in [0.01, 0.99].
///
/// Base 10% adjusted by arrears amounts, arrears count and payment
/// behavior, plus uniform jitter in [-0.05, 0.05].
pub fn rule_based_score(record: &Record) -> f64 {
    let jitter = rand::thread_rng().gen_range(-0.05..=0.05);
    rule_based_score_with_jitter(record, jitter)
}

/// Deterministic core of the rule-based scorer.
pub fn rule_based_score_with_jitter(record: &Record, jitter: f64) -> f64 {
    let arrears_capital = record.num_or("ArrearsCapital", 0.0);
    let arrears_od = record.num_or("ArrearsOD", 0.0);
    let rentals_in_arrears = record.num_or("NoOfRentalInArrears", 0.0);
    let on_time_payment = record.num_or("onTimePaymentPercentage", 50.0);

    let mut score = 0.1;

    if arrears_capital > 0.0 {
        score += (arrears_capital / 50000.0).min(0.4);
    }
    if arrears_od > 0.0 {
        score += (arrears_od / 10000.0).min(0.2);
    }
    if rentals_in_arrears > 0.0 {
        score += (rentals_in_arrears / 10.0).min(0.3);
    }

    // Good payment history reduces the score.
    score -= ((on_time_payment - 50.0) / 250.0).min(0.2);

    (score + jitter).clamp(0.01, 0.99)
}

/// Confidence reported for rule-based results. Deliberately lower than
/// the model-backed confidence of the same model name.
pub fn rule_based_confidence(model_name: &str) -> f64 {
    match model_name {
        "random_forest" => 0.65,
        "xgboost" => 0.62,
        "logistic_regression" => 0.60,
        "decision_tree" => 0.58,
        _ => 0.60,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        let mut r = Record::new();
        r.merge_value(value);
        r
    }

    #[test]
    fn test_clean_record_scores_low() {
        let clean = record(json!({ "onTimePaymentPercentage": 95 }));
        // 0.1 - (95-50)/250 = 0.1 - 0.18 -> clamped up from negative territory
        let score = rule_based_score_with_jitter(&clean, 0.0);
        assert_eq!(score, 0.01);
    }

    #[test]
    fn test_heavy_arrears_score_high() {
        let distressed = record(json!({
            "ArrearsCapital": 100000,
            "ArrearsOD": 50000,
            "NoOfRentalInArrears": 8,
            "onTimePaymentPercentage": 30,
        }));
        // 0.1 + 0.4 + 0.2 + 0.3 - (-0.08) = 1.08 -> clamped
        let score = rule_based_score_with_jitter(&distressed, 0.0);
        assert_eq!(score, 0.99);
    }

    #[test]
    fn test_jitter_stays_bounded() {
        let r = record(json!({ "ArrearsCapital": 10000, "onTimePaymentPercentage": 50 }));
        let center = rule_based_score_with_jitter(&r, 0.0);
        for _ in 0..50 {
            let score = rule_based_score(&r);
            assert!((score - center).abs() <= 0.05 + 1e-12);
            assert!((0.01..=0.99).contains(&score));
        }
    }

    #[test]
    fn test_rule_based_confidence_map() {
        assert_eq!(rule_based_confidence("random_forest"), 0.65);
        assert_eq!(rule_based_confidence("decision_tree"), 0.58);
        assert_eq!(rule_based_confidence("anything_else"), 0.60);
    }
}
