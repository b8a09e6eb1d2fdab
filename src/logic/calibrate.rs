//! Probability calibration against the business risk bands
//!
//! Raw model probabilities are remapped into fixed target ranges so the
//! served PD respects the banding the business contracts on:
//! High >= 0.80, Medium 0.20-0.80, Low < 0.20. The breakpoints and slopes
//! below are contractual values, not trained parameters - do not retune.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::logic::record::Record;

/// Risk band of a calibrated probability. Ordering is part of the
/// contract: Low < Medium < High.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskCategory {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Medium Risk")]
    Medium,
    #[serde(rename = "High Risk")]
    High,
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskCategory::Low => "Low Risk",
            RiskCategory::Medium => "Medium Risk",
            RiskCategory::High => "High Risk",
        };
        f.write_str(label)
    }
}

/// Band of a calibrated probability: thresholds 0.20 and 0.80.
pub fn risk_category(pd: f64) -> RiskCategory {
    if pd >= 0.80 {
        RiskCategory::High
    } else if pd >= 0.20 {
        RiskCategory::Medium
    } else {
        RiskCategory::Low
    }
}

/// Weighted risk score from the record's risk indicators.
///
/// Four indicator groups: arrears severity (0.4), payment behavior (0.3),
/// debt burden (0.2), prior defaults (0.1). Missing indicators take the
/// documented defaults and never fail the computation.
fn indicator_risk_score(record: &Record) -> f64 {
    let arrears_capital = record.num_or("ArrearsCapital", 0.0);
    let arrears_od = record.num_or("ArrearsOD", 0.0);
    let rentals_in_arrears = record.num_or("NoOfRentalInArrears", 0.0);
    let total_arrears = arrears_capital
        + arrears_od
        + record.num_or("ArrearsInterest", 0.0)
        + record.num_or("ArrearsVat", 0.0);
    let payment_regularity = record.num_or("payment_regularity", 0.5);
    let on_time_payment = record.num_or("onTimePaymentPercentage", 50.0);
    let facility_amount = record.num_or("FacilityAmount", 0.0);
    let arrears_ratio = if facility_amount > 0.0 {
        total_arrears / facility_amount
    } else {
        0.0
    };

    let mut risk_score = 0.0;

    // Arrears severity (40% weight)
    if rentals_in_arrears >= 6.0 || arrears_ratio > 0.25 {
        risk_score += 0.4;
    } else if rentals_in_arrears >= 3.0 || arrears_ratio > 0.10 {
        risk_score += 0.25;
    } else if rentals_in_arrears > 0.0 || arrears_ratio > 0.0 {
        risk_score += 0.15;
    }

    // Payment behavior (30% weight)
    if on_time_payment < 50.0 || payment_regularity < 0.5 {
        risk_score += 0.3;
    } else if on_time_payment < 70.0 || payment_regularity < 0.7 {
        risk_score += 0.15;
    }

    // Debt burden (20% weight)
    let debt_to_income = record.num_or("debt_to_income_ratio", 0.0);
    if debt_to_income > 2.0 {
        risk_score += 0.2;
    } else if debt_to_income > 1.0 {
        risk_score += 0.1;
    }

    // Prior default history (10% weight)
    if record.num_or("previousDefaults", 0.0) > 0.0 {
        risk_score += 0.1;
    }

    risk_score
}

/// Calibrate a raw model probability against the business bands.
///
/// Combines the clamped raw probability (weight 0.4) with the indicator
/// risk score (weight 0.6), then remaps piecewise-linearly into the band
/// target ranges: High [0.85, 0.92], Medium [0.35, 0.45], Low [0.08, 0.15].
/// Output is always within [0.01, 0.99].
pub fn calibrate(raw_pd: f64, record: &Record) -> f64 {
    let raw_pd = raw_pd.clamp(0.01, 0.99);
    let risk_score = indicator_risk_score(record);

    let combined = raw_pd * 0.4 + risk_score * 0.6;

    let calibrated = if combined >= 0.70 {
        // High band: target ~0.88
        if combined >= 0.85 {
            0.88 + (combined - 0.85) * (0.04 / 0.15)
        } else {
            0.85 + (combined - 0.70) * (0.03 / 0.15)
        }
    } else if combined >= 0.30 {
        // Medium band: target ~0.40
        if combined >= 0.50 {
            0.40 + (combined - 0.50) * (0.05 / 0.20)
        } else {
            0.35 + (combined - 0.30) * (0.05 / 0.20)
        }
    } else {
        // Low band: target ~0.12
        0.08 + combined * (0.07 / 0.30)
    };

    calibrated.clamp(0.01, 0.99)
}

/// Confidence of a calibrated probability for a given model.
///
/// Per-model base value, shifted up near the extremes and down in the
/// ambiguous mid-range.
pub fn confidence(pd: f64, model_name: &str) -> f64 {
    let base: f64 = match model_name {
        "random_forest" => 0.90,
        "xgboost" => 0.87,
        "logistic_regression" => 0.82,
        "decision_tree" => 0.80,
        _ => 0.75,
    };

    if pd < 0.1 || pd > 0.9 {
        (base + 0.10).min(0.95)
    } else if pd < 0.2 || pd > 0.8 {
        (base + 0.05).min(0.92)
    } else if (0.3..=0.7).contains(&pd) {
        (base - 0.05).max(0.70)
    } else {
        base
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
    fn test_output_always_in_bounds() {
        let empty = Record::new();
        for raw in [-1.0, 0.0, 0.25, 0.5, 0.75, 1.0, 2.0] {
            let pd = calibrate(raw, &empty);
            assert!((0.01..=0.99).contains(&pd), "pd {pd} out of bounds");
        }
    }

    #[test]
    fn test_clean_record_lands_in_low_band() {
        let clean = record(json!({
            "ArrearsCapital": 0,
            "ArrearsOD": 0,
            "NoOfRentalInArrears": 0,
            "onTimePaymentPercentage": 95,
            "payment_regularity": 0.95,
        }));
        let pd = calibrate(0.05, &clean);
        assert!((0.08..=0.15).contains(&pd), "pd {pd} outside low band");
        assert_eq!(risk_category(pd), RiskCategory::Low);
    }

    #[test]
    fn test_severe_arrears_land_in_high_band() {
        // arrears ratio 0.5 > 0.25, 7 rentals in arrears, poor payments
        let distressed = record(json!({
            "ArrearsCapital": 50000,
            "NoOfRentalInArrears": 7,
            "onTimePaymentPercentage": 30,
            "payment_regularity": 0.30,
            "FacilityAmount": 100000,
            "previousDefaults": 1,
            "debt_to_income_ratio": 2.5,
        }));
        let pd = calibrate(0.9, &distressed);
        assert!((0.85..=0.92).contains(&pd), "pd {pd} outside high band");
        assert_eq!(risk_category(pd), RiskCategory::High);
    }

    #[test]
    fn test_category_is_monotonic_step_function() {
        let mut previous = RiskCategory::Low;
        for step in 0..=100 {
            let pd = step as f64 / 100.0;
            let category = risk_category(pd);
            assert!(category >= previous, "category regressed at pd {pd}");
            previous = category;
        }
        assert_eq!(risk_category(0.1999), RiskCategory::Low);
        assert_eq!(risk_category(0.20), RiskCategory::Medium);
        assert_eq!(risk_category(0.80), RiskCategory::High);
    }

    #[test]
    fn test_band_breakpoints_exact() {
        let empty = Record::new();
        // With all-zero indicators, risk_score contributions come only from
        // the payment-behavior default path (on_time 50 < 70 -> +0.15).
        // combined = 0.4 * raw + 0.6 * 0.15
        let pd = calibrate(0.01, &empty);
        let combined = 0.01f64 * 0.4 + 0.15 * 0.6;
        let expected = 0.08 + combined * (0.07 / 0.30);
        assert!((pd - expected).abs() < 1e-12);
    }

    #[test]
    fn test_confidence_extremity_shifts() {
        assert_eq!(confidence(0.05, "random_forest"), 0.95);
        assert_eq!(confidence(0.15, "random_forest"), 0.92);
        assert_eq!(confidence(0.5, "random_forest"), 0.85);
        assert_eq!(confidence(0.5, "decision_tree"), 0.75);
        assert_eq!(confidence(0.95, "unknown_model"), 0.85);
    }
}
