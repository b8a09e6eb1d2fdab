//! Feature contribution ranking for prediction explanations
//!
//! Fixed base-impact weights per feature: positive impacts increase risk,
//! negative ones reduce it. Large monetary values scale their
//! contribution; results are sorted by contribution magnitude.

use serde::Serialize;
use serde_json::Value;

use crate::logic::record::Record;

/// Base impact per explained feature. Sign encodes direction.
const FEATURE_IMPACTS: &[(&str, f64)] = &[
    ("ArrearsCapital", 0.3),
    ("NoOfRentalInArrears", 0.2),
    ("payment_regularity", -0.15),
    ("ArrearsOD", 0.15),
    ("onTimePaymentPercentage", -0.1),
    ("previousDefaults", 0.1),
    ("employmentStability", -0.05),
];

const MAX_CONTRIBUTIONS: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct FeatureContribution {
    pub feature: String,
    pub importance: f64,
    pub impact: &'static str,
    pub contribution: f64,
    pub value: Value,
}

/// Rank the contributing features of a record, largest magnitude first.
/// Only features present in the record contribute.
pub fn contributions(record: &Record) -> Vec<FeatureContribution> {
    let mut out: Vec<FeatureContribution> = FEATURE_IMPACTS
        .iter()
        .filter_map(|(feature, base_impact)| {
            let value = record.get(feature)?.clone();
            // Monetary magnitudes above 1000 scale their contribution.
            let scale = match record.num(feature) {
                Some(v) if v > 1000.0 => v / 1000.0,
                _ => 1.0,
            };
            Some(FeatureContribution {
                feature: feature.to_string(),
                importance: base_impact.abs(),
                impact: if *base_impact > 0.0 { "increases_risk" } else { "decreases_risk" },
                contribution: base_impact * scale,
                value,
            })
        })
        .collect();

    out.sort_by(|a, b| {
        b.contribution
            .abs()
            .partial_cmp(&a.contribution.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    out.truncate(MAX_CONTRIBUTIONS);
    out
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
    fn test_only_present_features_contribute() {
        let r = record(json!({ "ArrearsCapital": 500 }));
        let out = contributions(&r);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].feature, "ArrearsCapital");
        assert_eq!(out[0].impact, "increases_risk");
        assert_eq!(out[0].contribution, 0.3);
    }

    #[test]
    fn test_large_values_scale_contribution() {
        let r = record(json!({ "ArrearsCapital": 50000 }));
        let out = contributions(&r);
        assert!((out[0].contribution - 0.3 * 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_sorted_by_magnitude() {
        let r = record(json!({
            "ArrearsCapital": 100,
            "NoOfRentalInArrears": 3,
            "payment_regularity": 0.9,
            "onTimePaymentPercentage": 90,
        }));
        let out = contributions(&r);
        let magnitudes: Vec<f64> = out.iter().map(|c| c.contribution.abs()).collect();
        let mut sorted = magnitudes.clone();
        sorted.sort_by(|a, b| b.partial_cmp(a).unwrap());
        assert_eq!(magnitudes, sorted);
    }

    #[test]
    fn test_direction_labels() {
        let r = record(json!({ "payment_regularity": 0.8, "previousDefaults": 1 }));
        let out = contributions(&r);
        let regularity = out.iter().find(|c| c.feature == "payment_regularity").unwrap();
        let defaults = out.iter().find(|c| c.feature == "previousDefaults").unwrap();
        assert_eq!(regularity.impact, "decreases_risk");
        assert_eq!(defaults.impact, "increases_risk");
    }

    #[test]
    fn test_empty_record_yields_no_contributions() {
        assert!(contributions(&Record::new()).is_empty());
    }
}
