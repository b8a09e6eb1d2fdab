//! Risk-mitigation recommendations for the default-risk service
//!
//! PD-band texts first, then triggers from financial and behavioral
//! fields. Capped at 10 entries.

use crate::logic::record::Record;

const MAX_RECOMMENDATIONS: usize = 10;

/// Generate recommendations for a calibrated PD and its source record.
pub fn recommendations(pd: f64, record: &Record) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push = |text: &str| out.push(text.to_string());

    if pd >= 0.80 {
        push("IMMEDIATE ACTION: High default risk detected (>80% PD)");
        push("Contact customer immediately for emergency meeting");
        push("Consider immediate loan restructuring or write-off");
        push("Daily monitoring and escalation to legal department");
    } else if pd >= 0.50 {
        push("HIGH RISK: Enhanced monitoring required (50-80% PD)");
        push("Weekly payment follow-ups and review meetings");
        push("Consider partial prepayment options");
        push("Review collateral adequacy and additional guarantees");
    } else if pd >= 0.20 {
        push("MEDIUM RISK: Close monitoring needed (20-50% PD)");
        push("Monthly payment reviews and check-ins");
        push("Watch for arrears accumulation patterns");
        push("Consider offering payment plan options");
    } else {
        push("LOW RISK: Maintain current monitoring (<20% PD)");
        push("Continue with standard monthly reviews");
        push("Consider relationship deepening opportunities");
        push("Eligible for loyalty benefits or premium services");
    }

    if record.num_or("ArrearsCapital", 0.0) > 1000.0 {
        push("Address capital arrears immediately - significant amount outstanding");
    }
    if record.num_or("NoOfRentalInArrears", 0.0) > 2.0 {
        push("Multiple arrears instances detected - schedule customer meeting");
    }
    if record.num_or("ArrearsOD", 0.0) > 500.0 {
        push("High OD arrears - review and potentially reduce credit limit");
    }
    if record.num_or("onTimePaymentPercentage", 0.0) < 80.0 {
        push("Payment punctuality needs improvement - consider automatic payment setup");
    }
    if record.num_or("latePaymentFrequency", 0.0) > 2.0 {
        push("Frequent late payments detected - implement stricter monitoring");
    }
    if record.num_or("previousDefaults", 0.0) > 0.0 {
        push("Previous default history - increase collateral requirements");
    }

    out.truncate(MAX_RECOMMENDATIONS);
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
    fn test_low_risk_band_texts() {
        let r = record(json!({ "onTimePaymentPercentage": 95 }));
        let out = recommendations(0.10, &r);
        assert!(out[0].starts_with("LOW RISK"));
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn test_high_risk_band_with_triggers() {
        let r = record(json!({
            "ArrearsCapital": 50000,
            "NoOfRentalInArrears": 7,
            "ArrearsOD": 2000,
            "onTimePaymentPercentage": 30,
            "latePaymentFrequency": 5,
            "previousDefaults": 2,
        }));
        let out = recommendations(0.88, &r);
        assert!(out[0].starts_with("IMMEDIATE ACTION"));
        // 4 band texts + 6 triggers, capped at 10
        assert_eq!(out.len(), MAX_RECOMMENDATIONS);
    }

    #[test]
    fn test_medium_band_threshold() {
        let r = record(json!({ "onTimePaymentPercentage": 90 }));
        assert!(recommendations(0.20, &r)[0].starts_with("MEDIUM RISK"));
        assert!(recommendations(0.50, &r)[0].starts_with("HIGH RISK"));
        assert!(recommendations(0.80, &r)[0].starts_with("IMMEDIATE ACTION"));
    }
}
