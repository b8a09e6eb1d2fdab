//! Feature Deriver - computed fields for the default-risk service
//!
//! Pure function over a raw record: ratios, flags, categorical risk codes
//! and temporal fields, each with a defined default when inputs are absent.
//! Deriving twice from the same raw fields yields the same values, so the
//! function is idempotent over already-derived records.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;

use crate::logic::record::Record;

/// Loan age used when the grant date is missing or unparseable.
/// Contractual constant - downstream models were trained against it.
pub const LOAN_AGE_FALLBACK_MONTHS: f64 = 12.0;

/// Risk score for equipment types not in the lookup table.
pub const EQUIPMENT_RISK_DEFAULT: f64 = 0.5;

static EQUIPMENT_RISK: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("MOTOR CYCLES", 0.6),
        ("MOTOR CARS", 0.5),
        ("THREE WHEELERS", 0.7),
        ("DUAL PURPOSE VEHICLES", 0.5),
        ("LORRY", 0.7),
        ("VAN", 0.6),
        ("Mini Truck", 0.65),
        ("BUSES", 0.6),
        ("Single Cab", 0.6),
        ("Agriculture Equipment", 0.5),
        ("LAND VEHICLE TRACTORS", 0.5),
        // Legacy equipment types
        ("Construction", 0.8),
        ("Medical", 0.3),
        ("Office", 0.4),
        ("Manufacturing", 0.7),
        ("Transport", 0.6),
        ("Agricultural", 0.5),
    ])
});

static BRANCH_CODES: Lazy<HashMap<&'static str, i64>> = Lazy::new(|| {
    HashMap::from([
        ("GODAGAMA", 1),
        ("ANURADHAPURA", 2),
        ("HYDE PARK", 3),
        ("KANDY", 4),
        ("HEAD OFFICE", 5),
        ("MATARA", 6),
        ("BADULLA", 7),
        ("WELLAWATHE", 8),
        ("NARAMMALA", 9),
        ("MULLAITIVU", 10),
        ("MINUWANGODA", 11),
        // Legacy branch names
        ("Main", 1),
        ("North", 2),
        ("South", 3),
        ("East", 4),
        ("West", 5),
        ("Central", 6),
        ("HQ", 7),
    ])
});

static SCHEME_CODES: Lazy<HashMap<&'static str, i64>> = Lazy::new(|| {
    HashMap::from([
        ("NORMAL", 1),
        ("STEP-UP", 2),
        // Legacy scheme types
        ("Standard Lease", 1),
        ("Finance Lease", 2),
        ("Operating Lease", 3),
        ("Sale and Leaseback", 4),
        ("Hire Purchase", 5),
        ("Consumer Lease", 6),
    ])
});

/// Risk score of an equipment type; unknown types score 0.5.
pub fn equipment_risk_score(equipment_type: &str) -> f64 {
    EQUIPMENT_RISK
        .get(equipment_type)
        .copied()
        .unwrap_or(EQUIPMENT_RISK_DEFAULT)
}

/// Integer code of a branch name; unknown branches encode to 0.
pub fn branch_code(branch: &str) -> i64 {
    BRANCH_CODES.get(branch).copied().unwrap_or(0)
}

/// Integer code of a scheme type; unknown schemes encode to 0.
pub fn scheme_code(scheme: &str) -> i64 {
    SCHEME_CODES.get(scheme).copied().unwrap_or(0)
}

/// Months elapsed since the grant date (`YYYY-MM-DD`), measured against
/// `today`. Unparseable or missing dates fall back to 12 months.
fn loan_age_months(granted_date: Option<&str>, today: NaiveDate) -> f64 {
    let parsed = granted_date
        .unwrap_or("2023-01-01")
        .parse::<NaiveDate>();
    match parsed {
        Ok(granted) => {
            let months = (today.year() - granted.year()) * 12
                + (today.month() as i32 - granted.month() as i32);
            months as f64
        }
        Err(_) => LOAN_AGE_FALLBACK_MONTHS,
    }
}

/// Derive the computed feature fields from a raw record.
///
/// Every ratio guards its denominator: a zero or negative denominator
/// yields 0 instead of dividing. All derived fields are written under
/// fixed names alongside the raw fields.
pub fn derive(raw: &Record) -> Record {
    derive_at(raw, Utc::now().date_naive())
}

/// Same as [`derive`] with an explicit "today" for deterministic tests.
pub fn derive_at(raw: &Record, today: NaiveDate) -> Record {
    let facility_amount = raw.num_or("FacilityAmount", 0.0);
    let net_rental = raw.num_or("NetRental", 0.0);
    let arrears_capital = raw.num_or("ArrearsCapital", 0.0);
    let arrears_interest = raw.num_or("ArrearsInterest", 0.0);
    let arrears_vat = raw.num_or("ArrearsVat", 0.0);
    let arrears_od = raw.num_or("ArrearsOD", 0.0);
    let rentals_in_arrears = raw.num_or("NoOfRentalInArrears", 0.0);
    let age = raw.num_or("Age", 0.0);
    let tenor = raw.num_or("Tenor", 0.0);
    let effective_rate = raw.num_or("EffectiveRate", 0.0);
    let prepayment = raw.num_or("Prepayment", 0.0);
    let on_time_pct = raw.num_or("onTimePaymentPercentage", 0.0);
    let monthly_income = raw.num_or("monthlyIncome", net_rental * 3.0);

    let total_arrears = arrears_capital + arrears_interest + arrears_vat + arrears_od;

    // Zero tenor counts as a single installment for the monthly-burden ratios.
    let tenor_or_one = if tenor > 0.0 { tenor } else { 1.0 };

    let arrears_intensity = if facility_amount > 0.0 {
        total_arrears / facility_amount
    } else {
        0.0
    };
    let debt_to_income_ratio = if monthly_income > 0.0 {
        (facility_amount / tenor_or_one) / monthly_income
    } else {
        0.0
    };
    let payment_coverage = if net_rental * tenor_or_one > 0.0 {
        facility_amount / (net_rental * tenor_or_one)
    } else {
        0.0
    };
    let arrears_ratio = if facility_amount > 0.0 {
        total_arrears / facility_amount
    } else {
        0.0
    };
    let overdue_intensity = if tenor > 0.0 {
        rentals_in_arrears / tenor
    } else {
        0.0
    };
    let payment_regularity = on_time_pct / 100.0;
    let has_arrears = total_arrears > 0.0;
    let high_interest_flag = effective_rate > 10.0;
    let early_settlement = prepayment > 0.0 || raw.flag("earlySettlementHistory");

    let loan_age = loan_age_months(raw.text("grantedDate"), today);
    let tenor_to_age_ratio = if age > 0.0 { tenor / age } else { 0.0 };

    let equipment_risk = equipment_risk_score(raw.text("equipmentType").unwrap_or(""));
    let branch_encoded = branch_code(raw.text("branch").unwrap_or(""));
    let scheme_encoded = scheme_code(raw.text("schemeType").unwrap_or(""));

    let mut derived = raw.clone();
    derived.set_num("arrears_intensity", arrears_intensity);
    derived.set_num("debt_to_income_ratio", debt_to_income_ratio);
    derived.set_num("payment_coverage", payment_coverage);
    derived.set_num("arrears_ratio", arrears_ratio);
    derived.set_num("overdue_intensity", overdue_intensity);
    derived.set_num("payment_regularity", payment_regularity);
    derived.set_int("has_arrears", has_arrears as i64);
    derived.set_int("high_interest_flag", high_interest_flag as i64);
    derived.set_int("early_settlement", early_settlement as i64);
    derived.set_num("equipment_risk_score", equipment_risk);
    derived.set_int("branch_encoded", branch_encoded);
    derived.set_int("scheme_encoded", scheme_encoded);
    derived.set_num("loan_age", loan_age);
    derived.set_num("tenor_to_age_ratio", tenor_to_age_ratio);
    derived
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

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn test_zero_facility_amount_ratios() {
        let raw = record(json!({
            "FacilityAmount": 0,
            "ArrearsCapital": 5000,
            "Tenor": 0,
            "Age": 0,
        }));
        let derived = derive_at(&raw, today());

        assert_eq!(derived.num("arrears_intensity"), Some(0.0));
        assert_eq!(derived.num("arrears_ratio"), Some(0.0));
        assert_eq!(derived.num("overdue_intensity"), Some(0.0));
        assert_eq!(derived.num("tenor_to_age_ratio"), Some(0.0));
        assert_eq!(derived.num("payment_coverage"), Some(0.0));
    }

    #[test]
    fn test_arrears_aggregation_and_flags() {
        let raw = record(json!({
            "FacilityAmount": 100000,
            "ArrearsCapital": 10000,
            "ArrearsInterest": 2000,
            "ArrearsVat": 500,
            "ArrearsOD": 1500,
            "EffectiveRate": 12.5,
            "Prepayment": 0,
        }));
        let derived = derive_at(&raw, today());

        // (10000 + 2000 + 500 + 1500) / 100000
        assert_eq!(derived.num("arrears_ratio"), Some(0.14));
        assert_eq!(derived.num("has_arrears"), Some(1.0));
        assert_eq!(derived.num("high_interest_flag"), Some(1.0));
        assert_eq!(derived.num("early_settlement"), Some(0.0));
    }

    #[test]
    fn test_early_settlement_from_history_flag() {
        let raw = record(json!({ "Prepayment": 0, "earlySettlementHistory": true }));
        let derived = derive_at(&raw, today());
        assert_eq!(derived.num("early_settlement"), Some(1.0));
    }

    #[test]
    fn test_loan_age_from_grant_date() {
        let raw = record(json!({ "grantedDate": "2024-06-15" }));
        let derived = derive_at(&raw, today());
        assert_eq!(derived.num("loan_age"), Some(12.0));
    }

    #[test]
    fn test_loan_age_fallback_on_bad_date() {
        let raw = record(json!({ "grantedDate": "not-a-date" }));
        let derived = derive_at(&raw, today());
        assert_eq!(derived.num("loan_age"), Some(LOAN_AGE_FALLBACK_MONTHS));
    }

    #[test]
    fn test_categorical_lookups() {
        assert_eq!(equipment_risk_score("THREE WHEELERS"), 0.7);
        assert_eq!(equipment_risk_score("UNKNOWN TYPE"), EQUIPMENT_RISK_DEFAULT);
        assert_eq!(branch_code("KANDY"), 4);
        assert_eq!(branch_code("NOWHERE"), 0);
        assert_eq!(scheme_code("STEP-UP"), 2);
        assert_eq!(scheme_code(""), 0);
    }

    #[test]
    fn test_monthly_income_defaults_to_rental_multiple() {
        let raw = record(json!({
            "FacilityAmount": 120000,
            "Tenor": 12,
            "NetRental": 5000,
        }));
        let derived = derive_at(&raw, today());
        // (120000 / 12) / (5000 * 3)
        let dti = derived.num("debt_to_income_ratio").unwrap();
        assert!((dti - 10000.0 / 15000.0).abs() < 1e-12);
    }

    #[test]
    fn test_idempotent_over_derived_record() {
        let raw = record(json!({
            "FacilityAmount": 100000,
            "ArrearsCapital": 4000,
            "Tenor": 24,
            "Age": 40,
            "EffectiveRate": 8.0,
            "onTimePaymentPercentage": 85,
            "grantedDate": "2024-01-01",
        }));
        let once = derive_at(&raw, today());
        let twice = derive_at(&once, today());
        assert_eq!(once, twice);
    }
}
