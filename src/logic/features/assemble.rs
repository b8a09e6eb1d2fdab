//! Feature Vector Assembler
//!
//! Projects a derived record into an ordered numeric vector following a
//! named feature layout. The layout order is part of the model contract:
//! models were trained against these exact positions.

use crate::logic::record::Record;

/// Feature layout for the default-risk classifiers, in training order.
pub const DEFAULT_RISK_FEATURES: &[&str] = &[
    "Age",
    "ArrearsOD",
    "payment_regularity",
    "NoOfRentalInArrears",
    "overdue_intensity",
    "early_settlement",
    "has_arrears",
    "ArrearsCapital",
    "arrears_ratio",
    "ArrearsInterest",
    "payment_coverage",
    "tenor_to_age_ratio",
    "LastReceiptPaidAmount",
    "loan_age",
    "EffectiveRate",
    "FacilityAmount",
    "Tenor",
    "NetRental",
    "DownPayment",
    "ArrearsVat",
    "onTimePaymentPercentage",
    "latePaymentFrequency",
    "customerResponsiveness",
    "previousDefaults",
    "employmentStability",
    "Prepayment",
];

/// Project `record` onto `feature_names`, in order.
///
/// Absent, null, or non-numeric fields contribute 0.0. The result always
/// has exactly `feature_names.len()` entries; assembly never fails.
pub fn assemble<S: AsRef<str>>(record: &Record, feature_names: &[S]) -> Vec<f64> {
    feature_names
        .iter()
        .map(|name| record.num_or(name.as_ref(), 0.0))
        .collect()
}
