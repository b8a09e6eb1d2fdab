//! Engineered features for the impairment/ECL regressors
//!
//! Reproduces the training-time feature engineering: renamed raw columns,
//! due-date derivations, +1-guarded ratios, interactions, log1p features
//! and polynomial terms, in the exact 28-column order the scaler and
//! models were fitted against.

use crate::logic::record::Record;

/// Regressor feature layout, in training order. Raw columns first (under
/// their training names), then engineered columns in creation order.
pub const IMPAIRMENT_FEATURES: &[&str] = &[
    "Facility amount",
    "Tenor",
    "Effec. Rate",
    "Flat Rate",
    "Net Rental",
    "No of Rental in arrears",
    "Age",
    "Days_to_Due",
    "Months_to_Due",
    "Years_to_Due",
    "Rate_Difference",
    "Rental_to_Amount_Ratio",
    "Amount_per_Tenor",
    "Rental_per_Tenor",
    "Arrears_Rate",
    "Total_Payment",
    "Payment_Capacity",
    "Risk_Score",
    "Age_Tenor_Interaction",
    "Amount_Rate_Interaction",
    "Arrears_Amount",
    "Log_Facility_Amount",
    "Log_Net_Rental",
    "Tenor_Squared",
    "Age_Squared",
    "Arrears_Squared",
    "Rate_Squared",
    "Rate_Cubed",
];

/// Engineer the regressor features from a raw loan record.
///
/// Reads the inbound snake_case field names and writes the training-time
/// column names. Ratio denominators carry a +1 guard, so zero tenor or
/// zero facility amount still produce finite values.
pub fn engineer(raw: &Record) -> Record {
    let facility_amount = raw.num_or("facility_amount", 0.0);
    let tenor = raw.num_or("tenor", 0.0);
    let effec_rate = raw.num_or("effec_rate", 0.0);
    let flat_rate = raw.num_or("flat_rate", 0.0);
    let net_rental = raw.num_or("net_rental", 0.0);
    let arrears = raw.num_or("no_of_rental_in_arrears", 0.0);
    let age = raw.num_or("age", 0.0);
    let days_to_due = raw.num_or("due_date", 0.0);

    let total_payment = net_rental * tenor;

    let mut out = Record::new();
    out.set_num("Facility amount", facility_amount);
    out.set_num("Tenor", tenor);
    out.set_num("Effec. Rate", effec_rate);
    out.set_num("Flat Rate", flat_rate);
    out.set_num("Net Rental", net_rental);
    out.set_num("No of Rental in arrears", arrears);
    out.set_num("Age", age);

    out.set_num("Days_to_Due", days_to_due);
    out.set_num("Months_to_Due", days_to_due / 30.0);
    out.set_num("Years_to_Due", days_to_due / 365.0);

    out.set_num("Rate_Difference", effec_rate - flat_rate);
    out.set_num("Rental_to_Amount_Ratio", net_rental / (facility_amount + 1.0));
    out.set_num("Amount_per_Tenor", facility_amount / (tenor + 1.0));
    out.set_num("Rental_per_Tenor", net_rental / (tenor + 1.0));
    out.set_num("Arrears_Rate", arrears / (tenor + 1.0));
    out.set_num("Total_Payment", total_payment);
    out.set_num("Payment_Capacity", facility_amount / (total_payment + 1.0));
    out.set_num("Risk_Score", arrears * effec_rate / 100.0);
    out.set_num("Age_Tenor_Interaction", age * tenor);
    out.set_num("Amount_Rate_Interaction", facility_amount * effec_rate / 100.0);
    out.set_num("Arrears_Amount", arrears * net_rental);

    out.set_num("Log_Facility_Amount", facility_amount.ln_1p());
    out.set_num("Log_Net_Rental", net_rental.ln_1p());

    out.set_num("Tenor_Squared", tenor * tenor);
    out.set_num("Age_Squared", age * age);
    out.set_num("Arrears_Squared", arrears * arrears);
    out.set_num("Rate_Squared", effec_rate * effec_rate);
    out.set_num("Rate_Cubed", effec_rate * effec_rate * effec_rate);
    out
}
