//! Request and response JSON types for the three services
//!
//! Inbound field names follow the upstream record layout (mixed Pascal
//! and camel case); most fields are optional and default per the feature
//! contract. Requests flatten into a [`Record`] before entering the
//! pipeline.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::logic::calibrate::RiskCategory;
use crate::logic::explain::FeatureContribution;
use crate::logic::model::ScoreSource;
use crate::logic::record::Record;

fn default_branch() -> String {
    "Main".to_string()
}

fn default_status() -> String {
    "Active".to_string()
}

fn default_marital_status() -> String {
    "Single".to_string()
}

fn default_mid_score() -> f64 {
    3.0
}

// ---------------------------------------------------------------------------
// Default-risk service
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    #[serde(rename = "customerId")]
    pub customer_id: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(rename = "equipmentType", default)]
    pub equipment_type: String,
    #[serde(rename = "schemeType", default)]
    pub scheme_type: String,
    #[serde(rename = "rentalPaymentType", default)]
    pub rental_payment_type: String,
    #[serde(rename = "grantedDate")]
    pub granted_date: String,
    #[serde(default)]
    pub occupation: String,
    #[serde(rename = "monthlyIncome", default)]
    pub monthly_income: f64,
    #[serde(rename = "maritalStatus", default = "default_marital_status")]
    pub marital_status: String,
    #[serde(default)]
    pub dependents: i64,
    #[serde(rename = "Age", default)]
    pub age: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialData {
    #[serde(rename = "FacilityAmount", default)]
    pub facility_amount: f64,
    #[serde(rename = "Tenor", default)]
    pub tenor: f64,
    #[serde(rename = "EffectiveRate", default)]
    pub effective_rate: f64,
    #[serde(rename = "FlatRate", default)]
    pub flat_rate: f64,
    #[serde(rename = "NetRental", default)]
    pub net_rental: f64,
    #[serde(rename = "DownPayment", default)]
    pub down_payment: f64,
    #[serde(rename = "NoOfRentalInArrears", default)]
    pub no_of_rental_in_arrears: f64,
    #[serde(rename = "ArrearsCapital", default)]
    pub arrears_capital: f64,
    #[serde(rename = "ArrearsInterest", default)]
    pub arrears_interest: f64,
    #[serde(rename = "ArrearsVat", default)]
    pub arrears_vat: f64,
    #[serde(rename = "ArrearsOD", default)]
    pub arrears_od: f64,
    #[serde(rename = "LastReceiptPaidAmount", default)]
    pub last_receipt_paid_amount: f64,
    #[serde(rename = "Prepayment", default)]
    pub prepayment: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehavioralData {
    #[serde(rename = "onTimePaymentPercentage", default)]
    pub on_time_payment_percentage: f64,
    #[serde(rename = "latePaymentFrequency", default)]
    pub late_payment_frequency: f64,
    #[serde(rename = "gracePeriodUsage", default)]
    pub grace_period_usage: f64,
    #[serde(rename = "customerResponsiveness", default = "default_mid_score")]
    pub customer_responsiveness: f64,
    #[serde(rename = "complaintFrequency", default)]
    pub complaint_frequency: f64,
    #[serde(rename = "relationshipDuration", default)]
    pub relationship_duration: f64,
    #[serde(rename = "savingsRate", default)]
    pub savings_rate: f64,
    #[serde(rename = "creditUtilization", default)]
    pub credit_utilization: f64,
    #[serde(rename = "previousDefaults", default)]
    pub previous_defaults: f64,
    #[serde(rename = "partialPayments", default)]
    pub partial_payments: f64,
    #[serde(rename = "paymentReschedules", default)]
    pub payment_reschedules: f64,
    #[serde(rename = "earlySettlementHistory", default)]
    pub early_settlement_history: bool,
    #[serde(rename = "employmentStability", default = "default_mid_score")]
    pub employment_stability: f64,
    #[serde(rename = "addressStability", default = "default_mid_score")]
    pub address_stability: f64,
    #[serde(rename = "referenceChecks", default = "default_mid_score")]
    pub reference_checks: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionRequest {
    pub customer_info: CustomerInfo,
    pub financial_data: FinancialData,
    pub behavioral_data: BehavioralData,
}

impl PredictionRequest {
    /// Flatten the three groups into one raw record, later groups taking
    /// precedence on duplicate names.
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        for group in [
            serde_json::to_value(&self.customer_info),
            serde_json::to_value(&self.financial_data),
            serde_json::to_value(&self.behavioral_data),
        ] {
            if let Ok(value) = group {
                record.merge_value(value);
            }
        }
        record
    }
}

/// Static training-time metrics of a default-risk model.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ModelPerformance {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub auc_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelIdentity {
    pub name: String,
    pub version: &'static str,
    pub training_date: &'static str,
    pub features_used: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    pub pd: f64,
    pub risk_category: RiskCategory,
    pub confidence: f64,
    pub timestamp: String,
    pub top_features: Vec<FeatureContribution>,
    pub recommendations: Vec<String>,
    pub model_info: ModelIdentity,
    pub feature_contributions: Vec<FeatureContribution>,
    pub model_used: String,
    pub model_source: ScoreSource,
    pub model_performance: ModelPerformance,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelComparison {
    pub model: String,
    pub pd: f64,
    pub risk_category: RiskCategory,
    pub confidence: f64,
    pub model_source: ScoreSource,
    pub performance: ModelPerformance,
}

#[derive(Debug, Clone, Serialize)]
pub struct AllModelsResponse {
    pub comparison: Vec<ModelComparison>,
    pub best_model: &'static str,
    pub best_model_reason: &'static str,
    pub timestamp: String,
}

// ---------------------------------------------------------------------------
// Impairment/ECL service
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanInput {
    pub facility_amount: f64,
    pub tenor: f64,
    pub effec_rate: f64,
    pub flat_rate: f64,
    pub net_rental: f64,
    pub no_of_rental_in_arrears: f64,
    pub age: f64,
    #[serde(default)]
    pub due_date: Option<f64>,
}

impl LoanInput {
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        if let Ok(value) = serde_json::to_value(self) {
            record.merge_value(value);
        }
        record
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchLoanInput {
    pub loans: Vec<LoanInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImpairmentPrediction {
    pub impairment: f64,
    pub ecl_1yr: f64,
    pub impairment_model: &'static str,
    pub ecl_model: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchImpairmentResponse {
    pub predictions: Vec<ImpairmentPrediction>,
    pub total_loans: usize,
    pub average_impairment: f64,
    pub average_ecl: f64,
    pub total_impairment: f64,
    pub total_ecl: f64,
}

// ---------------------------------------------------------------------------
// Branch-performance service
// ---------------------------------------------------------------------------

/// One branch loan record with arbitrary column names. The reconciler
/// maps whatever names the caller sends onto the trained feature list,
/// so the schema stays open.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct BranchRecord(pub Map<String, Value>);

impl BranchRecord {
    pub fn to_record(&self) -> Record {
        Record::from_map(self.0.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchBranchRequest {
    pub data: Vec<BranchRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelQuery {
    pub model_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BranchPrediction {
    pub prediction: String,
    pub confidence: Option<f64>,
    pub model_used: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BranchBatchItem {
    pub record_id: usize,
    pub prediction: String,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchBranchResponse {
    pub predictions: Vec<BranchBatchItem>,
    pub total_records: usize,
    pub model_used: String,
}
