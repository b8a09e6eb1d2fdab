//! Model loading and inference
//!
//! - `bundle`: on-disk JSON bundle format and companion parts
//! - `predictor`: capability-resolved in-process inference
//! - `registry`: startup loading, keyed lookup, load status
//! - `fallback`: rule-based scorer for unavailable models
//! - `scoring`: derive-assemble-predict-calibrate entry point

pub mod bundle;
pub mod fallback;
pub mod predictor;
pub mod registry;
pub mod scoring;

pub use registry::{ModelRegistry, DEFAULT_RISK_MODELS};
pub use scoring::{score_default_risk, ScoreOutcome, ScoreSource};
