//! Core prediction pipeline
//!
//! Raw record -> feature derivation -> vector assembly / column
//! reconciliation -> model inference -> calibration. Everything here is
//! pure and stateless apart from the registry, which is loaded once at
//! startup and read-only afterwards.

pub mod calibrate;
pub mod explain;
pub mod features;
pub mod model;
pub mod reconcile;
pub mod record;
pub mod recommend;

use thiserror::Error;

/// Failures of the prediction pipeline that cannot be recovered with a
/// documented default. Everything else (missing fields, unparseable
/// values, absent calibration indicators) recovers locally to 0.0 or the
/// documented fallback and never surfaces.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// An expected feature column could not be resolved by any
    /// reconciliation strategy. Client-correctable.
    #[error("missing required input column for prediction: '{0}'")]
    MissingColumn(String),

    /// Feature vector length does not match the model dimension.
    #[error("feature vector has {got} values, model expects {expected}")]
    ShapeMismatch { expected: usize, got: usize },

    /// An ensemble bundle with no trees.
    #[error("ensemble model has no trees")]
    EmptyEnsemble,
}
