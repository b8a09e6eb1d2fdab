//! Feature engineering for the three prediction services
//!
//! - `derive`: computed fields for the default-risk service
//! - `impairment`: engineered regressor columns for impairment/ECL
//! - `assemble`: ordered projection of a record into a numeric vector

pub mod assemble;
pub mod derive;
pub mod impairment;

pub use assemble::{assemble, DEFAULT_RISK_FEATURES};
pub use derive::derive;
pub use impairment::IMPAIRMENT_FEATURES;
