//! HTTP handlers

pub mod health;
pub mod default_risk;
pub mod impairment;
pub mod branch;
