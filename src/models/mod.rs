//! Data models for the EoS service inventory.

mod field;
mod service;

pub use field::{ServiceField, SortKey};
pub use service::{Category, RemediationDetails, RemediationPlan, Risk, Score, Service};
