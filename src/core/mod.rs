// Core domain types: errors, document models, crypto, resilience, metrics

pub mod crypto;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod resilience;
