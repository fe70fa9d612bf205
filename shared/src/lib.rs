//! Shared types and models for the Krishi Mitra dashboard
//!
//! This crate contains the data model, validation and response normalization
//! shared between the dashboard orchestrator and the browser (via WASM).

pub mod models;
pub mod normalize;
pub mod types;
pub mod validation;

pub use models::*;
pub use normalize::*;
pub use types::*;
pub use validation::*;
