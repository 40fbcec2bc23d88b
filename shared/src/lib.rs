//! Shared types and models for the Farm2Value dashboard
//!
//! This crate holds the pure domain logic shared between the backend and the
//! browser (via WASM): request models, weather normalization and the yield heuristic.

pub mod heuristic;
pub mod models;
pub mod types;
pub mod validation;

pub use heuristic::*;
pub use models::*;
pub use types::*;
pub use validation::*;
