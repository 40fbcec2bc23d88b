//! Business logic services for the Farm2Value dashboard

pub mod mango_count;
pub mod prediction;
pub mod weather;

pub use mango_count::MangoCountService;
pub use prediction::{PredictionOutcome, PredictionService, TierFailure};
pub use weather::WeatherService;
