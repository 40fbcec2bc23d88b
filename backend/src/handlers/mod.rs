//! HTTP handlers

pub mod health;
pub mod prediction;
pub mod segmentation;
pub mod weather;

pub use health::*;
pub use prediction::*;
pub use segmentation::*;
pub use weather::*;
