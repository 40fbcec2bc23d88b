//! Domain models for the Farm2Value dashboard

mod mango;
mod prediction;
pub mod weather;

pub use mango::*;
pub use prediction::*;
pub use weather::*;
