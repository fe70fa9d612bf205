//! Domain models for the Krishi Mitra dashboard

mod assistant;
mod location;
mod operation;
mod prediction;
mod weather;

pub use assistant::*;
pub use location::*;
pub use operation::*;
pub use prediction::*;
pub use weather::*;
