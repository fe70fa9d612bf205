//! Krishi Mitra dashboard
//!
//! Guides a farmer through capturing a location, loading its weather,
//! requesting a crop-yield prediction and asking agronomy questions, keeping
//! the dashboard consistent when any of those calls fail.

pub mod commands;
pub mod config;
pub mod error;
pub mod external;
pub mod view;
pub mod workflow;

pub use config::Config;
pub use error::{DashboardError, DashboardResult};
pub use workflow::{DashboardView, Settlement, Stage, WorkflowOrchestrator};
