//! Tidewatch - long-cycle cryptocurrency indicator dashboard

pub mod config;
pub mod error;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use error::EngineError;
pub use services::{DashboardEngine, DashboardService};
pub use types::*;
