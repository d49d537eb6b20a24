#![forbid(unsafe_code)]

//! Core domain model and business logic for the BMI tracker.
//!
//! This crate provides:
//! - BMI computation and classification
//! - Input validation
//! - Record store persistence (JSON document)
//! - Per-user history management
//! - Summary statistics and trend series
//! - CSV export

pub mod types;
pub mod error;
pub mod bmi;
pub mod input;
pub mod config;
pub mod logging;
pub mod store;
pub mod history;
pub mod stats;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use input::MeasurementInput;
pub use store::{JsonFileSink, StoreSink};
pub use stats::{reference_lines, summarize, trend_series, Summary, TrendPoint};
