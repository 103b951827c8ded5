//! Biobank Common Library
//!
//! Shared code for the biobank registry services:
//! - Database models, repository and report routines
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;

// Re-export commonly used types
pub use errors::{AppError, Result};
pub use config::AppConfig;
pub use db::{DbPool, Report, ReportTable, Repository};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
