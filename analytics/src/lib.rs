//! # Healthcare Analytics - billing statistics and dashboard
//!
//! Three stages over one healthcare-billing CSV. Each stage only talks to
//! the next one through files.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐
//! │   Raw CSV   │────▶│    check    │────▶ shape, preview, missing counts
//! │ (auto-enc)  │     └─────────────┘
//! │             │     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │             │────▶│   analyze   │────▶│  Clean CSV  │────▶│  dashboard  │────▶ PNG
//! └─────────────┘     │ (LoS, cost) │     │  (sorted)   │     │ (2×2 grid)  │
//!                     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use healthcare_analytics::{run_analysis, run_dashboard, AnalyticsConfig};
//!
//! let config = AnalyticsConfig::from_env();
//! let report = run_analysis(&config.raw_csv, &config.clean_csv())?;
//! let summary = run_dashboard(&config.clean_csv(), &config.dashboard_png())?;
//! println!("{} rows, {:.1}% high-cost", report.rows, summary.data.kpis.high_cost_pct);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - File layout and environment overrides
//! - [`logs`] - Leveled console logger
//! - [`parser`] - CSV reading with encoding and delimiter detection
//! - [`models`] - Patient records, admission types, age groups
//! - [`stats`] - Mean, percentile, correlation, least squares, box stats
//! - [`validation`] - The `check` stage
//! - [`transform`] - Grouping, derived metrics and the `analyze` stage
//! - [`report`] - Console report rendering and number formatting
//! - [`dashboard`] - The `dashboard` stage and its plotters rendering

// Core modules
pub mod config;
pub mod error;
pub mod logs;
pub mod models;

// Parsing
pub mod parser;

// Numerics
pub mod stats;

// Stages
pub mod dashboard;
pub mod report;
pub mod transform;
pub mod validation;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{CsvError, PipelineError, PipelineResult, RecordError, RenderError};

// =============================================================================
// Re-exports - Config
// =============================================================================

pub use config::AnalyticsConfig;

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{AdmissionType, AgeGroup, Dataset, PatientRecord};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content,
    detect_delimiter,
    detect_encoding,
    parse_bytes_auto,
    read_table,
    RawTable,
};

// =============================================================================
// Re-exports - Stages
// =============================================================================

pub use validation::run_check;

pub use transform::run_analysis;

pub use dashboard::{run_dashboard, DashboardSummary};

pub use report::{AnalysisReport, CheckReport};
