//! File locations shared by the three stages.
//!
//! Defaults mirror the fixed layout the stages agree on:
//! raw data under `Data/`, generated files under `Outputs/`.
//! `HEALTHCARE_BASE_DIR` (environment or `.env`) moves the whole layout.

use std::path::{Path, PathBuf};

/// Raw dataset, relative to the base directory.
pub const DEFAULT_RAW_CSV: &str = "Data/healthcare_dataset.csv";

/// Output directory, relative to the base directory.
pub const DEFAULT_OUTPUT_DIR: &str = "Outputs";

/// Cleaned dataset written by `analyze` and read by `dashboard`.
pub const CLEAN_CSV_NAME: &str = "healthcare_clean.csv";

/// Dashboard image written by `dashboard`.
pub const DASHBOARD_PNG_NAME: &str = "healthcare_dashboard.png";

/// Environment variable overriding the base directory.
pub const BASE_DIR_ENV: &str = "HEALTHCARE_BASE_DIR";

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsConfig {
    /// Raw input CSV
    pub raw_csv: PathBuf,
    /// Directory receiving the cleaned CSV and the dashboard
    pub output_dir: PathBuf,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self::with_base_dir(".")
    }
}

impl AnalyticsConfig {
    /// Resolve the default layout under `base`.
    pub fn with_base_dir(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            raw_csv: base.join(DEFAULT_RAW_CSV),
            output_dir: base.join(DEFAULT_OUTPUT_DIR),
        }
    }

    /// Read `HEALTHCARE_BASE_DIR`, falling back to the current directory.
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honored.
    pub fn from_env() -> Self {
        match std::env::var(BASE_DIR_ENV) {
            Ok(dir) if !dir.trim().is_empty() => Self::with_base_dir(dir.trim()),
            _ => Self::default(),
        }
    }

    /// Apply CLI overrides on top of the resolved layout.
    pub fn with_overrides(mut self, raw_csv: Option<PathBuf>, output_dir: Option<PathBuf>) -> Self {
        if let Some(p) = raw_csv {
            self.raw_csv = p;
        }
        if let Some(d) = output_dir {
            self.output_dir = d;
        }
        self
    }

    pub fn clean_csv(&self) -> PathBuf {
        self.output_dir.join(CLEAN_CSV_NAME)
    }

    pub fn dashboard_png(&self) -> PathBuf {
        self.output_dir.join(DASHBOARD_PNG_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let config = AnalyticsConfig::default();
        assert!(config.raw_csv.ends_with("Data/healthcare_dataset.csv"));
        assert!(config.clean_csv().ends_with("Outputs/healthcare_clean.csv"));
        assert!(config.dashboard_png().ends_with("Outputs/healthcare_dashboard.png"));
    }

    #[test]
    fn test_base_dir() {
        let config = AnalyticsConfig::with_base_dir("/srv/project");
        assert_eq!(config.raw_csv, PathBuf::from("/srv/project/Data/healthcare_dataset.csv"));
        assert_eq!(config.output_dir, PathBuf::from("/srv/project/Outputs"));
    }

    #[test]
    fn test_overrides() {
        let config = AnalyticsConfig::default()
            .with_overrides(Some(PathBuf::from("in.csv")), None);
        assert_eq!(config.raw_csv, PathBuf::from("in.csv"));
        assert!(config.output_dir.ends_with("Outputs"));

        let config = config.with_overrides(None, Some(PathBuf::from("out")));
        assert_eq!(config.clean_csv(), PathBuf::from("out/healthcare_clean.csv"));
    }
}
