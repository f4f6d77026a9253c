//! Healthcare Analytics CLI
//!
//! # Commands
//!
//! ```bash
//! healthcare-analytics                 # Same as `run`
//! healthcare-analytics run             # check, analyze, then dashboard
//! healthcare-analytics check           # Shape, preview and missing values
//! healthcare-analytics analyze         # Summaries + Outputs/healthcare_clean.csv
//! healthcare-analytics dashboard       # Outputs/healthcare_dashboard.png
//! ```
//!
//! Paths default to `Data/` and `Outputs/` under `HEALTHCARE_BASE_DIR`
//! (environment or `.env`), or under the current directory.

use clap::{Parser, Subcommand};
use healthcare_analytics::logs::{log_error, LogLevel, LOGGER};
use healthcare_analytics::{run_analysis, run_check, run_dashboard, AnalyticsConfig};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "healthcare-analytics")]
#[command(about = "Healthcare billing statistics and dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run check, analyze and dashboard in order
    Run {
        /// Raw CSV file (default: Data/healthcare_dataset.csv)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory (default: Outputs)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Report shape, first rows, columns and missing values of the raw CSV
    Check {
        /// Raw CSV file (default: Data/healthcare_dataset.csv)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Print summary statistics and write the cleaned CSV
    Analyze {
        /// Raw CSV file (default: Data/healthcare_dataset.csv)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory (default: Outputs)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Also write the report as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Render the dashboard from the cleaned CSV
    Dashboard {
        /// Directory holding the cleaned CSV and receiving the PNG (default: Outputs)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Also write the KPIs and aggregations as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let base = AnalyticsConfig::from_env();

    let result = match cli.command.unwrap_or(Commands::Run {
        input: None,
        output_dir: None,
    }) {
        Commands::Run { input, output_dir } => cmd_run(&base.with_overrides(input, output_dir)),

        Commands::Check { input } => cmd_check(&base.with_overrides(input, None)),

        Commands::Analyze {
            input,
            output_dir,
            json,
        } => cmd_analyze(&base.with_overrides(input, output_dir), json.as_deref()),

        Commands::Dashboard { output_dir, json } => {
            cmd_dashboard(&base.with_overrides(None, output_dir), json.as_deref())
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_run(config: &AnalyticsConfig) -> Result<(), Box<dyn std::error::Error>> {
    stage("check", cmd_check(config))?;
    stage("analyze", cmd_analyze(config, None))?;
    stage("dashboard", cmd_dashboard(config, None))?;

    let warnings = LOGGER.count(LogLevel::Warning);
    if warnings > 0 {
        eprintln!("\n✨ Done with {} warning(s)", warnings);
    } else {
        eprintln!("\n✨ Done!");
    }
    Ok(())
}

/// Log which stage stopped the run; later stages do not start.
fn stage(
    name: &str,
    result: Result<(), Box<dyn std::error::Error>>,
) -> Result<(), Box<dyn std::error::Error>> {
    if result.is_err() {
        log_error(format!("{} stage failed", name));
    }
    result
}

fn cmd_check(config: &AnalyticsConfig) -> Result<(), Box<dyn std::error::Error>> {
    run_check(&config.raw_csv)?;
    Ok(())
}

fn cmd_analyze(
    config: &AnalyticsConfig,
    json: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = run_analysis(&config.raw_csv, &config.clean_csv())?;
    if let Some(path) = json {
        write_json(&report, path)?;
    }
    Ok(())
}

fn cmd_dashboard(
    config: &AnalyticsConfig,
    json: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let summary = run_dashboard(&config.clean_csv(), &config.dashboard_png())?;
    if let Some(path) = json {
        write_json(&summary, path)?;
    }
    Ok(())
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    eprintln!("   💾 Saved to: {}", path.display());
    Ok(())
}
