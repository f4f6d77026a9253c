//! Console report text for the `check` and `analyze` stages.
//!
//! Report values are plain serializable structs; rendering them to text
//! is kept separate so the text can be tested without capturing stdout.

pub mod format;

use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;

use format::{format_count, format_currency, format_days, format_opt};

// =============================================================================
// Analysis Report
// =============================================================================

/// Length-of-stay summary. `None` values come from an empty dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaySummary {
    /// Mean, rounded to 2 decimals
    pub mean_days: Option<f64>,
    pub max_days: Option<i64>,
    pub min_days: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSummary {
    pub mean_billing: Option<f64>,
    /// Mean over finite cost-per-day values only
    pub mean_cost_per_day: Option<f64>,
    /// Rows whose cost per day is `inf`, `-inf` or `NaN`
    pub non_finite_cost_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionCost {
    pub condition: String,
    pub mean_cost_per_day: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsuranceShare {
    pub provider: String,
    pub count: usize,
    pub percent: f64,
}

/// Everything the `analyze` stage computed.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub rows: usize,
    pub stay: StaySummary,
    pub financial: FinancialSummary,
    pub top_conditions: Vec<ConditionCost>,
    pub insurance: Vec<InsuranceShare>,
    pub output_path: PathBuf,
}

/// Summary sections, each preceded by a blank line.
pub fn render_analysis(report: &AnalysisReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "\n=== Length of Stay Summary ===");
    let _ = writeln!(
        out,
        "Average Length of Stay: {} days",
        format_opt(report.stay.mean_days, 2)
    );
    let _ = writeln!(out, "Maximum Length of Stay: {}", format_opt_days(report.stay.max_days));
    let _ = writeln!(out, "Minimum Length of Stay: {}", format_opt_days(report.stay.min_days));

    let _ = writeln!(out, "\n=== Financial Summary ===");
    let _ = writeln!(
        out,
        "Average Billing per Patient: {}",
        format_currency(report.financial.mean_billing.unwrap_or(f64::NAN))
    );
    let _ = writeln!(
        out,
        "Average Cost per Day: {}",
        format_currency(report.financial.mean_cost_per_day.unwrap_or(f64::NAN))
    );

    let _ = writeln!(out, "\n=== Top 5 Conditions by Average Cost per Day ===");
    for c in &report.top_conditions {
        let _ = writeln!(out, "{}: {} per day", c.condition, format_currency(c.mean_cost_per_day));
    }

    let _ = writeln!(out, "\n=== Insurance Distribution ===");
    for share in &report.insurance {
        let _ = writeln!(
            out,
            "{}: {} patients ({:.2}%)",
            share.provider,
            format_count(share.count),
            share.percent
        );
    }

    out
}

fn format_opt_days(days: Option<i64>) -> String {
    match days {
        Some(d) => format_days(d),
        None => "nan days".to_string(),
    }
}

// =============================================================================
// Check Report
// =============================================================================

/// Shape, preview and missing-value counts of a raw CSV.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
    pub headers: Vec<String>,
    /// First rows, as read
    pub preview: Vec<Vec<String>>,
    /// `(column, missing cells)` in header order
    pub missing: Vec<(String, usize)>,
}

/// Tabular dump in the layout of a dataframe printout.
pub fn render_check(report: &CheckReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Rows, Columns: ({}, {})", report.rows, report.columns);
    out.push_str(&render_preview(&report.headers, &report.preview));

    let _ = writeln!(out, "\nColumns:");
    let quoted: Vec<String> = report.headers.iter().map(|h| format!("'{}'", h)).collect();
    let _ = writeln!(out, " [{}]", quoted.join(", "));

    let _ = writeln!(out, "\nMissing values:");
    let width = report.headers.iter().map(|h| h.chars().count()).max().unwrap_or(0);
    for (column, count) in &report.missing {
        let _ = writeln!(out, " {:<width$}    {}", column, count, width = width);
    }

    out
}

/// Right-aligned columns with a leading row index.
fn render_preview(headers: &[String], rows: &[Vec<String>]) -> String {
    let index_width = rows.len().saturating_sub(1).to_string().len();
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let _ = write!(out, "{:>w$}", "", w = index_width);
    for (h, w) in headers.iter().zip(&widths) {
        let _ = write!(out, "  {:>w$}", h, w = *w);
    }
    out.push('\n');

    for (idx, row) in rows.iter().enumerate() {
        let _ = write!(out, "{:<w$}", idx, w = index_width);
        for (cell, w) in row.iter().zip(&widths) {
            let _ = write!(out, "  {:>w$}", cell, w = *w);
        }
        out.push('\n');
    }
    out
}
