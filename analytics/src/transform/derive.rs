//! Whole-table computations for the `analyze` stage.
//!
//! Every function takes the full record slice and makes one pass over it.
//! Cost-per-day aggregates only see finite values; see
//! [`FinancialSummary::non_finite_cost_rows`] for how many were left out.

use serde::Serialize;

use super::grouper::{group_by, OrderedGroups};
use crate::models::{columns, Dataset, PatientRecord};
use crate::report::format::{format_currency, format_days};
use crate::report::{ConditionCost, FinancialSummary, InsuranceShare, StaySummary};
use crate::stats::{finite_mean, mean, round_to};

/// Number of conditions in the cost ranking.
pub const TOP_CONDITIONS: usize = 5;

// =============================================================================
// Summaries
// =============================================================================

pub fn stay_summary(records: &[PatientRecord]) -> StaySummary {
    let stays: Vec<i64> = records.iter().map(|r| r.length_of_stay()).collect();
    let as_float: Vec<f64> = stays.iter().map(|&d| d as f64).collect();

    StaySummary {
        mean_days: mean(&as_float).map(|m| round_to(m, 2)),
        max_days: stays.iter().copied().max(),
        min_days: stays.iter().copied().min(),
    }
}

pub fn financial_summary(records: &[PatientRecord]) -> FinancialSummary {
    let bills: Vec<f64> = records.iter().map(|r| r.billing_amount).collect();
    let costs: Vec<f64> = records.iter().map(|r| r.cost_per_day()).collect();
    let (mean_cost_per_day, non_finite_cost_rows) = finite_mean(&costs);

    FinancialSummary {
        mean_billing: mean(&bills),
        mean_cost_per_day,
        non_finite_cost_rows,
    }
}

/// Conditions ranked by mean finite cost per day, highest first.
///
/// A condition whose stays all have a non-finite cost per day has no mean
/// and is left out.
pub fn top_conditions_by_cost(records: &[PatientRecord], n: usize) -> Vec<ConditionCost> {
    let mut groups = OrderedGroups::new();
    for r in records {
        let cost = r.cost_per_day();
        if cost.is_finite() {
            groups.add(&r.medical_condition, cost);
        } else {
            groups.touch(&r.medical_condition);
        }
    }

    groups
        .ranked_by(|acc| acc.mean())
        .into_iter()
        .take(n)
        .map(|(condition, mean_cost_per_day)| ConditionCost {
            condition,
            mean_cost_per_day,
        })
        .collect()
}

/// Patients per insurance provider, most common first.
///
/// Percentages come from their own normalized pass (each row adds `1/n`),
/// not from the counts.
pub fn insurance_distribution(records: &[PatientRecord]) -> Vec<InsuranceShare> {
    let total = records.len();
    if total == 0 {
        return Vec::new();
    }

    let counts = group_by(records, |r| r.insurance_provider.as_str(), |_| 1.0);

    let weight = 1.0 / total as f64;
    let shares = group_by(records, |r| r.insurance_provider.as_str(), |_| weight);

    counts
        .ranked_by(|acc| Some(acc.count as f64))
        .into_iter()
        .map(|(provider, _)| {
            let count = counts.get(&provider).map(|a| a.count).unwrap_or(0);
            let percent = shares.get(&provider).map(|a| a.sum * 100.0).unwrap_or(0.0);
            InsuranceShare {
                provider,
                count,
                percent,
            }
        })
        .collect()
}

// =============================================================================
// Display Columns
// =============================================================================

/// Human-readable versions of the derived values. Never exported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRow {
    /// `4 days`
    pub length_of_stay: String,
    /// `$2,000.00`
    pub cleaned_bill: String,
    /// `$500.00 per day`
    pub cost_per_day: String,
}

pub fn display_rows(records: &[PatientRecord]) -> Vec<DisplayRow> {
    records
        .iter()
        .map(|r| DisplayRow {
            length_of_stay: format_days(r.length_of_stay()),
            cleaned_bill: format_currency(r.billing_amount),
            cost_per_day: format!("{} per day", format_currency(r.cost_per_day())),
        })
        .collect()
}

// =============================================================================
// Cleaning
// =============================================================================

/// Title case: the first letter after any non-letter is upper case, every
/// other letter lower case. `o'neil SMITH` → `O'Neil Smith`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }
    out
}

/// Title-case every name, in the typed field and the raw cell.
pub fn normalize_names(dataset: &mut Dataset) {
    let name_col = dataset.columns.name;
    for r in &mut dataset.records {
        r.name = title_case(&r.name);
        r.cells[name_col] = r.name.clone();
    }
}

/// Stable sort by admission type order, then admission date.
pub fn sort_by_admission(records: &mut [PatientRecord]) {
    records.sort_by(|a, b| {
        a.admission_type
            .sort_rank()
            .cmp(&b.admission_type.sort_rank())
            .then(a.admission_date.cmp(&b.admission_date))
    });
}

// =============================================================================
// Export
// =============================================================================

/// Cleaned CSV cell for a cost per day: `inf`, `-inf`, empty for `NaN`.
pub fn format_cost_cell(cost: f64) -> String {
    if cost.is_nan() {
        String::new()
    } else if cost.is_infinite() {
        if cost > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else {
        cost.to_string()
    }
}

/// Header of the cleaned CSV and the positions of the two derived
/// columns. Existing derived columns are reused rather than duplicated.
pub fn export_layout(headers: &[String]) -> (Vec<String>, usize, usize) {
    let mut out = headers.to_vec();
    let mut position = |name: &str| match out.iter().position(|h| h == name) {
        Some(i) => i,
        None => {
            out.push(name.to_string());
            out.len() - 1
        }
    };
    let los = position(columns::LENGTH_OF_STAY);
    let cpd = position(columns::COST_PER_DAY);
    (out, los, cpd)
}

/// Rows of the cleaned CSV: original cells with ISO dates, plus the
/// derived columns.
pub fn export_rows(dataset: &Dataset) -> (Vec<String>, Vec<Vec<String>>) {
    let (headers, los_col, cpd_col) = export_layout(&dataset.headers);
    let cols = dataset.columns;

    let rows = dataset
        .records
        .iter()
        .map(|r| {
            let mut cells = r.cells.clone();
            cells.resize(headers.len(), String::new());
            cells[cols.date_of_admission] = r.admission_date.format("%Y-%m-%d").to_string();
            cells[cols.discharge_date] = r.discharge_date.format("%Y-%m-%d").to_string();
            cells[los_col] = r.length_of_stay().to_string();
            cells[cpd_col] = format_cost_cell(r.cost_per_day());
            cells
        })
        .collect();

    (headers, rows)
}
