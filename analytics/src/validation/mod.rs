//! Dataset check: shape, preview and missing values of the raw CSV.
//!
//! Purely diagnostic. Nothing is transformed and nothing is written.

use std::path::Path;

use crate::error::PipelineResult;
use crate::logs::{log_info, log_success, log_warning};
use crate::parser::{read_table, RawTable};
use crate::report::{render_check, CheckReport};

/// Number of rows shown in the preview.
pub const PREVIEW_ROWS: usize = 5;

/// Cell values read as missing, on top of the empty string.
pub const NA_TOKENS: [&str; 17] = [
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "<NA>", "#N/A",
    "#NA", "1.#IND", "1.#QNAN", "-1.#IND", "-1.#QNAN",
];

/// Whether a cell counts as missing.
pub fn is_missing(cell: &str) -> bool {
    cell.is_empty() || NA_TOKENS.contains(&cell)
}

/// Missing-cell count per column, in header order.
pub fn missing_counts(table: &RawTable) -> Vec<(String, usize)> {
    let mut counts = vec![0usize; table.headers.len()];
    for row in &table.rows {
        for (i, cell) in row.cells.iter().enumerate() {
            if is_missing(cell) {
                counts[i] += 1;
            }
        }
    }
    table.headers.iter().cloned().zip(counts).collect()
}

/// Build the check report for an already loaded table.
pub fn check_table(table: &RawTable, path: &Path) -> CheckReport {
    let (rows, columns) = table.shape();
    CheckReport {
        path: path.to_path_buf(),
        rows,
        columns,
        headers: table.headers.clone(),
        preview: table
            .rows
            .iter()
            .take(PREVIEW_ROWS)
            .map(|r| r.cells.clone())
            .collect(),
        missing: missing_counts(table),
    }
}

/// Load the CSV at `path`, print the check report and return it.
pub fn run_check(path: &Path) -> PipelineResult<CheckReport> {
    println!("Looking for file at: {}", path.display());

    let table = read_table(path)?;
    log_success(format!("Read {} rows ({} encoding, '{}' delimiter)",
        table.rows.len(), table.encoding, format_delimiter(table.delimiter)));

    let report = check_table(&table, path);
    print!("{}", render_check(&report));

    let total_missing: usize = report.missing.iter().map(|(_, n)| n).sum();
    if total_missing > 0 {
        log_warning(format!("{} missing cells", total_missing));
    } else {
        log_info("No missing cells");
    }

    Ok(report)
}

/// Format delimiter for display
fn format_delimiter(d: char) -> &'static str {
    match d {
        ';' => ";",
        ',' => ",",
        '\t' => "TAB",
        '|' => "|",
        _ => "?",
    }
}
