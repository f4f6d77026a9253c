//! The `analyze` stage: raw CSV in, report on stdout, cleaned CSV out.
//!
//! # Example
//!
//! ```rust,ignore
//! use healthcare_analytics::transform::pipeline::run_analysis;
//! use std::path::Path;
//!
//! let report = run_analysis(
//!     Path::new("Data/healthcare_dataset.csv"),
//!     Path::new("Outputs/healthcare_clean.csv"),
//! )?;
//! println!("{} rows, mean stay {:?}", report.rows, report.stay.mean_days);
//! ```

use std::path::Path;

use super::derive::{
    display_rows, export_rows, financial_summary, insurance_distribution, normalize_names,
    sort_by_admission, stay_summary, top_conditions_by_cost, TOP_CONDITIONS,
};
use crate::error::PipelineResult;
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::models::Dataset;
use crate::parser::{read_table, write_csv};
use crate::report::{render_analysis, AnalysisReport};

/// Compute the report values without printing or writing anything.
pub fn summarize(dataset: &Dataset, output_path: &Path) -> AnalysisReport {
    AnalysisReport {
        rows: dataset.len(),
        stay: stay_summary(&dataset.records),
        financial: financial_summary(&dataset.records),
        top_conditions: top_conditions_by_cost(&dataset.records, TOP_CONDITIONS),
        insurance: insurance_distribution(&dataset.records),
        output_path: output_path.to_path_buf(),
    }
}

/// Title-case names and put rows in admission order.
pub fn clean(dataset: &mut Dataset) {
    normalize_names(dataset);
    sort_by_admission(&mut dataset.records);
}

/// Write the cleaned dataset, replacing any previous file.
pub fn write_clean_csv(dataset: &Dataset, path: &Path) -> PipelineResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let (headers, rows) = export_rows(dataset);
    write_csv(path, &headers, rows)?;
    Ok(())
}

/// Run the whole stage.
pub fn run_analysis(input: &Path, output: &Path) -> PipelineResult<AnalysisReport> {
    log_info(format!("📖 Reading {}", input.display()));
    let table = read_table(input)?;
    log_success(format!("Read {} rows, {} columns", table.rows.len(), table.headers.len()));

    let mut dataset = Dataset::from_table(table)?;
    log_success(format!("Parsed {} patient records", dataset.len()));

    let report = summarize(&dataset, output);
    if report.financial.non_finite_cost_rows > 0 {
        log_warning(format!(
            "{} rows have a non-finite cost per day and are left out of cost averages",
            report.financial.non_finite_cost_rows
        ));
    }
    print!("{}", render_analysis(&report));

    let display = display_rows(&dataset.records);
    if let Some(first) = display.first() {
        log_info("First record, formatted:");
        log_info_indent(
            format!("{} | {} | {}", first.length_of_stay, first.cleaned_bill, first.cost_per_day),
            1,
        );
    }

    clean(&mut dataset);
    write_clean_csv(&dataset, output)?;
    log_success(format!("Wrote {}", output.display()));
    println!("\nSaved cleaned dataset.");

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::columns;
    use crate::parser::read_table;

    const RAW: &str = "\
Name,Age,Gender,Medical Condition,Insurance Provider,Admission Type,Date of Admission,Discharge Date,Billing Amount
bobby JACKSON,30,Male,Cancer,Blue Cross,Urgent,2024-01-31,2024-02-02,18856.28
LesLie TErRy,62,Male,Obesity,Medicare,Emergency,2019-08-20,2019-08-26,33643.32
DaNnY sMitH,76,Female,Obesity,Aetna,Elective,2022-09-22,2022-10-07,27955.09
andrEw waTtS,28,Female,Diabetes,Medicare,Emergency,2020-11-18,2020-12-18,37909.78
adrIENNE bEll,43,Female,Cancer,Aetna,Urgent,2022-09-19,2022-09-19,14238.31
";

    fn write_raw(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("healthcare_dataset.csv");
        std::fs::write(&path, RAW).unwrap();
        path
    }

    #[test]
    fn test_run_analysis_writes_sorted_clean_csv() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_raw(dir.path());
        let output = dir.path().join("Outputs").join("healthcare_clean.csv");

        let report = run_analysis(&input, &output).unwrap();
        assert_eq!(report.rows, 5);
        assert_eq!(report.financial.non_finite_cost_rows, 1);

        let clean = read_table(&output).unwrap();
        assert_eq!(clean.rows.len(), 5);
        assert_eq!(clean.headers.last().map(String::as_str), Some(columns::COST_PER_DAY));
        assert!(clean.column_index("Gender").is_some());

        let name = clean.column_index(columns::NAME).unwrap();
        let names: Vec<&str> = clean.rows.iter().map(|r| r.cells[name].as_str()).collect();
        assert_eq!(
            names,
            vec!["Leslie Terry", "Andrew Watts", "Adrienne Bell", "Bobby Jackson", "Danny Smith"]
        );
    }

    #[test]
    fn test_clean_csv_round_trip_keeps_derived_values() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_raw(dir.path());
        let output = dir.path().join("clean.csv");
        run_analysis(&input, &output).unwrap();

        let mut dataset = Dataset::from_table(read_table(&input).unwrap()).unwrap();
        clean(&mut dataset);

        let written = read_table(&output).unwrap();
        let los = written.column_index(columns::LENGTH_OF_STAY).unwrap();
        let cpd = written.column_index(columns::COST_PER_DAY).unwrap();

        assert_eq!(written.rows.len(), dataset.len());
        for (row, record) in written.rows.iter().zip(&dataset.records) {
            assert_eq!(row.cells[los].parse::<i64>().unwrap(), record.length_of_stay());
            let cost: f64 = row.cells[cpd].parse().unwrap();
            let expected = record.cost_per_day();
            if expected.is_finite() {
                assert!((cost - expected).abs() < 1e-9);
            } else {
                assert_eq!(cost, expected);
            }
        }
    }

    #[test]
    fn test_rerun_overwrites_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_raw(dir.path());
        let output = dir.path().join("clean.csv");
        std::fs::write(&output, "stale,content\n1,2\n3,4\n5,6\n7,8\n9,10\n11,12\n").unwrap();

        run_analysis(&input, &output).unwrap();
        run_analysis(&input, &output).unwrap();

        let written = read_table(&output).unwrap();
        assert_eq!(written.rows.len(), 5);
        assert_eq!(written.headers[0], "Name");
    }

    #[test]
    fn test_run_analysis_bad_date_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.csv");
        std::fs::write(
            &input,
            "Name,Medical Condition,Insurance Provider,Admission Type,Date of Admission,Discharge Date,Billing Amount\n\
             A,Flu,Aetna,Urgent,someday,2023-01-02,10\n",
        )
        .unwrap();
        let output = dir.path().join("clean.csv");

        assert!(run_analysis(&input, &output).is_err());
        assert!(!output.exists());
    }
}
