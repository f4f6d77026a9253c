//! The `dashboard` stage: cleaned CSV in, four-panel PNG out.
//!
//! ```text
//! ┌────────────────────────────┬────────────────────────────┐
//! │ Billing vs Length of Stay  │ Total Billing by Condition │
//! │ (scatter + trend line)     │ (bars + cumulative %)      │
//! ├────────────────────────────┼────────────────────────────┤
//! │ Billing by Admission Type  │ Average Billing by Age     │
//! │ (box plot, no outliers)    │ (bars, bucket order)       │
//! └────────────────────────────┴────────────────────────────┘
//! ```

pub mod render;

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::{PipelineResult, RecordResult, RenderError};
use crate::logs::{log_info, log_success, log_warning};
use crate::models::{columns, finite_number_cell, number_cell, require_column, AdmissionType, AgeGroup};
use crate::parser::{read_table, RawRow, RawTable};
use crate::report::format::{format_count, format_currency_whole, format_opt};
use crate::stats::{box_stats, linear_fit, mean, pearson, percentile, BoxStats, LinearFit};
use crate::transform::grouper::OrderedGroups;

/// Cost-per-day percentile above which a stay is a high-cost case.
pub const HIGH_COST_QUANTILE: f64 = 0.90;

// =============================================================================
// Records
// =============================================================================

/// The columns of one cleaned row the dashboard reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardRecord {
    /// `NaN` when the cell is empty
    pub age: f64,
    pub age_group: Option<AgeGroup>,
    pub length_of_stay: f64,
    /// `NaN` when the cell is empty
    pub cost_per_day: f64,
    pub billing_amount: f64,
    pub admission_type: AdmissionType,
    pub medical_condition: String,
    pub high_cost: bool,
}

#[derive(Debug, Clone, Copy)]
struct DashboardColumns {
    age: usize,
    length_of_stay: usize,
    cost_per_day: usize,
    billing_amount: usize,
    admission_type: usize,
    medical_condition: usize,
}

impl DashboardColumns {
    fn resolve(headers: &[String]) -> RecordResult<Self> {
        Ok(Self {
            age: require_column(headers, columns::AGE)?,
            length_of_stay: require_column(headers, columns::LENGTH_OF_STAY)?,
            cost_per_day: require_column(headers, columns::COST_PER_DAY)?,
            billing_amount: require_column(headers, columns::BILLING_AMOUNT)?,
            admission_type: require_column(headers, columns::ADMISSION_TYPE)?,
            medical_condition: require_column(headers, columns::MEDICAL_CONDITION)?,
        })
    }
}

fn optional_number(row: &RawRow, index: usize, column: &str) -> RecordResult<f64> {
    if row.cells[index].trim().is_empty() {
        Ok(f64::NAN)
    } else {
        number_cell(row, index, column)
    }
}

impl DashboardRecord {
    fn from_row(row: &RawRow, cols: &DashboardColumns) -> RecordResult<Self> {
        let age = optional_number(row, cols.age, columns::AGE)?;
        Ok(Self {
            age,
            age_group: AgeGroup::from_age(age),
            length_of_stay: finite_number_cell(row, cols.length_of_stay, columns::LENGTH_OF_STAY)?,
            cost_per_day: optional_number(row, cols.cost_per_day, columns::COST_PER_DAY)?,
            billing_amount: finite_number_cell(row, cols.billing_amount, columns::BILLING_AMOUNT)?,
            admission_type: AdmissionType::parse(&row.cells[cols.admission_type]),
            medical_condition: row.cells[cols.medical_condition].clone(),
            high_cost: false,
        })
    }
}

/// Type the rows of a cleaned table. High-cost flags are not set yet.
pub fn records_from_table(table: &RawTable) -> RecordResult<Vec<DashboardRecord>> {
    let cols = DashboardColumns::resolve(&table.headers)?;
    table
        .rows
        .iter()
        .map(|row| DashboardRecord::from_row(row, &cols))
        .collect()
}

/// 90th percentile of the finite cost-per-day values.
pub fn high_cost_threshold(records: &[DashboardRecord]) -> Option<f64> {
    let finite: Vec<f64> = records
        .iter()
        .map(|r| r.cost_per_day)
        .filter(|c| c.is_finite())
        .collect();
    percentile(&finite, HIGH_COST_QUANTILE)
}

/// Flag stays whose cost per day is strictly above `threshold`.
/// `+inf` is flagged, `NaN` never is.
pub fn flag_high_cost(records: &mut [DashboardRecord], threshold: Option<f64>) {
    for r in records.iter_mut() {
        r.high_cost = threshold.map_or(false, |t| r.cost_per_day > t);
    }
}

// =============================================================================
// KPIs and Aggregations
// =============================================================================

/// Headline numbers shown in the figure title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub total_patients: usize,
    pub avg_billing: f64,
    pub avg_length_of_stay: f64,
    pub los_billing_correlation: f64,
    pub high_cost_pct: f64,
}

pub fn compute_kpis(records: &[DashboardRecord]) -> Kpis {
    let stays: Vec<f64> = records.iter().map(|r| r.length_of_stay).collect();
    let bills: Vec<f64> = records.iter().map(|r| r.billing_amount).collect();
    let flagged = records.iter().filter(|r| r.high_cost).count();

    Kpis {
        total_patients: records.len(),
        avg_billing: mean(&bills).unwrap_or(f64::NAN),
        avg_length_of_stay: mean(&stays).unwrap_or(f64::NAN),
        los_billing_correlation: pearson(&stays, &bills),
        high_cost_pct: if records.is_empty() {
            f64::NAN
        } else {
            flagged as f64 / records.len() as f64 * 100.0
        },
    }
}

/// One bar of the Pareto chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParetoEntry {
    pub condition: String,
    pub total_billing: f64,
    /// Running share of the grand total, in percent
    pub cumulative_pct: f64,
}

/// Total billing per condition, largest first, with cumulative percentage.
pub fn billing_pareto(records: &[DashboardRecord]) -> Vec<ParetoEntry> {
    let mut groups = OrderedGroups::new();
    for r in records {
        groups.add(&r.medical_condition, r.billing_amount);
    }

    let ranked = groups.ranked_by(|acc| Some(acc.sum));
    let grand_total: f64 = ranked.iter().map(|(_, v)| v).sum();

    let mut running = 0.0;
    ranked
        .into_iter()
        .map(|(condition, total_billing)| {
            running += total_billing;
            ParetoEntry {
                condition,
                total_billing,
                cumulative_pct: running / grand_total * 100.0,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeGroupBilling {
    pub group: AgeGroup,
    pub count: usize,
    /// `None` for an empty bucket
    pub mean_billing: Option<f64>,
}

/// Mean billing per age bucket, in bucket order, empty buckets included.
pub fn billing_by_age_group(records: &[DashboardRecord]) -> Vec<AgeGroupBilling> {
    let mut sums = [0.0f64; 5];
    let mut counts = [0usize; 5];
    for r in records {
        if let Some(g) = r.age_group {
            sums[g.index()] += r.billing_amount;
            counts[g.index()] += 1;
        }
    }

    AgeGroup::ALL
        .iter()
        .map(|&group| {
            let i = group.index();
            AgeGroupBilling {
                group,
                count: counts[i],
                mean_billing: (counts[i] > 0).then(|| sums[i] / counts[i] as f64),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdmissionBilling {
    pub admission_type: AdmissionType,
    #[serde(skip)]
    pub billing: Vec<f64>,
    /// `None` when no stay has this admission type
    pub stats: Option<BoxStats>,
}

/// Billing amounts per known admission type, in the fixed order.
/// Unrecognized types are not plotted.
pub fn billing_by_admission(records: &[DashboardRecord]) -> Vec<AdmissionBilling> {
    AdmissionType::ORDER
        .iter()
        .map(|t| {
            let billing: Vec<f64> = records
                .iter()
                .filter(|r| &r.admission_type == t)
                .map(|r| r.billing_amount)
                .collect();
            AdmissionBilling {
                admission_type: t.clone(),
                stats: box_stats(&billing),
                billing,
            }
        })
        .collect()
}

/// Least-squares trend of billing on length of stay.
pub fn billing_trend(records: &[DashboardRecord]) -> Option<LinearFit> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = records
        .iter()
        .map(|r| (r.length_of_stay, r.billing_amount))
        .unzip();
    linear_fit(&xs, &ys)
}

// =============================================================================
// Dashboard
// =============================================================================

/// Everything the figure needs.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    #[serde(skip)]
    pub records: Vec<DashboardRecord>,
    pub kpis: Kpis,
    pub cost_threshold: Option<f64>,
    pub pareto: Vec<ParetoEntry>,
    pub age_billing: Vec<AgeGroupBilling>,
    pub admission_billing: Vec<AdmissionBilling>,
    pub trend: Option<LinearFit>,
}

impl DashboardData {
    /// Flag high-cost stays, then compute KPIs and aggregations.
    pub fn build(mut records: Vec<DashboardRecord>) -> Self {
        let cost_threshold = high_cost_threshold(&records);
        flag_high_cost(&mut records, cost_threshold);

        Self {
            kpis: compute_kpis(&records),
            cost_threshold,
            pareto: billing_pareto(&records),
            age_billing: billing_by_age_group(&records),
            admission_billing: billing_by_admission(&records),
            trend: billing_trend(&records),
            records,
        }
    }
}

/// The two lines of the figure title.
pub fn title_lines(kpis: &Kpis) -> (String, String) {
    (
        "Healthcare Operations Analytics Dashboard".to_string(),
        format!(
            "Patients: {} | Avg Billing: {} | Avg LoS: {} days | LoS-Billing Corr: {} | Top 10% High-Cost Cases: {}%",
            format_count(kpis.total_patients),
            format_currency_whole(kpis.avg_billing),
            format_opt(Some(kpis.avg_length_of_stay), 1),
            format_opt(Some(kpis.los_billing_correlation), 2),
            format_opt(Some(kpis.high_cost_pct), 1),
        ),
    )
}

/// Returned by [`run_dashboard`].
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    #[serde(flatten)]
    pub data: DashboardData,
    pub output_path: PathBuf,
}

/// Run the whole stage.
pub fn run_dashboard(input: &Path, output: &Path) -> PipelineResult<DashboardSummary> {
    log_info(format!("📖 Reading {}", input.display()));
    let table = read_table(input)?;
    let records = records_from_table(&table)?;
    log_success(format!("Loaded {} cleaned records", records.len()));

    let non_finite = records.iter().filter(|r| !r.cost_per_day.is_finite()).count();
    if non_finite > 0 {
        log_warning(format!(
            "{} rows have a non-finite cost per day; they are left out of the percentile",
            non_finite
        ));
    }
    let unplotted = records.iter().filter(|r| !r.admission_type.is_known()).count();
    if unplotted > 0 {
        log_warning(format!("{} rows have an unrecognized admission type", unplotted));
    }

    let data = DashboardData::build(records);
    if let Some(t) = data.cost_threshold {
        log_info(format!("High-cost threshold: {:.2} per day", t));
    }

    if let Some(dir) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| RenderError::OutputDir {
            path: dir.display().to_string(),
            source,
        })?;
    }

    log_info("🎨 Rendering dashboard...");
    render::render_dashboard(&data, output)?;
    println!("Dashboard saved to: {}", output.display());

    Ok(DashboardSummary {
        data,
        output_path: output.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    const HEADER: &str = "Name,Age,Medical Condition,Admission Type,Billing Amount,LengthOfStay,CostPerDay";

    fn records(rows: &[&str]) -> Vec<DashboardRecord> {
        let mut csv = String::from(HEADER);
        for r in rows {
            csv.push('\n');
            csv.push_str(r);
        }
        records_from_table(&parse_str(&csv, ',').unwrap()).unwrap()
    }

    fn sample() -> Vec<DashboardRecord> {
        records(&[
            "A,30,Cancer,Emergency,1000,1,1000",
            "B,17,Obesity,Urgent,4000,2,2000",
            "C,66,Cancer,Elective,3000,3,1000",
            "D,45,Asthma,Emergency,2000,4,500",
            "E,52,Obesity,Urgent,6000,2,3000",
            "F,90,Diabetes,Walk-in,500,0,inf",
        ])
    }

    #[test]
    fn test_records_from_table() {
        let rs = sample();
        assert_eq!(rs.len(), 6);
        assert_eq!(rs[1].age_group, Some(AgeGroup::Child));
        assert_eq!(rs[2].age_group, Some(AgeGroup::Senior));
        assert!(rs[5].cost_per_day.is_infinite());
        assert_eq!(rs[5].admission_type, AdmissionType::Other("Walk-in".into()));
    }

    #[test]
    fn test_empty_cells_become_nan() {
        let rs = records(&["A,,Cancer,Urgent,100,0,"]);
        assert!(rs[0].age.is_nan());
        assert_eq!(rs[0].age_group, None);
        assert!(rs[0].cost_per_day.is_nan());
    }

    #[test]
    fn test_non_finite_billing_or_stay_rejected() {
        let table = parse_str(&format!("{}\nA,30,Cancer,Urgent,NaN,2,", HEADER), ',').unwrap();
        assert!(records_from_table(&table).is_err());

        let table = parse_str(&format!("{}\nA,30,Cancer,Urgent,100,inf,", HEADER), ',').unwrap();
        assert!(records_from_table(&table).is_err());
    }

    #[test]
    fn test_analyze_then_dashboard_writes_png() {
        use crate::transform::run_analysis;

        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("healthcare_dataset.csv");
        std::fs::write(
            &raw,
            "Name,Age,Medical Condition,Insurance Provider,Admission Type,Date of Admission,Discharge Date,Billing Amount\n\
             bobby JACKSON,30,Cancer,Blue Cross,Urgent,2024-01-31,2024-02-02,18856.28\n\
             LesLie TErRy,62,Obesity,Medicare,Emergency,2019-08-20,2019-08-26,33643.32\n\
             DaNnY sMitH,76,Obesity,Aetna,Elective,2022-09-22,2022-10-07,27955.09\n\
             andrEw waTtS,28,Diabetes,Medicare,Walk-in,2020-11-18,2020-12-18,37909.78\n\
             adrIENNE bEll,43,Cancer,Aetna,Urgent,2022-09-19,2022-09-19,14238.31\n\
             emily JOHNSON,,Asthma,Cigna,Elective,2021-03-01,2021-03-01,0\n",
        )
        .unwrap();

        let clean = dir.path().join("Outputs").join("healthcare_clean.csv");
        let png = dir.path().join("Outputs").join("healthcare_dashboard.png");
        run_analysis(&raw, &clean).unwrap();

        let summary = run_dashboard(&clean, &png).unwrap();
        let kpis = &summary.data.kpis;
        assert_eq!(kpis.total_patients, 6);
        assert!(kpis.avg_billing.is_finite());
        assert_eq!(summary.output_path, png);

        // zero-day stays: one infinite cost (flagged), one empty cell (never flagged)
        let records = &summary.data.records;
        assert_eq!(records.iter().filter(|r| r.cost_per_day.is_infinite()).count(), 1);
        assert_eq!(records.iter().filter(|r| r.cost_per_day.is_nan()).count(), 1);
        assert!(records.iter().filter(|r| r.cost_per_day.is_infinite()).all(|r| r.high_cost));
        assert!(records.iter().filter(|r| r.cost_per_day.is_nan()).all(|r| !r.high_cost));

        let bytes = std::fs::read(&png).unwrap();
        assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n']));

        let nested = dir.path().join("charts").join("2024").join("dashboard.png");
        run_dashboard(&clean, &nested).unwrap();
        assert!(nested.exists());
    }

    #[test]
    fn test_run_dashboard_missing_clean_csv() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("Outputs").join("healthcare_dashboard.png");

        assert!(run_dashboard(&dir.path().join("nope.csv"), &png).is_err());
        assert!(!png.exists());
    }

    #[test]
    fn test_missing_derived_column() {
        let table = parse_str("Age,Medical Condition,Admission Type,Billing Amount\n1,A,Urgent,1", ',').unwrap();
        let err = records_from_table(&table).unwrap_err();
        assert!(err.to_string().contains("LengthOfStay"));
    }

    #[test]
    fn test_high_cost_threshold_and_flags() {
        let mut rs = sample();
        // finite costs sorted: 500 1000 1000 2000 3000; rank 4 * 0.9 = 3.6
        let t = high_cost_threshold(&rs).unwrap();
        assert!((t - 2600.0).abs() < 1e-9);

        flag_high_cost(&mut rs, Some(t));
        let flagged: Vec<&str> = rs
            .iter()
            .filter(|r| r.high_cost)
            .map(|r| r.medical_condition.as_str())
            .collect();
        assert_eq!(flagged, vec!["Obesity", "Diabetes"]);
    }

    #[test]
    fn test_nan_never_flagged() {
        let mut rs = records(&["A,30,Cancer,Urgent,0,0,", "B,30,Cancer,Urgent,10,1,10"]);
        flag_high_cost(&mut rs, Some(1.0));
        assert!(!rs[0].high_cost);
        assert!(rs[1].high_cost);

        flag_high_cost(&mut rs, None);
        assert!(rs.iter().all(|r| !r.high_cost));
    }

    #[test]
    fn test_kpis() {
        let data = DashboardData::build(sample());
        let k = &data.kpis;

        assert_eq!(k.total_patients, 6);
        assert!((k.avg_billing - 16500.0 / 6.0).abs() < 1e-9);
        assert!((k.avg_length_of_stay - 2.0).abs() < 1e-9);
        assert!(k.los_billing_correlation > -1.0 && k.los_billing_correlation < 1.0);
        assert!((k.high_cost_pct - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_kpis_empty() {
        let k = compute_kpis(&[]);
        assert_eq!(k.total_patients, 0);
        assert!(k.avg_billing.is_nan());
        assert!(k.los_billing_correlation.is_nan());
        assert!(k.high_cost_pct.is_nan());
    }

    #[test]
    fn test_pareto_monotonic_and_ends_at_100() {
        let pareto = billing_pareto(&sample());

        let names: Vec<&str> = pareto.iter().map(|e| e.condition.as_str()).collect();
        assert_eq!(names, vec!["Obesity", "Cancer", "Asthma", "Diabetes"]);
        assert_eq!(pareto[0].total_billing, 10000.0);

        assert!(pareto.windows(2).all(|w| w[0].cumulative_pct <= w[1].cumulative_pct));
        let last = pareto.last().unwrap().cumulative_pct;
        assert!((last - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_pareto_tie_keeps_first_seen_order() {
        let pareto = billing_pareto(&records(&[
            "A,30,Flu,Urgent,100,1,100",
            "B,30,Cold,Urgent,100,1,100",
        ]));
        assert_eq!(pareto[0].condition, "Flu");
        assert_eq!(pareto[1].condition, "Cold");
    }

    #[test]
    fn test_billing_by_age_group() {
        let groups = billing_by_age_group(&sample());

        assert_eq!(groups.len(), 5);
        assert_eq!(groups[0].group, AgeGroup::Child);
        assert_eq!(groups[0].mean_billing, Some(4000.0));
        assert_eq!(groups[1].mean_billing, Some(1000.0));
        assert_eq!(groups[2].mean_billing, Some(2000.0));
        assert_eq!(groups[3].mean_billing, Some(6000.0));
        assert_eq!(groups[4].mean_billing, Some(1750.0));
        assert_eq!(groups[4].count, 2);
    }

    #[test]
    fn test_empty_age_bucket_has_no_mean() {
        let groups = billing_by_age_group(&records(&["A,30,Flu,Urgent,100,1,100"]));
        assert_eq!(groups[0].mean_billing, None);
        assert_eq!(groups[0].count, 0);
    }

    #[test]
    fn test_billing_by_admission_fixed_order() {
        let groups = billing_by_admission(&sample());

        let types: Vec<&str> = groups.iter().map(|g| g.admission_type.as_str()).collect();
        assert_eq!(types, vec!["Emergency", "Urgent", "Elective"]);
        assert_eq!(groups[0].billing, vec![1000.0, 2000.0]);
        assert_eq!(groups[1].stats.unwrap().median, 5000.0);
        assert_eq!(groups[2].billing.len(), 1);
    }

    #[test]
    fn test_billing_trend() {
        let fit = billing_trend(&records(&[
            "A,30,Flu,Urgent,100,1,100",
            "B,30,Flu,Urgent,300,3,100",
            "C,30,Flu,Urgent,500,5,100",
        ]))
        .unwrap();
        assert!((fit.slope - 100.0).abs() < 1e-9);
        assert!(fit.intercept.abs() < 1e-9);
    }

    #[test]
    fn test_title_lines() {
        let kpis = Kpis {
            total_patients: 55500,
            avg_billing: 25539.32,
            avg_length_of_stay: 15.509,
            los_billing_correlation: -0.0037,
            high_cost_pct: 10.0,
        };
        let (first, second) = title_lines(&kpis);

        assert_eq!(first, "Healthcare Operations Analytics Dashboard");
        assert_eq!(
            second,
            "Patients: 55,500 | Avg Billing: $25,539 | Avg LoS: 15.5 days | LoS-Billing Corr: -0.00 | Top 10% High-Cost Cases: 10.0%"
        );
    }

    #[test]
    fn test_title_lines_undefined_correlation() {
        let (_, second) = title_lines(&compute_kpis(&[]));
        assert!(second.contains("LoS-Billing Corr: nan"));
    }
}
