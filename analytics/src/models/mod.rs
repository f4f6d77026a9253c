//! Domain models for the healthcare billing dataset.
//!
//! - [`PatientRecord`] - one row of the raw dataset, typed
//! - [`Dataset`] - header row plus ordered patient records
//! - [`AdmissionType`] - fixed-order admission category
//! - [`AgeGroup`] - fixed age buckets used by the dashboard

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::fmt;

use crate::error::{RecordError, RecordResult};
use crate::parser::{RawRow, RawTable};

// =============================================================================
// Column Names
// =============================================================================

/// Header names the stages depend on.
pub mod columns {
    pub const NAME: &str = "Name";
    pub const AGE: &str = "Age";
    pub const MEDICAL_CONDITION: &str = "Medical Condition";
    pub const INSURANCE_PROVIDER: &str = "Insurance Provider";
    pub const ADMISSION_TYPE: &str = "Admission Type";
    pub const DATE_OF_ADMISSION: &str = "Date of Admission";
    pub const DISCHARGE_DATE: &str = "Discharge Date";
    pub const BILLING_AMOUNT: &str = "Billing Amount";

    /// Derived columns appended to the cleaned CSV.
    pub const LENGTH_OF_STAY: &str = "LengthOfStay";
    pub const COST_PER_DAY: &str = "CostPerDay";
}

/// Find a required column or fail with [`RecordError::MissingColumn`].
pub fn require_column(headers: &[String], name: &str) -> RecordResult<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| RecordError::MissingColumn(name.to_string()))
}

// =============================================================================
// Admission Type
// =============================================================================

/// Admission category with the fixed order Emergency, Urgent, Elective.
///
/// Anything else is kept verbatim as `Other` and sorts after the three
/// known types. All `Other` values share one rank.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AdmissionType {
    Emergency,
    Urgent,
    Elective,
    Other(String),
}

impl AdmissionType {
    /// The known types in display and sort order.
    pub const ORDER: [AdmissionType; 3] = [
        AdmissionType::Emergency,
        AdmissionType::Urgent,
        AdmissionType::Elective,
    ];

    /// Exact match on the trimmed value.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "Emergency" => Self::Emergency,
            "Urgent" => Self::Urgent,
            "Elective" => Self::Elective,
            other => Self::Other(other.to_string()),
        }
    }

    /// Sort key: Emergency < Urgent < Elective < Other.
    pub fn sort_rank(&self) -> u8 {
        match self {
            Self::Emergency => 0,
            Self::Urgent => 1,
            Self::Elective => 2,
            Self::Other(_) => 3,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Emergency => "Emergency",
            Self::Urgent => "Urgent",
            Self::Elective => "Elective",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for AdmissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AdmissionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// =============================================================================
// Age Group
// =============================================================================

/// Age bucket. Upper bounds are inclusive and 0 belongs to the first bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AgeGroup {
    #[serde(rename = "0-18")]
    Child,
    #[serde(rename = "19-35")]
    YoungAdult,
    #[serde(rename = "36-50")]
    Adult,
    #[serde(rename = "51-65")]
    MiddleAged,
    #[serde(rename = "65+")]
    Senior,
}

impl AgeGroup {
    /// All buckets in order.
    pub const ALL: [AgeGroup; 5] = [
        AgeGroup::Child,
        AgeGroup::YoungAdult,
        AgeGroup::Adult,
        AgeGroup::MiddleAged,
        AgeGroup::Senior,
    ];

    /// Bucket an age; negative and NaN ages have no group.
    /// Ages above 100 still land in `65+`; there is no upper bound.
    pub fn from_age(age: f64) -> Option<Self> {
        if age.is_nan() || age < 0.0 {
            None
        } else if age <= 18.0 {
            Some(Self::Child)
        } else if age <= 35.0 {
            Some(Self::YoungAdult)
        } else if age <= 50.0 {
            Some(Self::Adult)
        } else if age <= 65.0 {
            Some(Self::MiddleAged)
        } else {
            Some(Self::Senior)
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Child => "0-18",
            Self::YoungAdult => "19-35",
            Self::Adult => "36-50",
            Self::MiddleAged => "51-65",
            Self::Senior => "65+",
        }
    }

    /// Position in [`AgeGroup::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Cell Parsing
// =============================================================================

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M:%S"];

/// Parse a date in any of the accepted layouts. Time of day is dropped.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Parse a float cell. `inf`, `-inf` and `NaN` are accepted; empty is not.
pub fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok()
}

/// Helpers shared by the raw and cleaned readers.
pub(crate) fn date_cell(row: &RawRow, index: usize, column: &str) -> RecordResult<NaiveDate> {
    let value = &row.cells[index];
    parse_date(value).ok_or_else(|| RecordError::InvalidDate {
        line: row.line,
        column: column.to_string(),
        value: value.clone(),
    })
}

pub(crate) fn number_cell(row: &RawRow, index: usize, column: &str) -> RecordResult<f64> {
    let value = &row.cells[index];
    parse_number(value).ok_or_else(|| RecordError::InvalidNumber {
        line: row.line,
        column: column.to_string(),
        value: value.clone(),
    })
}

/// Like [`number_cell`] but `inf`, `-inf` and `NaN` are rejected too.
pub(crate) fn finite_number_cell(row: &RawRow, index: usize, column: &str) -> RecordResult<f64> {
    let value = &row.cells[index];
    parse_number(value)
        .filter(|v| v.is_finite())
        .ok_or_else(|| RecordError::InvalidNumber {
            line: row.line,
            column: column.to_string(),
            value: value.clone(),
        })
}

// =============================================================================
// Patient Record
// =============================================================================

/// Positions of the required columns in a raw header.
#[derive(Debug, Clone, Copy)]
pub struct PatientColumns {
    pub name: usize,
    pub medical_condition: usize,
    pub insurance_provider: usize,
    pub admission_type: usize,
    pub date_of_admission: usize,
    pub discharge_date: usize,
    pub billing_amount: usize,
}

impl PatientColumns {
    pub fn resolve(headers: &[String]) -> RecordResult<Self> {
        Ok(Self {
            name: require_column(headers, columns::NAME)?,
            medical_condition: require_column(headers, columns::MEDICAL_CONDITION)?,
            insurance_provider: require_column(headers, columns::INSURANCE_PROVIDER)?,
            admission_type: require_column(headers, columns::ADMISSION_TYPE)?,
            date_of_admission: require_column(headers, columns::DATE_OF_ADMISSION)?,
            discharge_date: require_column(headers, columns::DISCHARGE_DATE)?,
            billing_amount: require_column(headers, columns::BILLING_AMOUNT)?,
        })
    }
}

/// One patient stay.
///
/// `cells` keeps every original value so columns the stages never
/// interpret still reach the cleaned CSV.
#[derive(Debug, Clone)]
pub struct PatientRecord {
    pub line: usize,
    pub cells: Vec<String>,
    pub name: String,
    pub medical_condition: String,
    pub insurance_provider: String,
    pub admission_type: AdmissionType,
    pub admission_date: NaiveDate,
    pub discharge_date: NaiveDate,
    pub billing_amount: f64,
}

impl PatientRecord {
    pub fn from_row(row: &RawRow, cols: &PatientColumns) -> RecordResult<Self> {
        Ok(Self {
            line: row.line,
            cells: row.cells.clone(),
            name: row.cells[cols.name].clone(),
            medical_condition: row.cells[cols.medical_condition].clone(),
            insurance_provider: row.cells[cols.insurance_provider].clone(),
            admission_type: AdmissionType::parse(&row.cells[cols.admission_type]),
            admission_date: date_cell(row, cols.date_of_admission, columns::DATE_OF_ADMISSION)?,
            discharge_date: date_cell(row, cols.discharge_date, columns::DISCHARGE_DATE)?,
            billing_amount: finite_number_cell(row, cols.billing_amount, columns::BILLING_AMOUNT)?,
        })
    }

    /// Whole days between admission and discharge. Negative when the
    /// discharge date precedes admission.
    pub fn length_of_stay(&self) -> i64 {
        (self.discharge_date - self.admission_date).num_days()
    }

    /// Billing amount divided by length of stay, as IEEE float division:
    /// a zero-day stay gives `inf` (or `NaN` for a zero bill).
    pub fn cost_per_day(&self) -> f64 {
        self.billing_amount / self.length_of_stay() as f64
    }
}

// =============================================================================
// Dataset
// =============================================================================

/// Header row plus typed records, in file order.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub columns: PatientColumns,
    pub records: Vec<PatientRecord>,
}

impl Dataset {
    /// Type every row; the first unparsable cell aborts.
    pub fn from_table(table: RawTable) -> RecordResult<Self> {
        let columns = PatientColumns::resolve(&table.headers)?;
        let records = table
            .rows
            .iter()
            .map(|row| PatientRecord::from_row(row, &columns))
            .collect::<RecordResult<Vec<_>>>()?;

        Ok(Self {
            headers: table.headers,
            columns,
            records,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    const HEADER: &str = "Name,Age,Medical Condition,Insurance Provider,Admission Type,Date of Admission,Discharge Date,Billing Amount";

    fn table(rows: &[&str]) -> RawTable {
        let mut csv = String::from(HEADER);
        for r in rows {
            csv.push('\n');
            csv.push_str(r);
        }
        parse_str(&csv, ',').unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_length_of_stay_and_cost_per_day() {
        let ds = Dataset::from_table(table(&[
            "Bobby JacksOn,30,Cancer,Blue Cross,Urgent,2023-01-01,2023-01-05,2000",
        ]))
        .unwrap();

        let r = &ds.records[0];
        assert_eq!(r.length_of_stay(), 4);
        assert_eq!(r.cost_per_day(), 500.0);
    }

    #[test]
    fn test_negative_stay_is_preserved() {
        let ds = Dataset::from_table(table(&[
            "A,30,Flu,Aetna,Elective,2023-01-10,2023-01-07,300",
        ]))
        .unwrap();

        assert_eq!(ds.records[0].length_of_stay(), -3);
        assert_eq!(ds.records[0].cost_per_day(), -100.0);
    }

    #[test]
    fn test_zero_day_stay_is_non_finite() {
        let ds = Dataset::from_table(table(&[
            "A,30,Flu,Aetna,Elective,2023-01-01,2023-01-01,100",
            "B,30,Flu,Aetna,Elective,2023-01-01,2023-01-01,0",
        ]))
        .unwrap();

        assert_eq!(ds.records[0].length_of_stay(), 0);
        assert!(ds.records[0].cost_per_day().is_infinite());
        assert!(ds.records[0].cost_per_day() > 0.0);
        assert!(ds.records[1].cost_per_day().is_nan());
    }

    #[test]
    fn test_date_formats() {
        assert_eq!(parse_date("2024-01-31"), Some(date(2024, 1, 31)));
        assert_eq!(parse_date("1/5/2023"), Some(date(2023, 1, 5)));
        assert_eq!(parse_date("12/25/2022"), Some(date(2022, 12, 25)));
        assert_eq!(parse_date("2024-01-31 00:00:00"), Some(date(2024, 1, 31)));
        assert_eq!(parse_date("2024-01-31T13:45:00"), Some(date(2024, 1, 31)));
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_invalid_date_names_line_and_column() {
        let err = Dataset::from_table(table(&[
            "A,30,Flu,Aetna,Elective,2023-01-01,2023-01-02,100",
            "B,30,Flu,Aetna,Elective,2023-01-01,not-a-date,100",
        ]))
        .unwrap_err();

        match err {
            RecordError::InvalidDate { line, column, value } => {
                assert_eq!(line, 3);
                assert_eq!(column, "Discharge Date");
                assert_eq!(value, "not-a-date");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_billing_amount() {
        let err = Dataset::from_table(table(&[
            "A,30,Flu,Aetna,Elective,2023-01-01,2023-01-02,lots",
        ]))
        .unwrap_err();
        assert!(matches!(err, RecordError::InvalidNumber { .. }));
    }

    #[test]
    fn test_non_finite_billing_amount_rejected() {
        for bad in ["NaN", "inf", "-inf"] {
            let row = format!("A,30,Flu,Aetna,Elective,2023-01-01,2023-01-03,{}", bad);
            let err = Dataset::from_table(table(&["B,40,Flu,Aetna,Urgent,2023-01-01,2023-01-03,2000", &row]))
                .unwrap_err();
            assert!(
                matches!(err, RecordError::InvalidNumber { line: 3, ref column, .. } if column == "Billing Amount"),
                "{} accepted",
                bad
            );
        }
    }

    #[test]
    fn test_missing_column() {
        let t = parse_str("Name,Age\nA,1", ',').unwrap();
        let err = Dataset::from_table(t).unwrap_err();
        assert!(matches!(err, RecordError::MissingColumn(ref c) if c == "Medical Condition"));
    }

    #[test]
    fn test_admission_type_order() {
        let mut types = vec![
            AdmissionType::parse("Elective"),
            AdmissionType::parse("Walk-in"),
            AdmissionType::parse("Emergency"),
            AdmissionType::parse("Urgent"),
        ];
        types.sort_by_key(|t| t.sort_rank());

        let names: Vec<&str> = types.iter().map(|t| t.as_str()).collect();
        assert_eq!(names, vec!["Emergency", "Urgent", "Elective", "Walk-in"]);
        assert!(!types[3].is_known());
    }

    #[test]
    fn test_admission_type_exact_match() {
        assert_eq!(AdmissionType::parse(" Urgent "), AdmissionType::Urgent);
        assert_eq!(
            AdmissionType::parse("urgent"),
            AdmissionType::Other("urgent".to_string())
        );
    }

    #[test]
    fn test_age_groups() {
        assert_eq!(AgeGroup::from_age(0.0), Some(AgeGroup::Child));
        assert_eq!(AgeGroup::from_age(18.0), Some(AgeGroup::Child));
        assert_eq!(AgeGroup::from_age(19.0), Some(AgeGroup::YoungAdult));
        assert_eq!(AgeGroup::from_age(35.0), Some(AgeGroup::YoungAdult));
        assert_eq!(AgeGroup::from_age(36.0), Some(AgeGroup::Adult));
        assert_eq!(AgeGroup::from_age(50.0), Some(AgeGroup::Adult));
        assert_eq!(AgeGroup::from_age(65.0), Some(AgeGroup::MiddleAged));
        assert_eq!(AgeGroup::from_age(66.0), Some(AgeGroup::Senior));
        assert_eq!(AgeGroup::from_age(104.0), Some(AgeGroup::Senior));
        assert_eq!(AgeGroup::from_age(-1.0), None);
        assert_eq!(AgeGroup::from_age(f64::NAN), None);
    }

    #[test]
    fn test_age_group_labels_in_order() {
        let labels: Vec<&str> = AgeGroup::ALL.iter().map(|g| g.label()).collect();
        assert_eq!(labels, vec!["0-18", "19-35", "36-50", "51-65", "65+"]);
        assert_eq!(AgeGroup::Senior.index(), 4);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 18856.28 "), Some(18856.28));
        assert_eq!(parse_number("inf"), Some(f64::INFINITY));
        assert!(parse_number("NaN").unwrap().is_nan());
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("$100"), None);
    }
}
