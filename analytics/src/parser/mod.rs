//! CSV loading with encoding and delimiter auto-detection.
//!
//! Produces a [`RawTable`]: the header row plus every data row as strings.
//! No healthcare-specific logic here; typed records are built in
//! [`crate::models`].

use serde::Serialize;
use std::path::Path;

use crate::error::{CsvError, CsvResult};

/// One data row with the 1-based line it started on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawRow {
    pub line: usize,
    pub cells: Vec<String>,
}

/// A CSV file held in memory
#[derive(Debug, Clone, Serialize)]
pub struct RawTable {
    /// Column headers, in file order
    pub headers: Vec<String>,
    /// Data rows, each padded to `headers.len()` cells
    pub rows: Vec<RawRow>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

impl RawTable {
    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.headers.len())
    }

    /// Position of a column by exact header name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(e) => {
                // chardet occasionally calls Latin-1 files UTF-8
                let (text, _, had_errors) = encoding_rs::WINDOWS_1252.decode(bytes);
                if had_errors {
                    return Err(CsvError::Encoding(e.to_string()));
                }
                text.into_owned()
            }
        },
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(enc) => enc.decode(bytes).0.into_owned(),
            None => String::from_utf8_lossy(bytes).into_owned(),
        },
    };

    Ok(decoded.trim_start_matches('\u{feff}').to_string())
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Read a CSV file with auto-detection of encoding and delimiter.
pub fn read_table<P: AsRef<Path>>(path: P) -> CsvResult<RawTable> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| CsvError::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse_bytes_auto(&bytes)
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<RawTable> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);

    let mut table = parse_str(&content, delimiter)?;
    table.encoding = encoding;
    Ok(table)
}

/// Parse CSV text with an explicit delimiter.
///
/// Short rows are padded with empty cells; rows longer than the header
/// are rejected.
pub fn parse_str(content: &str, delimiter: char) -> CsvResult<RawTable> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);

        if record.len() > headers.len() {
            return Err(CsvError::RaggedRow {
                line,
                expected: headers.len(),
                found: record.len(),
            });
        }

        let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
        cells.resize(headers.len(), String::new());
        rows.push(RawRow { line, cells });
    }

    Ok(RawTable {
        headers,
        rows,
        encoding: "utf-8".to_string(),
        delimiter,
    })
}

/// Write a header and rows as comma-delimited CSV, replacing any existing file.
pub fn write_csv<P, H, R>(path: P, headers: &[H], rows: R) -> CsvResult<()>
where
    P: AsRef<Path>,
    H: AsRef<str>,
    R: IntoIterator<Item = Vec<String>>,
{
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record(headers.iter().map(|h| h.as_ref()))?;
    for row in rows {
        writer.write_record(&row)?;
    }
    writer.flush().map_err(|source| CsvError::Io {
        path: path.display().to_string(),
        source,
    })?;

    Ok(())
}
