//! CSV ingest and normalization of historical project data.
//!
//! This module is responsible for turning a historical-projects CSV into a
//! clean set of `HistoricalRecord`s that are safe to fit.
//!
//! Expected schema (header names are case-insensitive):
//!
//! ```text
//! id,size,duration_months,m1,m2,...,mN
//! ```
//!
//! `tamano` / `duracion` are accepted as aliases for `size` / `duration_months`.
//! Rows may be ragged: a 6-month project only needs `m1..m6`.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors up front)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Separation of concerns**: no fitting logic here

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{info, warn};

use crate::domain::HistoricalRecord;
use crate::error::AppError;

const SIZE_COLUMNS: [&str; 2] = ["size", "tamano"];
const DURATION_COLUMNS: [&str; 2] = ["duration_months", "duracion"];

/// Summary stats about the records actually used.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub n_records: usize,
    pub size_min: f64,
    pub size_max: f64,
    pub duration_min: u32,
    pub duration_max: u32,
    pub total_defects: f64,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub id: Option<String>,
    pub message: String,
}

/// Ingest output: records + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub records: Vec<HistoricalRecord>,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Column layout resolved from the header row.
#[derive(Debug, Clone)]
struct Schema {
    id: Option<usize>,
    size: usize,
    duration: usize,
    /// Month number (1-based) → column index.
    months: BTreeMap<u32, usize>,
}

/// Load historical records from a CSV file.
pub fn load_historical_records(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open CSV '{}': {e}", path.display())))?;
    let data = read_historical_records(file)?;
    info!(
        path = %path.display(),
        rows_read = data.rows_read,
        rows_used = data.rows_used,
        row_errors = data.row_errors.len(),
        "historical data loaded"
    );
    Ok(data)
}

/// Parse historical records from any CSV reader.
pub fn read_historical_records<R: Read>(input: R) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::io(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let schema = resolve_schema(&headers)?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let id = schema
            .id
            .and_then(|i| record.get(i))
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        match parse_row(&record, &schema, id.clone()) {
            Ok(r) => records.push(r),
            Err(message) => {
                warn!(line, message = %message, "skipping invalid CSV row");
                row_errors.push(RowError { line, id, message });
            }
        }
    }

    let rows_used = records.len();
    let stats = compute_stats(&records)
        .ok_or_else(|| AppError::data_insufficient("No valid rows remain after validation."))?;

    Ok(IngestedData {
        records,
        stats,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn resolve_schema(headers: &StringRecord) -> Result<Schema, AppError> {
    let header_map: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect();

    let find = |names: &[&str]| names.iter().find_map(|n| header_map.get(*n).copied());

    let size = find(&SIZE_COLUMNS).ok_or_else(|| {
        AppError::config("Missing required column: `size` (or `tamano`).")
    })?;
    let duration = find(&DURATION_COLUMNS).ok_or_else(|| {
        AppError::config("Missing required column: `duration_months` (or `duracion`).")
    })?;

    let months: BTreeMap<u32, usize> = header_map
        .iter()
        .filter_map(|(name, &idx)| month_number(name).map(|m| (m, idx)))
        .collect();
    if !months.contains_key(&1) {
        return Err(AppError::config(
            "Missing monthly defect columns: expected `m1`, `m2`, ...",
        ));
    }

    Ok(Schema {
        id: header_map.get("id").copied(),
        size,
        duration,
        months,
    })
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, schema validation will incorrectly
    // report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

/// `m12` → `Some(12)`.
fn month_number(name: &str) -> Option<u32> {
    let digits = name.strip_prefix('m')?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|m| *m >= 1)
}

fn parse_row(record: &StringRecord, schema: &Schema, id: Option<String>) -> Result<HistoricalRecord, String> {
    let size = parse_f64(get_required(record, schema.size, "size")?, "size")?;
    let duration = parse_duration(get_required(record, schema.duration, "duration_months")?)?;

    let mut monthly = Vec::with_capacity(duration as usize);
    for m in 1..=duration {
        let col = schema
            .months
            .get(&m)
            .ok_or_else(|| format!("Duration is {duration} months but there is no `m{m}` column."))?;
        let name = format!("m{m}");
        monthly.push(parse_f64(get_required(record, *col, &name)?, &name)?);
    }

    // Values past the declared duration would break `len == duration`.
    for (&m, &col) in schema.months.range(duration + 1..) {
        if record.get(col).is_some_and(|s| !s.is_empty()) {
            return Err(format!(
                "Value in `m{m}` lies beyond the declared duration of {duration} months."
            ));
        }
    }

    HistoricalRecord::new(id, size, duration, monthly).map_err(|e| e.message().to_string())
}

fn get_required<'a>(record: &'a StringRecord, idx: usize, name: &str) -> Result<&'a str, String> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn parse_f64(s: &str, name: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("Invalid number '{s}' in `{name}`.")),
    }
}

fn parse_duration(s: &str) -> Result<u32, String> {
    let v = parse_f64(s, "duration_months")?;
    if v < 1.0 || v.fract() != 0.0 || v > u32::MAX as f64 {
        return Err(format!("`duration_months` must be a whole number >= 1 (got '{s}')."));
    }
    Ok(v as u32)
}

fn compute_stats(records: &[HistoricalRecord]) -> Option<DatasetStats> {
    if records.is_empty() {
        return None;
    }
    let mut size_min = f64::INFINITY;
    let mut size_max = f64::NEG_INFINITY;
    let mut duration_min = u32::MAX;
    let mut duration_max = 0u32;
    let mut total_defects = 0.0;

    for r in records {
        size_min = size_min.min(r.project_size);
        size_max = size_max.max(r.project_size);
        duration_min = duration_min.min(r.duration_months);
        duration_max = duration_max.max(r.duration_months);
        total_defects += r.total_defects();
    }

    Some(DatasetStats {
        n_records: records.len(),
        size_min,
        size_max,
        duration_min,
        duration_max,
        total_defects,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ragged_rows() {
        let csv = "\u{feff}ID,Tamano,Duracion,m1,m2,m3,m4\n\
                   P1,50000,4,2,5,8,3\n\
                   P2,20000,2,1,4\n";
        let data = read_historical_records(csv.as_bytes()).unwrap();
        assert_eq!(data.rows_read, 2);
        assert_eq!(data.rows_used, 2);
        assert_eq!(data.records[1].defects_per_month, vec![1.0, 4.0]);
        assert_eq!(data.records[0].id.as_deref(), Some("P1"));
        assert_eq!(data.stats.duration_max, 4);
        assert!((data.stats.total_defects - 23.0).abs() < 1e-12);
    }

    #[test]
    fn bad_rows_are_reported_and_skipped() {
        let csv = "id,size,duration_months,m1,m2,m3\n\
                   OK,100,2,1,2\n\
                   NEG,-1,2,1,2\n\
                   FRAC,100,2.5,1,2,3\n\
                   SHORT,100,3,1,2\n\
                   EXTRA,100,1,1,2\n\
                   LONG,100,4,1,2,3\n";
        let data = read_historical_records(csv.as_bytes()).unwrap();
        assert_eq!(data.rows_used, 1);
        let failed: Vec<&str> = data
            .row_errors
            .iter()
            .filter_map(|e| e.id.as_deref())
            .collect();
        assert_eq!(failed, vec!["NEG", "FRAC", "SHORT", "EXTRA", "LONG"]);
        assert_eq!(data.row_errors[0].line, 3);
    }

    #[test]
    fn missing_required_column_is_config_error() {
        let csv = "id,duration_months,m1\nA,1,3\n";
        let err = read_historical_records(csv.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }

    #[test]
    fn no_valid_rows_is_insufficient() {
        let csv = "size,duration_months,m1\n-3,1,3\n";
        let err = read_historical_records(csv.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::DataInsufficient);
    }

    #[test]
    fn month_number_parsing() {
        assert_eq!(month_number("m1"), Some(1));
        assert_eq!(month_number("m12"), Some(12));
        assert_eq!(month_number("m0"), None);
        assert_eq!(month_number("max"), None);
        assert_eq!(month_number("m"), None);
    }
}
