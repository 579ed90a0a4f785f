//! JSON ingestion implementation.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"a":1}, {"a":2}]`
//! - A single JSON object: `{"a":1}`
//! - Newline-delimited JSON (NDJSON): `{"a":1}\n{"a":2}\n`
//!
//! Numbers become [`Scalar::Number`], strings [`Scalar::Text`] and `null` [`Scalar::Null`].
//! Booleans, arrays and nested objects have no scalar form; they are stored as null and reported
//! as [`DataQualityWarning::CoercedToNull`].

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{ChartDataError, ChartDataResult, DataQualityWarning};
use crate::observability::Reporter;
use crate::store::{ChartData, ChartDataOptions};
use crate::types::{ColumnDef, Row, Scalar};

use super::{Declared, into_chart_data};

const OPERATION: &str = "ingest_json";

/// Ingest a JSON file into a [`ChartData`] store.
pub fn ingest_json_from_path(
    path: impl AsRef<Path>,
    defs: &[ColumnDef],
    options: &ChartDataOptions,
) -> ChartDataResult<ChartData> {
    let reporter = Reporter::new(options.observer.clone());
    let result = read_path(path.as_ref(), defs, &reporter);
    reporter.check(OPERATION, result)
}

/// Ingest JSON from an in-memory string into a [`ChartData`] store.
///
/// ```
/// use chart_data::ingestion::json::ingest_json_from_str;
/// use chart_data::store::ChartDataOptions;
/// use chart_data::types::ColumnDef;
///
/// let data = ingest_json_from_str(
///     r#"[{"year": 2000, "gdp": 1.5, "note": "x"}, {"year": 2001, "gdp": 2.5}]"#,
///     &[ColumnDef::new("year"), ColumnDef::new("gdp")],
///     &ChartDataOptions::default(),
/// )
/// .unwrap();
/// assert_eq!(data.row_count(), 2);
/// assert!(data.column("note").is_none());
/// ```
pub fn ingest_json_from_str(input: &str, defs: &[ColumnDef], options: &ChartDataOptions) -> ChartDataResult<ChartData> {
    let reporter = Reporter::new(options.observer.clone());
    let result = read_str(input, defs, &reporter);
    reporter.check(OPERATION, result)
}

/// Convert already-parsed JSON records into rows, keeping only declared keys.
///
/// Every record must be an object. Coerced values are reported to `options.observer`.
pub fn records_to_rows(records: &[Value], defs: &[ColumnDef], options: &ChartDataOptions) -> ChartDataResult<Vec<Row>> {
    let reporter = Reporter::new(options.observer.clone());
    let result = convert_records(records, &Declared::new(defs), &reporter);
    reporter.check(OPERATION, result)
}

pub(super) fn read_path(path: &Path, defs: &[ColumnDef], reporter: &Reporter) -> ChartDataResult<ChartData> {
    let text = fs::read_to_string(path)?;
    read_str(&text, defs, reporter)
}

fn read_str(input: &str, defs: &[ColumnDef], reporter: &Reporter) -> ChartDataResult<ChartData> {
    let records = parse_records(input)?;
    let rows = convert_records(&records, &Declared::new(defs), reporter)?;
    tracing::debug!(records = records.len(), "ingested json");
    into_chart_data(rows, defs, reporter)
}

fn parse_records(input: &str) -> ChartDataResult<Vec<Value>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    // First try parsing as a single JSON value (array or object).
    if let Ok(v) = serde_json::from_str::<Value>(trimmed) {
        return match v {
            Value::Array(items) => Ok(items),
            Value::Object(_) => Ok(vec![v]),
            _ => Err(ChartDataError::invalid_configuration(
                "json must be an object, an array of objects, or NDJSON",
            )),
        };
    }

    // Fall back to NDJSON.
    let mut values = Vec::new();
    for (i, line) in trimmed.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let v = serde_json::from_str::<Value>(line).map_err(|e| {
            ChartDataError::invalid_configuration(format!("invalid ndjson at line {}: {e}", i + 1))
        })?;
        values.push(v);
    }
    Ok(values)
}

fn convert_records(records: &[Value], declared: &Declared<'_>, reporter: &Reporter) -> ChartDataResult<Vec<Row>> {
    let mut rows = Vec::with_capacity(records.len());
    for (idx0, record) in records.iter().enumerate() {
        let row_num = idx0 + 1;
        let obj = record.as_object().ok_or_else(|| {
            ChartDataError::invalid_configuration(format!("record {row_num} is not a json object"))
        })?;

        let mut row = Row::with_capacity(obj.len());
        for (key, value) in obj.iter().filter(|(k, _)| declared.keeps(k)) {
            let cell = Scalar::from_json(value).unwrap_or_else(|| {
                reporter.warn(
                    OPERATION,
                    DataQualityWarning::CoercedToNull {
                        row: row_num,
                        column: key.clone(),
                    },
                );
                Scalar::Null
            });
            row.insert(key.as_str(), cell);
        }
        rows.push(row);
    }
    Ok(rows)
}
