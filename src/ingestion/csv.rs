//! CSV ingestion implementation.

use std::path::Path;

use crate::error::{ChartDataError, ChartDataResult};
use crate::observability::Reporter;
use crate::store::{ChartData, ChartDataOptions};
use crate::types::{ColumnDef, Row, Scalar};

use super::{Declared, into_chart_data};

const OPERATION: &str = "ingest_csv";

/// Ingest a CSV file into a [`ChartData`] store.
///
/// Rules:
///
/// - CSV must have headers.
/// - Every declared column must be a header (order can differ); with no declarations every
///   header becomes a column.
/// - Empty cells are null, cells that parse as a finite number are numbers, everything else is
///   text.
pub fn ingest_csv_from_path(
    path: impl AsRef<Path>,
    defs: &[ColumnDef],
    options: &ChartDataOptions,
) -> ChartDataResult<ChartData> {
    let reporter = Reporter::new(options.observer.clone());
    let result = read_path(path.as_ref(), defs, &reporter);
    reporter.check(OPERATION, result)
}

/// Ingest CSV text into a [`ChartData`] store.
///
/// ```
/// use chart_data::ingestion::csv::ingest_csv_from_str;
/// use chart_data::store::ChartDataOptions;
/// use chart_data::types::Scalar;
///
/// let data = ingest_csv_from_str("year,country\n2000,a\n2001,\n", &[], &ChartDataOptions::default()).unwrap();
/// assert_eq!(data.get_column_data("country").unwrap(), vec![Scalar::from("a"), Scalar::Null]);
/// assert!(data.column("year").unwrap().is_continuous);
/// ```
pub fn ingest_csv_from_str(input: &str, defs: &[ColumnDef], options: &ChartDataOptions) -> ChartDataResult<ChartData> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes());
    ingest_csv_from_reader(&mut rdr, defs, options)
}

/// Ingest CSV data from an existing CSV reader.
pub fn ingest_csv_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    defs: &[ColumnDef],
    options: &ChartDataOptions,
) -> ChartDataResult<ChartData> {
    let reporter = Reporter::new(options.observer.clone());
    let result = read_records(rdr, defs, &reporter);
    reporter.check(OPERATION, result)
}

pub(super) fn read_path(path: &Path, defs: &[ColumnDef], reporter: &Reporter) -> ChartDataResult<ChartData> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    read_records(&mut rdr, defs, reporter)
}

fn read_records<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    defs: &[ColumnDef],
    reporter: &Reporter,
) -> ChartDataResult<ChartData> {
    let headers = rdr.headers()?.clone();

    for def in defs {
        if !headers.iter().any(|h| h == def.key) {
            return Err(ChartDataError::invalid_configuration(format!(
                "missing declared column '{}'. headers={:?}",
                def.key,
                headers.iter().collect::<Vec<_>>()
            )));
        }
    }

    let declared = Declared::new(defs);
    let kept: Vec<(usize, &str)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| declared.keeps(h))
        .collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let row: Row = kept
            .iter()
            .map(|&(idx, header)| (header, parse_cell(record.get(idx).unwrap_or(""))))
            .collect();
        rows.push(row);
    }

    tracing::debug!(rows = rows.len(), columns = kept.len(), "ingested csv");
    into_chart_data(rows, defs, reporter)
}

fn parse_cell(raw: &str) -> Scalar {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Scalar::Null;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => Scalar::Number(n),
        _ => Scalar::Text(trimmed.to_owned()),
    }
}
