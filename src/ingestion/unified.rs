//! Unified ingestion entrypoint.
//!
//! Most callers should use [`ingest_from_path`], which loads a file into a [`ChartData`] store
//! using the provided column declarations.
//!
//! - If [`IngestionOptions::format`] is `None`, the ingestion format is inferred from the file
//!   extension.
//! - If a [`ChartDataObserver`] is provided, failures and data-quality warnings are reported to
//!   it, and the resulting store keeps reporting to it.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{ChartDataError, ChartDataResult};
use crate::observability::{ChartDataObserver, Reporter};
use crate::store::ChartData;
use crate::types::ColumnDef;

use super::{csv, json};

/// Supported ingestion formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionFormat {
    /// Comma-separated values.
    Csv,
    /// JSON array-of-objects, single object or NDJSON.
    Json,
}

impl IngestionFormat {
    /// Parse an ingestion format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" | "ndjson" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Options controlling unified ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone, Default)]
pub struct IngestionOptions {
    /// If `None`, auto-detect format from file extension.
    pub format: Option<IngestionFormat>,
    /// Optional observer for diagnostics, carried over to the ingested store.
    pub observer: Option<Arc<dyn ChartDataObserver>>,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("format", &self.format)
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

/// Unified ingestion entry point for path-based sources.
///
/// # Examples
///
/// ## Auto-detect by extension
///
/// ```no_run
/// use chart_data::ingestion::{ingest_from_path, IngestionOptions};
/// use chart_data::types::ColumnDef;
///
/// # fn main() -> Result<(), chart_data::ChartDataError> {
/// let data = ingest_from_path(
///     "gdp.csv",
///     &[ColumnDef::new("year").continuous(false), ColumnDef::new("country"), ColumnDef::new("gdp")],
///     &IngestionOptions::default(),
/// )?;
/// println!("rows={}", data.row_count());
/// # Ok(())
/// # }
/// ```
///
/// ## Force a format and observe diagnostics
///
/// ```no_run
/// use std::sync::Arc;
///
/// use chart_data::ingestion::{ingest_from_path, IngestionFormat, IngestionOptions};
/// use chart_data::observability::TracingObserver;
///
/// # fn main() -> Result<(), chart_data::ChartDataError> {
/// let opts = IngestionOptions {
///     format: Some(IngestionFormat::Json),
///     observer: Some(Arc::new(TracingObserver)),
/// };
///
/// // Useful when a file has no extension or you want to override inference.
/// let data = ingest_from_path("export", &[], &opts)?;
/// println!("columns={}", data.columns().len());
/// # Ok(())
/// # }
/// ```
pub fn ingest_from_path(
    path: impl AsRef<Path>,
    defs: &[ColumnDef],
    options: &IngestionOptions,
) -> ChartDataResult<ChartData> {
    let path = path.as_ref();
    let reporter = Reporter::new(options.observer.clone());

    let result = options
        .format
        .map_or_else(|| infer_format_from_path(path), Ok)
        .and_then(|format| {
            tracing::debug!(path = %path.display(), ?format, "ingesting");
            match format {
                IngestionFormat::Csv => csv::read_path(path, defs, &reporter),
                IngestionFormat::Json => json::read_path(path, defs, &reporter),
            }
        });

    reporter.check("ingest_from_path", result)
}

fn infer_format_from_path(path: &Path) -> ChartDataResult<IngestionFormat> {
    let ext = path.extension().and_then(|s| s.to_str()).ok_or_else(|| {
        ChartDataError::invalid_configuration(format!(
            "cannot infer format: path has no extension ({})",
            path.display()
        ))
    })?;

    IngestionFormat::from_extension(ext).ok_or_else(|| {
        ChartDataError::invalid_configuration(format!(
            "cannot infer format from extension '{ext}' for path ({})",
            path.display()
        ))
    })
}
