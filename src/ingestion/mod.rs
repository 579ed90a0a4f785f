//! Loading rows into a [`ChartData`] store from files and strings.
//!
//! Most callers should use [`ingest_from_path`] (from [`unified`]) which:
//!
//! - auto-detects format by file extension (or you can override via [`IngestionOptions`])
//! - builds an immutable [`ChartData`] from the declared columns
//! - reports failures and data-quality warnings to the configured observer
//!
//! Format-specific functions are also available under:
//! - [`csv`]
//! - [`json`]
//!
//! Both formats take column declarations. Only declared keys are kept in the ingested rows; an
//! empty declaration slice declares every key, in order of first appearance.

pub mod csv;
pub mod json;
pub mod unified;

use std::collections::HashSet;

use crate::error::ChartDataResult;
use crate::observability::Reporter;
use crate::store::ChartData;
use crate::types::{ColumnDef, Row};

pub use unified::{IngestionFormat, IngestionOptions, ingest_from_path};

/// Which source keys survive ingestion.
struct Declared<'a> {
    keys: Option<HashSet<&'a str>>,
}

impl<'a> Declared<'a> {
    fn new(defs: &'a [ColumnDef]) -> Self {
        let keys = (!defs.is_empty()).then(|| defs.iter().map(|d| d.key.as_str()).collect());
        Self { keys }
    }

    fn keeps(&self, key: &str) -> bool {
        self.keys.as_ref().is_none_or(|keys| keys.contains(key))
    }
}

/// Build the store, declaring every key seen when `defs` is empty.
fn into_chart_data(rows: Vec<Row>, defs: &[ColumnDef], reporter: &Reporter) -> ChartDataResult<ChartData> {
    if !defs.is_empty() {
        return ChartData::assemble(rows, defs, reporter.clone());
    }

    let mut seen = HashSet::new();
    let inferred: Vec<ColumnDef> = rows
        .iter()
        .flat_map(Row::keys)
        .filter(|k| seen.insert(*k))
        .map(ColumnDef::new)
        .collect();
    ChartData::assemble(rows, &inferred, reporter.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_declarations_keep_every_key() {
        let declared = Declared::new(&[]);
        assert!(declared.keeps("anything"));
    }

    #[test]
    fn declarations_filter_keys() {
        let defs = [ColumnDef::new("a")];
        let declared = Declared::new(&defs);
        assert!(declared.keeps("a"));
        assert!(!declared.keeps("b"));
    }

    #[test]
    fn inferred_columns_follow_first_appearance() {
        let rows = vec![
            Row::new().with("b", 1).with("a", "x"),
            Row::new().with("c", 2).with("b", 3),
        ];
        let data = into_chart_data(rows, &[], &Reporter::default()).unwrap();
        assert_eq!(data.columns().keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);
    }
}
