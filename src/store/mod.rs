//! The immutable chart data store.
//!
//! [`ChartData`] holds ordered [`Row`]s and the resolved [`Columns`] they were declared with.
//! Nothing is ever mutated in place: [`ChartData::map_rows`], [`ChartData::update_rows`],
//! [`ChartData::filter_rows`] and the frame queries all return new stores that share the column
//! metadata of their source.
//!
//! Derived values (aggregates, unique values, frame groupings) are pure functions of the rows and
//! columns, so each store memoizes them lazily, once per operation signature.
//!
//! ```rust
//! use chart_data::store::ChartData;
//! use chart_data::types::{ColumnDef, Row, Scalar};
//!
//! let data = ChartData::new(
//!     vec![
//!         Row::new().with("year", 2000).with("country", "a").with("gdp", 1.0),
//!         Row::new().with("year", 2000).with("country", "b").with("gdp", 3.0),
//!         Row::new().with("year", 2001).with("country", "a").with("gdp", 2.0),
//!         Row::new().with("year", 2001).with("country", "b").with("gdp", 5.0),
//!     ],
//!     &[ColumnDef::new("year").continuous(false), ColumnDef::new("country"), ColumnDef::new("gdp")],
//! )
//! .unwrap();
//!
//! assert_eq!(data.max("gdp").unwrap(), Some(5.0));
//! assert_eq!(data.make_frames("year").unwrap().len(), 2);
//!
//! let halfway = data.frame_at_index_interpolated("year", "country", 0.5).unwrap();
//! assert_eq!(halfway.get_column_data("gdp").unwrap(), vec![Scalar::Number(1.5), Scalar::Number(4.0)]);
//! ```

mod aggregate;
mod cache;
mod frames;
mod interpolate;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::{ChartDataError, ChartDataResult};
use crate::observability::{ChartDataObserver, Reporter};
use crate::types::{Column, ColumnDef, Columns, NULL, Row, Scalar};

pub use aggregate::{AggregateOp, IntoColumns};
pub use frames::{Frame, Frames};
pub use interpolate::lerp;

use cache::{MemoCache, MemoKey};

/// Options controlling store construction.
///
/// Use [`Default`] for common cases.
#[derive(Clone, Default)]
pub struct ChartDataOptions {
    /// Optional observer receiving every error and data-quality warning.
    pub observer: Option<Arc<dyn ChartDataObserver>>,
}

impl fmt::Debug for ChartDataOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartDataOptions")
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

/// Immutable table of rows plus ordered column metadata.
///
/// Cloning is cheap and shares rows, columns and the memo cache.
#[derive(Clone)]
pub struct ChartData {
    rows: Arc<[Row]>,
    columns: Arc<Columns>,
    cache: Arc<MemoCache>,
    reporter: Reporter,
}

impl ChartData {
    /// Create a store from rows and column declarations.
    ///
    /// Continuity is inferred for every declaration that does not state it. Fails with
    /// [`ChartDataError::InvalidConfiguration`] on duplicate column keys.
    pub fn new(rows: Vec<Row>, defs: &[ColumnDef]) -> ChartDataResult<Self> {
        Self::with_options(rows, defs, &ChartDataOptions::default())
    }

    /// Like [`ChartData::new`], attaching an observer for diagnostics.
    pub fn with_options(rows: Vec<Row>, defs: &[ColumnDef], options: &ChartDataOptions) -> ChartDataResult<Self> {
        let reporter = Reporter::new(options.observer.clone());
        let result = Self::assemble(rows, defs, reporter.clone());
        reporter.check("new", result)
    }

    /// Resolve columns and build the store without reporting failures.
    pub(crate) fn assemble(rows: Vec<Row>, defs: &[ColumnDef], reporter: Reporter) -> ChartDataResult<Self> {
        let columns = Columns::resolve(defs, &rows)?;
        tracing::debug!(rows = rows.len(), columns = columns.len(), "chart data created");
        Ok(Self::from_parts(rows, Arc::new(columns), reporter))
    }

    fn from_parts(rows: Vec<Row>, columns: Arc<Columns>, reporter: Reporter) -> Self {
        Self {
            rows: rows.into(),
            columns,
            cache: Arc::new(MemoCache::default()),
            reporter,
        }
    }

    /// A new store over `rows` sharing this store's columns and observer.
    fn derive(&self, rows: Vec<Row>) -> Self {
        Self::from_parts(rows, Arc::clone(&self.columns), self.reporter.clone())
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    pub fn column(&self, key: &str) -> Option<&Column> {
        self.columns.get(key)
    }

    /// Number of rows in the store.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The observer this store reports to, if any.
    pub fn observer(&self) -> Option<&Arc<dyn ChartDataObserver>> {
        self.reporter.observer()
    }

    /// Values of `column` in row order. Rows that do not carry the key yield [`Scalar::Null`],
    /// so the result always has [`Self::row_count`] entries.
    pub fn get_column_data(&self, column: &str) -> ChartDataResult<Vec<Scalar>> {
        let result = self.require_column(column).map(|_| self.column_values(column).cloned().collect());
        self.reporter.check("get_column_data", result)
    }

    /// Distinct values of `column` in order of first appearance.
    pub fn get_unique_values(&self, column: &str) -> ChartDataResult<Arc<[Scalar]>> {
        let result = self.require_column(column).map(|_| self.unique_values(column));
        self.reporter.check("get_unique_values", result)
    }

    /// A new store with the rows produced by `f` from a copy of this store's rows.
    ///
    /// Column metadata is shared unchanged; continuity is not re-inferred.
    pub fn update_rows<F>(&self, f: F) -> Self
    where
        F: FnOnce(Vec<Row>) -> Vec<Row>,
    {
        self.derive(f(self.rows.to_vec()))
    }

    /// A new store obtained by applying `mapper` to every row.
    pub fn map_rows<F>(&self, mapper: F) -> Self
    where
        F: FnMut(&Row) -> Row,
    {
        self.derive(self.rows.iter().map(mapper).collect())
    }

    /// A new store containing only rows that match `predicate`.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&Row) -> bool,
    {
        self.derive(self.rows.iter().filter(|row| predicate(row)).cloned().collect())
    }

    fn require_column(&self, column: &str) -> ChartDataResult<&Column> {
        self.columns
            .get(column)
            .ok_or_else(|| ChartDataError::unknown_column(column))
    }

    fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a Scalar> + 'a {
        self.rows
            .iter()
            .map(move |row| row.get(column).unwrap_or(&NULL))
    }

    fn unique_values(&self, column: &str) -> Arc<[Scalar]> {
        self.cache.get_or_insert_with(MemoKey::Unique(column.to_owned()), || {
            let mut seen = HashSet::new();
            self.column_values(column)
                .filter(|v| seen.insert(*v))
                .cloned()
                .collect::<Vec<_>>()
                .into()
        })
    }

    #[cfg(test)]
    pub(crate) fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

impl fmt::Debug for ChartData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartData")
            .field("rows", &self.rows.len())
            .field("columns", &self.columns.keys().collect::<Vec<_>>())
            .field("reporter", &self.reporter)
            .finish()
    }
}

impl PartialEq for ChartData {
    /// Stores are equal when their rows and columns are equal; caches and observers are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows && self.columns == other.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ChartData {
        ChartData::new(
            vec![
                Row::new().with("a", 1).with("b", "x"),
                Row::new().with("a", 2).with("b", "y"),
                Row::new().with("b", "x"),
            ],
            &[ColumnDef::new("a"), ColumnDef::new("b"), ColumnDef::new("c")],
        )
        .unwrap()
    }

    #[test]
    fn infers_continuity_per_column() {
        let ds = sample();
        assert!(ds.column("a").unwrap().is_continuous);
        assert!(!ds.column("b").unwrap().is_continuous);
        assert!(!ds.column("c").unwrap().is_continuous);
    }

    #[test]
    fn column_data_has_one_value_per_row() {
        let ds = sample();
        for key in ["a", "b", "c"] {
            assert_eq!(ds.get_column_data(key).unwrap().len(), ds.row_count());
        }
        assert_eq!(
            ds.get_column_data("a").unwrap(),
            vec![Scalar::Number(1.0), Scalar::Number(2.0), Scalar::Null]
        );
    }

    #[test]
    fn unknown_column_is_reported_and_store_stays_usable() {
        let ds = sample();
        let err = ds.get_column_data("missing").unwrap_err();
        assert!(matches!(err, ChartDataError::UnknownColumn { ref column } if column == "missing"));
        assert!(ds.get_unique_values("b").is_ok());
    }

    #[test]
    fn unique_values_keep_first_appearance_order() {
        let ds = sample();
        assert_eq!(
            &*ds.get_unique_values("b").unwrap(),
            &[Scalar::from("x"), Scalar::from("y")]
        );
        assert_eq!(&*ds.get_unique_values("c").unwrap(), &[Scalar::Null]);
    }

    #[test]
    fn unique_values_are_memoized() {
        let ds = sample();
        let first = ds.get_unique_values("b").unwrap();
        let second = ds.get_unique_values("b").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(ds.cached_entries(), 1);
    }

    #[test]
    fn transforms_return_new_stores_and_leave_source_unchanged() {
        let ds = sample();
        let mapped = ds.map_rows(|row| {
            let mut out = row.clone();
            if let Some(Scalar::Number(v)) = row.get("a") {
                out.insert("a", v * 10.0);
            }
            out
        });
        assert_eq!(
            mapped.get_column_data("a").unwrap(),
            vec![Scalar::Number(10.0), Scalar::Number(20.0), Scalar::Null]
        );
        assert_eq!(ds.get_column_data("a").unwrap()[0], Scalar::Number(1.0));

        let updated = ds.update_rows(|mut rows| {
            rows.reverse();
            rows
        });
        assert_eq!(updated.rows()[0], ds.rows()[2]);
        assert_eq!(updated.columns(), ds.columns());

        let filtered = ds.filter_rows(|row| row.get("b") == Some(&Scalar::from("x")));
        assert_eq!(filtered.row_count(), 2);
        assert_eq!(ds.row_count(), 3);
    }

    #[test]
    fn derived_stores_do_not_share_cached_values() {
        let ds = sample();
        let _ = ds.get_unique_values("b").unwrap();
        let filtered = ds.filter_rows(|row| row.get("b") == Some(&Scalar::from("y")));
        assert_eq!(&*filtered.get_unique_values("b").unwrap(), &[Scalar::from("y")]);
    }
}
