//! Memoized numeric aggregation over one or more columns.

use crate::error::ChartDataResult;
use crate::types::Scalar;

use super::ChartData;
use super::cache::MemoKey;

/// Built-in aggregations.
///
/// All of them operate on the union of numeric values across the named columns; nulls, strings
/// and `NaN` are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateOp {
    Min,
    Max,
    /// Sum of values; `0` when nothing contributes.
    Sum,
    /// Arithmetic mean.
    Average,
    /// Middle value; mean of the two middle values for an even count.
    Median,
}

impl AggregateOp {
    pub fn name(self) -> &'static str {
        match self {
            AggregateOp::Min => "min",
            AggregateOp::Max => "max",
            AggregateOp::Sum => "sum",
            AggregateOp::Average => "average",
            AggregateOp::Median => "median",
        }
    }

    /// Apply the aggregation. A `NaN` result collapses to `None`, the same as no data.
    fn apply(self, mut values: Vec<f64>) -> Option<f64> {
        let out = match self {
            AggregateOp::Sum => values.iter().sum(),
            _ if values.is_empty() => return None,
            AggregateOp::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            AggregateOp::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            AggregateOp::Average => {
                let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
                let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                // rounding can push the mean just past the extremes
                mean.clamp(lo, hi)
            }
            AggregateOp::Median => {
                values.sort_by(f64::total_cmp);
                let mid = values.len() / 2;
                if values.len() % 2 == 0 {
                    (values[mid - 1] + values[mid]) / 2.0
                } else {
                    values[mid]
                }
            }
        };
        (!out.is_nan()).then_some(out)
    }
}

/// Conversion for aggregate arguments: one column key or several.
pub trait IntoColumns {
    fn into_columns(self) -> Vec<String>;
}

impl IntoColumns for &str {
    fn into_columns(self) -> Vec<String> {
        vec![self.to_owned()]
    }
}

impl IntoColumns for String {
    fn into_columns(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoColumns for &[&str] {
    fn into_columns(self) -> Vec<String> {
        self.iter().map(|s| (*s).to_owned()).collect()
    }
}

impl<const N: usize> IntoColumns for [&str; N] {
    fn into_columns(self) -> Vec<String> {
        self.iter().map(|s| (*s).to_owned()).collect()
    }
}

impl IntoColumns for &[String] {
    fn into_columns(self) -> Vec<String> {
        self.to_vec()
    }
}

impl IntoColumns for Vec<String> {
    fn into_columns(self) -> Vec<String> {
        self
    }
}

impl IntoColumns for Vec<&str> {
    fn into_columns(self) -> Vec<String> {
        self.into_iter().map(str::to_owned).collect()
    }
}

impl ChartData {
    /// Run `op` over the union of values in `columns`.
    ///
    /// Every named column must be declared. Results are memoized per operation and sorted,
    /// de-duplicated column list, so `["supply", "demand"]` and `["demand", "supply"]` share an
    /// entry.
    pub fn aggregate(&self, op: AggregateOp, columns: impl IntoColumns) -> ChartDataResult<Option<f64>> {
        let result = self.aggregate_impl(op, columns.into_columns());
        self.reporter.check(op.name(), result)
    }

    pub fn min(&self, columns: impl IntoColumns) -> ChartDataResult<Option<f64>> {
        self.aggregate(AggregateOp::Min, columns)
    }

    pub fn max(&self, columns: impl IntoColumns) -> ChartDataResult<Option<f64>> {
        self.aggregate(AggregateOp::Max, columns)
    }

    /// Sum of the numeric values; `Some(0.0)` when there are none.
    pub fn sum(&self, columns: impl IntoColumns) -> ChartDataResult<Option<f64>> {
        self.aggregate(AggregateOp::Sum, columns)
    }

    pub fn average(&self, columns: impl IntoColumns) -> ChartDataResult<Option<f64>> {
        self.aggregate(AggregateOp::Average, columns)
    }

    pub fn median(&self, columns: impl IntoColumns) -> ChartDataResult<Option<f64>> {
        self.aggregate(AggregateOp::Median, columns)
    }

    fn aggregate_impl(&self, op: AggregateOp, mut columns: Vec<String>) -> ChartDataResult<Option<f64>> {
        for column in &columns {
            self.require_column(column)?;
        }
        columns.sort();
        columns.dedup();

        let key = MemoKey::Aggregate(op, columns.clone());
        Ok(self.cache.get_or_insert_with(key, || {
            let values = columns
                .iter()
                .flat_map(|c| self.column_values(c))
                .filter_map(Scalar::as_number)
                .filter(|n| !n.is_nan())
                .collect();
            op.apply(values)
        }))
    }
}
