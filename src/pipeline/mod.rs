//! Preprocessing steps for [`PointSeries`].
//!
//! A step is a pure function from one series to another. Steps are configured up front
//! (e.g. [`normalize_to_percentage`] takes the value key) and composed with [`Pipeline`]:
//!
//! ```rust
//! use chart_data::pipeline::{normalize_to_percentage, Pipeline};
//! use chart_data::series::{Point, PointSeries};
//! use serde_json::json;
//!
//! let obj = |v: serde_json::Value| v.as_object().cloned().unwrap_or_default();
//! let series: PointSeries<Point> = PointSeries::new(vec![
//!     vec![obj(json!({"v": 1}))],
//!     vec![obj(json!({"v": 3}))],
//! ])
//! .unwrap();
//!
//! let out = Pipeline::new().step(normalize_to_percentage("v")).run(series).unwrap();
//! assert_eq!(out.get(1, 0).unwrap()["v"], json!(1.0));
//! assert!(out.preprocess().normalize_to_percentage);
//! ```

mod percentage;
mod stack;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::ChartDataResult;
use crate::series::{Point, PointSeries};

pub use percentage::normalize_to_percentage;
pub use stack::stack;

/// Side-channel field holding a point's value before stacking.
pub const ORIGINAL_VALUE_KEY: &str = "__originalValue";
/// Side-channel field holding the un-stacked share of the slice total.
pub const PERCENTAGE_KEY: &str = "__percentage";
/// Side-channel field holding the lower bound of a stacked point.
pub const STACK_START_KEY: &str = "__stackStart";

/// A configured preprocessing step.
pub type SeriesStep = Arc<dyn Fn(PointSeries<Point>) -> ChartDataResult<PointSeries<Point>> + Send + Sync>;

/// An ordered list of steps applied left to right.
#[derive(Clone, Default)]
pub struct Pipeline {
    steps: Vec<SeriesStep>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step.
    pub fn step<F>(mut self, step: F) -> Self
    where
        F: Fn(PointSeries<Point>) -> ChartDataResult<PointSeries<Point>> + Send + Sync + 'static,
    {
        self.steps.push(Arc::new(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step in order, stopping at the first error.
    pub fn run(&self, series: PointSeries<Point>) -> ChartDataResult<PointSeries<Point>> {
        self.steps.iter().try_fold(series, |acc, step| step(acc))
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("steps_len", &self.steps.len())
            .finish()
    }
}

/// Numeric value of `key`; missing and non-numeric values count as zero.
fn numeric(point: &Point, key: &str) -> f64 {
    point
        .get(key)
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

fn number(n: f64) -> Value {
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Replace `key` with a stacked value, keeping the original and the lower bound alongside.
fn write_stacked(point: &Point, key: &str, start: f64, end: f64) -> Point {
    let mut out = point.clone();
    let original = out.get(key).cloned().unwrap_or(Value::Null);
    out.insert(ORIGINAL_VALUE_KEY.to_owned(), original);
    out.insert(STACK_START_KEY.to_owned(), number(start));
    out.insert(key.to_owned(), number(end));
    out
}
