//! `chart-data` is the data layer behind a charting library: an immutable table of rows with
//! declared columns ([`store::ChartData`]) and a grouped point-series engine
//! ([`series::PointSeries`]) for multi-series charts.
//!
//! ## The store
//!
//! A [`store::ChartData`] is built from rows plus [`types::ColumnDef`] declarations. Continuity
//! (whether a column is numeric and should interpolate) is inferred when not declared. Every
//! query is a pure function of the store, and derived values are memoized per store:
//!
//! - aggregates: [`store::ChartData::min`], `max`, `sum`, `average`, `median`
//! - [`store::ChartData::get_column_data`] and [`store::ChartData::get_unique_values`]
//! - temporal frames: [`store::ChartData::make_frames`] and [`store::ChartData::frame_at_index`]
//! - [`store::ChartData::frame_at_index_interpolated`] for animating between frames
//!
//! ```rust
//! use chart_data::store::ChartData;
//! use chart_data::types::{ColumnDef, Row};
//!
//! let data = ChartData::new(
//!     vec![
//!         Row::new().with("year", 2000).with("demand", 3).with("supply", 9),
//!         Row::new().with("year", 2001).with("demand", 4).with("supply", 1),
//!     ],
//!     &[ColumnDef::new("year"), ColumnDef::new("demand"), ColumnDef::new("supply")],
//! )
//! .unwrap();
//!
//! assert_eq!(data.min(["demand", "supply"]).unwrap(), Some(1.0));
//! assert_eq!(data.sum("demand").unwrap(), Some(7.0));
//! assert!(data.get_column_data("nope").is_err());
//! ```
//!
//! ## Grouped point series
//!
//! [`series::GroupedSeriesBuilder`] turns flat records into equal-length groups aligned on a
//! shared x-axis, synthesizing points for missing `(group, x)` combinations. Steps in
//! [`pipeline`] (stacking, percentage normalization) transform the result.
//!
//! ```rust
//! use chart_data::pipeline::{Pipeline, stack};
//! use chart_data::series::GroupedSeriesBuilder;
//! use serde_json::json;
//!
//! let records: Vec<_> = [
//!     json!({"x": 0, "g": "a", "v": 1}),
//!     json!({"x": 1, "g": "b", "v": 2}),
//! ]
//! .into_iter()
//! .filter_map(|v| v.as_object().cloned())
//! .collect();
//!
//! let series = GroupedSeriesBuilder::new("x", "g").build(&records).unwrap();
//! assert_eq!((series.group_count(), series.point_count()), (2, 2));
//!
//! let stacked = Pipeline::new().step(stack("v")).run(series).unwrap();
//! assert!(stacked.ensure_stacked().is_ok());
//! ```
//!
//! ## Ingestion
//!
//! [`ingestion::ingest_from_path`] loads CSV or JSON files (format detected by extension) into a
//! store, keeping only the declared columns.
//!
//! ## Diagnostics
//!
//! Every failure is returned as a [`ChartDataError`]. Failures and non-fatal
//! [`error::DataQualityWarning`]s are also logged through `tracing` and reported to an optional
//! [`observability::ChartDataObserver`].
//!
//! ## Modules
//!
//! - [`store`]: the immutable chart data store
//! - [`series`]: grouped point series and the builder that produces them
//! - [`pipeline`]: preprocessing steps over point series
//! - [`ingestion`]: CSV/JSON loaders
//! - [`types`]: scalars, rows and column metadata
//! - [`observability`]: observer interface and severities
//! - [`error`]: error and warning types

pub mod error;
pub mod ingestion;
pub mod observability;
pub mod pipeline;
pub mod series;
pub mod store;
pub mod types;

pub use error::{ChartDataError, ChartDataResult};
pub use store::ChartData;
