//! Aligned multi-series point data.
//!
//! A [`PointSeries`] is an ordered list of groups, each an ordered list of points, where every
//! group has the same length: index `i` in any group refers to the same logical x-position.
//! Series are immutable; [`PointSeries::map_groups`] and [`PointSeries::map_points`] return new
//! series.
//!
//! Build one from flat records with [`GroupedSeriesBuilder`], then run it through
//! [`crate::pipeline`] steps.

mod builder;

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{ChartDataError, ChartDataResult};

pub use builder::{GroupKey, GroupedSeriesBuilder, GroupedSeriesConfig, PointComparator};

/// An arbitrary keyed record. Key order is insertion order.
pub type Point = serde_json::Map<String, serde_json::Value>;

/// How stacked values are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackType {
    /// Each point carries its own cumulative value, stacked across groups at the same index.
    Points,
}

/// Which pipeline steps have already run on a series.
///
/// Renderers read this to decide how to interpret point values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preprocess {
    #[serde(default)]
    pub stacked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_type: Option<StackType>,
    #[serde(default)]
    pub normalize_to_percentage: bool,
}

/// Ordered groups of equally many points.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointSeries<P = Point> {
    data: Vec<Vec<P>>,
    preprocess: Preprocess,
}

impl<P> PointSeries<P> {
    /// Fails with [`ChartDataError::InvalidConfiguration`] if the groups differ in length.
    pub fn new(data: Vec<Vec<P>>) -> ChartDataResult<Self> {
        if let Some(first) = data.first() {
            let expected = first.len();
            if let Some((g, group)) = data.iter().enumerate().find(|(_, g)| g.len() != expected) {
                return Err(ChartDataError::invalid_configuration(format!(
                    "group {g} has {} points, expected {expected}",
                    group.len()
                )));
            }
        }
        Ok(Self {
            data,
            preprocess: Preprocess::default(),
        })
    }

    pub fn with_preprocess(mut self, preprocess: Preprocess) -> Self {
        self.preprocess = preprocess;
        self
    }

    pub fn preprocess(&self) -> &Preprocess {
        &self.preprocess
    }

    pub fn data(&self) -> &[Vec<P>] {
        &self.data
    }

    pub fn into_data(self) -> Vec<Vec<P>> {
        self.data
    }

    pub fn group_count(&self) -> usize {
        self.data.len()
    }

    /// Points per group.
    pub fn point_count(&self) -> usize {
        self.data.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.point_count() == 0
    }

    pub fn get(&self, group: usize, point: usize) -> ChartDataResult<&P> {
        let g = self.get_group(group)?;
        g.get(point)
            .ok_or_else(|| ChartDataError::index_out_of_range(point, g.len()))
    }

    pub fn get_group(&self, group: usize) -> ChartDataResult<&[P]> {
        self.data
            .get(group)
            .map(Vec::as_slice)
            .ok_or_else(|| ChartDataError::index_out_of_range(group, self.data.len()))
    }

    /// The point at `point` from every group, in group order.
    pub fn get_point(&self, point: usize) -> ChartDataResult<Vec<&P>> {
        if point >= self.point_count() {
            return Err(ChartDataError::index_out_of_range(point, self.point_count()));
        }
        Ok(self.data.iter().map(|g| &g[point]).collect())
    }

    /// Replace each group with `f(group)`.
    ///
    /// Returned groups must still be of equal length.
    pub fn map_groups<Q, F>(&self, f: F) -> ChartDataResult<PointSeries<Q>>
    where
        F: FnMut(&[P]) -> Vec<Q>,
    {
        let data = self.data.iter().map(|g| g.as_slice()).map(f).collect();
        Ok(PointSeries::new(data)?.with_preprocess(self.preprocess))
    }

    /// Operate across groups one point-index at a time.
    ///
    /// For every index `i`, `f` receives the cross-group slice at `i` and must return exactly one
    /// replacement per group; replacement `g` becomes point `i` of group `g`.
    pub fn map_points<Q, F>(&self, mut f: F) -> ChartDataResult<PointSeries<Q>>
    where
        F: FnMut(&[&P], usize) -> Vec<Q>,
    {
        let groups = self.group_count();
        let points = self.point_count();
        let mut data: Vec<Vec<Q>> = (0..groups).map(|_| Vec::with_capacity(points)).collect();

        for i in 0..points {
            let slice: Vec<&P> = self.data.iter().map(|g| &g[i]).collect();
            let replaced = f(&slice, i);
            if replaced.len() != groups {
                return Err(ChartDataError::invalid_argument(format!(
                    "map_points callback returned {} values at point {i}, expected {groups}",
                    replaced.len()
                )));
            }
            for (group, value) in data.iter_mut().zip(replaced) {
                group.push(value);
            }
        }

        Ok(PointSeries {
            data,
            preprocess: self.preprocess,
        })
    }

    /// Fails with [`ChartDataError::InvalidConfiguration`] unless a stacking step has run.
    pub fn ensure_stacked(&self) -> ChartDataResult<()> {
        if self.preprocess.stacked {
            Ok(())
        } else {
            Err(ChartDataError::invalid_configuration(
                "stacked rendering requested but the series has not been stacked",
            ))
        }
    }
}

/// Three-way comparison of JSON values.
///
/// Numbers compare numerically and strings lexically; values of different kinds order as
/// null < bool < number < string < array < object.
pub fn compare_values(a: &serde_json::Value, b: &serde_json::Value) -> Ordering {
    use serde_json::Value;

    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(f64::NAN), y.as_f64().unwrap_or(f64::NAN));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn grid() -> PointSeries<i32> {
        PointSeries::new(vec![vec![1, 2, 3], vec![10, 20, 30]]).unwrap()
    }

    #[test]
    fn rejects_ragged_groups() {
        let err = PointSeries::new(vec![vec![1, 2], vec![1]]).unwrap_err();
        assert!(err.to_string().contains("group 1 has 1 points, expected 2"));
    }

    #[test]
    fn lookups_and_bounds() {
        let s = grid();
        assert_eq!(*s.get(1, 2).unwrap(), 30);
        assert_eq!(s.get_group(0).unwrap(), &[1, 2, 3]);
        assert_eq!(s.get_point(1).unwrap(), vec![&2, &20]);
        assert!(matches!(s.get(2, 0).unwrap_err(), ChartDataError::IndexOutOfRange { len: 2, .. }));
        assert!(matches!(s.get(0, 3).unwrap_err(), ChartDataError::IndexOutOfRange { len: 3, .. }));
        assert!(s.get_point(3).is_err());
        assert_eq!(s.data()[1], vec![10, 20, 30]);
        assert_eq!(s.into_data(), vec![vec![1, 2, 3], vec![10, 20, 30]]);
    }

    #[test]
    fn map_points_scatters_results_back_into_groups() {
        let s = grid();
        let seen = std::cell::RefCell::new(Vec::new());
        let out = s
            .map_points(|slice, i| {
                seen.borrow_mut().push(i);
                let total: i32 = slice.iter().copied().sum();
                slice.iter().map(|v| (**v, total)).collect()
            })
            .unwrap();

        assert_eq!(*seen.borrow(), vec![0, 1, 2]);
        assert_eq!(out.group_count(), 2);
        assert_eq!(out.point_count(), 3);
        assert_eq!(out.get_group(0).unwrap(), &[(1, 11), (2, 22), (3, 33)]);
        assert_eq!(out.get_group(1).unwrap(), &[(10, 11), (20, 22), (30, 33)]);
    }

    #[test]
    fn map_points_rejects_wrong_arity() {
        let err = grid().map_points(|_, _| vec![0]).unwrap_err();
        assert!(matches!(err, ChartDataError::InvalidArgument { .. }));
    }

    #[test]
    fn map_groups_preserves_preprocess() {
        let meta = Preprocess {
            stacked: true,
            stack_type: Some(StackType::Points),
            normalize_to_percentage: false,
        };
        let s = grid().with_preprocess(meta);
        let out = s.map_groups(|g| g.iter().rev().copied().collect()).unwrap();
        assert_eq!(out.get_group(0).unwrap(), &[3, 2, 1]);
        assert_eq!(*out.preprocess(), meta);
        assert!(out.ensure_stacked().is_ok());
        assert!(grid().ensure_stacked().is_err());
    }

    #[test]
    fn preprocess_serializes_camel_case() {
        let meta = Preprocess {
            stacked: true,
            stack_type: Some(StackType::Points),
            normalize_to_percentage: true,
        };
        assert_eq!(
            serde_json::to_value(meta).unwrap(),
            json!({"stacked": true, "stackType": "points", "normalizeToPercentage": true})
        );
    }

    #[test]
    fn compare_values_orders_numbers_strings_and_kinds() {
        assert_eq!(compare_values(&json!(2), &json!(10)), Ordering::Less);
        assert_eq!(compare_values(&json!("b"), &json!("a")), Ordering::Greater);
        assert_eq!(compare_values(&json!(null), &json!(0)), Ordering::Less);
        assert_eq!(compare_values(&json!(1.0), &json!(1)), Ordering::Equal);
    }
}
