//! Build aligned [`PointSeries`] from flat, sparse records.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ChartDataError, ChartDataResult};
use crate::types::canonical_bits;

use super::{Point, PointSeries, compare_values};

/// Custom ordering for the points of each group.
pub type PointComparator = Arc<dyn Fn(&Point, &Point) -> Ordering + Send + Sync>;

/// One field, or an ordered list of fields, whose combined value identifies a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupKey {
    Single(String),
    Many(Vec<String>),
}

impl GroupKey {
    pub fn keys(&self) -> &[String] {
        match self {
            GroupKey::Single(k) => std::slice::from_ref(k),
            GroupKey::Many(ks) => ks,
        }
    }
}

impl From<&str> for GroupKey {
    fn from(key: &str) -> Self {
        GroupKey::Single(key.to_owned())
    }
}

impl From<String> for GroupKey {
    fn from(key: String) -> Self {
        GroupKey::Single(key)
    }
}

impl From<Vec<&str>> for GroupKey {
    fn from(keys: Vec<&str>) -> Self {
        GroupKey::Many(keys.into_iter().map(str::to_owned).collect())
    }
}

impl<const N: usize> From<[&str; N]> for GroupKey {
    fn from(keys: [&str; N]) -> Self {
        GroupKey::Many(keys.iter().map(|k| (*k).to_owned()).collect())
    }
}

/// Declarative form of a [`GroupedSeriesBuilder`].
///
/// ```
/// use chart_data::series::{GroupKey, GroupedSeriesConfig};
///
/// let cfg: GroupedSeriesConfig =
///     serde_json::from_str(r#"{"pointKey":"x","groupKey":["a","b"],"defaultPoint":{"v":0}}"#).unwrap();
/// assert_eq!(cfg.group_key, GroupKey::Many(vec!["a".to_string(), "b".to_string()]));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedSeriesConfig {
    pub point_key: String,
    pub group_key: GroupKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_point: Option<Point>,
}

/// Groups flat records into a [`PointSeries`] with one point per distinct `point_key` value in
/// every group.
///
/// 1. The distinct `point_key` values across all records, in first-seen order, form the
///    canonical x-axis.
/// 2. Records are partitioned by the combined value of the `group_key` fields; groups keep
///    first-seen order.
/// 3. Each group gets one point per canonical x-value: the default point, overlaid with the
///    group's key fields and the x-value, overlaid with every record of the group at that
///    x-value (later records win field by field).
/// 4. Points are sorted with the comparator (ascending by `point_key` by default).
///
/// ```
/// use chart_data::series::GroupedSeriesBuilder;
/// use serde_json::json;
///
/// let records: Vec<_> = [
///     json!({"type": "foo", "x": 0, "v": 1}),
///     json!({"type": "foo", "x": 1, "v": 1}),
///     json!({"type": "bar", "x": 0, "v": 2}),
/// ]
/// .into_iter()
/// .filter_map(|v| v.as_object().cloned())
/// .collect();
///
/// let series = GroupedSeriesBuilder::new("x", "type")
///     .with_default_point(json!({"v": 0}).as_object().cloned().unwrap_or_default())
///     .build(&records)
///     .unwrap();
///
/// let bar = series.get_group(1).unwrap();
/// assert_eq!(serde_json::Value::Object(bar[1].clone()), json!({"type": "bar", "x": 1, "v": 0}));
/// ```
#[derive(Clone)]
pub struct GroupedSeriesBuilder {
    point_key: String,
    group_key: GroupKey,
    default_point: Point,
    comparator: Option<PointComparator>,
}

impl GroupedSeriesBuilder {
    pub fn new(point_key: impl Into<String>, group_key: impl Into<GroupKey>) -> Self {
        Self {
            point_key: point_key.into(),
            group_key: group_key.into(),
            default_point: Point::new(),
            comparator: None,
        }
    }

    pub fn from_config(config: GroupedSeriesConfig) -> Self {
        Self {
            point_key: config.point_key,
            group_key: config.group_key,
            default_point: config.default_point.unwrap_or_default(),
            comparator: None,
        }
    }

    /// Template merged under every synthesized point.
    pub fn with_default_point(mut self, default_point: Point) -> Self {
        self.default_point = default_point;
        self
    }

    /// Replace the default ascending-by-`point_key` ordering.
    pub fn with_comparator<F>(mut self, comparator: F) -> Self
    where
        F: Fn(&Point, &Point) -> Ordering + Send + Sync + 'static,
    {
        self.comparator = Some(Arc::new(comparator));
        self
    }

    /// Group `records` into an aligned series.
    ///
    /// Fails with [`ChartDataError::InvalidConfiguration`] if `point_key` is also one of the
    /// group-key fields.
    pub fn build(&self, records: &[Point]) -> ChartDataResult<PointSeries> {
        let group_keys = self.group_key.keys();
        if group_keys.contains(&self.point_key) {
            return Err(ChartDataError::invalid_configuration(format!(
                "point key '{}' must not also be a group key",
                self.point_key
            )));
        }

        let mut x_axis: Vec<(String, &Value)> = Vec::new();
        let mut x_seen: HashSet<String> = HashSet::new();
        let mut groups: Vec<PendingGroup<'_>> = Vec::new();
        let mut group_index: HashMap<String, usize> = HashMap::new();

        for record in records {
            let x = field(record, &self.point_key);
            let x_sig = value_signature(x);
            if x_seen.insert(x_sig.clone()) {
                x_axis.push((x_sig.clone(), x));
            }

            let g_sig = group_signature(record, group_keys);
            let slot = *group_index.entry(g_sig).or_insert_with(|| {
                groups.push(PendingGroup::default());
                groups.len() - 1
            });
            let group = &mut groups[slot];
            for key in group_keys {
                if !group.key_fields.contains_key(key) {
                    if let Some(v) = record.get(key) {
                        group.key_fields.insert(key.clone(), v.clone());
                    }
                }
            }
            group.by_x.entry(x_sig).or_default().push(record);
        }

        let data: Vec<Vec<Point>> = groups
            .iter()
            .map(|group| {
                let mut points: Vec<Point> = x_axis
                    .iter()
                    .map(|(sig, x)| self.synthesize(group, sig, x))
                    .collect();
                match &self.comparator {
                    Some(cmp) => points.sort_by(|a, b| cmp(a, b)),
                    None => points.sort_by(|a, b| {
                        compare_values(field(a, &self.point_key), field(b, &self.point_key))
                    }),
                }
                points
            })
            .collect();

        tracing::debug!(
            groups = data.len(),
            points = x_axis.len(),
            records = records.len(),
            "grouped series built"
        );
        PointSeries::new(data)
    }

    fn synthesize(&self, group: &PendingGroup<'_>, x_sig: &str, x: &Value) -> Point {
        let mut point = self.default_point.clone();
        for (k, v) in &group.key_fields {
            point.insert(k.clone(), v.clone());
        }
        point.insert(self.point_key.clone(), x.clone());
        for record in group.by_x.get(x_sig).into_iter().flatten() {
            for (k, v) in record.iter() {
                point.insert(k.clone(), v.clone());
            }
        }
        point
    }
}

impl fmt::Debug for GroupedSeriesBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupedSeriesBuilder")
            .field("point_key", &self.point_key)
            .field("group_key", &self.group_key)
            .field("default_point", &self.default_point)
            .field("comparator_set", &self.comparator.is_some())
            .finish()
    }
}

#[derive(Default)]
struct PendingGroup<'a> {
    key_fields: Point,
    by_x: HashMap<String, Vec<&'a Point>>,
}

static NULL: Value = Value::Null;

fn field<'a>(point: &'a Point, key: &str) -> &'a Value {
    point.get(key).unwrap_or(&NULL)
}

/// Identity of a value on the x-axis or in a group key.
///
/// Numbers are keyed by their `f64` bits, so `1` and `1.0` match as they do under
/// [`compare_values`]. Anything else keeps its JSON text, which never starts with `n:`.
fn value_signature(value: &Value) -> String {
    match value.as_f64() {
        Some(n) => format!("n:{:016x}", canonical_bits(n)),
        None => value.to_string(),
    }
}

/// Value signatures joined by a control character that JSON escapes inside strings, so distinct
/// key tuples never collide.
fn group_signature(record: &Point, keys: &[String]) -> String {
    keys.iter()
        .map(|k| value_signature(field(record, k)))
        .collect::<Vec<_>>()
        .join("\u{1f}")
}
