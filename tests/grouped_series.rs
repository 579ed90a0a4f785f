use std::cmp::Ordering;
use std::fs;

use chart_data::ChartDataError;
use chart_data::series::{GroupedSeriesBuilder, GroupedSeriesConfig, Point, PointSeries, compare_values};
use serde_json::{Value, json};

fn sales() -> Vec<Point> {
    let text = fs::read_to_string("tests/fixtures/sales.json").unwrap();
    serde_json::from_str(&text).unwrap()
}

fn obj(v: Value) -> Point {
    v.as_object().cloned().unwrap_or_default()
}

fn column(series: &PointSeries, group: usize, key: &str) -> Vec<Value> {
    series
        .get_group(group)
        .unwrap()
        .iter()
        .map(|p| p.get(key).cloned().unwrap_or(Value::Null))
        .collect()
}

#[test]
fn groups_align_on_the_shared_x_axis() {
    let series = GroupedSeriesBuilder::new("month", ["region", "product"])
        .with_default_point(obj(json!({"units": 0})))
        .build(&sales())
        .unwrap();

    assert_eq!(series.group_count(), 3);
    assert_eq!(series.point_count(), 3);
    for g in 0..series.group_count() {
        assert_eq!(column(&series, g, "month"), vec![json!(1), json!(2), json!(3)]);
    }

    assert_eq!(column(&series, 0, "units"), vec![json!(4), json!(6), json!(2)]);
    assert_eq!(column(&series, 1, "units"), vec![json!(1), json!(0), json!(3)]);
    assert_eq!(column(&series, 2, "units"), vec![json!(0), json!(5), json!(0)]);

    // synthesized points carry the group's key fields
    let filler = series.get(2, 0).unwrap();
    assert_eq!(filler["region"], json!("south"));
    assert_eq!(filler["product"], json!("coffee"));
}

#[test]
fn config_round_trips_through_json() {
    let cfg: GroupedSeriesConfig = serde_json::from_value(json!({
        "pointKey": "month",
        "groupKey": "region",
        "defaultPoint": {"units": 0}
    }))
    .unwrap();
    let series = GroupedSeriesBuilder::from_config(cfg.clone()).build(&sales()).unwrap();

    // tea and coffee in the south share a group; later records win per field
    assert_eq!(series.group_count(), 2);
    assert_eq!(column(&series, 1, "units"), vec![json!(1), json!(5), json!(3)]);
    assert_eq!(column(&series, 1, "product"), vec![json!("tea"), json!("coffee"), json!("tea")]);

    let back = serde_json::to_value(&cfg).unwrap();
    assert_eq!(back["groupKey"], json!("region"));
}

#[test]
fn points_sort_by_x_unless_a_comparator_is_given() {
    let records = vec![
        obj(json!({"x": 3, "g": "a"})),
        obj(json!({"x": 1, "g": "a"})),
        obj(json!({"x": 2, "g": "b"})),
    ];

    let ascending = GroupedSeriesBuilder::new("x", "g").build(&records).unwrap();
    assert_eq!(column(&ascending, 1, "x"), vec![json!(1), json!(2), json!(3)]);

    let descending = GroupedSeriesBuilder::new("x", "g")
        .with_comparator(|a, b| compare_values(&b["x"], &a["x"]))
        .build(&records)
        .unwrap();
    assert_eq!(column(&descending, 0, "x"), vec![json!(3), json!(2), json!(1)]);
}

#[test]
fn mixed_x_types_order_by_kind() {
    assert_eq!(compare_values(&Value::Null, &json!(0)), Ordering::Less);
    assert_eq!(compare_values(&json!(10), &json!(9.5)), Ordering::Greater);
    assert_eq!(compare_values(&json!("b"), &json!("a")), Ordering::Greater);
    assert_eq!(compare_values(&json!(1), &json!("1")), Ordering::Less);
}

#[test]
fn empty_input_gives_an_empty_series() {
    let series = GroupedSeriesBuilder::new("x", "g").build(&[]).unwrap();
    assert!(series.is_empty());
    assert_eq!(series.group_count(), 0);
}

#[test]
fn point_key_cannot_be_a_group_key() {
    let err = GroupedSeriesBuilder::new("month", ["region", "month"]).build(&sales()).unwrap_err();
    assert!(matches!(err, ChartDataError::InvalidConfiguration { .. }));
}

#[test]
fn map_points_sees_one_slice_per_x() {
    let series = GroupedSeriesBuilder::new("month", "region")
        .with_default_point(obj(json!({"units": 0})))
        .build(&sales())
        .unwrap();

    let totals = series
        .map_points(|slice, i| {
            let total: f64 = slice.iter().filter_map(|p| p["units"].as_f64()).sum();
            slice.iter().map(|_| (i, total)).collect()
        })
        .unwrap();
    assert_eq!(totals.get_group(0).unwrap(), &[(0, 5.0), (1, 11.0), (2, 5.0)]);

    let err = series.map_points(|_, _| vec![0]).unwrap_err();
    assert!(matches!(err, ChartDataError::InvalidArgument { .. }));
}
