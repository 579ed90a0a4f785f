use crate::error::{ChartDataError, ChartDataResult};
use crate::series::{Point, PointSeries, Preprocess, StackType};

use super::{PERCENTAGE_KEY, number, numeric, write_stacked};

/// Normalize `value_key` to stacked cumulative shares of each point-index total.
///
/// At every point index the values of all groups are summed (missing or non-numeric values
/// count as zero). Group `g`'s value becomes the running share of groups `0..=g`, so the last
/// group reaches `1.0`. The original value is kept under
/// [`super::ORIGINAL_VALUE_KEY`], the share itself under [`PERCENTAGE_KEY`] and the previous
/// running share under [`super::STACK_START_KEY`]. A zero total gives every group a share of 0.
///
/// Fails with [`ChartDataError::InvalidConfiguration`] if the series is already stacked.
pub fn normalize_to_percentage(
    value_key: impl Into<String>,
) -> impl Fn(PointSeries<Point>) -> ChartDataResult<PointSeries<Point>> + Send + Sync + Clone + 'static {
    let value_key = value_key.into();
    move |series: PointSeries<Point>| {
        if series.preprocess().stacked {
            return Err(ChartDataError::invalid_configuration(format!(
                "cannot normalize '{value_key}': series is already stacked"
            )));
        }

        let out = series.map_points(|slice, _| {
            let values: Vec<f64> = slice.iter().map(|p| numeric(p, &value_key)).collect();
            let total: f64 = values.iter().sum();
            let mut running = 0.0;
            slice
                .iter()
                .zip(values)
                .map(|(point, v)| {
                    let share = if total == 0.0 { 0.0 } else { v / total };
                    let start = running;
                    running += share;
                    let mut p = write_stacked(point, &value_key, start, running);
                    p.insert(PERCENTAGE_KEY.to_owned(), number(share));
                    p
                })
                .collect::<Vec<Point>>()
        })?;

        tracing::debug!(value_key = %value_key, groups = out.group_count(), "normalized to percentage");
        Ok(out.with_preprocess(Preprocess {
            stacked: true,
            stack_type: Some(StackType::Points),
            normalize_to_percentage: true,
        }))
    }
}
