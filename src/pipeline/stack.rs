use crate::error::{ChartDataError, ChartDataResult};
use crate::series::{Point, PointSeries, Preprocess, StackType};

use super::{numeric, write_stacked};

/// Stack `value_key` across groups at every point index.
///
/// Group `g`'s value becomes the running sum of groups `0..=g`, with the previous running sum
/// stored under [`super::STACK_START_KEY`] and the untouched value under
/// [`super::ORIGINAL_VALUE_KEY`]. Missing or non-numeric values contribute zero.
///
/// Fails with [`ChartDataError::InvalidConfiguration`] if the series is already stacked.
pub fn stack(
    value_key: impl Into<String>,
) -> impl Fn(PointSeries<Point>) -> ChartDataResult<PointSeries<Point>> + Send + Sync + Clone + 'static {
    let value_key = value_key.into();
    move |series: PointSeries<Point>| {
        if series.preprocess().stacked {
            return Err(ChartDataError::invalid_configuration(format!(
                "cannot stack '{value_key}': series is already stacked"
            )));
        }

        let out = series.map_points(|slice, _| {
            let mut running = 0.0;
            slice
                .iter()
                .map(|point| {
                    let start = running;
                    running += numeric(point, &value_key);
                    write_stacked(point, &value_key, start, running)
                })
                .collect::<Vec<Point>>()
        })?;

        tracing::debug!(value_key = %value_key, groups = out.group_count(), "stacked series");
        Ok(out.with_preprocess(Preprocess {
            stacked: true,
            stack_type: Some(StackType::Points),
            normalize_to_percentage: false,
        }))
    }
}
