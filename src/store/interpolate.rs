//! Cross-frame linear interpolation.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{ChartDataError, ChartDataResult, DataQualityWarning};
use crate::types::{NULL, Row, Scalar};

use super::ChartData;
use super::cache::MemoKey;

/// Linear interpolation between two cells.
///
/// - `t == 0` returns `x` and `t == 1` returns `y` unchanged, whatever their type.
/// - `t` outside `[0, 1]` (or `NaN`) fails with [`ChartDataError::InvalidArgument`].
/// - A null on either side yields null.
/// - A non-numeric value on either side yields `x` unchanged.
///
/// ```
/// use chart_data::store::lerp;
/// use chart_data::types::Scalar;
///
/// assert_eq!(lerp(&Scalar::from(2.0), &Scalar::from(4.0), 0.5).unwrap(), Scalar::from(3.0));
/// assert_eq!(lerp(&Scalar::Null, &Scalar::from(4.0), 0.5).unwrap(), Scalar::Null);
/// ```
pub fn lerp(x: &Scalar, y: &Scalar, t: f64) -> ChartDataResult<Scalar> {
    if t == 0.0 {
        return Ok(x.clone());
    }
    if t == 1.0 {
        return Ok(y.clone());
    }
    if !(0.0..=1.0).contains(&t) {
        return Err(ChartDataError::invalid_argument(format!(
            "blend factor {t} outside [0, 1]"
        )));
    }
    Ok(match (x, y) {
        (Scalar::Null, _) | (_, Scalar::Null) => Scalar::Null,
        (Scalar::Number(a), Scalar::Number(b)) => Scalar::Number(a + (b - a) * t),
        _ => x.clone(),
    })
}

/// For each frame, the positions of its rows keyed by primary-column value.
type JoinIndex = Arc<Vec<HashMap<Scalar, Vec<usize>>>>;

impl ChartData {
    /// Interpolate between two adjacent frames of `frame_column`.
    ///
    /// `index` may be fractional: with `a = floor(index)`, `b = ceil(index)` and
    /// `blend = index - a`, rows of frame `a` and frame `b` are paired by their
    /// `primary_column` value. One row is produced per primary value (in order of first
    /// appearance across the whole store) that has a match in both frames; unmatched values are
    /// dropped. Continuous columns other than the primary column are interpolated with [`lerp`];
    /// every other column is copied from the frame-`a` row.
    ///
    /// When a frame holds several rows for one primary value the first is used and a
    /// [`DataQualityWarning::DuplicateJoinKey`] is reported.
    ///
    /// An integral `index` is exactly [`ChartData::frame_at_index`].
    pub fn frame_at_index_interpolated(
        &self,
        frame_column: &str,
        primary_column: &str,
        index: f64,
    ) -> ChartDataResult<ChartData> {
        let result = self.frame_at_index_interpolated_impl(frame_column, primary_column, index);
        self.reporter.check("frame_at_index_interpolated", result)
    }

    fn frame_at_index_interpolated_impl(
        &self,
        frame_column: &str,
        primary_column: &str,
        index: f64,
    ) -> ChartDataResult<ChartData> {
        self.require_column(frame_column)?;
        self.require_column(primary_column)?;
        if frame_column == primary_column {
            return Err(ChartDataError::invalid_argument(format!(
                "primary column '{primary_column}' must differ from frame column"
            )));
        }

        let frame_count = self.frame_index(frame_column).len();
        if !index.is_finite() || index < 0.0 || index > frame_count as f64 - 1.0 {
            return Err(ChartDataError::index_out_of_range(index, frame_count));
        }
        if index.fract() == 0.0 {
            return self.frame_at_index_impl(frame_column, index as usize);
        }

        let a = index.floor() as usize;
        let b = index.ceil() as usize;
        let blend = index - index.floor();

        let join = self.join_index(frame_column, primary_column);
        let mut rows = Vec::new();
        for value in self.unique_values(primary_column).iter() {
            let (Some(ra), Some(rb)) = (join[a].get(value), join[b].get(value)) else {
                continue;
            };
            for (frame, matches) in [(a, ra), (b, rb)] {
                if matches.len() > 1 {
                    self.reporter.warn(
                        "frame_at_index_interpolated",
                        DataQualityWarning::DuplicateJoinKey {
                            primary_column: primary_column.to_owned(),
                            value: value.clone(),
                            frame,
                            matches: matches.len(),
                        },
                    );
                }
            }
            rows.push(self.blend_rows(&self.rows[ra[0]], &self.rows[rb[0]], primary_column, blend)?);
        }

        tracing::debug!(frame_column, primary_column, index, rows = rows.len(), "interpolated frame");
        Ok(self.derive(rows))
    }

    fn join_index(&self, frame_column: &str, primary_column: &str) -> JoinIndex {
        self.cache
            .get_or_insert_with(MemoKey::Join(frame_column.to_owned(), primary_column.to_owned()), || {
                let frames = self.frame_index(frame_column);
                let joined = (0..frames.len())
                    .map(|f| {
                        let mut by_key: HashMap<Scalar, Vec<usize>> = HashMap::new();
                        for &i in frames.members(f) {
                            let key = self.rows[i].get(primary_column).cloned().unwrap_or_default();
                            by_key.entry(key).or_default().push(i);
                        }
                        by_key
                    })
                    .collect();
                Arc::new(joined)
            })
    }

    fn blend_rows(&self, from: &Row, to: &Row, primary_column: &str, blend: f64) -> ChartDataResult<Row> {
        let mut out = Row::with_capacity(self.columns.len());
        for column in self.columns.iter() {
            let key = column.key.as_str();
            if column.is_continuous && key != primary_column {
                if from.contains_key(key) || to.contains_key(key) {
                    let x = from.get(key).unwrap_or(&NULL);
                    let y = to.get(key).unwrap_or(&NULL);
                    out.insert(key, lerp(x, y, blend)?);
                }
            } else if let Some(v) = from.get(key) {
                out.insert(key, v.clone());
            }
        }
        Ok(out)
    }
}
