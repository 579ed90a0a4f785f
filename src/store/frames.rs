//! Grouping rows into temporal frames.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{ChartDataError, ChartDataResult};
use crate::types::{Row, Scalar};

use super::ChartData;
use super::cache::MemoKey;

/// Row positions of each frame, in first-appearance order of the frame value.
#[derive(Debug)]
pub(crate) struct FrameIndex {
    values: Vec<Scalar>,
    members: Vec<Vec<usize>>,
}

impl FrameIndex {
    fn build<'a>(values: impl Iterator<Item = &'a Scalar>) -> Self {
        let mut position: HashMap<&Scalar, usize> = HashMap::new();
        let mut out = FrameIndex {
            values: Vec::new(),
            members: Vec::new(),
        };
        for (row, value) in values.enumerate() {
            let slot = *position.entry(value).or_insert_with(|| {
                out.values.push(value.clone());
                out.members.push(Vec::new());
                out.values.len() - 1
            });
            out.members[slot].push(row);
        }
        out
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    pub(crate) fn members(&self, frame: usize) -> &[usize] {
        &self.members[frame]
    }
}

/// The frames of a store for one column.
///
/// A cheap view over the source store's rows; cloning shares everything.
#[derive(Debug, Clone)]
pub struct Frames {
    index: Arc<FrameIndex>,
    rows: Arc<[Row]>,
}

impl Frames {
    /// Number of frames.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.values.is_empty()
    }

    /// Frame values in first-appearance order.
    pub fn values(&self) -> &[Scalar] {
        &self.index.values
    }

    pub fn get(&self, frame: usize) -> Option<Frame<'_>> {
        let value = self.index.values.get(frame)?;
        Some(Frame {
            value,
            members: self.index.members(frame),
            rows: &self.rows,
        })
    }

    /// Ordinal of the frame holding `value`, if any.
    pub fn position(&self, value: &Scalar) -> Option<usize> {
        self.index.values.iter().position(|v| v == value)
    }

    pub fn iter(&self) -> impl Iterator<Item = Frame<'_>> {
        (0..self.len()).filter_map(move |i| self.get(i))
    }
}

/// One frame: the rows sharing a single value of the framing column.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// The framing column's value for every row of this frame.
    pub value: &'a Scalar,
    members: &'a [usize],
    rows: &'a [Row],
}

impl<'a> Frame<'a> {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Rows of this frame in store order.
    pub fn rows(&self) -> impl Iterator<Item = &'a Row> + 'a {
        let (members, rows) = (self.members, self.rows);
        members.iter().map(move |&i| &rows[i])
    }
}

impl ChartData {
    /// Group rows by the value of `column`.
    ///
    /// Frames are ordered by first appearance of their value and rows keep store order within a
    /// frame. Rows are expected to be sorted by `column` already; nothing is re-sorted.
    pub fn make_frames(&self, column: &str) -> ChartDataResult<Frames> {
        let result = self.require_column(column).map(|_| self.frames(column));
        self.reporter.check("make_frames", result)
    }

    /// A new store holding only the rows of frame `index` of `frame_column`.
    ///
    /// Fails with [`ChartDataError::IndexOutOfRange`] when `index` is not below the frame count.
    pub fn frame_at_index(&self, frame_column: &str, index: usize) -> ChartDataResult<ChartData> {
        let result = self.frame_at_index_impl(frame_column, index);
        self.reporter.check("frame_at_index", result)
    }

    pub(super) fn frame_index(&self, column: &str) -> Arc<FrameIndex> {
        self.cache.get_or_insert_with(MemoKey::Frames(column.to_owned()), || {
            Arc::new(FrameIndex::build(self.column_values(column)))
        })
    }

    fn frames(&self, column: &str) -> Frames {
        Frames {
            index: self.frame_index(column),
            rows: Arc::clone(&self.rows),
        }
    }

    pub(super) fn frame_at_index_impl(&self, frame_column: &str, index: usize) -> ChartDataResult<ChartData> {
        self.require_column(frame_column)?;
        let frames = self.frame_index(frame_column);
        if index >= frames.len() {
            return Err(ChartDataError::index_out_of_range(index, frames.len()));
        }
        let rows = frames
            .members(index)
            .iter()
            .map(|&i| self.rows[i].clone())
            .collect();
        Ok(self.derive(rows))
    }
}
