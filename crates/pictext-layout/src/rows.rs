//! A vertical stack of rows with a fixed inter-row distance

use pictext_core::{Align, Extent, Result, Valign};

use crate::metrics::Metrics;
use crate::row::{Row, RowMetrics};

/// Rows stacked top-to-bottom in list order
///
/// `distance` is the gap between consecutive rows, never applied before
/// the first or after the last. The block is as wide as its widest row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rows {
    rows: Vec<Row>,
    distance: u32,
}

/// Aggregate block size and anchor plus every row's full placement
#[derive(Debug, Clone, PartialEq)]
pub struct RowsMetrics {
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
    pub rows: Vec<RowMetrics>,
}

impl Rows {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows, distance: 0 }
    }

    pub fn with_distance(mut self, distance: u32) -> Self {
        self.distance = distance;
        self
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn distance(&self) -> u32 {
        self.distance
    }

    /// Unanchored aggregate size: width maxes, heights sum plus the gaps
    pub fn extent(&self, metrics: &Metrics<'_>) -> Result<Extent> {
        if self.rows.is_empty() {
            return Ok(Extent::ZERO);
        }
        let mut width = 0u32;
        let mut height = 0u32;
        for row in &self.rows {
            let extent = row.extent(metrics)?;
            width = width.max(extent.width);
            height += extent.height;
        }
        height += self.distance * (self.rows.len() as u32 - 1);
        Ok(Extent::new(width, height))
    }

    /// Anchor the block and place every row inside it
    ///
    /// Rows stack downward from the block anchor y. Each row re-anchors
    /// horizontally against the caller's reference x with its own width,
    /// so Center blocks center every row on the same axis and Right
    /// blocks share a right edge.
    pub fn metrics(
        &self,
        metrics: &Metrics<'_>,
        x: i32,
        y: i32,
        align: Align,
        valign: Valign,
    ) -> Result<RowsMetrics> {
        let extent = self.extent(metrics)?;
        let anchor_x = align.anchor_x(x, extent.width);
        let anchor_y = valign.anchor_y(y, extent.height);

        let mut placed = Vec::with_capacity(self.rows.len());
        let mut cursor = anchor_y;
        for row in &self.rows {
            let row_extent = row.extent(metrics)?;
            let row_anchor_x = align.anchor_x(x, row_extent.width);
            placed.push(row.metrics_at(metrics, row_anchor_x, cursor, row_extent, valign)?);
            cursor += row_extent.height as i32 + self.distance as i32;
        }

        Ok(RowsMetrics {
            width: extent.width,
            height: extent.height,
            x: anchor_x,
            y: anchor_y,
            rows: placed,
        })
    }
}
