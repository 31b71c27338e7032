//! A horizontal sequence of runs with no inter-run spacing

use pictext_core::{Align, Extent, Result, TextRun, Valign};

use crate::metrics::Metrics;
use crate::text::{Text, TextMetrics};

/// Runs concatenated left-to-right, each keeping its own font and size
///
/// The row is as wide as all runs together and as tall as its tallest
/// run. An empty row is legal and measures zero; config-generated pages
/// routinely produce empty caption sections.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    texts: Vec<Text>,
}

/// Aggregate size and anchor of a row plus each member's placement
#[derive(Debug, Clone, PartialEq)]
pub struct RowMetrics {
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
    pub texts: Vec<TextMetrics>,
}

impl Row {
    pub fn new(texts: Vec<Text>) -> Self {
        Self { texts }
    }

    pub fn from_runs(runs: impl IntoIterator<Item = TextRun>) -> Self {
        Self::new(runs.into_iter().map(Text::new).collect())
    }

    pub fn texts(&self) -> &[Text] {
        &self.texts
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Unanchored aggregate size: width sums, height is the tallest run
    pub fn extent(&self, metrics: &Metrics<'_>) -> Result<Extent> {
        let mut width = 0u32;
        let mut height = 0u32;
        for text in &self.texts {
            let extent = text.extent(metrics)?;
            width += extent.width;
            height = height.max(extent.height);
        }
        Ok(Extent::new(width, height))
    }

    /// Anchor the row and place every run inside it
    pub fn metrics(
        &self,
        metrics: &Metrics<'_>,
        x: i32,
        y: i32,
        align: Align,
        valign: Valign,
    ) -> Result<RowMetrics> {
        let extent = self.extent(metrics)?;
        let anchor_x = align.anchor_x(x, extent.width);
        let anchor_y = valign.anchor_y(y, extent.height);
        self.metrics_at(metrics, anchor_x, anchor_y, extent, valign)
    }

    /// Place runs for an already-resolved anchor
    ///
    /// Runs advance left-to-right from the anchor x with no gaps. A run
    /// shorter than the row is shifted by its valign delta so Bottom rows
    /// share a baseline, Top rows share a top edge, and Middle rows share
    /// a vertical center.
    pub(crate) fn metrics_at(
        &self,
        metrics: &Metrics<'_>,
        anchor_x: i32,
        anchor_y: i32,
        extent: Extent,
        valign: Valign,
    ) -> Result<RowMetrics> {
        let mut texts = Vec::with_capacity(self.texts.len());
        let mut cursor = anchor_x;
        for text in &self.texts {
            let run_extent = text.extent(metrics)?;
            texts.push(TextMetrics {
                width: run_extent.width,
                height: run_extent.height,
                x: cursor,
                y: anchor_y + valign.member_delta(run_extent.height, extent.height),
                run: text.run().clone(),
            });
            cursor += run_extent.width as i32;
        }
        Ok(RowMetrics {
            width: extent.width,
            height: extent.height,
            x: anchor_x,
            y: anchor_y,
            texts,
        })
    }
}
