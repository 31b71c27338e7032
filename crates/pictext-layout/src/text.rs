//! A single anchored text run

use pictext_core::{Align, Extent, Result, TextRun, Valign};

use crate::metrics::Metrics;

/// One styled run, ready to be anchored
///
/// Immutable value object; `metrics` is a pure computation producing a
/// fresh result every call, nothing is retained between renders.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    run: TextRun,
}

/// Size plus anchor of a run, carrying the run itself for the backend
#[derive(Debug, Clone, PartialEq)]
pub struct TextMetrics {
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
    pub run: TextRun,
}

impl Text {
    pub fn new(run: TextRun) -> Self {
        Self { run }
    }

    pub fn run(&self) -> &TextRun {
        &self.run
    }

    /// Unanchored size, rotation applied
    pub fn extent(&self, metrics: &Metrics<'_>) -> Result<Extent> {
        metrics.measure(&self.run)
    }

    /// Anchor the run against a reference point
    ///
    /// The returned y is a baseline: Bottom leaves the reference as-is,
    /// Top and Middle add height (see [`Valign`]).
    pub fn metrics(
        &self,
        metrics: &Metrics<'_>,
        x: i32,
        y: i32,
        align: Align,
        valign: Valign,
    ) -> Result<TextMetrics> {
        let extent = self.extent(metrics)?;
        Ok(TextMetrics {
            width: extent.width,
            height: extent.height,
            x: align.anchor_x(x, extent.width),
            y: valign.anchor_y(y, extent.height),
            run: self.run.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pictext_core::FixedMetrics;

    fn text(content: &str, size: u32) -> Text {
        Text::new(TextRun::new(content, "fixture", size, 0))
    }

    #[test]
    fn test_left_bottom_is_identity_anchor() {
        let provider = FixedMetrics;
        let metrics = Metrics::new(&provider);
        let result = text("Text", 20)
            .metrics(&metrics, 0, 0, Align::Left, Valign::Bottom)
            .unwrap();
        assert_eq!(result.width, 80);
        assert_eq!(result.height, 20);
        assert_eq!(result.x, 0);
        assert_eq!(result.y, 0);
    }

    #[test]
    fn test_align_round_trips() {
        let provider = FixedMetrics;
        let metrics = Metrics::new(&provider);
        let t = text("Text", 20);
        for (x, y) in [(0, 0), (37, -12), (-500, 941)] {
            let left = t.metrics(&metrics, x, y, Align::Left, Valign::Bottom).unwrap();
            let center = t
                .metrics(&metrics, x, y, Align::Center, Valign::Bottom)
                .unwrap();
            let right = t
                .metrics(&metrics, x, y, Align::Right, Valign::Bottom)
                .unwrap();
            assert_eq!(left.x, x);
            assert_eq!(center.x, x - 40);
            assert_eq!(right.x, x - 80);
        }
    }

    #[test]
    fn test_valign_adds_height() {
        let provider = FixedMetrics;
        let metrics = Metrics::new(&provider);
        let t = text("Text", 20);
        let top = t.metrics(&metrics, 0, 100, Align::Left, Valign::Top).unwrap();
        let middle = t
            .metrics(&metrics, 0, 100, Align::Left, Valign::Middle)
            .unwrap();
        assert_eq!(top.y, 120);
        assert_eq!(middle.y, 110);
    }

    #[test]
    fn test_result_carries_run() {
        let provider = FixedMetrics;
        let metrics = Metrics::new(&provider);
        let t = text("Mai 2026", 32);
        let result = t
            .metrics(&metrics, 10, 10, Align::Center, Valign::Middle)
            .unwrap();
        assert_eq!(result.run, *t.run());
    }

    #[test]
    fn test_idempotent() {
        let provider = FixedMetrics;
        let metrics = Metrics::new(&provider);
        let t = text("Text", 20);
        let first = t.metrics(&metrics, 5, 7, Align::Center, Valign::Top).unwrap();
        let second = t.metrics(&metrics, 5, 7, Align::Center, Valign::Top).unwrap();
        assert_eq!(first, second);
    }
}
