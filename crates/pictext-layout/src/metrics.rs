//! Run measurement, rotation included
//!
//! Font engines answer size questions about upright text; captions on a
//! calendar page are sometimes rotated. [`Metrics`] combines the two: it
//! asks the provider for the upright box and rotates the corners itself,
//! so every provider gets rotation handling for free and all of them get
//! the same one.

use pictext_core::{Extent, FontMetricsProvider, Result, TextRun};

/// Measures text runs against a [`FontMetricsProvider`]
///
/// Borrowed, not owned: one `Metrics` is typically constructed per draw
/// call around the provider of whichever engine renders the page.
#[derive(Clone, Copy)]
pub struct Metrics<'a> {
    provider: &'a dyn FontMetricsProvider,
}

impl<'a> Metrics<'a> {
    pub fn new(provider: &'a dyn FontMetricsProvider) -> Self {
        Self { provider }
    }

    /// Tight pixel bounding box of the run, rotation applied
    ///
    /// An empty run measures 0 wide and one nominal line tall, whatever
    /// the angle; there is no glyph box to rotate.
    pub fn measure(&self, run: &TextRun) -> Result<Extent> {
        if run.content.is_empty() {
            let line = self.provider.line_height(&run.font_path, run.font_size)?;
            return Ok(Extent::new(0, line));
        }

        let upright = self.provider.measure(&run.upright())?;
        let rotated = rotated_extent(upright, run.angle);
        log::trace!(
            "measure '{}' size={} angle={} -> {}x{}",
            run.content,
            run.font_size,
            run.angle,
            rotated.width,
            rotated.height
        );
        Ok(rotated)
    }
}

/// Bounding box of an `extent`-sized rectangle rotated by `angle` degrees
///
/// Corner rotation: width = |right - left|, height = |bottom - top|,
/// rounded to nearest integer.
pub fn rotated_extent(extent: Extent, angle: i32) -> Extent {
    if angle.rem_euclid(360) == 0 {
        return extent;
    }
    let radians = f64::from(angle).to_radians();
    let (sin, cos) = (radians.sin().abs(), radians.cos().abs());
    let w = f64::from(extent.width);
    let h = f64::from(extent.height);
    Extent::new(
        (w * cos + h * sin).round() as u32,
        (w * sin + h * cos).round() as u32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pictext_core::FixedMetrics;

    fn run(text: &str, size: u32, angle: i32) -> TextRun {
        TextRun::new(text, "fixture", size, angle)
    }

    #[test]
    fn test_upright_measure() {
        let metrics = Metrics::new(&FixedMetrics);
        let extent = metrics.measure(&run("Text", 20, 0)).unwrap();
        assert_eq!(extent, Extent::new(80, 20));
    }

    #[test]
    fn test_quarter_turn_swaps_axes() {
        let metrics = Metrics::new(&FixedMetrics);
        let extent = metrics.measure(&run("Text", 20, 90)).unwrap();
        assert_eq!(extent, Extent::new(20, 80));
        let extent = metrics.measure(&run("Text", 20, -90)).unwrap();
        assert_eq!(extent, Extent::new(20, 80));
    }

    #[test]
    fn test_half_turn_preserves_box() {
        let metrics = Metrics::new(&FixedMetrics);
        let extent = metrics.measure(&run("Text", 20, 180)).unwrap();
        assert_eq!(extent, Extent::new(80, 20));
    }

    #[test]
    fn test_diagonal_box_grows() {
        // 45 degrees: both sides become (80 + 20) / sqrt(2) ~ 71
        let metrics = Metrics::new(&FixedMetrics);
        let extent = metrics.measure(&run("Text", 20, 45)).unwrap();
        assert_eq!(extent, Extent::new(71, 71));
    }

    #[test]
    fn test_empty_run_ignores_angle() {
        let metrics = Metrics::new(&FixedMetrics);
        let extent = metrics.measure(&run("", 20, 45)).unwrap();
        assert_eq!(extent, Extent::new(0, 20));
    }

    #[test]
    fn test_width_monotone_in_content() {
        let metrics = Metrics::new(&FixedMetrics);
        let mut text = String::new();
        let mut last = 0;
        for ch in "Grüße aus München".chars() {
            text.push(ch);
            let width = metrics.measure(&run(&text, 20, 0)).unwrap().width;
            assert!(width >= last);
            last = width;
        }
    }
}
