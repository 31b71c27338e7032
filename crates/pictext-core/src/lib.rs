//! Pictext Core: contracts and value types for caption rendering
//!
//! A calendar page is a photograph with captions laid over it. Getting the
//! captions pixel-accurate takes two cooperating halves:
//!
//! 1. **Layout** - pure geometry: measure runs, anchor them, stack them
//! 2. **Rendering** - mutable state: canvases, colors, glyph rasterization
//!
//! This crate holds what both halves agree on: the [`TextRun`] value type,
//! the [`Align`]/[`Valign`] policies, the error taxonomy, and the two
//! contracts in [`traits`] that let two very different imaging engines
//! consume identical layout output.
//!
//! ## The Traits That Power Everything
//!
//! - [`FontMetricsProvider`] - Where text runs learn their size
//! - [`ImageBuilder`] - Where layout output becomes an image

pub mod align;
pub mod error;
pub mod run;
pub mod traits;

pub use align::{Align, Valign};
pub use error::{PictextError, Result};
pub use run::{Extent, TextRun};
pub use traits::{FontMetricsProvider, ImageBuilder};

/// Simple RGBA color that works everywhere
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Color from a 0-100 visibility value, 100 = opaque
    ///
    /// Page definitions express alpha as percent visibility; engines want
    /// 8-bit alpha. Values above 100 clamp to opaque.
    pub fn from_visibility(r: u8, g: u8, b: u8, visibility: u8) -> Self {
        let vis = visibility.min(100) as u16;
        Self::rgba(r, g, b, ((vis * 255) / 100) as u8)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    /// Equal in RGB, ignoring alpha; how knockout backgrounds are matched
    pub fn rgb_eq(&self, other: &Color) -> bool {
        self.r == other.r && self.g == other.g && self.b == other.b
    }
}

/// Declared format of a loaded source photo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoFormat {
    Jpeg,
    Png,
}

/// Serialization target for a finished canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Lossy; honors the quality parameter
    Jpeg,
    Png,
    /// Vector engines only
    Svg,
}

impl OutputFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::Svg => "image/svg+xml",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }
}

/// Deterministic metrics with no font file behind them
///
/// Every glyph advances exactly the font size and a line is exactly one
/// font size tall. Useful for layout previews and for exercising the
/// layout engine in tests where real font metrics would tie results to an
/// installed font.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedMetrics;

impl FontMetricsProvider for FixedMetrics {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn measure(&self, run: &TextRun) -> Result<Extent> {
        if run.font_size == 0 {
            return Err(error::MetricsError::ZeroFontSize {
                font: run.font_path.clone(),
            }
            .into());
        }
        let chars = run.content.chars().count() as u32;
        if chars == 0 {
            return Ok(Extent::new(0, run.font_size));
        }
        Ok(Extent::new(chars * run.font_size, run.font_size))
    }

    fn line_height(&self, _font_path: &str, font_size: u32) -> Result<u32> {
        Ok(font_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_alpha() {
        assert_eq!(Color::from_visibility(1, 2, 3, 100).a, 255);
        assert_eq!(Color::from_visibility(1, 2, 3, 0).a, 0);
        assert_eq!(Color::from_visibility(1, 2, 3, 50).a, 127);
        // Clamps instead of wrapping
        assert_eq!(Color::from_visibility(1, 2, 3, 200).a, 255);
    }

    #[test]
    fn test_rgb_eq_ignores_alpha() {
        assert!(Color::rgba(10, 20, 30, 0).rgb_eq(&Color::rgb(10, 20, 30)));
        assert!(!Color::rgb(10, 20, 31).rgb_eq(&Color::rgb(10, 20, 30)));
    }

    #[test]
    fn test_fixed_metrics_counts_chars_not_bytes() {
        let provider = FixedMetrics;
        let run = TextRun::new("Mär", "fixture", 20, 0);
        let extent = provider.measure(&run).unwrap();
        assert_eq!(extent.width, 60);
        assert_eq!(extent.height, 20);
    }

    #[test]
    fn test_fixed_metrics_empty_run() {
        let provider = FixedMetrics;
        let extent = provider
            .measure(&TextRun::new("", "fixture", 20, 0))
            .unwrap();
        assert_eq!(extent, Extent::new(0, 20));
    }

    #[test]
    fn test_fixed_metrics_rejects_zero_size() {
        let provider = FixedMetrics;
        assert!(provider
            .measure(&TextRun::new("x", "fixture", 0, 0))
            .is_err());
    }
}
