//! Pictext - caption layout and dual-engine rendering
//!
//! Pictext turns styled text runs into pixel-accurate anchored geometry
//! and draws them, together with photos, rectangles, lines and composited
//! blobs, through one of two interchangeable rendering engines.
//!
//! ## The pipeline
//!
//! 1. **Describe** - wrap caption text in [`TextRun`]s, group them into
//!    [`Row`]s and [`Rows`]
//! 2. **Measure** - anchor the block with [`Rows::metrics`] against the
//!    engine's [`FontMetricsProvider`]
//! 3. **Draw** - feed the anchored results to an [`ImageBuilder`]
//! 4. **Serialize** - `image_bytes` returns JPEG/PNG (raster engine) or
//!    an SVG document (vector engine)
//!
//! ## Picking an engine
//!
//! ```no_run
//! use pictext::prelude::*;
//!
//! let mut builder = pictext::builder_for("raster")?;
//! builder.create_image(1200, 800)?;
//! builder.create_color("ink", Color::white())?;
//! let caption = TextRun::new("Mai 2026", "/fonts/site.ttf", 48, 0);
//! builder.add_text_raw(&caption, "ink", 600, 740, Align::Center, Valign::Bottom)?;
//! let jpeg = builder.image_bytes(OutputFormat::Jpeg, 90)?;
//! # Ok::<(), pictext::PictextError>(())
//! ```
//!
//! Both engines consume identical layout output and place it identically;
//! their differing native font-metric units are reconciled behind
//! `corrected_value` and never leak into layout math.

pub use pictext_core::{
    error, traits, Align, Color, Extent, FixedMetrics, FontMetricsProvider, ImageBuilder,
    OutputFormat, PhotoFormat, PictextError, Result, TextRun, Valign,
};
pub use pictext_layout::{Metrics, Row, RowMetrics, Rows, RowsMetrics, Text, TextMetrics};

pub use pictext_fontdb as fontdb;
pub use pictext_render_skia::SkiaImageBuilder;
pub use pictext_render_svg::SvgImageBuilder;

/// Common imports for typical usage
pub mod prelude {
    pub use pictext_core::{
        error::{PictextError, Result},
        traits::{FontMetricsProvider, ImageBuilder},
        Align, Color, Extent, OutputFormat, PhotoFormat, TextRun, Valign,
    };
    pub use pictext_layout::{Metrics, Row, Rows, Text};
}

/// Instantiate the rendering engine a config string names
///
/// `"skia"` / `"raster"` builds the tiny-skia bitmap engine, `"svg"` /
/// `"vector"` the SVG document engine. Anything else is a configuration
/// error.
pub fn builder_for(engine: &str) -> Result<Box<dyn ImageBuilder>> {
    match engine.to_ascii_lowercase().as_str() {
        "skia" | "raster" => Ok(Box::new(SkiaImageBuilder::new())),
        "svg" | "vector" => Ok(Box::new(SvgImageBuilder::new())),
        other => Err(PictextError::Config(format!(
            "unknown rendering engine '{other}'"
        ))),
    }
}
