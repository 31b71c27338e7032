//! The contracts that bind layout and rendering together
//!
//! Two traits, two sides of one seam. [`FontMetricsProvider`] answers the
//! geometry questions the layout engine asks; [`ImageBuilder`] turns the
//! answers into pixels or vector shapes. Swap either implementation and the
//! layout math never notices.

use std::path::Path;
use std::sync::Arc;

use crate::align::{Align, Valign};
use crate::error::Result;
use crate::run::{Extent, TextRun};
use crate::{Color, OutputFormat, PhotoFormat};

/// Where text runs learn their size
///
/// One implementation per rendering engine, because the engines disagree on
/// native font-metric units. Every implementation reports extents in
/// *pixels* regardless of its native unit, so Metrics/Text/Row/Rows stay
/// engine-agnostic; [`scale_correction`](Self::scale_correction) is the one
/// place the unit ratio is allowed to surface.
pub trait FontMetricsProvider: Send + Sync {
    /// Identify yourself in logs and error messages
    fn name(&self) -> &'static str;

    /// Unrotated pixel bounding box of the run
    ///
    /// Width reflects actual glyph advances, never byte length. An empty
    /// run measures 0 wide and one nominal line tall. A zero font size or
    /// an unreadable font file is a fatal configuration error.
    fn measure(&self, run: &TextRun) -> Result<Extent>;

    /// The font's nominal line height at `font_size`, in pixels
    fn line_height(&self, font_path: &str, font_size: u32) -> Result<u32>;

    /// Ratio between this engine's native font-metric unit and pixels
    ///
    /// 1.0 when the engine already thinks in pixels.
    fn scale_correction(&self) -> f32 {
        1.0
    }
}

/// The drawing primitives a rendering engine must expose
///
/// Design-layer code draws whole calendar pages through this contract
/// without knowing which engine is underneath. Implementations own all
/// mutable rendering state (current canvas, loaded photo, registered
/// colors), scoped to one render; layout objects stay pure. Native
/// resources are released on [`reset`](Self::reset) and again on Drop, so
/// early-return error paths cannot leak handles.
pub trait ImageBuilder: Send {
    /// Your engine's signature
    fn name(&self) -> &'static str;

    /// Start a blank canvas of the given pixel dimensions
    fn create_image(&mut self, width: u32, height: u32) -> Result<()>;

    /// Load the source photo this render composites onto the canvas
    ///
    /// `format` declares how the photo should be treated on re-encode;
    /// decoding sniffs the actual file content.
    fn create_image_from_file(&mut self, path: &Path, format: PhotoFormat) -> Result<()>;

    /// Register a named color for later draw calls
    ///
    /// Re-registering a key replaces the color.
    fn create_color(&mut self, key: &str, color: Color) -> Result<()>;

    /// Stroke a one-pixel line between two points
    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color_key: &str) -> Result<()>;

    /// Fill a rectangle
    fn add_rectangle(
        &mut self,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        color_key: &str,
    ) -> Result<()>;

    /// Resample the loaded source photo into the given box on the canvas
    fn add_image(&mut self, x: i32, y: i32, width: u32, height: u32) -> Result<()>;

    /// Composite an in-memory image, treating `knockout` pixels as transparent
    ///
    /// This is how QR cards land on a page: the card's background color is
    /// knocked out so the photo shows through.
    fn add_image_blob(
        &mut self,
        blob: &[u8],
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        knockout: Color,
    ) -> Result<()>;

    /// Render a text run anchored at the given reference point
    ///
    /// Applies the same anchoring math as the layout engine, using this
    /// engine's own metrics provider, so coordinates produced by
    /// Text/Row/Rows land identically on every engine.
    fn add_text_raw(
        &mut self,
        run: &TextRun,
        color_key: &str,
        x: i32,
        y: i32,
        align: Align,
        valign: Valign,
    ) -> Result<()>;

    /// Normalize a layout angle to this engine's native rotation direction
    ///
    /// Layout angles are counterclockwise degrees for positive values;
    /// engines whose native rotation runs the other way invert the sign
    /// here and document it.
    fn angle(&self, angle: i32) -> i32;

    /// Apply this engine's font-metric unit correction to a value
    ///
    /// Identity for pixel-native engines. The one seam where the unit
    /// ratio between the engines may appear.
    fn corrected_value(&self, value: f32) -> f32;

    /// Serialize the canvas; `quality` applies to lossy formats (0-100)
    fn image_bytes(&mut self, format: OutputFormat, quality: u8) -> Result<Vec<u8>>;

    /// Drop the canvas, loaded photo and registered colors
    ///
    /// Also happens on Drop; calling it merely makes the release explicit
    /// mid-lifetime so a builder can be reused for the next render.
    fn reset(&mut self);

    /// The metrics provider whose numbers match this engine
    fn metrics(&self) -> Arc<dyn FontMetricsProvider>;
}
