//! Glyph outline extraction for the raster text path
//!
//! skrifa hands us outlines in font space (y-up, already scaled to the
//! requested pixel size); the pen flips them into screen space while
//! building a kurbo path, and the path is then translated into tiny-skia's
//! native format for filling.

use kurbo::{BezPath, PathEl, Point};
use skrifa::outline::DrawSettings;
use skrifa::MetadataProvider;
use tiny_skia::PathBuilder;

use pictext_core::error::{RenderError, Result};

/// Builds a screen-space (y-down) kurbo path from a glyph outline
pub(crate) struct ScreenPathPen {
    path: BezPath,
}

impl ScreenPathPen {
    pub(crate) fn new() -> Self {
        Self {
            path: BezPath::new(),
        }
    }

    pub(crate) fn finish(self) -> BezPath {
        self.path
    }

    fn point(x: f32, y: f32) -> Point {
        Point::new(f64::from(x), f64::from(-y))
    }
}

impl skrifa::outline::OutlinePen for ScreenPathPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.path.move_to(Self::point(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.path.line_to(Self::point(x, y));
    }

    fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) {
        self.path
            .quad_to(Self::point(cx, cy), Self::point(x, y));
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.path.curve_to(
            Self::point(cx0, cy0),
            Self::point(cx1, cy1),
            Self::point(x, y),
        );
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}

/// Extract one glyph as a screen-space path at the given pixel size
///
/// `None` for glyphs without an outline (spaces and friends).
pub(crate) fn glyph_outline(
    font_data: &[u8],
    glyph_id: u32,
    font_size: f32,
) -> Result<Option<BezPath>> {
    let font_ref = skrifa::FontRef::new(font_data)
        .map_err(|e| RenderError::BackendError(format!("skrifa rejected font data: {e}")))?;

    let outlines = font_ref.outline_glyphs();
    let Some(glyph) = outlines.get(skrifa::GlyphId::new(glyph_id)) else {
        return Ok(None);
    };

    let mut pen = ScreenPathPen::new();
    let size = skrifa::instance::Size::new(font_size);
    let settings = DrawSettings::unhinted(size, skrifa::instance::LocationRef::default());
    glyph
        .draw(settings, &mut pen)
        .map_err(|_| RenderError::OutlineExtractionFailed { glyph_id })?;

    let path = pen.finish();
    if path.elements().is_empty() {
        return Ok(None);
    }
    Ok(Some(path))
}

/// Translate kurbo's path format into tiny-skia's native format
pub(crate) fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut builder = PathBuilder::new();
    for element in path.elements() {
        match *element {
            PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(ctrl, end) => {
                builder.quad_to(ctrl.x as f32, ctrl.y as f32, end.x as f32, end.y as f32)
            },
            PathEl::CurveTo(c1, c2, end) => builder.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                end.x as f32,
                end.y as f32,
            ),
            PathEl::ClosePath => builder.close(),
        }
    }
    builder.finish()
}
