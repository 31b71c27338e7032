//! Raster image builder backed by tiny-skia
//!
//! The pixel engine: photos, rectangles, lines and glyph outlines all land
//! on one premultiplied RGBA pixmap, and the finished canvas serializes to
//! JPEG or PNG. Glyphs are extracted with skrifa and filled as true vector
//! paths, so rotated captions stay crisp instead of turning into resampled
//! bitmaps.
//!
//! All mutable rendering state lives in the builder and is scoped to one
//! render; `reset` and Drop both release it, error paths included.

mod glyph;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use image::ImageEncoder;
use tiny_skia::{
    FillRule, FilterQuality, IntSize, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke,
    Transform,
};

use pictext_core::error::{ExportError, RenderError, Result};
use pictext_core::{
    Align, Color, FontMetricsProvider, ImageBuilder, OutputFormat, PhotoFormat, TextRun, Valign,
};
use pictext_fontdb::{FontDatabase, PxFontMetrics};
use pictext_layout::{Metrics, Text};

use glyph::{glyph_outline, to_skia_path};

/// tiny-skia powered [`ImageBuilder`]
///
/// Cheap to instantiate: independent render pipelines can each own one
/// without sharing anything.
pub struct SkiaImageBuilder {
    canvas: Option<Pixmap>,
    photo: Option<Pixmap>,
    colors: HashMap<String, Color>,
    fonts: FontDatabase,
    metrics: Arc<PxFontMetrics>,
}

impl SkiaImageBuilder {
    pub fn new() -> Self {
        Self {
            canvas: None,
            photo: None,
            colors: HashMap::new(),
            fonts: FontDatabase::new(),
            metrics: Arc::new(PxFontMetrics::new()),
        }
    }

    fn color(&self, key: &str) -> Result<Color> {
        self.colors
            .get(key)
            .copied()
            .ok_or_else(|| RenderError::ColorNotRegistered { key: key.to_owned() }.into())
    }

    fn paint(color: Color) -> Paint<'static> {
        let mut paint = Paint {
            anti_alias: true,
            ..Paint::default()
        };
        paint.set_color(tiny_skia::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
        paint
    }

    fn canvas_mut(&mut self, operation: &'static str) -> Result<&mut Pixmap> {
        self.canvas
            .as_mut()
            .ok_or_else(|| RenderError::NoCanvas { operation }.into())
    }

    /// Decode an image and premultiply it into a pixmap
    ///
    /// `knockout` pixels (RGB match, alpha ignored) become fully
    /// transparent before premultiplication.
    fn decode_to_pixmap(bytes: &[u8], knockout: Option<Color>) -> Result<Pixmap> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| RenderError::SourceDecode(e.to_string()))?
            .to_rgba8();
        let (width, height) = decoded.dimensions();

        let mut data = decoded.into_raw();
        for px in data.chunks_exact_mut(4) {
            if let Some(bg) = knockout {
                if bg.rgb_eq(&Color::rgb(px[0], px[1], px[2])) {
                    px[3] = 0;
                }
            }
            let a = u16::from(px[3]);
            if a < 255 {
                px[0] = ((u16::from(px[0]) * a) / 255) as u8;
                px[1] = ((u16::from(px[1]) * a) / 255) as u8;
                px[2] = ((u16::from(px[2]) * a) / 255) as u8;
            }
        }

        let size = IntSize::from_wh(width, height)
            .ok_or(RenderError::InvalidDimensions { width, height })?;
        Pixmap::from_vec(data, size)
            .ok_or_else(|| RenderError::SourceDecode("pixmap allocation failed".to_owned()).into())
    }

    /// Scale `source` into the box (x, y, width, height) on the canvas
    fn blit_scaled(
        &mut self,
        source: &Pixmap,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        operation: &'static str,
    ) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height }.into());
        }
        let sx = width as f32 / source.width() as f32;
        let sy = height as f32 / source.height() as f32;
        let transform = Transform::from_row(sx, 0.0, 0.0, sy, x as f32, y as f32);
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        let canvas = self.canvas_mut(operation)?;
        canvas.draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);
        Ok(())
    }

    /// Canvas pixels with premultiplication undone, as straight RGBA
    fn straight_rgba(canvas: &Pixmap) -> Vec<u8> {
        let mut out = Vec::with_capacity(canvas.pixels().len() * 4);
        for px in canvas.pixels() {
            let c = px.demultiply();
            out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }
}

impl Default for SkiaImageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBuilder for SkiaImageBuilder {
    fn name(&self) -> &'static str {
        "skia"
    }

    fn create_image(&mut self, width: u32, height: u32) -> Result<()> {
        let pixmap =
            Pixmap::new(width, height).ok_or(RenderError::InvalidDimensions { width, height })?;
        self.canvas = Some(pixmap);
        Ok(())
    }

    fn create_image_from_file(&mut self, path: &Path, format: PhotoFormat) -> Result<()> {
        log::debug!("loading photo {} ({:?})", path.display(), format);
        let bytes = std::fs::read(path)?;
        self.photo = Some(Self::decode_to_pixmap(&bytes, None)?);
        Ok(())
    }

    fn create_color(&mut self, key: &str, color: Color) -> Result<()> {
        self.colors.insert(key.to_owned(), color);
        Ok(())
    }

    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color_key: &str) -> Result<()> {
        let color = self.color(color_key)?;
        let mut builder = PathBuilder::new();
        builder.move_to(x1 as f32, y1 as f32);
        builder.line_to(x2 as f32, y2 as f32);
        let path = builder
            .finish()
            .ok_or_else(|| RenderError::BackendError("degenerate line path".to_owned()))?;
        let paint = Self::paint(color);
        let stroke = Stroke {
            width: 1.0,
            ..Stroke::default()
        };
        let canvas = self.canvas_mut("draw_line")?;
        canvas.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        Ok(())
    }

    fn add_rectangle(
        &mut self,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        color_key: &str,
    ) -> Result<()> {
        let color = self.color(color_key)?;
        let rect = Rect::from_xywh(x as f32, y as f32, width as f32, height as f32)
            .ok_or(RenderError::InvalidDimensions { width, height })?;
        let paint = Self::paint(color);
        let canvas = self.canvas_mut("add_rectangle")?;
        canvas.fill_rect(rect, &paint, Transform::identity(), None);
        Ok(())
    }

    fn add_image(&mut self, x: i32, y: i32, width: u32, height: u32) -> Result<()> {
        let photo = self
            .photo
            .take()
            .ok_or(RenderError::NoSourceImage {
                operation: "add_image",
            })?;
        let result = self.blit_scaled(&photo, x, y, width, height, "add_image");
        self.photo = Some(photo);
        result
    }

    fn add_image_blob(
        &mut self,
        blob: &[u8],
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        knockout: Color,
    ) -> Result<()> {
        let pixmap = Self::decode_to_pixmap(blob, Some(knockout))?;
        self.blit_scaled(&pixmap, x, y, width, height, "add_image_blob")
    }

    fn add_text_raw(
        &mut self,
        run: &TextRun,
        color_key: &str,
        x: i32,
        y: i32,
        align: Align,
        valign: Valign,
    ) -> Result<()> {
        let color = self.color(color_key)?;

        // Same anchoring math as the layout engine, on this engine's own
        // metrics, so coordinates from Text/Row/Rows land identically
        let provider = self.metrics.clone();
        let layout = Metrics::new(provider.as_ref());
        let anchored = Text::new(run.clone()).metrics(&layout, x, y, align, valign)?;

        let font = self.fonts.load(&run.font_path)?;
        let font_size = self.corrected_value(run.font_size as f32);
        let angle = self.angle(run.angle);
        let radians = (angle as f32).to_radians();
        let (cos, sin) = (radians.cos(), radians.sin());
        let scale = font_size / font.units_per_em() as f32;

        log::debug!(
            "skia text '{}' at ({}, {}) angle {}",
            run.content,
            anchored.x,
            anchored.y,
            angle
        );

        let paint = Self::paint(color);
        let mut pen_x = anchored.x as f32;
        let mut pen_y = anchored.y as f32;
        let canvas = self
            .canvas
            .as_mut()
            .ok_or(RenderError::NoCanvas {
                operation: "add_text_raw",
            })?;

        for ch in run.content.chars() {
            let glyph_id = font.glyph_id(ch).unwrap_or(0);
            if let Some(outline) = glyph_outline(font.data(), glyph_id, font_size)? {
                if let Some(path) = to_skia_path(&outline) {
                    // Rotate counterclockwise about the pen position; the
                    // outline is already in y-down screen space
                    let transform = Transform::from_row(cos, -sin, sin, cos, pen_x, pen_y);
                    canvas.fill_path(&path, &paint, FillRule::Winding, transform, None);
                }
            }
            let advance = font.advance_units(glyph_id) * scale;
            pen_x += advance * cos;
            pen_y -= advance * sin;
        }
        Ok(())
    }

    /// Layout angles are already this engine's native direction
    /// (counterclockwise for positive values)
    fn angle(&self, angle: i32) -> i32 {
        angle
    }

    /// Pixel-native metrics need no unit correction
    fn corrected_value(&self, value: f32) -> f32 {
        value
    }

    fn image_bytes(&mut self, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
        let canvas = self
            .canvas
            .as_ref()
            .ok_or(RenderError::NoCanvas {
                operation: "image_bytes",
            })?;
        match format {
            OutputFormat::Png => canvas
                .encode_png()
                .map_err(|e| ExportError::EncodingFailed(e.to_string()).into()),
            OutputFormat::Jpeg => {
                // JPEG has no alpha channel; demultiply and drop it
                let rgba = Self::straight_rgba(canvas);
                let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
                for px in rgba.chunks_exact(4) {
                    rgb.extend_from_slice(&px[..3]);
                }
                let mut out = Vec::new();
                let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                    &mut out,
                    quality.clamp(1, 100),
                );
                encoder
                    .write_image(
                        &rgb,
                        canvas.width(),
                        canvas.height(),
                        image::ExtendedColorType::Rgb8,
                    )
                    .map_err(|e| ExportError::EncodingFailed(e.to_string()))?;
                Ok(out)
            },
            OutputFormat::Svg => {
                Err(ExportError::FormatNotSupported("svg on a raster engine".to_owned()).into())
            },
        }
    }

    fn reset(&mut self) {
        self.canvas = None;
        self.photo = None;
        self.colors.clear();
    }

    fn metrics(&self) -> Arc<dyn FontMetricsProvider> {
        self.metrics.clone()
    }
}

impl Drop for SkiaImageBuilder {
    fn drop(&mut self) {
        // Release pixel buffers on every exit path, not just happy ones
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pictext_fontdb::metrics::test_support::system_font;

    fn builder_with_canvas(width: u32, height: u32) -> SkiaImageBuilder {
        let mut builder = SkiaImageBuilder::new();
        builder.create_image(width, height).unwrap();
        builder
    }

    fn tiny_png(color: [u8; 4]) -> Vec<u8> {
        let mut img = image::RgbaImage::new(4, 4);
        for px in img.pixels_mut() {
            *px = image::Rgba(color);
        }
        let mut out = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut out),
            image::ImageFormat::Png,
        )
        .unwrap();
        out
    }

    #[test]
    fn test_builder_name() {
        assert_eq!(SkiaImageBuilder::new().name(), "skia");
    }

    #[test]
    fn test_zero_canvas_is_invalid() {
        let mut builder = SkiaImageBuilder::new();
        assert!(builder.create_image(0, 10).is_err());
    }

    #[test]
    fn test_draw_without_canvas_reports_operation() {
        let mut builder = SkiaImageBuilder::new();
        builder.create_color("ink", Color::black()).unwrap();
        let err = builder.draw_line(0, 0, 5, 5, "ink").unwrap_err();
        assert!(err.to_string().contains("draw_line"));
    }

    #[test]
    fn test_unregistered_color_reports_key() {
        let mut builder = builder_with_canvas(8, 8);
        let err = builder.add_rectangle(0, 0, 4, 4, "missing").unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_rectangle_fills_pixels() {
        let mut builder = builder_with_canvas(8, 8);
        builder
            .create_color("red", Color::rgb(255, 0, 0))
            .unwrap();
        builder.add_rectangle(0, 0, 8, 8, "red").unwrap();
        let canvas = builder.canvas.as_ref().unwrap();
        let px = canvas.pixels()[0].demultiply();
        assert_eq!((px.red(), px.green(), px.blue()), (255, 0, 0));
    }

    #[test]
    fn test_reregistering_color_replaces_it() {
        let mut builder = builder_with_canvas(8, 8);
        builder.create_color("ink", Color::rgb(1, 2, 3)).unwrap();
        builder
            .create_color("ink", Color::rgb(255, 255, 255))
            .unwrap();
        assert_eq!(builder.color("ink").unwrap(), Color::rgb(255, 255, 255));
    }

    #[test]
    fn test_png_bytes_have_magic() {
        let mut builder = builder_with_canvas(4, 4);
        let png = builder.image_bytes(OutputFormat::Png, 0).unwrap();
        assert_eq!(&png[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    }

    #[test]
    fn test_jpeg_bytes_have_magic() {
        let mut builder = builder_with_canvas(4, 4);
        let jpeg = builder.image_bytes(OutputFormat::Jpeg, 85).unwrap();
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_svg_export_is_unsupported() {
        let mut builder = builder_with_canvas(4, 4);
        assert!(builder.image_bytes(OutputFormat::Svg, 0).is_err());
    }

    #[test]
    fn test_blob_knockout_makes_background_transparent() {
        let mut builder = builder_with_canvas(4, 4);
        let blob = tiny_png([10, 20, 30, 255]);
        builder
            .add_image_blob(&blob, 0, 0, 4, 4, Color::rgb(10, 20, 30))
            .unwrap();
        // Every blob pixel matched the knockout color, so nothing landed
        let canvas = builder.canvas.as_ref().unwrap();
        assert!(canvas.pixels().iter().all(|p| p.alpha() == 0));
    }

    #[test]
    fn test_blob_knockout_matches_on_rgb_ignoring_alpha() {
        let mut builder = builder_with_canvas(4, 4);
        let blob = tiny_png([10, 20, 30, 255]);
        builder
            .add_image_blob(&blob, 0, 0, 4, 4, Color::rgba(10, 20, 30, 0))
            .unwrap();
        let canvas = builder.canvas.as_ref().unwrap();
        assert!(canvas.pixels().iter().all(|p| p.alpha() == 0));
    }

    #[test]
    fn test_blob_without_knockout_match_lands() {
        let mut builder = builder_with_canvas(4, 4);
        let blob = tiny_png([10, 20, 30, 255]);
        builder
            .add_image_blob(&blob, 0, 0, 4, 4, Color::rgb(200, 200, 200))
            .unwrap();
        let canvas = builder.canvas.as_ref().unwrap();
        assert!(canvas.pixels().iter().all(|p| p.alpha() == 255));
    }

    #[test]
    fn test_add_image_without_photo_fails() {
        let mut builder = builder_with_canvas(4, 4);
        let err = builder.add_image(0, 0, 4, 4).unwrap_err();
        assert!(err.to_string().contains("add_image"));
    }

    #[test]
    fn test_reset_releases_everything() {
        let mut builder = builder_with_canvas(4, 4);
        builder.create_color("ink", Color::black()).unwrap();
        builder.reset();
        assert!(builder.canvas.is_none());
        assert!(builder.colors.is_empty());
        assert!(builder.image_bytes(OutputFormat::Png, 0).is_err());
    }

    #[test]
    fn test_angle_and_correction_are_identity() {
        let builder = SkiaImageBuilder::new();
        assert_eq!(builder.angle(37), 37);
        assert_eq!(builder.corrected_value(20.0), 20.0);
    }

    #[test]
    fn test_text_marks_pixels() {
        let Some(font) = system_font() else {
            eprintln!("no system font found, skipping");
            return;
        };
        let mut builder = builder_with_canvas(200, 60);
        builder.create_color("ink", Color::black()).unwrap();
        let run = TextRun::new("Mai", font.to_string_lossy(), 32, 0);
        builder
            .add_text_raw(&run, "ink", 10, 45, Align::Left, Valign::Bottom)
            .unwrap();
        let canvas = builder.canvas.as_ref().unwrap();
        assert!(canvas.pixels().iter().any(|p| p.alpha() > 0));
    }
}
