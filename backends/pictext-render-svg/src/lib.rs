//! Vector image builder emitting SVG documents
//!
//! The compositing engine: instead of touching pixels it accumulates SVG
//! elements and serializes them as one document. Text never becomes a
//! `<text>` element; glyph outlines are extracted from the font with
//! skrifa and emitted as perfect vector paths, so the output needs no
//! fonts installed wherever it is viewed. Photos and blobs ride along as
//! base64 data URIs.
//!
//! Given the same layout output and draw calls, this engine and the
//! raster engine place everything identically; the unit seam between
//! them lives in [`corrected_value`](SvgImageBuilder::corrected_value).

use std::collections::HashMap;
use std::fmt::Write as FmtWrite;
use std::path::Path;
use std::sync::Arc;

use base64::Engine as _;
use skrifa::outline::DrawSettings;
use skrifa::MetadataProvider;

use pictext_core::error::{ExportError, RenderError, Result};
use pictext_core::{
    Align, Color, FontMetricsProvider, ImageBuilder, OutputFormat, PhotoFormat, TextRun, Valign,
};
use pictext_fontdb::{FontDatabase, PtFontMetrics, PX_PER_PT};
use pictext_layout::{Metrics, Text};

/// SVG vector [`ImageBuilder`]
pub struct SvgImageBuilder {
    size: Option<(u32, u32)>,
    elements: Vec<String>,
    colors: HashMap<String, Color>,
    photo: Option<(Vec<u8>, PhotoFormat)>,
    fonts: FontDatabase,
    metrics: Arc<PtFontMetrics>,
}

impl SvgImageBuilder {
    pub fn new() -> Self {
        Self {
            size: None,
            elements: Vec::new(),
            colors: HashMap::new(),
            photo: None,
            fonts: FontDatabase::new(),
            metrics: Arc::new(PtFontMetrics::new()),
        }
    }

    fn color(&self, key: &str) -> Result<Color> {
        self.colors
            .get(key)
            .copied()
            .ok_or_else(|| RenderError::ColorNotRegistered { key: key.to_owned() }.into())
    }

    fn require_canvas(&self, operation: &'static str) -> Result<(u32, u32)> {
        self.size
            .ok_or_else(|| RenderError::NoCanvas { operation }.into())
    }

    fn fill_attrs(color: Color) -> String {
        format!(
            r#"fill="rgb({},{},{})" fill-opacity="{:.3}""#,
            color.r,
            color.g,
            color.b,
            f32::from(color.a) / 255.0
        )
    }

    fn push_data_uri_image(
        &mut self,
        bytes: &[u8],
        mime: &str,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        self.elements.push(format!(
            r#"  <image x="{x}" y="{y}" width="{width}" height="{height}" preserveAspectRatio="none" href="data:{mime};base64,{encoded}"/>"#
        ));
    }
}

impl Default for SvgImageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBuilder for SvgImageBuilder {
    fn name(&self) -> &'static str {
        "svg"
    }

    fn create_image(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height }.into());
        }
        self.size = Some((width, height));
        self.elements.clear();
        Ok(())
    }

    fn create_image_from_file(&mut self, path: &Path, format: PhotoFormat) -> Result<()> {
        log::debug!("loading photo {} ({:?})", path.display(), format);
        let bytes = std::fs::read(path)?;
        self.photo = Some((bytes, format));
        Ok(())
    }

    fn create_color(&mut self, key: &str, color: Color) -> Result<()> {
        self.colors.insert(key.to_owned(), color);
        Ok(())
    }

    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color_key: &str) -> Result<()> {
        let color = self.color(color_key)?;
        self.require_canvas("draw_line")?;
        self.elements.push(format!(
            r#"  <line x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}" stroke="rgb({},{},{})" stroke-opacity="{:.3}" stroke-width="1"/>"#,
            color.r,
            color.g,
            color.b,
            f32::from(color.a) / 255.0
        ));
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
        self.require_canvas("add_rectangle")?;
        self.elements.push(format!(
            r#"  <rect x="{x}" y="{y}" width="{width}" height="{height}" {}/>"#,
            Self::fill_attrs(color)
        ));
        Ok(())
    }

    fn add_image(&mut self, x: i32, y: i32, width: u32, height: u32) -> Result<()> {
        self.require_canvas("add_image")?;
        let (bytes, format) = self
            .photo
            .take()
            .ok_or(RenderError::NoSourceImage {
                operation: "add_image",
            })?;
        let mime = match format {
            PhotoFormat::Jpeg => "image/jpeg",
            PhotoFormat::Png => "image/png",
        };
        self.push_data_uri_image(&bytes, mime, x, y, width, height);
        self.photo = Some((bytes, format));
        Ok(())
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
        self.require_canvas("add_image_blob")?;

        // SVG cannot key a color out of an embedded raster, so the
        // knockout happens here and the result re-encodes as PNG with a
        // real alpha channel
        let mut decoded = image::load_from_memory(blob)
            .map_err(|e| RenderError::SourceDecode(e.to_string()))?
            .to_rgba8();
        for px in decoded.pixels_mut() {
            let [r, g, b, _] = px.0;
            if knockout.rgb_eq(&Color::rgb(r, g, b)) {
                px.0[3] = 0;
            }
        }
        let mut bytes = Vec::new();
        decoded
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .map_err(|e| ExportError::EncodingFailed(e.to_string()))?;

        self.push_data_uri_image(&bytes, "image/png", x, y, width, height);
        Ok(())
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
        self.require_canvas("add_text_raw")?;

        let provider = self.metrics.clone();
        let layout = Metrics::new(provider.as_ref());
        let anchored = Text::new(run.clone()).metrics(&layout, x, y, align, valign)?;

        let font = self.fonts.load(&run.font_path)?;
        // Native font sizes are points here; converting back to user
        // units keeps glyphs the same visual size the raster engine draws
        let native_pt = self.corrected_value(run.font_size as f32);
        let px_size = native_pt * PX_PER_PT;
        let angle = self.angle(run.angle);

        log::debug!(
            "svg text '{}' at ({}, {}) rotate {}",
            run.content,
            anchored.x,
            anchored.y,
            angle
        );

        let font_ref = skrifa::FontRef::new(font.data())
            .map_err(|e| RenderError::BackendError(format!("skrifa rejected font data: {e}")))?;
        let outlines = font_ref.outline_glyphs();
        let scale = px_size / font.units_per_em() as f32;

        let mut group = format!(
            r#"  <g transform="translate({} {}) rotate({})" {}>"#,
            anchored.x,
            anchored.y,
            angle,
            Self::fill_attrs(color)
        );
        group.push('\n');

        let mut cursor = 0.0f32;
        for ch in run.content.chars() {
            let glyph_id = font.glyph_id(ch).unwrap_or(0);
            if let Some(glyph) = outlines.get(skrifa::GlyphId::new(glyph_id)) {
                let mut pen = SvgPathPen::new();
                let settings = DrawSettings::unhinted(
                    skrifa::instance::Size::new(px_size),
                    skrifa::instance::LocationRef::default(),
                );
                glyph
                    .draw(settings, &mut pen)
                    .map_err(|_| RenderError::OutlineExtractionFailed { glyph_id })?;
                let path = pen.finish();
                if !path.is_empty() {
                    let _ = writeln!(
                        &mut group,
                        r#"    <path d="{path}" transform="translate({cursor:.2} 0)"/>"#
                    );
                }
            }
            cursor += font.advance_units(glyph_id) * scale;
        }

        group.push_str("  </g>");
        self.elements.push(group);
        Ok(())
    }

    /// This engine's `rotate()` runs clockwise for positive values in its
    /// y-down viewport, the opposite of layout's convention, so the sign
    /// inverts here
    fn angle(&self, angle: i32) -> i32 {
        -angle
    }

    /// Pixels to this engine's native points
    fn corrected_value(&self, value: f32) -> f32 {
        value / PX_PER_PT
    }

    fn image_bytes(&mut self, format: OutputFormat, _quality: u8) -> Result<Vec<u8>> {
        let (width, height) = self.require_canvas("image_bytes")?;
        match format {
            OutputFormat::Svg => {
                let mut svg = String::new();
                let _ = writeln!(&mut svg, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
                let _ = writeln!(
                    &mut svg,
                    r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}">"#
                );
                for element in &self.elements {
                    let _ = writeln!(&mut svg, "{element}");
                }
                let _ = writeln!(&mut svg, "</svg>");
                Ok(svg.into_bytes())
            },
            other => Err(ExportError::FormatNotSupported(format!(
                "{} on a vector engine",
                other.extension()
            ))
            .into()),
        }
    }

    fn reset(&mut self) {
        self.size = None;
        self.elements.clear();
        self.colors.clear();
        self.photo = None;
    }

    fn metrics(&self) -> Arc<dyn FontMetricsProvider> {
        self.metrics.clone()
    }
}

impl Drop for SvgImageBuilder {
    fn drop(&mut self) {
        self.reset();
    }
}

/// Writes glyph outline commands as SVG path data
///
/// skrifa hands outlines over y-up; SVG wants y-down, so every y flips.
struct SvgPathPen {
    commands: String,
}

impl SvgPathPen {
    fn new() -> Self {
        Self {
            commands: String::new(),
        }
    }

    fn finish(self) -> String {
        self.commands
    }
}

impl skrifa::outline::OutlinePen for SvgPathPen {
    fn move_to(&mut self, x: f32, y: f32) {
        let _ = write!(&mut self.commands, "M{:.2},{:.2}", x, -y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let _ = write!(&mut self.commands, "L{:.2},{:.2}", x, -y);
    }

    fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) {
        let _ = write!(&mut self.commands, "Q{:.2},{:.2} {:.2},{:.2}", cx, -cy, x, -y);
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        let _ = write!(
            &mut self.commands,
            "C{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}",
            cx0, -cy0, cx1, -cy1, x, -y
        );
    }

    fn close(&mut self) {
        self.commands.push('Z');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pictext_fontdb::metrics::test_support::system_font;

    fn builder_with_canvas() -> SvgImageBuilder {
        let mut builder = SvgImageBuilder::new();
        builder.create_image(400, 300).unwrap();
        builder
    }

    fn document(builder: &mut SvgImageBuilder) -> String {
        let bytes = builder.image_bytes(OutputFormat::Svg, 0).unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_builder_name() {
        assert_eq!(SvgImageBuilder::new().name(), "svg");
    }

    #[test]
    fn test_document_frame() {
        let mut builder = builder_with_canvas();
        let svg = document(&mut builder);
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains(r#"viewBox="0 0 400 300""#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_rectangle_and_line_elements() {
        let mut builder = builder_with_canvas();
        builder
            .create_color("frame", Color::from_visibility(0, 0, 0, 50))
            .unwrap();
        builder.add_rectangle(10, 20, 100, 40, "frame").unwrap();
        builder.draw_line(0, 0, 400, 300, "frame").unwrap();
        let svg = document(&mut builder);
        assert!(svg.contains(r#"<rect x="10" y="20" width="100" height="40""#));
        assert!(svg.contains(r#"<line x1="0" y1="0" x2="400" y2="300""#));
        assert!(svg.contains("fill-opacity=\"0.498\""));
    }

    #[test]
    fn test_unregistered_color_reports_key() {
        let mut builder = builder_with_canvas();
        let err = builder.add_rectangle(0, 0, 1, 1, "nope").unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_draw_without_canvas_reports_operation() {
        let mut builder = SvgImageBuilder::new();
        builder.create_color("ink", Color::black()).unwrap();
        let err = builder.draw_line(0, 0, 1, 1, "ink").unwrap_err();
        assert!(err.to_string().contains("draw_line"));
    }

    #[test]
    fn test_blob_becomes_data_uri() {
        let mut builder = builder_with_canvas();
        let mut img = image::RgbaImage::new(2, 2);
        for px in img.pixels_mut() {
            *px = image::Rgba([255, 255, 255, 255]);
        }
        let mut blob = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut blob),
            image::ImageFormat::Png,
        )
        .unwrap();
        builder
            .add_image_blob(&blob, 5, 6, 50, 50, Color::white())
            .unwrap();
        let svg = document(&mut builder);
        assert!(svg.contains("data:image/png;base64,"));
        assert!(svg.contains(r#"x="5" y="6""#));
    }

    #[test]
    fn test_raster_export_is_unsupported() {
        let mut builder = builder_with_canvas();
        assert!(builder.image_bytes(OutputFormat::Jpeg, 90).is_err());
        assert!(builder.image_bytes(OutputFormat::Png, 0).is_err());
    }

    #[test]
    fn test_angle_inverts_sign() {
        let builder = SvgImageBuilder::new();
        assert_eq!(builder.angle(15), -15);
        assert_eq!(builder.angle(-90), 90);
    }

    #[test]
    fn test_corrected_value_converts_to_points() {
        let builder = SvgImageBuilder::new();
        assert!((builder.corrected_value(16.0) - 12.0).abs() < 1e-6);
    }

    #[test]
    fn test_reset_clears_document() {
        let mut builder = builder_with_canvas();
        builder.create_color("ink", Color::black()).unwrap();
        builder.add_rectangle(0, 0, 1, 1, "ink").unwrap();
        builder.reset();
        assert!(builder.image_bytes(OutputFormat::Svg, 0).is_err());
    }

    #[test]
    fn test_text_emits_outline_paths() {
        let Some(font) = system_font() else {
            eprintln!("no system font found, skipping");
            return;
        };
        let mut builder = builder_with_canvas();
        builder.create_color("ink", Color::black()).unwrap();
        let run = TextRun::new("Mai", font.to_string_lossy(), 32, 10);
        builder
            .add_text_raw(&run, "ink", 40, 200, Align::Left, Valign::Bottom)
            .unwrap();
        let svg = document(&mut builder);
        assert!(svg.contains("rotate(-10)"));
        assert!(svg.contains("<path d=\"M"));
        assert!(!svg.contains("<text"));
    }
}
