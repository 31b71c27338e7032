//! The two per-engine font metrics providers
//!
//! The raster engine thinks in pixels (96 dpi); the vector engine's native
//! font unit is the point (72 dpi). Both providers report extents in
//! pixels so the layout engine never sees the difference; the 4/3 ratio
//! between the units lives in this file and in the vector builder's
//! `corrected_value`, nowhere else.

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

use pictext_core::error::{MetricsError, Result};
use pictext_core::{Extent, FontMetricsProvider, TextRun};

use crate::FontDatabase;

/// Pixels per typographic point at 96 dpi screen resolution
pub const PX_PER_PT: f32 = 96.0 / 72.0;

const MEASURE_CACHE_SIZE: usize = 512;

/// Which unit a provider's engine natively measures in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetricUnit {
    Pixel,
    Point,
}

impl MetricUnit {
    fn to_native(self, px: f32) -> f32 {
        match self {
            MetricUnit::Pixel => px,
            MetricUnit::Point => px / PX_PER_PT,
        }
    }

    fn to_px(self, native: f32) -> f32 {
        match self {
            MetricUnit::Pixel => native,
            MetricUnit::Point => native * PX_PER_PT,
        }
    }
}

/// Key for caching measured extents
///
/// Uniquely identifies a measurement by font path, content and size; the
/// angle is handled above this layer and never reaches the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MeasureKey {
    font_path: String,
    content: String,
    font_size: u32,
}

/// Shared measurement engine behind both providers
struct MetricsEngine {
    unit: MetricUnit,
    fonts: Mutex<FontDatabase>,
    cache: Mutex<LruCache<MeasureKey, Extent>>,
}

impl MetricsEngine {
    fn new(unit: MetricUnit) -> Self {
        Self {
            unit,
            fonts: Mutex::new(FontDatabase::new()),
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(MEASURE_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN),
            )),
        }
    }

    fn measure(&self, run: &TextRun) -> Result<Extent> {
        if run.font_size == 0 {
            return Err(MetricsError::ZeroFontSize {
                font: run.font_path.clone(),
            }
            .into());
        }

        let key = MeasureKey {
            font_path: run.font_path.clone(),
            content: run.content.clone(),
            font_size: run.font_size,
        };
        if let Some(extent) = self.cache.lock().get(&key) {
            return Ok(*extent);
        }

        let font = self.fonts.lock().load(&run.font_path)?;
        let upem = font.units_per_em() as f32;
        let native_size = self.unit.to_native(run.font_size as f32);

        // Width from actual glyph advances, height from the line box;
        // conversion back to pixels happens before rounding so both
        // providers report identical integers for the same run
        let native_width = font.text_advance_units(&run.content) * native_size / upem;
        let native_height = font.line_units() * native_size / upem;
        let extent = Extent::new(
            self.unit.to_px(native_width).round() as u32,
            self.unit.to_px(native_height).round() as u32,
        );

        self.cache.lock().put(key, extent);
        Ok(extent)
    }

    fn line_height(&self, font_path: &str, font_size: u32) -> Result<u32> {
        if font_size == 0 {
            return Err(MetricsError::ZeroFontSize {
                font: font_path.to_owned(),
            }
            .into());
        }
        let font = self.fonts.lock().load(font_path)?;
        let native_size = self.unit.to_native(font_size as f32);
        let native = font.line_units() * native_size / font.units_per_em() as f32;
        Ok(self.unit.to_px(native).round() as u32)
    }
}

/// Pixel-native font metrics, matching the raster engine
pub struct PxFontMetrics {
    engine: MetricsEngine,
}

impl PxFontMetrics {
    pub fn new() -> Self {
        Self {
            engine: MetricsEngine::new(MetricUnit::Pixel),
        }
    }
}

impl Default for PxFontMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl FontMetricsProvider for PxFontMetrics {
    fn name(&self) -> &'static str {
        "px"
    }

    fn measure(&self, run: &TextRun) -> Result<Extent> {
        self.engine.measure(run)
    }

    fn line_height(&self, font_path: &str, font_size: u32) -> Result<u32> {
        self.engine.line_height(font_path, font_size)
    }
}

/// Point-native font metrics, matching the vector engine
///
/// Internally measures in points and reconciles through [`PX_PER_PT`]
/// before reporting, so its extents line up with [`PxFontMetrics`] and
/// the layout math stays engine-agnostic.
pub struct PtFontMetrics {
    engine: MetricsEngine,
}

impl PtFontMetrics {
    pub fn new() -> Self {
        Self {
            engine: MetricsEngine::new(MetricUnit::Point),
        }
    }
}

impl Default for PtFontMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl FontMetricsProvider for PtFontMetrics {
    fn name(&self) -> &'static str {
        "pt"
    }

    fn measure(&self, run: &TextRun) -> Result<Extent> {
        self.engine.measure(run)
    }

    fn line_height(&self, font_path: &str, font_size: u32) -> Result<u32> {
        self.engine.line_height(font_path, font_size)
    }

    fn scale_correction(&self) -> f32 {
        PX_PER_PT
    }
}

/// Helpers for tests that need a real font file
pub mod test_support {
    use std::path::PathBuf;

    /// Find an installed TrueType/OpenType font, searching the usual
    /// platform directories. Tests skip when this returns `None`.
    pub fn system_font() -> Option<PathBuf> {
        let roots = [
            "/usr/share/fonts",
            "/usr/local/share/fonts",
            "/System/Library/Fonts",
            "C:\\Windows\\Fonts",
        ];
        for root in roots {
            if let Some(found) = find_font(PathBuf::from(root), 0) {
                return Some(found);
            }
        }
        None
    }

    fn find_font(dir: PathBuf, depth: usize) -> Option<PathBuf> {
        if depth > 4 {
            return None;
        }
        let entries = std::fs::read_dir(dir).ok()?;
        let mut subdirs = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                subdirs.push(path);
            } else if matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("ttf") | Some("otf")
            ) {
                return Some(path);
            }
        }
        subdirs
            .into_iter()
            .find_map(|sub| find_font(sub, depth + 1))
    }
}
