//! Where fonts come to life: loading and measurement for Pictext
//!
//! The layout engine asks geometry questions; this crate owns the fonts
//! that answer them. Fonts keep their raw bytes and create a `FontRef` on
//! demand for table access, so a single loaded font serves any number of
//! concurrent renders without shared mutable state.
//!
//! The two production [`FontMetricsProvider`](pictext_core::FontMetricsProvider)
//! implementations live in [`metrics`], one per rendering engine.

pub mod metrics;

pub use metrics::{PtFontMetrics, PxFontMetrics, PX_PER_PT};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use read_fonts::{FontRef as ReadFontRef, TableProvider};

use pictext_core::error::{FontLoadError, Result};

/// A font brought into memory, ready to measure text
///
/// Stores the raw font data plus the handful of global metrics every
/// measurement needs (units per em, ascender, descender), extracted once
/// at load time.
pub struct Font {
    data: Vec<u8>,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
}

impl Font {
    /// Opens a font file from disk and makes it usable
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = fs::read(path.as_ref())
            .map_err(|_| FontLoadError::FileNotFound(path.as_ref().display().to_string()))?;
        Self::from_data(data)
    }

    /// Turns raw font bytes into something we can work with
    pub fn from_data(data: Vec<u8>) -> Result<Self> {
        let font_ref = ReadFontRef::new(&data)
            .map_err(|e| FontLoadError::InvalidData(e.to_string()))?;

        let units_per_em = font_ref
            .head()
            .map(|head| head.units_per_em())
            .unwrap_or(1000);

        // hhea carries the nominal line box; fall back to one em when the
        // table is absent so empty-text measurement stays defined
        let (ascender, descender) = font_ref
            .hhea()
            .map(|hhea| (hhea.ascender().to_i16(), hhea.descender().to_i16()))
            .unwrap_or((units_per_em as i16, 0));

        Ok(Font {
            data,
            units_per_em,
            ascender,
            descender,
        })
    }

    /// Raw font bytes as they live in the file
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The font's internal coordinate system scale
    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// Creates a FontRef on-demand for parsing operations
    fn font_ref(&self) -> Option<ReadFontRef<'_>> {
        ReadFontRef::new(&self.data).ok()
    }

    /// Finds which glyph draws this character
    pub fn glyph_id(&self, ch: char) -> Option<u32> {
        self.font_ref()
            .and_then(|font| font.cmap().ok()?.map_codepoint(ch).map(|gid| gid.to_u32()))
    }

    /// Advance of a glyph in font units
    ///
    /// Half an em when the metrics table cannot answer; a readable but
    /// slightly wrong width beats a failed render here.
    pub fn advance_units(&self, glyph_id: u32) -> f32 {
        self.font_ref()
            .and_then(|font| {
                let hmtx = font.hmtx().ok()?;
                use read_fonts::types::GlyphId;
                let advance = hmtx.advance(GlyphId::new(glyph_id))?;
                Some(advance as f32)
            })
            .unwrap_or(self.units_per_em as f32 / 2.0)
    }

    /// Sum of glyph advances for a string, in font units
    ///
    /// Characters the font has no glyph for fall back to the .notdef
    /// advance, so width never silently drops below the rendered result.
    pub fn text_advance_units(&self, text: &str) -> f32 {
        text.chars()
            .map(|ch| self.advance_units(self.glyph_id(ch).unwrap_or(0)))
            .sum()
    }

    /// Nominal line height in font units (ascender minus descender)
    pub fn line_units(&self) -> f32 {
        (self.ascender as i32 - self.descender as i32) as f32
    }
}

/// Loaded fonts keyed by canonical path
///
/// Prevents re-reading and re-parsing the same font file across runs of a
/// render; pages tend to reuse two or three fonts for every caption.
#[derive(Default)]
pub struct FontDatabase {
    path_cache: HashMap<PathBuf, Arc<Font>>,
}

impl FontDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a font file, or returns the cached copy for its path
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<Arc<Font>> {
        let path = path.as_ref();
        let cache_key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if let Some(font) = self.path_cache.get(&cache_key) {
            return Ok(font.clone());
        }

        let font = Arc::new(Font::from_file(path)?);
        log::debug!(
            "loaded font {} (upem {})",
            path.display(),
            font.units_per_em()
        );
        self.path_cache.insert(cache_key, font.clone());
        Ok(font)
    }

    pub fn len(&self) -> usize {
        self.path_cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path_cache.is_empty()
    }
}
