//! Error types for Pictext

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PictextError>;

/// Main error type for Pictext
#[derive(Debug, Error)]
pub enum PictextError {
    #[error("Font loading failed: {0}")]
    FontLoad(#[from] FontLoadError),

    #[error("Metrics computation failed: {0}")]
    Metrics(#[from] MetricsError),

    #[error("Rendering failed: {0}")]
    Rendering(#[from] RenderError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Font loading errors
#[derive(Debug, Error)]
pub enum FontLoadError {
    #[error("Font file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid font data: {0}")]
    InvalidData(String),
}

/// Metrics computation errors
///
/// A font that loads but cannot answer a metrics query is a fatal
/// configuration problem for the render that asked, never retried.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Font size must be positive (font: {font})")]
    ZeroFontSize { font: String },

    #[error("No metrics available for '{text}' in {font}")]
    Unavailable { text: String, font: String },
}

/// Rendering errors
///
/// Resource failures carry the operation and key so a failing draw call
/// can be traced back to the page definition that produced it.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid canvas dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("No canvas for operation '{operation}'")]
    NoCanvas { operation: &'static str },

    #[error("No source image loaded for operation '{operation}'")]
    NoSourceImage { operation: &'static str },

    #[error("Color '{key}' is not registered")]
    ColorNotRegistered { key: String },

    #[error("Source image could not be decoded: {0}")]
    SourceDecode(String),

    #[error("Glyph outline extraction failed for glyph {glyph_id}")]
    OutlineExtractionFailed { glyph_id: u32 },

    #[error("Backend error: {0}")]
    BackendError(String),
}

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Format not supported: {0}")]
    FormatNotSupported(String),

    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}
