//! Styled text runs and their measured extents

/// One styled span of text: content plus the font it renders with
///
/// Immutable value object; constructed once per page definition and shared
/// read-only across renders. The font path arrives already resolved to an
/// absolute file path by the configuration layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextRun {
    /// UTF-8 text content
    pub content: String,
    /// Absolute path to the font file
    pub font_path: String,
    /// Font size in pixels; zero is rejected at measurement time
    pub font_size: u32,
    /// Rotation in degrees, counterclockwise for positive values, 0 = horizontal
    pub angle: i32,
}

impl TextRun {
    pub fn new(
        content: impl Into<String>,
        font_path: impl Into<String>,
        font_size: u32,
        angle: i32,
    ) -> Self {
        Self {
            content: content.into(),
            font_path: font_path.into(),
            font_size,
            angle,
        }
    }

    /// Same run without rotation; what metrics providers measure before
    /// the bounding box is rotated.
    pub fn upright(&self) -> TextRun {
        TextRun {
            angle: 0,
            ..self.clone()
        }
    }
}

/// Pixel bounding box of a rendered run, independent of position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const ZERO: Extent = Extent::new(0, 0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upright_drops_angle_only() {
        let run = TextRun::new("Mai", "/fonts/a.ttf", 24, 90);
        let upright = run.upright();
        assert_eq!(upright.angle, 0);
        assert_eq!(upright.content, run.content);
        assert_eq!(upright.font_size, run.font_size);
    }
}
