//! Alignment policies for anchored layout
//!
//! Every layout object resolves its absolute anchor from a caller-supplied
//! reference point and these two policies. The anchor is the point the
//! caller aligns against, not necessarily the box's top-left corner.

use std::str::FromStr;

use crate::error::PictextError;

/// Horizontal alignment against a reference x
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    /// Resolve the anchor x for a box of `width` aligned against `reference`.
    ///
    /// Left keeps the reference, Center shifts back by half the width,
    /// Right shifts back by the full width.
    pub fn anchor_x(self, reference: i32, width: u32) -> i32 {
        match self {
            Align::Left => reference,
            Align::Center => reference - (width as f64 / 2.0).round() as i32,
            Align::Right => reference - width as i32,
        }
    }
}

impl FromStr for Align {
    type Err = PictextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Align::Left),
            "center" => Ok(Align::Center),
            "right" => Ok(Align::Right),
            other => Err(PictextError::Config(format!("unknown align '{other}'"))),
        }
    }
}

/// Vertical alignment against a reference y
///
/// Baseline-anchored convention: the y every layout object returns is the
/// baseline a raster text call consumes. Bottom leaves the reference
/// untouched, Top and Middle *add* height so the reference names the box's
/// top edge or vertical center while the returned y stays a baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Valign {
    Top,
    Middle,
    Bottom,
}

impl Valign {
    /// Resolve the anchor y for a box of `height` aligned against `reference`.
    pub fn anchor_y(self, reference: i32, height: u32) -> i32 {
        match self {
            Valign::Top => reference + height as i32,
            Valign::Middle => reference + (height as f64 / 2.0).round() as i32,
            Valign::Bottom => reference,
        }
    }

    /// Offset of a member box of `height` inside a container of
    /// `container_height` sharing this policy.
    ///
    /// Bottom members share the container baseline; Top members share its
    /// top edge; Middle members share its vertical center. Used by Row to
    /// place runs shorter than the row.
    pub fn member_delta(self, height: u32, container_height: u32) -> i32 {
        let h = height as i32;
        let ch = container_height as i32;
        match self {
            Valign::Top => h - ch,
            Valign::Middle => (((h - ch) as f64) / 2.0).round() as i32,
            Valign::Bottom => 0,
        }
    }
}

impl FromStr for Valign {
    type Err = PictextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top" => Ok(Valign::Top),
            "middle" => Ok(Valign::Middle),
            "bottom" => Ok(Valign::Bottom),
            other => Err(PictextError::Config(format!("unknown valign '{other}'"))),
        }
    }
}
