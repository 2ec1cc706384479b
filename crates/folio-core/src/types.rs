// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core page-geometry types shared by the composer, the pagination engine and
// the CLI.

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};

/// Points per millimetre (1 pt = 1/72 in, 1 in = 25.4 mm).
pub const PT_PER_MM: f32 = 72.0 / 25.4;

/// Convert millimetres to PDF points.
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * PT_PER_MM
}

/// Convert centimetres to PDF points.
pub fn cm_to_pt(cm: f32) -> f32 {
    mm_to_pt(cm * 10.0)
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PaperSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: f32, height_mm: f32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (f32, f32) {
        match self {
            Self::A4 => (210.0, 297.0),
            Self::A3 => (297.0, 420.0),
            Self::A5 => (148.0, 210.0),
            Self::Letter => (215.9, 279.4),
            Self::Legal => (215.9, 355.6),
            Self::Tabloid => (279.4, 431.8),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }

    /// Dimensions in points (width, height).
    pub fn dimensions_pt(&self) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        (mm_to_pt(w), mm_to_pt(h))
    }

    /// Parse a case-insensitive paper-size keyword such as `a4` or `letter`.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "a4" => Some(Self::A4),
            "a3" => Some(Self::A3),
            "a5" => Some(Self::A5),
            "letter" => Some(Self::Letter),
            "legal" => Some(Self::Legal),
            "tabloid" => Some(Self::Tabloid),
            _ => None,
        }
    }
}

/// Page margins in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 20.0,
            right: 20.0,
            top: 25.0,
            bottom: 20.0,
        }
    }
}

/// Paper size plus margins, as supplied by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSetup {
    pub paper_size: PaperSize,
    pub margins: Margins,
}

impl PageSetup {
    /// Resolve into point-based geometry, validating that the content area
    /// is usable.
    pub fn geometry(&self) -> Result<PageGeometry> {
        PageGeometry::from_setup(self)
    }
}

/// Resolved page geometry in points. Origin is bottom-left, as in PDF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

impl PageGeometry {
    pub fn from_setup(setup: &PageSetup) -> Result<Self> {
        let (width, height) = setup.paper_size.dimensions_pt();
        let m = setup.margins;
        let geometry = Self {
            width,
            height,
            margin_left: mm_to_pt(m.left),
            margin_right: mm_to_pt(m.right),
            margin_top: mm_to_pt(m.top),
            margin_bottom: mm_to_pt(m.bottom),
        };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Reject non-finite or negative values and margins that leave no
    /// content area.
    pub fn validate(&self) -> Result<()> {
        let values = [
            self.width,
            self.height,
            self.margin_left,
            self.margin_right,
            self.margin_top,
            self.margin_bottom,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(FolioError::Geometry("non-finite dimension".into()));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(FolioError::Geometry(format!(
                "page size must be positive, got {:.1} x {:.1} pt",
                self.width, self.height
            )));
        }
        if values[2..].iter().any(|v| *v < 0.0) {
            return Err(FolioError::Geometry("margins must not be negative".into()));
        }
        if self.content_width() <= 0.0 || self.content_height() <= 0.0 {
            return Err(FolioError::Geometry(format!(
                "margins leave no content area ({:.1} x {:.1} pt)",
                self.content_width(),
                self.content_height()
            )));
        }
        Ok(())
    }

    /// Width available between the left and right margins.
    pub fn content_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }

    /// Height available between the top and bottom margins.
    pub fn content_height(&self) -> f32 {
        self.height - self.margin_top - self.margin_bottom
    }

    /// Y coordinate of the top of the content area.
    pub fn content_top(&self) -> f32 {
        self.height - self.margin_top
    }
}
