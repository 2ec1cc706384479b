// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Style registry — the colour palette and the named paragraph styles used by
// every report.
//
// A `StyleSheet` is built fresh for each composition; nothing here is global
// or mutable, so concurrent report generations never share style state.

use printpdf::{BuiltinFont, Color, Rgb};

/// An sRGB colour with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Colour {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to printpdf's floating-point colour.
    pub fn to_pdf(self) -> Color {
        Color::Rgb(Rgb::new(
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            None,
        ))
    }
}

/// The fixed report palette.
pub mod palette {
    use super::Colour;

    /// Deep navy. Cover banner, header bar, table header band.
    pub const PRIMARY: Colour = Colour::rgb(0x1A, 0x23, 0x7E);
    /// Indigo. Level-2 headings, header underline, summary rule.
    pub const SECONDARY: Colour = Colour::rgb(0x39, 0x49, 0xAB);
    /// Blue. Subtitles and level-1 heading rules.
    pub const ACCENT: Colour = Colour::rgb(0x42, 0xA5, 0xF5);
    /// Very light blue. Odd data rows in tables.
    pub const TINT: Colour = Colour::rgb(0xE3, 0xF2, 0xFD);
    pub const GREY_DARK: Colour = Colour::rgb(0x42, 0x42, 0x42);
    pub const GREY_MID: Colour = Colour::rgb(0x75, 0x75, 0x75);
    pub const GREY_LIGHT: Colour = Colour::rgb(0xF5, 0xF5, 0xF5);
    pub const GRID: Colour = Colour::rgb(0xBD, 0xBD, 0xBD);
    pub const WHITE: Colour = Colour::rgb(0xFF, 0xFF, 0xFF);
}

/// Helvetica faces available without embedding a font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    Regular,
    Bold,
    Oblique,
}

impl FontFace {
    pub fn builtin(self) -> BuiltinFont {
        match self {
            Self::Regular => BuiltinFont::Helvetica,
            Self::Bold => BuiltinFont::HelveticaBold,
            Self::Oblique => BuiltinFont::HelveticaOblique,
        }
    }

    /// Average glyph advance as a fraction of the font size.
    fn average_advance(self) -> f32 {
        match self {
            Self::Bold => 0.55,
            Self::Regular | Self::Oblique => 0.50,
        }
    }
}

/// Estimated rendered width of `text` in points.
///
/// Builtin fonts carry no metrics we can query through printpdf, so widths
/// are approximated from the average Helvetica advance. Used for wrapping and
/// for centre/right alignment.
pub fn estimate_text_width(text: &str, font: FontFace, size: f32) -> f32 {
    text.chars().count() as f32 * font.average_advance() * size
}

/// Number of characters of `font` at `size` that fit in `width` points.
/// Always at least one so wrapping makes progress.
pub fn chars_per_line(width: f32, font: FontFace, size: f32) -> usize {
    let per_char = font.average_advance() * size;
    if per_char <= 0.0 || width <= 0.0 {
        return 1;
    }
    ((width / per_char) as usize).max(1)
}

/// Horizontal alignment of a line within its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Centre,
    Right,
}

/// Keys of the style registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleName {
    Title,
    Subtitle,
    H1,
    H2,
    H3,
    Body,
    Bullet,
    Caption,
    Footer,
}

impl StyleName {
    pub const ALL: [StyleName; 9] = [
        StyleName::Title,
        StyleName::Subtitle,
        StyleName::H1,
        StyleName::H2,
        StyleName::H3,
        StyleName::Body,
        StyleName::Bullet,
        StyleName::Caption,
        StyleName::Footer,
    ];
}

/// Text-presentation descriptor. All lengths are in points.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSpec {
    pub name: StyleName,
    pub font: FontFace,
    pub size: f32,
    pub colour: Colour,
    pub alignment: Alignment,
    /// Baseline-to-baseline distance.
    pub leading: f32,
    pub space_before: f32,
    pub space_after: f32,
    pub left_indent: f32,
    pub bullet_indent: f32,
}

impl StyleSpec {
    /// Left-aligned style with leading 1.2 × size and no spacing.
    fn new(name: StyleName, font: FontFace, size: f32, colour: Colour) -> Self {
        Self {
            name,
            font,
            size,
            colour,
            alignment: Alignment::Left,
            leading: size * 1.2,
            space_before: 0.0,
            space_after: 0.0,
            left_indent: 0.0,
            bullet_indent: 0.0,
        }
    }

    fn aligned(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    fn with_leading(mut self, leading: f32) -> Self {
        self.leading = leading;
        self
    }

    fn spaced(mut self, before: f32, after: f32) -> Self {
        self.space_before = before;
        self.space_after = after;
        self
    }

    fn indented(mut self, left: f32, bullet: f32) -> Self {
        self.left_indent = left;
        self.bullet_indent = bullet;
        self
    }

    /// Copy of this style in a different colour.
    pub fn with_colour(&self, colour: Colour) -> Self {
        Self {
            colour,
            ..self.clone()
        }
    }

    /// Copy of this style in a different face.
    pub fn with_font(&self, font: FontFace) -> Self {
        Self {
            font,
            ..self.clone()
        }
    }

    /// Copy of this style at `size` points with leading 1.2 × size.
    pub fn with_size(&self, size: f32) -> Self {
        Self {
            size,
            leading: size * 1.2,
            ..self.clone()
        }
    }
}

/// Fully-populated mapping from [`StyleName`] to [`StyleSpec`].
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSheet {
    styles: [StyleSpec; 9],
}

impl StyleSheet {
    /// Build the report styles. Every call returns an independent sheet.
    pub fn build() -> Self {
        use palette::*;

        Self {
            styles: [
                StyleSpec::new(StyleName::Title, FontFace::Bold, 28.0, WHITE)
                    .aligned(Alignment::Centre)
                    .spaced(0.0, 6.0),
                StyleSpec::new(StyleName::Subtitle, FontFace::Regular, 14.0, ACCENT)
                    .aligned(Alignment::Centre)
                    .spaced(0.0, 4.0),
                StyleSpec::new(StyleName::H1, FontFace::Bold, 18.0, PRIMARY).spaced(16.0, 8.0),
                StyleSpec::new(StyleName::H2, FontFace::Bold, 14.0, SECONDARY).spaced(12.0, 6.0),
                StyleSpec::new(StyleName::H3, FontFace::Bold, 11.0, GREY_DARK).spaced(8.0, 4.0),
                StyleSpec::new(StyleName::Body, FontFace::Regular, 10.0, GREY_DARK)
                    .with_leading(14.0)
                    .spaced(0.0, 6.0),
                StyleSpec::new(StyleName::Bullet, FontFace::Regular, 10.0, GREY_DARK)
                    .with_leading(14.0)
                    .spaced(0.0, 3.0)
                    .indented(20.0, 10.0),
                StyleSpec::new(StyleName::Caption, FontFace::Oblique, 9.0, GREY_MID)
                    .aligned(Alignment::Centre)
                    .spaced(0.0, 6.0),
                StyleSpec::new(StyleName::Footer, FontFace::Regular, 8.0, GREY_MID)
                    .aligned(Alignment::Centre),
            ],
        }
    }

    pub fn get(&self, name: StyleName) -> &StyleSpec {
        &self.styles[name as usize]
    }
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self::build()
    }
}
