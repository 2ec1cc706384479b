// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Canvas — a page surface that records printpdf 0.8 operations.
//
// printpdf 0.8 pages are plain `Vec<Op>` lists, so drawing is just appending
// operations. `Canvas::save_state` hands out a guard that emits the matching
// restore when it goes out of scope.

use std::ops::{Deref, DerefMut};

use printpdf::{
    Line, LinePoint, Op, PaintMode, Point, Polygon, PolygonRing, Pt, TextItem, WindingOrder,
};

use crate::report::style::{Alignment, Colour, FontFace, estimate_text_width};

/// Recorded drawing operations for one page. Coordinates are in points with
/// the origin at the bottom-left corner.
#[derive(Debug, Default)]
pub struct Canvas {
    ops: Vec<Op>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a graphics-state save; the returned guard restores it on drop,
    /// including during unwinding.
    pub fn save_state(&mut self) -> StateGuard<'_> {
        self.ops.push(Op::SaveGraphicsState);
        StateGuard { canvas: self }
    }

    /// Fill an axis-aligned rectangle whose bottom-left corner is `(x, y)`.
    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, colour: Colour) {
        let corners = [
            (x, y),
            (x + width, y),
            (x + width, y + height),
            (x, y + height),
        ];
        self.ops.push(Op::SetFillColor {
            col: colour.to_pdf(),
        });
        self.ops.push(Op::DrawPolygon {
            polygon: Polygon {
                rings: vec![PolygonRing {
                    points: corners.iter().map(|&(px, py)| line_point(px, py)).collect(),
                }],
                mode: PaintMode::Fill,
                winding_order: WindingOrder::NonZero,
            },
        });
    }

    /// Stroke a straight line.
    pub fn stroke_line(
        &mut self,
        from: (f32, f32),
        to: (f32, f32),
        thickness: f32,
        colour: Colour,
    ) {
        self.ops.push(Op::SetOutlineColor {
            col: colour.to_pdf(),
        });
        self.ops.push(Op::SetOutlineThickness { pt: Pt(thickness) });
        self.ops.push(Op::DrawLine {
            line: Line {
                points: vec![line_point(from.0, from.1), line_point(to.0, to.1)],
                is_closed: false,
            },
        });
    }

    /// Stroke the outline of a rectangle.
    pub fn stroke_rect(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        thickness: f32,
        colour: Colour,
    ) {
        self.ops.push(Op::SetOutlineColor {
            col: colour.to_pdf(),
        });
        self.ops.push(Op::SetOutlineThickness { pt: Pt(thickness) });
        self.ops.push(Op::DrawLine {
            line: Line {
                points: vec![
                    line_point(x, y),
                    line_point(x + width, y),
                    line_point(x + width, y + height),
                    line_point(x, y + height),
                ],
                is_closed: true,
            },
        });
    }

    /// Draw one line of text with its baseline starting at `(x, y)`.
    pub fn text(&mut self, x: f32, y: f32, text: &str, font: FontFace, size: f32, colour: Colour) {
        let builtin = font.builtin();
        self.ops.push(Op::SetFillColor {
            col: colour.to_pdf(),
        });
        self.ops.push(Op::StartTextSection);
        self.ops.push(Op::SetTextCursor {
            pos: Point { x: Pt(x), y: Pt(y) },
        });
        self.ops.push(Op::SetFontSizeBuiltinFont {
            size: Pt(size),
            font: builtin,
        });
        self.ops.push(Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(text.to_string())],
            font: builtin,
        });
        self.ops.push(Op::EndTextSection);
    }

    /// Draw one line of text aligned inside the horizontal span
    /// `[left, left + width]`.
    #[allow(clippy::too_many_arguments)]
    pub fn text_aligned(
        &mut self,
        left: f32,
        width: f32,
        y: f32,
        text: &str,
        font: FontFace,
        size: f32,
        colour: Colour,
        alignment: Alignment,
    ) {
        let text_width = estimate_text_width(text, font, size);
        let x = match alignment {
            Alignment::Left => left,
            Alignment::Centre => left + (width - text_width) / 2.0,
            Alignment::Right => left + width - text_width,
        };
        self.text(x, y, text, font, size, colour);
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<Op> {
        self.ops
    }
}

/// Scoped graphics state. Derefs to the canvas it was taken from.
pub struct StateGuard<'a> {
    canvas: &'a mut Canvas,
}

impl Deref for StateGuard<'_> {
    type Target = Canvas;

    fn deref(&self) -> &Canvas {
        self.canvas
    }
}

impl DerefMut for StateGuard<'_> {
    fn deref_mut(&mut self) -> &mut Canvas {
        self.canvas
    }
}

impl Drop for StateGuard<'_> {
    fn drop(&mut self) {
        self.canvas.ops.push(Op::RestoreGraphicsState);
    }
}

fn line_point(x: f32, y: f32) -> LinePoint {
    LinePoint {
        p: Point { x: Pt(x), y: Pt(y) },
        bezier: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::style::palette;

    #[test]
    fn guard_restores_on_drop() {
        let mut canvas = Canvas::new();
        {
            let mut scoped = canvas.save_state();
            scoped.fill_rect(0.0, 0.0, 10.0, 10.0, palette::PRIMARY);
        }
        let ops = canvas.ops();
        assert!(matches!(ops.first(), Some(Op::SaveGraphicsState)));
        assert!(matches!(ops.last(), Some(Op::RestoreGraphicsState)));
    }

    #[test]
    fn guard_restores_when_unwinding() {
        let mut canvas = Canvas::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _scoped = canvas.save_state();
            panic!("drawing failed");
        }));
        assert!(result.is_err());
        assert!(matches!(canvas.ops().last(), Some(Op::RestoreGraphicsState)));
    }

    #[test]
    fn text_emits_a_closed_text_section() {
        let mut canvas = Canvas::new();
        canvas.text(10.0, 20.0, "hello", FontFace::Regular, 10.0, palette::GREY_DARK);
        let ops = canvas.into_ops();
        assert!(ops.iter().any(|op| matches!(op, Op::StartTextSection)));
        assert!(matches!(ops.last(), Some(Op::EndTextSection)));
        assert!(ops.iter().any(|op| matches!(
            op,
            Op::WriteTextBuiltinFont { items, .. }
                if matches!(items.first(), Some(TextItem::Text(t)) if t == "hello")
        )));
    }
}
