// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Table builder — turns headers and rows into a styled table block with
// banded header, zebra-striped body and a uniform grid.

use super::model::Cell;
use super::style::{Colour, FontFace, StyleName, StyleSheet, StyleSpec, palette};

/// Visual treatment of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableStyle {
    pub header_background: Colour,
    pub header_text: Colour,
    pub header_font: FontFace,
    /// Font sizes of header and data cells, in points.
    pub header_size: f32,
    pub body_size: f32,
    /// Data-row backgrounds, alternating from the first data row.
    pub row_backgrounds: [Colour; 2],
    pub grid_colour: Colour,
    pub grid_thickness: f32,
    /// Heavier rule between header and body.
    pub header_rule_colour: Colour,
    pub header_rule_thickness: f32,
    pub header_padding: f32,
    pub body_padding: f32,
    pub horizontal_padding: f32,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            header_background: palette::PRIMARY,
            header_text: palette::WHITE,
            header_font: FontFace::Bold,
            header_size: 10.0,
            body_size: 9.0,
            row_backgrounds: [palette::WHITE, palette::TINT],
            grid_colour: palette::GRID,
            grid_thickness: 0.5,
            header_rule_colour: palette::SECONDARY,
            header_rule_thickness: 1.5,
            header_padding: 8.0,
            body_padding: 5.0,
            horizontal_padding: 8.0,
        }
    }
}

/// A table ready for layout. Cells are already stringified.
#[derive(Debug, Clone, PartialEq)]
pub struct TableBlock {
    pub column_widths: Vec<f32>,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Style used to wrap and draw cell text.
    pub cell_style: StyleSpec,
    pub style: TableStyle,
}

impl TableBlock {
    pub fn width(&self) -> f32 {
        self.column_widths.iter().sum()
    }

    pub fn has_header(&self) -> bool {
        !self.header.is_empty()
    }

    /// Header row (if any) plus data rows.
    pub fn rendered_row_count(&self) -> usize {
        usize::from(self.has_header()) + self.rows.len()
    }

    /// Background of the data row at `index` (0 = first row after the header).
    pub fn row_background(&self, index: usize) -> Colour {
        self.style.row_backgrounds[index % 2]
    }

    /// Backgrounds of every rendered row, top to bottom.
    pub fn rendered_backgrounds(&self) -> Vec<Colour> {
        let header = self
            .has_header()
            .then_some(self.style.header_background);
        header
            .into_iter()
            .chain((0..self.rows.len()).map(|i| self.row_background(i)))
            .collect()
    }

    /// Style for the header cells: cell style in the header face, size and
    /// colour.
    pub fn header_cell_style(&self) -> StyleSpec {
        self.cell_style
            .with_size(self.style.header_size)
            .with_font(self.style.header_font)
            .with_colour(self.style.header_text)
    }
}

/// Split `available` evenly across `max(columns, 1)` columns.
pub fn even_column_widths(columns: usize, available: f32) -> Vec<f32> {
    let n = columns.max(1);
    vec![available / n as f32; n]
}

/// Build a styled table block.
///
/// When `column_widths` is `None` or empty, the available width is split
/// evenly across the header columns. Rows are passed through as given: short
/// rows leave their trailing cells blank and cells beyond the last column are
/// not drawn.
pub fn build_table(
    headers: &[String],
    rows: &[Vec<Cell>],
    column_widths: Option<&[f32]>,
    available_width: f32,
    styles: &StyleSheet,
) -> TableBlock {
    let column_widths = match column_widths {
        Some(widths) if !widths.is_empty() => widths.to_vec(),
        _ => even_column_widths(headers.len(), available_width),
    };

    let style = TableStyle::default();
    TableBlock {
        column_widths,
        header: headers.to_vec(),
        rows: rows
            .iter()
            .map(|row| row.iter().map(ToString::to_string).collect())
            .collect(),
        cell_style: styles.get(StyleName::Body).with_size(style.body_size),
        style,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|c| Cell::from(*c)).collect()
    }

    #[test]
    fn even_widths_sum_to_available() {
        let styles = StyleSheet::build();
        for h in 1..=7 {
            let names: Vec<String> = (0..h).map(|i| format!("C{i}")).collect();
            let table = build_table(&names, &[], None, 481.9, &styles);
            assert_eq!(table.column_widths.len(), h);
            assert!((table.width() - 481.9).abs() < 1e-3);
            for w in &table.column_widths {
                assert!((w - 481.9 / h as f32).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn zero_headers_use_single_column() {
        let widths = even_column_widths(0, 300.0);
        assert_eq!(widths, vec![300.0]);
        assert!(widths.iter().all(|w| w.is_finite()));
    }

    #[test]
    fn explicit_widths_are_kept() {
        let styles = StyleSheet::build();
        let table = build_table(&headers(&["A", "B"]), &[], Some(&[100.0, 50.0]), 400.0, &styles);
        assert_eq!(table.column_widths, vec![100.0, 50.0]);

        let table = build_table(&headers(&["A", "B"]), &[], Some(&[]), 400.0, &styles);
        assert_eq!(table.column_widths, vec![200.0, 200.0]);
    }

    #[test]
    fn zebra_starts_white_after_header() {
        let styles = StyleSheet::build();
        let table = build_table(
            &headers(&["A", "B"]),
            &[row(&["1", "2"]), row(&["3", "4"])],
            None,
            200.0,
            &styles,
        );

        assert_eq!(table.rendered_row_count(), 3);
        assert_eq!(
            table.rendered_backgrounds(),
            vec![palette::PRIMARY, palette::WHITE, palette::TINT]
        );
    }

    #[test]
    fn header_only_table() {
        let styles = StyleSheet::build();
        let table = build_table(&headers(&["A"]), &[], None, 200.0, &styles);
        assert_eq!(table.rendered_row_count(), 1);
        assert!(table.rows.is_empty());
    }

    #[test]
    fn ragged_rows_pass_through() {
        let styles = StyleSheet::build();
        let table = build_table(
            &headers(&["A", "B", "C"]),
            &[row(&["1"]), row(&["1", "2", "3", "4"])],
            None,
            300.0,
            &styles,
        );
        assert_eq!(table.rows[0], vec!["1"]);
        assert_eq!(table.rows[1].len(), 4);
    }

    #[test]
    fn header_cells_are_bold_white() {
        let styles = StyleSheet::build();
        let table = build_table(&headers(&["A"]), &[], None, 100.0, &styles);
        let header = table.header_cell_style();
        assert_eq!(header.font, FontFace::Bold);
        assert_eq!(header.colour, palette::WHITE);
        assert_eq!(table.cell_style.name, StyleName::Body);
    }

    #[test]
    fn data_cells_are_smaller_than_header_cells() {
        let styles = StyleSheet::build();
        let table = build_table(&headers(&["A"]), &[row(&["1"])], None, 100.0, &styles);
        assert_eq!(table.header_cell_style().size, 10.0);
        assert_eq!(table.cell_style.size, 9.0);
        assert!((table.cell_style.leading - 10.8).abs() < 1e-4);
        assert_eq!(table.cell_style.font, FontFace::Regular);
    }
}
