// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — paginate render blocks onto pages and serialise them with
// `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`. Layout happens entirely on our side: blocks flow
// top-to-bottom inside the margins and break onto a new page when they do not
// fit.

use std::path::Path;

use folio_core::{PT_PER_MM, PageGeometry, PageSetup, Result};
use printpdf::{Mm, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg};
use tracing::{debug, info, instrument, warn};

use super::canvas::Canvas;
use crate::report::block::{Banner, RenderBlock};
use crate::report::decoration::PageDecorator;
use crate::report::style::{Alignment, Colour, StyleSpec, chars_per_line};
use crate::report::table::TableBlock;

/// Space above and below a horizontal rule.
const RULE_GAP: f32 = 1.0;

/// Bullet glyph drawn at the bullet indent.
const BULLET: &str = "\u{2022}";

/// Serialised output of a render.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Lays out render blocks on fixed-size pages and produces PDF bytes.
pub struct PdfWriter {
    geometry: PageGeometry,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl PdfWriter {
    /// Create a writer for the given paper size and margins.
    pub fn new(setup: &PageSetup) -> Result<Self> {
        Ok(Self {
            geometry: setup.geometry()?,
            title: None,
        })
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Flow `blocks` onto pages, returning the content of each page without
    /// decoration. There is always at least one page.
    pub fn paginate(&self, blocks: &[RenderBlock]) -> Vec<Canvas> {
        let mut paginator = Paginator::new(&self.geometry);
        for block in blocks {
            paginator.place(block);
        }
        paginator.finish()
    }

    /// Paginate `blocks`, decorate each page and serialise the document.
    ///
    /// `first_page` decorates page 1, `later_pages` every page after it.
    /// Decorations are painted beneath the page content.
    #[instrument(skip_all, fields(blocks = blocks.len()))]
    pub fn render(
        &self,
        blocks: &[RenderBlock],
        first_page: &dyn PageDecorator,
        later_pages: &dyn PageDecorator,
    ) -> Result<RenderedDocument> {
        let contents = self.paginate(blocks);
        let page_count = contents.len();
        let title = self.title.as_deref().unwrap_or("Folio Document");

        let page_w = Mm(self.geometry.width / PT_PER_MM);
        let page_h = Mm(self.geometry.height / PT_PER_MM);

        let mut pages: Vec<PdfPage> = Vec::with_capacity(page_count);
        for (index, content) in contents.into_iter().enumerate() {
            let page_number = index + 1;
            let decorator = if page_number == 1 {
                first_page
            } else {
                later_pages
            };

            let mut canvas = Canvas::new();
            decorator.decorate(&mut canvas, &self.geometry, page_number);

            let mut ops = canvas.into_ops();
            ops.extend(content.into_ops());
            pages.push(PdfPage::new(page_w, page_h, ops));
        }

        let mut doc = PdfDocument::new(title);
        doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);

        if !warnings.is_empty() {
            debug!(warnings = warnings.len(), "printpdf reported warnings");
        }
        debug!(page_count, bytes = bytes.len(), "Render complete");

        Ok(RenderedDocument { bytes, page_count })
    }

    // -- File output convenience ----------------------------------------------

    /// Render and write the document to `path`, returning the page count.
    ///
    /// The file is written in one call and closed before returning. On error
    /// the path may hold nothing or a partial file.
    pub fn write_to_file(
        &self,
        blocks: &[RenderBlock],
        first_page: &dyn PageDecorator,
        later_pages: &dyn PageDecorator,
        path: impl AsRef<Path>,
    ) -> Result<usize> {
        let rendered = self.render(blocks, first_page, later_pages)?;
        std::fs::write(path.as_ref(), &rendered.bytes)?;
        info!(
            pages = rendered.page_count,
            "Wrote PDF to {}",
            path.as_ref().display()
        );
        Ok(rendered.page_count)
    }
}

// -- Pagination ---------------------------------------------------------------

/// Measured table row: wrapped lines per column plus total height.
struct RowLayout {
    cells: Vec<Vec<String>>,
    height: f32,
    padding: f32,
    leading: f32,
}

impl RowLayout {
    fn new(cells: Vec<Vec<String>>, padding: f32, leading: f32) -> Self {
        let tallest = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
        Self {
            height: 2.0 * padding + tallest as f32 * leading,
            cells,
            padding,
            leading,
        }
    }

    fn line_count(&self) -> usize {
        self.cells.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// How many wrapped lines, padding included, fit in `available` points.
    fn lines_within(&self, available: f32) -> usize {
        ((available - 2.0 * self.padding) / self.leading)
            .floor()
            .max(0.0) as usize
    }

    /// Height of this row cut down to its first line.
    fn first_line_height(&self) -> f32 {
        self.height.min(2.0 * self.padding + self.leading)
    }

    /// Detach the first `lines` lines of every cell; `self` keeps the rest.
    fn split_head(&mut self, lines: usize) -> RowLayout {
        let head: Vec<Vec<String>> = self
            .cells
            .iter_mut()
            .map(|cell| cell.drain(..lines.min(cell.len())).collect())
            .collect();
        *self = RowLayout::new(std::mem::take(&mut self.cells), self.padding, self.leading);
        RowLayout::new(head, self.padding, self.leading)
    }
}

/// Cursor-based page filler. `cursor` is the y coordinate of the top of the
/// remaining free area on the current page.
struct Paginator<'g> {
    geometry: &'g PageGeometry,
    pages: Vec<Canvas>,
    current: Canvas,
    cursor: f32,
    has_content: bool,
}

impl<'g> Paginator<'g> {
    fn new(geometry: &'g PageGeometry) -> Self {
        Self {
            geometry,
            pages: Vec::new(),
            current: Canvas::new(),
            cursor: geometry.content_top(),
            has_content: false,
        }
    }

    fn left(&self) -> f32 {
        self.geometry.margin_left
    }

    fn width(&self) -> f32 {
        self.geometry.content_width()
    }

    fn remaining(&self) -> f32 {
        self.cursor - self.geometry.margin_bottom
    }

    fn new_page(&mut self) {
        let finished = std::mem::take(&mut self.current);
        self.pages.push(finished);
        self.cursor = self.geometry.content_top();
        self.has_content = false;
    }

    /// Break to a new page unless `height` fits or the page is still empty.
    fn ensure(&mut self, height: f32) {
        if height > self.remaining() && self.has_content {
            self.new_page();
        }
    }

    /// Move down by `gap` without ever breaking the page.
    fn skip(&mut self, gap: f32) {
        self.cursor = (self.cursor - gap).max(self.geometry.margin_bottom);
    }

    fn finish(mut self) -> Vec<Canvas> {
        if self.has_content || self.pages.is_empty() {
            let last = std::mem::take(&mut self.current);
            self.pages.push(last);
        }
        self.pages
    }

    fn place(&mut self, block: &RenderBlock) {
        match block {
            RenderBlock::Spacer { height } => {
                if *height > self.remaining() && self.has_content {
                    self.new_page();
                } else {
                    self.skip(*height);
                }
            }
            RenderBlock::Banner(banner) => self.place_banner(banner),
            RenderBlock::Heading { text, style } => {
                self.flow_text(std::slice::from_ref(text), style, false);
            }
            RenderBlock::Paragraph { lines, style } => self.flow_text(lines, style, false),
            RenderBlock::Bullet { text, style } => {
                self.flow_text(std::slice::from_ref(text), style, true);
            }
            RenderBlock::Rule { thickness, colour } => {
                self.ensure(thickness + 2.0 * RULE_GAP);
                self.skip(RULE_GAP);
                let y = self.cursor - thickness / 2.0;
                let (left, right) = (self.left(), self.left() + self.width());
                self.current
                    .stroke_line((left, y), (right, y), *thickness, *colour);
                self.skip(thickness + RULE_GAP);
                self.has_content = true;
            }
            RenderBlock::Table(table) => self.place_table(table),
            RenderBlock::PageBreak => {
                if self.has_content {
                    self.new_page();
                }
            }
        }
    }

    /// Wrap and draw text lines, breaking pages between lines as needed.
    fn flow_text(&mut self, lines: &[String], style: &StyleSpec, bulleted: bool) {
        if self.has_content {
            self.skip(style.space_before);
        }

        let left = self.left();
        let indent = style.left_indent;
        let width = self.width() - indent;
        let max_chars = chars_per_line(width, style.font, style.size);
        let wrapped = wrap_lines(lines, max_chars);

        for (index, line) in wrapped.iter().enumerate() {
            self.ensure(style.leading);
            let baseline = self.cursor - style.size;

            if bulleted && index == 0 {
                self.current.text(
                    left + style.bullet_indent,
                    baseline,
                    BULLET,
                    style.font,
                    style.size,
                    style.colour,
                );
            }
            if !line.is_empty() {
                self.current.text_aligned(
                    left + indent,
                    width,
                    baseline,
                    line,
                    style.font,
                    style.size,
                    style.colour,
                    style.alignment,
                );
            }

            self.cursor -= style.leading;
            self.has_content = true;
        }

        self.skip(style.space_after);
    }

    fn place_banner(&mut self, banner: &Banner) {
        let style = &banner.style;
        let (left, width) = (self.left(), self.width());
        let inner_width = width - 2.0 * banner.padding_horizontal;
        let lines = wrap_lines(
            std::slice::from_ref(&banner.text),
            chars_per_line(inner_width, style.font, style.size),
        );

        // A band taller than the content area continues on following pages.
        let per_page = ((self.geometry.content_height() - 2.0 * banner.padding_vertical)
            / style.leading)
            .floor()
            .max(1.0) as usize;
        if lines.len() > per_page {
            warn!(
                lines = lines.len(),
                per_page, "banner is taller than a page; continuing it on the next page"
            );
        }

        for segment in lines.chunks(per_page) {
            let height = 2.0 * banner.padding_vertical + segment.len() as f32 * style.leading;
            self.ensure(height);
            let top = self.cursor;
            self.current
                .fill_rect(left, top - height, width, height, banner.background);

            let mut line_top = top - banner.padding_vertical;
            for line in segment {
                self.current.text_aligned(
                    left + banner.padding_horizontal,
                    inner_width,
                    line_top - style.size,
                    line,
                    style.font,
                    style.size,
                    style.colour,
                    style.alignment,
                );
                line_top -= style.leading;
            }

            self.skip(height);
            self.has_content = true;
        }
    }

    fn place_table(&mut self, table: &TableBlock) {
        let header_style = table.header_cell_style();
        let header = table
            .has_header()
            .then(|| measure_row(table, &table.header, &header_style, table.style.header_padding));
        let rows: Vec<RowLayout> = table
            .rows
            .iter()
            .map(|row| measure_row(table, row, &table.cell_style, table.style.body_padding))
            .collect();

        let overflow = table
            .rows
            .iter()
            .filter(|row| row.len() > table.column_widths.len())
            .count();
        if overflow > 0 {
            warn!(
                rows = overflow,
                columns = table.column_widths.len(),
                "table rows have cells beyond the last column; extra cells are not drawn"
            );
        }

        let table_width = table.width();
        let x = if table_width < self.width() {
            self.left() + (self.width() - table_width) / 2.0
        } else {
            self.left()
        };

        let header_height = header.as_ref().map_or(0.0, |h| h.height);
        if header_height >= self.geometry.content_height() {
            warn!(header_height, "table header is taller than a page");
        }
        // Room left for data rows on a page that starts with the header.
        let capacity = self.geometry.content_height() - header_height;

        // Keep the header together with the first data row, or with its first
        // line when that row will have to be split anyway.
        let first = rows.first().map_or(0.0, |row| {
            if row.height <= capacity {
                row.height
            } else {
                row.first_line_height()
            }
        });
        let lead = header_height + first;
        self.ensure(lead);

        if let Some(header) = &header {
            self.draw_header_row(table, header, &header_style, x);
        }

        for (index, mut row) in rows.into_iter().enumerate() {
            let background = table.row_background(index);
            let mut fresh = false;
            loop {
                if row.height <= self.remaining() {
                    self.draw_row(table, &row, &table.cell_style, background, x);
                    break;
                }
                // Move whole rows that fit on a page; split only the taller ones.
                if !fresh && self.has_content && row.height <= capacity {
                    self.continue_table(table, header.as_ref(), &header_style, x);
                    fresh = true;
                    continue;
                }

                let mut fits = row.lines_within(self.remaining());
                if fits == 0 && !fresh && self.has_content {
                    self.continue_table(table, header.as_ref(), &header_style, x);
                    fresh = true;
                    continue;
                }
                if fits == 0 {
                    warn!("table cell line does not fit below the header; drawing it anyway");
                    fits = 1;
                }
                if fits >= row.line_count() {
                    self.draw_row(table, &row, &table.cell_style, background, x);
                    break;
                }

                let head = row.split_head(fits);
                self.draw_row(table, &head, &table.cell_style, background, x);
                self.continue_table(table, header.as_ref(), &header_style, x);
                fresh = true;
            }
        }

        debug!(
            rows = table.rows.len(),
            columns = table.column_widths.len(),
            "Table placed"
        );
    }

    /// Break the page and repeat the header, if the table has one.
    fn continue_table(
        &mut self,
        table: &TableBlock,
        header: Option<&RowLayout>,
        style: &StyleSpec,
        x: f32,
    ) {
        self.new_page();
        if let Some(header) = header {
            self.draw_header_row(table, header, style, x);
        }
    }

    fn draw_header_row(&mut self, table: &TableBlock, header: &RowLayout, style: &StyleSpec, x: f32) {
        self.draw_row(table, header, style, table.style.header_background, x);
        let y = self.cursor;
        self.current.stroke_line(
            (x, y),
            (x + table.width(), y),
            table.style.header_rule_thickness,
            table.style.header_rule_colour,
        );
    }

    fn draw_row(
        &mut self,
        table: &TableBlock,
        row: &RowLayout,
        style: &StyleSpec,
        background: Colour,
        x: f32,
    ) {
        let top = self.cursor;
        let bottom = top - row.height;
        let padding = table.style.horizontal_padding;

        let mut cell_x = x;
        for (width, lines) in table.column_widths.iter().zip(&row.cells) {
            self.current
                .fill_rect(cell_x, bottom, *width, row.height, background);

            let mut baseline = top - row.padding - style.size;
            for line in lines.iter().filter(|l| !l.is_empty()) {
                self.current.text_aligned(
                    cell_x + padding,
                    width - 2.0 * padding,
                    baseline,
                    line,
                    style.font,
                    style.size,
                    style.colour,
                    Alignment::Left,
                );
                baseline -= style.leading;
            }

            self.current.stroke_rect(
                cell_x,
                bottom,
                *width,
                row.height,
                table.style.grid_thickness,
                table.style.grid_colour,
            );
            cell_x += width;
        }

        self.cursor = bottom;
        self.has_content = true;
    }
}

/// Wrap every column of `cells` to its column width. Missing trailing cells
/// are blank; cells beyond the last column are ignored.
fn measure_row(
    table: &TableBlock,
    cells: &[String],
    style: &StyleSpec,
    vertical_padding: f32,
) -> RowLayout {
    let padding = table.style.horizontal_padding;
    let wrapped: Vec<Vec<String>> = table
        .column_widths
        .iter()
        .enumerate()
        .map(|(column, width)| {
            let text = cells.get(column).map(String::as_str).unwrap_or("");
            let max_chars = chars_per_line(width - 2.0 * padding, style.font, style.size);
            wrap_text(text, max_chars)
        })
        .collect();

    RowLayout::new(wrapped, vertical_padding, style.leading)
}

// -- Text wrapping helper -----------------------------------------------------

/// Wrap each explicit line separately; an empty input line stays a blank line.
fn wrap_lines(lines: &[String], max_width: usize) -> Vec<String> {
    lines
        .iter()
        .flat_map(|line| wrap_text(line, max_width))
        .collect()
}

/// Wrap a multi-line string so that no line exceeds `max_width` characters.
///
/// Splits on existing newlines first, then performs simple word-wrap within each
/// paragraph. Words longer than `max_width` are force-broken on character
/// boundaries.
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    let mut result = Vec::new();

    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            result.push(String::new());
            continue;
        }

        let mut current_line = String::new();
        let mut current_len = 0usize;

        for word in words {
            let word_len = word.chars().count();
            if word_len > max_width {
                if !current_line.is_empty() {
                    result.push(std::mem::take(&mut current_line));
                }
                let chars: Vec<char> = word.chars().collect();
                let mut chunks = chars.chunks(max_width).peekable();
                while let Some(chunk) = chunks.next() {
                    let piece: String = chunk.iter().collect();
                    if chunks.peek().is_some() {
                        result.push(piece);
                    } else {
                        current_len = chunk.len();
                        current_line = piece;
                    }
                }
            } else if current_line.is_empty() {
                current_line.push_str(word);
                current_len = word_len;
            } else if current_len + 1 + word_len <= max_width {
                current_line.push(' ');
                current_line.push_str(word);
                current_len += 1 + word_len;
            } else {
                result.push(std::mem::replace(&mut current_line, word.to_string()));
                current_len = word_len;
            }
        }

        if !current_line.is_empty() {
            result.push(current_line);
        }
    }

    result
}
