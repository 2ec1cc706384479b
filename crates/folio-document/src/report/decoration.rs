// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page decoration — header and footer bars painted on every page.

use std::fmt::Write as _;

use chrono::Local;
use folio_core::{FolioConfig, PageGeometry, cm_to_pt};
use tracing::warn;

use super::style::{Alignment, FontFace, StyleName, StyleSheet, StyleSpec, palette};
use crate::pdf::canvas::Canvas;

/// Fallback used when a configured date format cannot be rendered.
const DEFAULT_DATE_FORMAT: &str = "%B %d, %Y";

/// Called by the pagination engine once per emitted page.
///
/// Implementations draw onto `canvas` and nothing else. Any graphics state
/// they change must be restored before returning.
pub trait PageDecorator {
    fn decorate(&self, canvas: &mut Canvas, geometry: &PageGeometry, page_number: usize);
}

/// Decorator that draws nothing.
pub struct Undecorated;

impl PageDecorator for Undecorated {
    fn decorate(&self, _canvas: &mut Canvas, _geometry: &PageGeometry, _page_number: usize) {}
}

/// Today's date in `format`, falling back to `%B %d, %Y` for format strings
/// chrono cannot render.
pub fn today_label(format: &str) -> String {
    let now = Local::now();
    let mut out = String::new();
    if write!(out, "{}", now.format(format)).is_err() {
        warn!(format, "unrenderable date format, using default");
        out = now.format(DEFAULT_DATE_FORMAT).to_string();
    }
    out
}

/// Navy title/author bar on pages after the first, grey date/marker/page bar
/// on every page.
#[derive(Debug, Clone)]
pub struct PageBanner {
    title: String,
    author: String,
    show_header: bool,
    show_footer: bool,
    marker: String,
    date_format: String,
    /// Overrides the wall-clock date stamp.
    fixed_date: Option<String>,
    footer_style: StyleSpec,
}

impl PageBanner {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        config: &FolioConfig,
        styles: &StyleSheet,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            show_header: config.show_header,
            show_footer: config.show_footer,
            marker: config.footer_marker.clone(),
            date_format: config.date_format.clone(),
            fixed_date: None,
            footer_style: styles.get(StyleName::Footer).clone(),
        }
    }

    /// Stamp `date` instead of reading the clock at draw time.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.fixed_date = Some(date.into());
        self
    }

    fn date_label(&self) -> String {
        match &self.fixed_date {
            Some(date) => date.clone(),
            None => today_label(&self.date_format),
        }
    }

    fn draw_header(&self, canvas: &mut Canvas, geometry: &PageGeometry) {
        let bar_height = cm_to_pt(1.2);
        let inset = cm_to_pt(1.5);
        let baseline = geometry.height - cm_to_pt(0.8);
        let span = geometry.width - 2.0 * inset;

        canvas.fill_rect(
            0.0,
            geometry.height - bar_height,
            geometry.width,
            bar_height,
            palette::PRIMARY,
        );
        canvas.text(inset, baseline, &self.title, FontFace::Bold, 9.0, palette::WHITE);
        canvas.text_aligned(
            inset,
            span,
            baseline,
            &self.author,
            FontFace::Regular,
            9.0,
            palette::WHITE,
            Alignment::Right,
        );
    }

    fn draw_footer(&self, canvas: &mut Canvas, geometry: &PageGeometry, page_number: usize) {
        let bar_height = cm_to_pt(0.9);
        let inset = cm_to_pt(1.5);
        let baseline = cm_to_pt(0.3);
        let span = geometry.width - 2.0 * inset;
        let style = &self.footer_style;

        canvas.fill_rect(0.0, 0.0, geometry.width, bar_height, palette::GREY_LIGHT);

        let slots = [
            (self.date_label(), Alignment::Left),
            (self.marker.clone(), Alignment::Centre),
            (format!("Page {page_number}"), Alignment::Right),
        ];
        for (text, alignment) in slots {
            canvas.text_aligned(
                inset,
                span,
                baseline,
                &text,
                style.font,
                style.size,
                style.colour,
                alignment,
            );
        }
    }
}

impl PageDecorator for PageBanner {
    fn decorate(&self, canvas: &mut Canvas, geometry: &PageGeometry, page_number: usize) {
        let mut scoped = canvas.save_state();

        if self.show_header && page_number > 1 {
            self.draw_header(&mut scoped, geometry);
        }
        if self.show_footer {
            self.draw_footer(&mut scoped, geometry, page_number);
        }
    }
}

#[cfg(test)]
mod tests {
    use folio_core::PageSetup;
    use printpdf::{Op, TextItem};

    use super::*;

    fn banner(config: &FolioConfig) -> PageBanner {
        PageBanner::new("Quarterly", "Ops Team", config, &StyleSheet::build()).with_date("May 01, 2026")
    }

    fn draw(banner: &PageBanner, page: usize) -> Vec<Op> {
        let geometry = PageSetup::default().geometry().unwrap();
        let mut canvas = Canvas::new();
        banner.decorate(&mut canvas, &geometry, page);
        canvas.into_ops()
    }

    fn texts(ops: &[Op]) -> Vec<String> {
        ops.iter()
            .filter_map(|op| match op {
                Op::WriteTextBuiltinFont { items, .. } => items.iter().find_map(|i| match i {
                    TextItem::Text(t) => Some(t.clone()),
                    _ => None,
                }),
                _ => None,
            })
            .collect()
    }

    fn bars(ops: &[Op]) -> usize {
        ops.iter().filter(|op| matches!(op, Op::DrawPolygon { .. })).count()
    }

    #[test]
    fn first_page_has_footer_only() {
        let ops = draw(&banner(&FolioConfig::default()), 1);
        assert_eq!(bars(&ops), 1);
        assert_eq!(texts(&ops), vec!["May 01, 2026", "CONFIDENTIAL", "Page 1"]);
    }

    #[test]
    fn later_pages_add_header() {
        let ops = draw(&banner(&FolioConfig::default()), 3);
        assert_eq!(bars(&ops), 2);
        let texts = texts(&ops);
        assert_eq!(&texts[..2], &["Quarterly", "Ops Team"]);
        assert!(texts.contains(&"Page 3".to_string()));
    }

    #[test]
    fn drawing_is_wrapped_in_save_restore() {
        let ops = draw(&banner(&FolioConfig::default()), 2);
        assert!(matches!(ops.first(), Some(Op::SaveGraphicsState)));
        assert!(matches!(ops.last(), Some(Op::RestoreGraphicsState)));
        let saves = ops.iter().filter(|op| matches!(op, Op::SaveGraphicsState)).count();
        let restores = ops.iter().filter(|op| matches!(op, Op::RestoreGraphicsState)).count();
        assert_eq!(saves, restores);
    }

    #[test]
    fn disabled_bars_still_balance_state() {
        let config = FolioConfig {
            show_header: false,
            show_footer: false,
            ..FolioConfig::default()
        };
        let ops = draw(&banner(&config), 2);
        assert_eq!(ops.len(), 2);
        assert_eq!(bars(&ops), 0);
    }

    #[test]
    fn custom_marker() {
        let config = FolioConfig {
            footer_marker: "INTERNAL".into(),
            ..FolioConfig::default()
        };
        let ops = draw(&banner(&config), 1);
        assert!(texts(&ops).contains(&"INTERNAL".to_string()));
    }

    #[test]
    fn bad_date_format_falls_back() {
        let label = today_label("%Q%");
        assert!(!label.is_empty());
    }
}
