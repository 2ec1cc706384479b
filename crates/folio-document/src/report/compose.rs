// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Report composer — walks a `ReportDescription` into an ordered story of
// render blocks and hands it to the PDF writer.
//
// Three report kinds share one assembly: text (cover + sections), table
// (cover + intro + tables) and full (banner cover + sections + tables +
// summary). Block order is always cover, then sections in input order, then
// tables in input order, then the summary.

use std::path::{Path, PathBuf};

use folio_core::{FolioConfig, Result, cm_to_pt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::block::{Banner, PartKind, RenderBlock, Story};
use super::decoration::{PageBanner, today_label};
use super::model::{ReportDescription, SectionSpec, TableSpec};
use super::style::{StyleName, StyleSheet, palette};
use super::table::build_table;
use crate::pdf::writer::PdfWriter;

/// Which block categories a report includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// Cover and text sections.
    Text,
    /// Cover, optional intro paragraph and tables.
    Table,
    /// Banner cover, sections, tables and optional summary.
    #[default]
    Full,
}

/// Vertical spacing that differs between report kinds, in centimetres.
struct Spacing {
    cover_top: f32,
    before_subtitle: f32,
    before_caption: f32,
    after_section: f32,
    after_table: f32,
}

impl ReportKind {
    fn spacing(self) -> Spacing {
        match self {
            Self::Text => Spacing {
                cover_top: 2.0,
                before_subtitle: 0.3,
                before_caption: 0.5,
                after_section: 0.3,
                after_table: 0.6,
            },
            Self::Table => Spacing {
                cover_top: 2.0,
                before_subtitle: 0.3,
                before_caption: 0.4,
                after_section: 0.3,
                after_table: 0.6,
            },
            Self::Full => Spacing {
                cover_top: 1.5,
                before_subtitle: 0.4,
                before_caption: 0.4,
                after_section: 0.4,
                after_table: 0.5,
            },
        }
    }
}

/// Builds the story for one report. Styles are built per composer, so
/// composers on different threads share nothing.
pub struct ReportComposer<'a> {
    description: &'a ReportDescription,
    config: FolioConfig,
    styles: StyleSheet,
    /// Date shown on the cover and in the footer; the clock is read when unset.
    fixed_date: Option<String>,
}

impl<'a> ReportComposer<'a> {
    pub fn new(description: &'a ReportDescription) -> Self {
        Self::with_config(description, FolioConfig::default())
    }

    pub fn with_config(description: &'a ReportDescription, config: FolioConfig) -> Self {
        Self {
            description,
            config,
            styles: StyleSheet::build(),
            fixed_date: None,
        }
    }

    /// Use `date` for every date stamp instead of today's date.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.fixed_date = Some(date.into());
        self
    }

    pub fn styles(&self) -> &StyleSheet {
        &self.styles
    }

    fn date_label(&self) -> String {
        match &self.fixed_date {
            Some(date) => date.clone(),
            None => today_label(&self.config.date_format),
        }
    }

    fn writer(&self) -> Result<PdfWriter> {
        let setup = self
            .description
            .page
            .unwrap_or_else(|| self.config.default_page_setup());
        let mut writer = PdfWriter::new(&setup)?;
        writer.set_title(self.description.title.clone());
        Ok(writer)
    }

    fn decorator(&self) -> PageBanner {
        let banner = PageBanner::new(
            self.description.title.clone(),
            self.description.author.clone(),
            &self.config,
            &self.styles,
        );
        match &self.fixed_date {
            Some(date) => banner.with_date(date.clone()),
            None => banner,
        }
    }

    // -- Story assembly -------------------------------------------------------

    /// Assemble the ordered story for `kind`. Needs the content width to size
    /// tables, so it validates the page geometry first.
    pub fn story(&self, kind: ReportKind) -> Result<Story> {
        let content_width = self.writer()?.geometry().content_width();
        let spacing = kind.spacing();
        let desc = self.description;
        let mut story = Story::new();

        story.push(PartKind::Cover, self.cover_blocks(kind, &spacing));

        if kind == ReportKind::Table && !desc.intro.is_empty() {
            story.push(
                PartKind::Intro,
                vec![
                    RenderBlock::paragraph(&desc.intro, self.styles.get(StyleName::Body)),
                    RenderBlock::spacer(cm_to_pt(0.5)),
                ],
            );
        }

        if matches!(kind, ReportKind::Text | ReportKind::Full) {
            for (index, section) in desc.sections.iter().enumerate() {
                story.push(PartKind::Section(index), self.section_blocks(section, &spacing));
            }
        }

        if matches!(kind, ReportKind::Table | ReportKind::Full) {
            for (index, table) in desc.tables.iter().enumerate() {
                story.push(
                    PartKind::Table(index),
                    self.table_blocks(table, &spacing, content_width),
                );
            }
        }

        if kind == ReportKind::Full && !desc.summary.is_empty() {
            story.push(PartKind::Summary, self.summary_blocks());
        }

        debug!(
            ?kind,
            parts = story.parts().len(),
            blocks = story.block_count(),
            "Story assembled"
        );
        Ok(story)
    }

    fn cover_blocks(&self, kind: ReportKind, spacing: &Spacing) -> Vec<RenderBlock> {
        let desc = self.description;
        let styles = &self.styles;
        let title_style = styles.get(StyleName::Title);
        let mut blocks = vec![RenderBlock::spacer(cm_to_pt(spacing.cover_top))];

        if kind == ReportKind::Full {
            blocks.push(RenderBlock::Banner(Banner {
                text: desc.title.clone(),
                style: title_style.clone(),
                background: palette::PRIMARY,
                padding_vertical: 18.0,
                padding_horizontal: 20.0,
            }));
        } else {
            // White title text needs a dark band; without one it is drawn in
            // the primary colour.
            blocks.push(RenderBlock::heading(
                desc.title.clone(),
                &title_style.with_colour(palette::PRIMARY),
            ));
        }

        if kind != ReportKind::Table && !desc.subtitle.is_empty() {
            blocks.push(RenderBlock::spacer(cm_to_pt(spacing.before_subtitle)));
            blocks.push(RenderBlock::heading(
                desc.subtitle.clone(),
                styles.get(StyleName::Subtitle),
            ));
        }

        let date = self.date_label();
        let caption = match (kind, desc.author.is_empty()) {
            (_, true) => date,
            (ReportKind::Full, false) => format!("Prepared by: {}  \u{b7}  {date}", desc.author),
            (_, false) => format!("{}  \u{b7}  {date}", desc.author),
        };
        blocks.push(RenderBlock::spacer(cm_to_pt(spacing.before_caption)));
        blocks.push(RenderBlock::paragraph(&caption, styles.get(StyleName::Caption)));
        blocks.push(RenderBlock::rule(2.0, palette::ACCENT));
        blocks.push(RenderBlock::PageBreak);
        blocks
    }

    fn section_blocks(&self, section: &SectionSpec, spacing: &Spacing) -> Vec<RenderBlock> {
        let styles = &self.styles;
        let mut blocks = Vec::new();

        if !section.heading.is_empty() {
            let (heading_style, rule_colour) = if section.is_primary() {
                (StyleName::H1, palette::ACCENT)
            } else {
                (StyleName::H2, palette::GREY_LIGHT)
            };
            blocks.push(RenderBlock::heading(
                section.heading.clone(),
                styles.get(heading_style),
            ));
            blocks.push(RenderBlock::rule(1.0, rule_colour));
            blocks.push(RenderBlock::spacer(cm_to_pt(0.2)));
        }

        if !section.body.is_empty() {
            blocks.push(RenderBlock::paragraph(&section.body, styles.get(StyleName::Body)));
        }

        for bullet in &section.bullets {
            blocks.push(RenderBlock::bullet(bullet.clone(), styles.get(StyleName::Bullet)));
        }

        blocks.push(RenderBlock::spacer(cm_to_pt(spacing.after_section)));
        blocks
    }

    fn table_blocks(&self, table: &TableSpec, spacing: &Spacing, width: f32) -> Vec<RenderBlock> {
        let styles = &self.styles;
        let mut blocks = Vec::new();

        if !table.heading.is_empty() {
            blocks.push(RenderBlock::heading(
                table.heading.clone(),
                styles.get(StyleName::H1),
            ));
            blocks.push(RenderBlock::rule(1.0, palette::ACCENT));
            blocks.push(RenderBlock::spacer(cm_to_pt(0.2)));
        }

        if table.has_content() {
            blocks.push(RenderBlock::Table(build_table(
                &table.headers,
                &table.rows,
                Some(table.column_widths.as_slice()),
                width,
                styles,
            )));
        }

        if !table.caption.is_empty() {
            blocks.push(RenderBlock::spacer(cm_to_pt(0.15)));
            blocks.push(RenderBlock::paragraph(
                &table.caption,
                styles.get(StyleName::Caption),
            ));
        }

        blocks.push(RenderBlock::spacer(cm_to_pt(spacing.after_table)));
        blocks
    }

    fn summary_blocks(&self) -> Vec<RenderBlock> {
        vec![
            RenderBlock::rule(1.0, palette::SECONDARY),
            RenderBlock::heading("Summary", self.styles.get(StyleName::H1)),
            RenderBlock::paragraph(&self.description.summary, self.styles.get(StyleName::Body)),
        ]
    }

    // -- Output ---------------------------------------------------------------

    /// Compose the `kind` report and write it to `output`.
    ///
    /// Returns the output path once the file is fully written. Errors from
    /// geometry validation or the filesystem are returned unchanged; the path
    /// may then hold a partial file or nothing.
    #[instrument(skip(self, output), fields(title = %self.description.title, output = %output.as_ref().display()))]
    pub fn generate(&self, kind: ReportKind, output: impl AsRef<Path>) -> Result<PathBuf> {
        let output = output.as_ref();
        let story = self.story(kind)?;
        let blocks = story.into_blocks();
        let decorator = self.decorator();

        let pages = self
            .writer()?
            .write_to_file(&blocks, &decorator, &decorator, output)?;

        info!(?kind, pages, "Report generated");
        Ok(output.to_path_buf())
    }
}

// -- Entry points ---------------------------------------------------------------

/// Cover plus text sections.
pub fn generate_text_report(
    description: &ReportDescription,
    output: impl AsRef<Path>,
) -> Result<PathBuf> {
    ReportComposer::new(description).generate(ReportKind::Text, output)
}

/// Cover, optional intro paragraph and data tables.
pub fn generate_table_report(
    description: &ReportDescription,
    output: impl AsRef<Path>,
) -> Result<PathBuf> {
    ReportComposer::new(description).generate(ReportKind::Table, output)
}

/// Banner cover, text sections, tables and optional summary.
pub fn generate_full_report(
    description: &ReportDescription,
    output: impl AsRef<Path>,
) -> Result<PathBuf> {
    ReportComposer::new(description).generate(ReportKind::Full, output)
}

#[cfg(test)]
mod tests {
    use folio_core::{FolioError, Margins, PageSetup, PaperSize};

    use super::*;
    use crate::report::model::Cell;
    use crate::report::style::Colour;

    fn composer(desc: &ReportDescription) -> ReportComposer<'_> {
        ReportComposer::new(desc).with_date("May 01, 2026")
    }

    fn sample() -> ReportDescription {
        let mut desc = ReportDescription::new("Annual Review");
        desc.subtitle = "Operations".into();
        desc.author = "Finance".into();
        desc.sections = vec![
            SectionSpec::new("Overview").with_body("First line\nSecond line"),
            SectionSpec::new("Details").with_level(2).with_bullets(["a", "b"]),
        ];
        desc.tables = vec![
            TableSpec::new(["Region", "Total"])
                .with_heading("Sales")
                .with_row(["North", "10"])
                .with_caption("Table 1"),
            TableSpec::new(["Product"]).with_row(["Widget"]),
        ];
        desc.summary = "All good.".into();
        desc
    }

    fn rules(blocks: &[RenderBlock]) -> Vec<Colour> {
        blocks
            .iter()
            .filter_map(|b| match b {
                RenderBlock::Rule { colour, .. } => Some(*colour),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn full_story_orders_cover_sections_tables_summary() {
        let desc = sample();
        let story = composer(&desc).story(ReportKind::Full).unwrap();
        assert_eq!(
            story.kinds(),
            vec![
                PartKind::Cover,
                PartKind::Section(0),
                PartKind::Section(1),
                PartKind::Table(0),
                PartKind::Table(1),
                PartKind::Summary,
            ]
        );
        assert!(matches!(story.parts()[0].blocks[1], RenderBlock::Banner(_)));
    }

    #[test]
    fn text_story_has_no_tables_or_summary() {
        let desc = sample();
        let story = composer(&desc).story(ReportKind::Text).unwrap();
        assert_eq!(
            story.kinds(),
            vec![PartKind::Cover, PartKind::Section(0), PartKind::Section(1)]
        );
        assert!(!story.blocks().any(|b| matches!(b, RenderBlock::Table(_) | RenderBlock::Banner(_))));
    }

    #[test]
    fn table_story_includes_intro() {
        let mut desc = sample();
        desc.intro = "Figures below.".into();
        let story = composer(&desc).story(ReportKind::Table).unwrap();
        assert_eq!(
            story.kinds(),
            vec![PartKind::Cover, PartKind::Intro, PartKind::Table(0), PartKind::Table(1)]
        );
    }

    #[test]
    fn cover_caption_and_closing_page_break() {
        let desc = sample();
        let story = composer(&desc).story(ReportKind::Full).unwrap();
        let cover = &story.parts()[0].blocks;

        assert!(matches!(cover.last(), Some(RenderBlock::PageBreak)));
        let caption = cover.iter().find_map(|b| match b {
            RenderBlock::Paragraph { lines, style } if style.name == StyleName::Caption => {
                Some(lines.join(" "))
            }
            _ => None,
        });
        assert_eq!(
            caption.as_deref(),
            Some("Prepared by: Finance  \u{b7}  May 01, 2026")
        );

        let text = composer(&desc).story(ReportKind::Text).unwrap();
        let caption = text.parts()[0].blocks.iter().find_map(|b| match b {
            RenderBlock::Paragraph { lines, .. } => Some(lines[0].clone()),
            _ => None,
        });
        assert_eq!(caption.as_deref(), Some("Finance  \u{b7}  May 01, 2026"));
    }

    #[test]
    fn body_newlines_become_separate_lines() {
        let mut desc = ReportDescription::new("T");
        desc.sections = vec![SectionSpec::new("H").with_body("Line1\nLine2")];
        let story = composer(&desc).story(ReportKind::Text).unwrap();

        let body = story.parts()[1].blocks.iter().find_map(|b| match b {
            RenderBlock::Paragraph { lines, .. } => Some(lines.clone()),
            _ => None,
        });
        assert_eq!(body, Some(vec!["Line1".to_string(), "Line2".to_string()]));
    }

    /// Baseline of every shown string in a written PDF, page by page.
    fn written_baselines(path: &Path) -> Vec<(String, f32)> {
        use lopdf::Object;

        let doc = lopdf::Document::load(path).unwrap();
        let mut found = Vec::new();
        for page_id in doc.get_pages().into_values() {
            let content = doc.get_and_decode_page_content(page_id).unwrap();
            let mut y = 0.0;
            for op in &content.operations {
                match op.operator.as_str() {
                    "Td" | "TD" => y = op.operands[1].as_float().unwrap(),
                    "Tm" => y = op.operands[5].as_float().unwrap(),
                    "Tj" | "TJ" => {
                        let mut text = String::new();
                        let items = match &op.operands[0] {
                            Object::Array(items) => items.clone(),
                            other => vec![other.clone()],
                        };
                        for item in items {
                            if let Object::String(bytes, _) = item {
                                text.push_str(&String::from_utf8_lossy(&bytes));
                            }
                        }
                        found.push((text, y));
                    }
                    _ => {}
                }
            }
        }
        found
    }

    #[test]
    fn written_body_lines_sit_on_separate_baselines() {
        let dir = tempfile::tempdir().unwrap();
        let mut desc = ReportDescription::new("T");
        desc.sections = vec![SectionSpec::new("H").with_body("Line1\nLine2")];
        let path = generate_text_report(&desc, dir.path().join("lines.pdf")).unwrap();

        let baselines = written_baselines(&path);
        let y_of = |wanted: &str| {
            baselines
                .iter()
                .find(|(text, _)| text == wanted)
                .map(|(_, y)| *y)
                .unwrap_or_else(|| panic!("{wanted} not drawn: {baselines:?}"))
        };
        let (first, second) = (y_of("Line1"), y_of("Line2"));
        // Body leading is 14pt; the second line sits lower on the page.
        assert!((first - second - 14.0).abs() < 0.5, "{first} vs {second}");
    }

    #[test]
    fn level_two_sections_use_secondary_style_and_light_rule() {
        let desc = sample();
        let story = composer(&desc).story(ReportKind::Text).unwrap();
        let primary = &story.parts()[1].blocks;
        let secondary = &story.parts()[2].blocks;

        match (&primary[0], &secondary[0]) {
            (RenderBlock::Heading { style: a, .. }, RenderBlock::Heading { style: b, .. }) => {
                assert_eq!(a.name, StyleName::H1);
                assert_eq!(b.name, StyleName::H2);
            }
            _ => panic!("sections should start with a heading"),
        }
        assert_eq!(rules(primary), vec![palette::ACCENT]);
        assert_eq!(rules(secondary), vec![palette::GREY_LIGHT]);
    }

    #[test]
    fn two_by_two_table_has_three_rendered_rows() {
        let mut desc = ReportDescription::new("T");
        desc.tables = vec![TableSpec::new(["A", "B"]).with_row(["1", "2"]).with_row(["3", "4"])];
        let story = composer(&desc).story(ReportKind::Table).unwrap();

        let tables: Vec<_> = story
            .blocks()
            .filter_map(|b| match b {
                RenderBlock::Table(t) => Some(t),
                _ => None,
            })
            .collect();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rendered_row_count(), 3);
        assert_eq!(
            tables[0].rendered_backgrounds(),
            vec![palette::PRIMARY, palette::WHITE, palette::TINT]
        );
    }

    #[test]
    fn empty_tables_are_skipped_header_only_tables_kept() {
        let mut desc = ReportDescription::new("T");
        desc.tables = vec![
            TableSpec::default().with_heading("Nothing here"),
            TableSpec::new(["Only", "Headers"]),
        ];
        let story = composer(&desc).story(ReportKind::Table).unwrap();

        let in_part = |i: usize| {
            story.parts()[i]
                .blocks
                .iter()
                .filter(|b| matches!(b, RenderBlock::Table(_)))
                .count()
        };
        assert_eq!(in_part(1), 0);
        assert_eq!(in_part(2), 1);
    }

    #[test]
    fn summary_only_full_report() {
        let mut desc = ReportDescription::new("T");
        desc.summary = "Done.".into();
        let story = composer(&desc).story(ReportKind::Full).unwrap();

        assert_eq!(story.kinds(), vec![PartKind::Cover, PartKind::Summary]);
        let summary = &story.parts()[1].blocks;
        assert_eq!(summary.len(), 3);
        assert!(matches!(&summary[1], RenderBlock::Heading { text, .. } if text == "Summary"));
    }

    #[test]
    fn explicit_column_widths_reach_the_table() {
        let mut desc = ReportDescription::new("T");
        desc.tables = vec![
            TableSpec::new(["A", "B"])
                .with_row([Cell::new(1), Cell::new(2)])
                .with_column_widths(vec![120.0, 60.0]),
        ];
        let story = composer(&desc).story(ReportKind::Full).unwrap();
        let widths = story.blocks().find_map(|b| match b {
            RenderBlock::Table(t) => Some(t.column_widths.clone()),
            _ => None,
        });
        assert_eq!(widths, Some(vec![120.0, 60.0]));
    }

    #[test]
    fn generate_writes_file_and_returns_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("full.pdf");
        let desc = sample();

        let returned = composer(&desc).generate(ReportKind::Full, &path).unwrap();
        assert_eq!(returned, path);

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        // Cover page plus at least one content page.
        assert!(doc.get_pages().len() >= 2);
    }

    #[test]
    fn identical_descriptions_give_equal_length_output() {
        let dir = tempfile::tempdir().unwrap();
        let desc = sample();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.pdf");

        generate_text_report(&desc, &a).unwrap();
        generate_text_report(&desc, &b).unwrap();

        let len_a = std::fs::metadata(&a).unwrap().len();
        let len_b = std::fs::metadata(&b).unwrap().len();
        assert_eq!(len_a, len_b);
    }

    #[test]
    fn invalid_page_setup_is_a_geometry_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut desc = sample();
        desc.page = Some(PageSetup {
            paper_size: PaperSize::A5,
            margins: Margins {
                left: 90.0,
                right: 90.0,
                top: 20.0,
                bottom: 20.0,
            },
        });

        let path = dir.path().join("bad.pdf");
        let err = generate_full_report(&desc, &path).unwrap_err();
        assert!(matches!(err, FolioError::Geometry(_)));
        assert!(!path.exists());
    }

    #[test]
    fn unwritable_output_surfaces_io_error() {
        let desc = sample();
        let err = generate_table_report(&desc, "/nonexistent-dir/report.pdf").unwrap_err();
        assert!(matches!(err, FolioError::Io(_)));
    }
}
