// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Render blocks — the ordered, self-contained drawable units the composer
// produces and the pagination engine consumes.

use super::style::{Colour, StyleSpec};
use super::table::TableBlock;

/// A full-width band of colour with centred text, used for the cover title.
#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    pub text: String,
    pub style: StyleSpec,
    pub background: Colour,
    pub padding_vertical: f32,
    pub padding_horizontal: f32,
}

/// One atomic drawable unit. Blocks own their data and reference nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderBlock {
    /// Vertical gap in points.
    Spacer { height: f32 },
    Banner(Banner),
    Heading { text: String, style: StyleSpec },
    /// Each entry of `lines` starts on a new line; long lines are wrapped.
    Paragraph { lines: Vec<String>, style: StyleSpec },
    /// A list item drawn with a bullet glyph at the style's bullet indent.
    Bullet { text: String, style: StyleSpec },
    /// Full-width horizontal rule.
    Rule { thickness: f32, colour: Colour },
    Table(TableBlock),
    PageBreak,
}

impl RenderBlock {
    pub fn spacer(height: f32) -> Self {
        Self::Spacer { height }
    }

    pub fn heading(text: impl Into<String>, style: &StyleSpec) -> Self {
        Self::Heading {
            text: text.into(),
            style: style.clone(),
        }
    }

    /// Paragraph whose literal newlines become line breaks.
    pub fn paragraph(text: &str, style: &StyleSpec) -> Self {
        Self::Paragraph {
            lines: text.lines().map(str::to_string).collect(),
            style: style.clone(),
        }
    }

    pub fn bullet(text: impl Into<String>, style: &StyleSpec) -> Self {
        Self::Bullet {
            text: text.into(),
            style: style.clone(),
        }
    }

    pub fn rule(thickness: f32, colour: Colour) -> Self {
        Self::Rule { thickness, colour }
    }

    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Spacer { .. } => "spacer",
            Self::Banner(_) => "banner",
            Self::Heading { .. } => "heading",
            Self::Paragraph { .. } => "paragraph",
            Self::Bullet { .. } => "bullet",
            Self::Rule { .. } => "rule",
            Self::Table(_) => "table",
            Self::PageBreak => "page-break",
        }
    }
}

/// Which part of the description a run of blocks came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    Cover,
    Intro,
    /// Index into `ReportDescription::sections`.
    Section(usize),
    /// Index into `ReportDescription::tables`.
    Table(usize),
    Summary,
}

/// The blocks produced for one part of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryPart {
    pub kind: PartKind,
    pub blocks: Vec<RenderBlock>,
}

/// Ordered sequence of parts; flattening it gives the block list handed to
/// the pagination engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Story {
    parts: Vec<StoryPart>,
}

impl Story {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: PartKind, blocks: Vec<RenderBlock>) {
        self.parts.push(StoryPart { kind, blocks });
    }

    pub fn parts(&self) -> &[StoryPart] {
        &self.parts
    }

    pub fn kinds(&self) -> Vec<PartKind> {
        self.parts.iter().map(|p| p.kind).collect()
    }

    pub fn blocks(&self) -> impl Iterator<Item = &RenderBlock> {
        self.parts.iter().flat_map(|p| p.blocks.iter())
    }

    pub fn block_count(&self) -> usize {
        self.parts.iter().map(|p| p.blocks.len()).sum()
    }

    pub fn into_blocks(self) -> Vec<RenderBlock> {
        self.parts.into_iter().flat_map(|p| p.blocks).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::style::{StyleName, StyleSheet};

    #[test]
    fn paragraph_splits_on_newlines() {
        let sheet = StyleSheet::build();
        let block = RenderBlock::paragraph("Line1\nLine2", sheet.get(StyleName::Body));
        match block {
            RenderBlock::Paragraph { lines, .. } => assert_eq!(lines, vec!["Line1", "Line2"]),
            other => panic!("expected paragraph, got {}", other.kind()),
        }
    }

    #[test]
    fn story_flattens_in_part_order() {
        let mut story = Story::new();
        story.push(PartKind::Cover, vec![RenderBlock::spacer(1.0), RenderBlock::PageBreak]);
        story.push(PartKind::Summary, vec![RenderBlock::spacer(2.0)]);

        assert_eq!(story.kinds(), vec![PartKind::Cover, PartKind::Summary]);
        assert_eq!(story.block_count(), 3);
        let kinds: Vec<&str> = story.blocks().map(RenderBlock::kind).collect();
        assert_eq!(kinds, vec!["spacer", "page-break", "spacer"]);
    }
}
