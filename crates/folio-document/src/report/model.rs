// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Report description — the plain data a caller hands to the composer.
//
// Every optional field has an explicit empty default so that JSON
// descriptions with missing keys deserialise cleanly and the composer never
// has to test for presence.

use std::fmt;

use folio_core::PageSetup;
use serde::{Deserialize, Serialize};

/// One text section: optional heading, free-text body and bullet list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionSpec {
    pub heading: String,
    /// Newlines are rendered as line breaks.
    pub body: String,
    pub bullets: Vec<String>,
    /// 1 selects the primary heading style and accent rule; any other value
    /// renders as a level-2 section.
    pub level: u8,
}

impl Default for SectionSpec {
    fn default() -> Self {
        Self {
            heading: String::new(),
            body: String::new(),
            bullets: Vec::new(),
            level: 1,
        }
    }
}

impl SectionSpec {
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            ..Self::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_bullets<I, S>(mut self, bullets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bullets = bullets.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    pub fn is_primary(&self) -> bool {
        self.level == 1
    }
}

/// A single table cell. Any JSON scalar is accepted and stringified; `null`
/// becomes an empty cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "String")]
pub struct Cell(String);

impl Cell {
    pub fn new(value: impl fmt::Display) -> Self {
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<serde_json::Value> for Cell {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self(String::new()),
            serde_json::Value::String(s) => Self(s),
            other => Self(other.to_string()),
        }
    }
}

impl From<Cell> for String {
    fn from(cell: Cell) -> Self {
        cell.0
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One data table with optional heading and caption.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSpec {
    pub heading: String,
    pub headers: Vec<String>,
    /// Rows may be shorter or longer than `headers`; see the table builder.
    pub rows: Vec<Vec<Cell>>,
    pub caption: String,
    /// Explicit column widths in points. Empty means split evenly.
    pub column_widths: Vec<f32>,
}

impl TableSpec {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = heading.into();
        self
    }

    pub fn with_row<I, C>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    pub fn with_column_widths(mut self, widths: Vec<f32>) -> Self {
        self.column_widths = widths;
        self
    }

    /// A table with neither headers nor rows renders nothing.
    pub fn has_content(&self) -> bool {
        !self.headers.is_empty() || !self.rows.is_empty()
    }
}

/// Complete input to report generation. Read-only during composition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportDescription {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    /// Introductory paragraph of a table report.
    pub intro: String,
    pub sections: Vec<SectionSpec>,
    pub tables: Vec<TableSpec>,
    pub summary: String,
    /// Page size and margins; the configured defaults apply when absent.
    pub page: Option<PageSetup>,
}

impl ReportDescription {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn from_json(raw: &str) -> folio_core::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
