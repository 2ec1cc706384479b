// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Report configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{Margins, PageSetup, PaperSize};

/// Settings applied to every generated report unless the report description
/// overrides them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    /// Paper size used when a description carries no page setup.
    pub default_paper_size: PaperSize,
    /// Margins used when a description carries no page setup.
    pub default_margins: Margins,
    /// Draw the title/author bar on pages after the first.
    pub show_header: bool,
    /// Draw the date/marker/page-number bar on every page.
    pub show_footer: bool,
    /// Text centred in the footer bar.
    pub footer_marker: String,
    /// `chrono` format string for date stamps on the cover and footer.
    pub date_format: String,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            default_paper_size: PaperSize::A4,
            default_margins: Margins::default(),
            show_header: true,
            show_footer: true,
            footer_marker: "CONFIDENTIAL".to_string(),
            date_format: "%B %d, %Y".to_string(),
        }
    }
}

impl FolioConfig {
    /// Load a configuration from a JSON file. Missing keys take their
    /// defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Page setup derived from the configured defaults.
    pub fn default_page_setup(&self) -> PageSetup {
        PageSetup {
            paper_size: self.default_paper_size,
            margins: self.default_margins,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.json");
        std::fs::write(&path, r#"{ "footer_marker": "INTERNAL", "show_header": false }"#).unwrap();

        let config = FolioConfig::load(&path).unwrap();
        assert_eq!(config.footer_marker, "INTERNAL");
        assert!(!config.show_header);
        assert!(config.show_footer);
        assert_eq!(config.default_paper_size, PaperSize::A4);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = FolioConfig::load("/nonexistent/folio.json").unwrap_err();
        assert!(matches!(err, crate::FolioError::Io(_)));
    }
}
