// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// folio-document — Report composition and PDF handling for Folio.
//
// Composes styled, paginated reports (cover, text sections, zebra-striped
// tables, summary) from a plain description, and provides operations on
// existing PDFs (inspect, extract text, search, merge, split, rotate,
// watermark, encrypt and decrypt).

pub mod pdf;
pub mod report;

// Re-export the primary entry points so callers can use `folio_document::PdfReader` etc.
pub use pdf::reader::PdfReader;
pub use pdf::writer::PdfWriter;
pub use report::{
    ReportComposer, ReportDescription, ReportKind, generate_full_report, generate_table_report,
    generate_text_report,
};
