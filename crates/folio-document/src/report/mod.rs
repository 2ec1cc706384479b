// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Report composition: style registry, description model, render blocks,
// table builder, page decoration and the composer itself.

pub mod block;
pub mod compose;
pub mod decoration;
pub mod model;
pub mod style;
pub mod table;

pub use block::{PartKind, RenderBlock, Story};
pub use compose::{
    ReportComposer, ReportKind, generate_full_report, generate_table_report, generate_text_report,
};
pub use decoration::{PageBanner, PageDecorator, Undecorated};
pub use model::{Cell, ReportDescription, SectionSpec, TableSpec};
pub use style::{StyleName, StyleSheet, StyleSpec};
pub use table::{TableBlock, build_table};
