// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — laying out new documents and working on existing ones: text,
// search, merge, split, rotate, watermark and password protection.

pub mod canvas;
pub mod files;
pub mod reader;
pub mod writer;

pub use canvas::Canvas;
pub use files::{
    decrypt_file, encrypt_file, extract_range_file, merge_files, rotate_file, split_file,
    watermark_file,
};
pub use reader::{PageChunk, PdfInfo, PdfReader, SearchMatch};
pub use writer::{PdfWriter, RenderedDocument};
