// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Folio.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Folio operations.
#[derive(Debug, Error)]
pub enum FolioError {
    // -- Document errors --
    #[error("PDF operation failed: {0}")]
    Pdf(String),

    #[error("page {page} out of range (document has {total} pages)")]
    PageOutOfRange { page: u32, total: u32 },

    #[error("rotation must be a multiple of 90, got {0}")]
    InvalidRotation(i32),

    #[error("invalid search pattern: {0}")]
    InvalidPattern(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("incorrect password")]
    InvalidPassword,

    // -- Layout errors --
    #[error("invalid page geometry: {0}")]
    Geometry(String),

    // -- Storage / persistence --
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FolioError>;
