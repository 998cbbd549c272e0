// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for QuickSide.

use thiserror::Error;

/// Top-level error type for all QuickSide operations.
#[derive(Debug, Error)]
pub enum QuickSideError {
    // -- Input errors --
    #[error("unsupported input '{name}': {media_type}")]
    UnsupportedInput { name: String, media_type: String },

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("image format {0} cannot be embedded (only JPEG and PNG)")]
    UnsupportedImageFormat(String),

    // -- Collection / export errors --
    #[error("preview allocation failed: {0}")]
    PreviewAllocation(String),

    #[error("page index {index} out of range (collection has {len} pages)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("nothing to export: the page collection is empty")]
    EmptyCollection,

    #[error("export produced no pages ({skipped} skipped)")]
    NothingExported { skipped: usize },

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, QuickSideError>;
