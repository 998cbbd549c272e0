// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// quickside-document — the PDF and image collaborators of the page assembler.
//
// Opens source PDFs and copies their pages byte-for-byte into an output
// document, turns JPEG/PNG images into full pages, reads image headers, and
// renders low-resolution page previews.

pub mod image;
pub mod pdf;
pub mod preview;

// Re-export the primary structs so callers can use `quickside_document::SourcePdf` etc.
pub use image::processor::ImageProcessor;
pub use pdf::assembler::OutputDocument;
pub use pdf::copy::PageCopier;
pub use pdf::reader::SourcePdf;
pub use pdf::writer::PdfWriter;
pub use preview::{OutlineRenderer, PageRenderer, RenderedPreview};
