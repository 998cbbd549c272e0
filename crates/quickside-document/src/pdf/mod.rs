// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — opening source PDFs, copying their pages, building image pages,
// and assembling the output document.

pub mod assembler;
pub mod copy;
pub mod reader;
pub mod writer;

pub use assembler::OutputDocument;
pub use copy::PageCopier;
pub use reader::SourcePdf;
pub use writer::PdfWriter;
