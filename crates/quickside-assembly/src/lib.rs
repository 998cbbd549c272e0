// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// quickside-assembly — the page collection and the batches that fill and
// export it.
//
// Files go in through an `Ingestor`, which appends one descriptor per PDF
// page or image to a `PageCollection`. The collection is reordered, trimmed
// and rotated in place, then an `Exporter` copies every page, in order, into
// one output PDF that a `DownloadSink` hands to the user.

pub mod cancel;
pub mod collection;
pub mod download;
pub mod export;
pub mod ingest;
pub mod preview;
pub mod source;

pub use cancel::CancelToken;
pub use collection::{PageCollection, PageDescriptor};
pub use download::{DirectorySink, DownloadSink};
pub use export::{ExportArtifact, ExportEvent, ExportOutcome, ExportRun, Exporter, SkippedPage};
pub use ingest::{FileFailure, IngestEvent, IngestReport, IngestRun, Ingestor};
pub use preview::{HandleId, PreviewAllocator, PreviewHandle, PreviewStats, PreviewStore};
pub use source::SourceFile;
