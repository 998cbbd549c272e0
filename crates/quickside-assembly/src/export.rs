// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export — assemble the collection into a single PDF.
//
// Like ingestion, an export is an iterator of events: one per page, then a
// terminal `Finished`, `Failed` or `Cancelled`. Each source PDF is parsed at
// most once per export, keyed by content fingerprint, and its shared objects
// are copied into the output once. Pages that cannot be copied are skipped
// and reported; the export only fails if no page made it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use quickside_core::error::{QuickSideError, Result};
use quickside_core::{AssemblyConfig, HumanError, PageKind, humanize_error};
use quickside_document::{OutputDocument, PageCopier, SourcePdf};
use tracing::{debug, info, instrument, warn};

use crate::cancel::CancelToken;
use crate::collection::{PageCollection, PageDescriptor};

/// A page left out of the output.
#[derive(Debug, Clone)]
pub struct SkippedPage {
    /// Position in the collection.
    pub position: usize,
    pub label: String,
    pub reason: String,
    pub human: HumanError,
}

/// The serialised output PDF.
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    /// Suggested download name.
    pub filename: String,
    pub page_count: usize,
    pub skipped: Vec<SkippedPage>,
    /// Distinct source PDFs parsed for this export.
    pub sources_parsed: usize,
    pub finished_at: DateTime<Utc>,
}

impl std::fmt::Debug for ExportArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportArtifact")
            .field("bytes", &self.bytes.len())
            .field("filename", &self.filename)
            .field("page_count", &self.page_count)
            .field("skipped", &self.skipped.len())
            .field("sources_parsed", &self.sources_parsed)
            .field("finished_at", &self.finished_at)
            .finish()
    }
}

#[derive(Debug)]
pub enum ExportEvent {
    PageAdded {
        position: usize,
        total: usize,
        progress: f32,
    },
    PageSkipped { skipped: SkippedPage, progress: f32 },
    Finished(ExportArtifact),
    Failed(QuickSideError),
    /// Stopped between pages; nothing was produced.
    Cancelled { processed: usize, total: usize },
}

/// How an export run ended, when it did not fail.
#[derive(Debug)]
pub enum ExportOutcome {
    Completed(ExportArtifact),
    Cancelled,
}

/// Parsed source plus the copier that remembers what was already copied
/// from it into this export's output.
enum CachedSource {
    Loaded { pdf: SourcePdf, copier: PageCopier },
    Unreadable(String),
}

/// Builds output PDFs from a page collection.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    config: AssemblyConfig,
}

impl Exporter {
    pub fn new(config: AssemblyConfig) -> Self {
        Self { config }
    }

    /// Start exporting `collection` in its current order. The collection is
    /// borrowed for the whole run, so it cannot change underneath it.
    #[instrument(skip_all, fields(pages = collection.len()))]
    pub fn export<'a>(
        &self,
        collection: &'a PageCollection,
        cancel: CancelToken,
    ) -> Result<ExportRun<'a>> {
        if collection.is_empty() {
            return Err(QuickSideError::EmptyCollection);
        }
        info!("Export started");
        Ok(ExportRun {
            pages: collection.as_slice(),
            position: 0,
            output: Some(OutputDocument::new(&self.config.pdf_version)),
            sources: HashMap::new(),
            skipped: Vec::new(),
            config: self.config.clone(),
            cancel,
            done: false,
        })
    }
}

/// An export in progress.
pub struct ExportRun<'a> {
    pages: &'a [PageDescriptor],
    position: usize,
    output: Option<OutputDocument>,
    /// Keyed by source fingerprint. Dropped with the run.
    sources: HashMap<String, CachedSource>,
    skipped: Vec<SkippedPage>,
    config: AssemblyConfig,
    cancel: CancelToken,
    done: bool,
}

impl ExportRun<'_> {
    /// Drive the export to the end.
    pub fn finish(mut self) -> Result<ExportOutcome> {
        for event in self.by_ref() {
            match event {
                ExportEvent::Finished(artifact) => return Ok(ExportOutcome::Completed(artifact)),
                ExportEvent::Failed(err) => return Err(err),
                ExportEvent::Cancelled { .. } => return Ok(ExportOutcome::Cancelled),
                ExportEvent::PageAdded { .. } | ExportEvent::PageSkipped { .. } => {}
            }
        }
        Ok(ExportOutcome::Cancelled)
    }

    pub fn total(&self) -> usize {
        self.pages.len()
    }

    fn progress(&self) -> f32 {
        self.position as f32 / self.pages.len() as f32
    }

    fn append(&mut self, page: &PageDescriptor) -> Result<()> {
        let output = self
            .output
            .as_mut()
            .ok_or_else(|| QuickSideError::PdfError("export already finished".into()))?;
        let rotation = page.rotation().degrees();
        let source = page.source();

        match page.kind() {
            PageKind::ImagePage => {
                let media_type =
                    source
                        .media_type()
                        .ok_or_else(|| QuickSideError::UnsupportedInput {
                            name: source.name().to_string(),
                            media_type: source.declared_type().to_string(),
                        })?;
                output.append_image_page(source.bytes(), &media_type, rotation)
            }
            PageKind::PdfPage => {
                let cached = self
                    .sources
                    .entry(source.fingerprint().to_string())
                    .or_insert_with(|| match SourcePdf::from_bytes(source.bytes()) {
                        Ok(pdf) => {
                            debug!(
                                file = source.name(),
                                pages = pdf.page_count(),
                                "Source parsed for export"
                            );
                            CachedSource::Loaded {
                                pdf,
                                copier: PageCopier::new(),
                            }
                        }
                        Err(QuickSideError::PdfError(detail)) => CachedSource::Unreadable(detail),
                        Err(err) => CachedSource::Unreadable(err.to_string()),
                    });
                match cached {
                    CachedSource::Loaded { pdf, copier } => {
                        output.append_pdf_page(pdf, copier, page.source_page_index(), rotation)
                    }
                    CachedSource::Unreadable(reason) => {
                        Err(QuickSideError::PdfError(reason.clone()))
                    }
                }
            }
        }
    }

    fn complete(&mut self) -> Result<ExportArtifact> {
        let output = self
            .output
            .take()
            .ok_or_else(|| QuickSideError::PdfError("export already finished".into()))?;
        let page_count = output.page_count();
        if page_count == 0 {
            return Err(QuickSideError::NothingExported {
                skipped: self.skipped.len(),
            });
        }

        let bytes = output.finish()?;
        let sources_parsed = self
            .sources
            .values()
            .filter(|cached| matches!(cached, CachedSource::Loaded { .. }))
            .count();
        self.sources.clear();

        Ok(ExportArtifact {
            filename: self.config.output_filename(page_count),
            bytes,
            page_count,
            skipped: std::mem::take(&mut self.skipped),
            sources_parsed,
            finished_at: Utc::now(),
        })
    }
}

impl Iterator for ExportRun<'_> {
    type Item = ExportEvent;

    fn next(&mut self) -> Option<ExportEvent> {
        if self.done {
            return None;
        }
        let total = self.pages.len();

        if self.cancel.is_cancelled() {
            self.done = true;
            self.output = None;
            self.sources.clear();
            info!(processed = self.position, total, "Export cancelled");
            return Some(ExportEvent::Cancelled {
                processed: self.position,
                total,
            });
        }

        if self.position < total {
            let position = self.position;
            let pages = self.pages;
            let page = &pages[position];
            let result = self.append(page);
            self.position += 1;

            return Some(match result {
                Ok(()) => ExportEvent::PageAdded {
                    position,
                    total,
                    progress: self.progress(),
                },
                Err(err) => {
                    warn!(position, page = %page.label(), error = %err, "Page skipped");
                    let skipped = SkippedPage {
                        position,
                        label: page.label(),
                        reason: err.to_string(),
                        human: humanize_error(&err),
                    };
                    self.skipped.push(skipped.clone());
                    ExportEvent::PageSkipped {
                        skipped,
                        progress: self.progress(),
                    }
                }
            });
        }

        self.done = true;
        Some(match self.complete() {
            Ok(artifact) => {
                info!(
                    pages = artifact.page_count,
                    skipped = artifact.skipped.len(),
                    bytes = artifact.bytes.len(),
                    filename = %artifact.filename,
                    "Export finished"
                );
                ExportEvent::Finished(artifact)
            }
            Err(err) => {
                warn!(error = %err, "Export failed");
                ExportEvent::Failed(err)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_collection_is_refused() {
        let collection = PageCollection::new();
        let result = Exporter::default().export(&collection, CancelToken::new());
        assert!(matches!(result, Err(QuickSideError::EmptyCollection)));
    }
}
