// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ingestion — turn uploaded files into page descriptors.
//
// A batch is driven as an iterator of `IngestEvent`s, one per unit of work
// (opening a file, rendering one page). Descriptors are staged and only
// appended to the collection when the batch completes, so a cancelled or
// abandoned batch leaves the collection exactly as it was and releases every
// preview it allocated.

use std::sync::Arc;

use quickside_core::error::{QuickSideError, Result};
use quickside_core::{AssemblyConfig, HumanError, MediaType, PageKind, humanize_error};
use quickside_document::{ImageProcessor, OutlineRenderer, PageRenderer, RenderedPreview, SourcePdf};
use tracing::{debug, info, instrument, warn};

use crate::cancel::CancelToken;
use crate::collection::{PageCollection, PageDescriptor};
use crate::preview::{PreviewAllocator, PreviewHandle};
use crate::source::SourceFile;

/// A file that contributed no pages.
#[derive(Debug, Clone)]
pub struct FileFailure {
    /// Position of the file in the submitted batch.
    pub file_index: usize,
    pub name: String,
    pub error: String,
    pub human: HumanError,
}

impl FileFailure {
    fn new(file_index: usize, name: &str, err: &QuickSideError) -> Self {
        Self {
            file_index,
            name: name.to_string(),
            error: err.to_string(),
            human: humanize_error(err),
        }
    }
}

/// Outcome of an ingestion batch.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub files_total: usize,
    pub files_ingested: usize,
    /// Pages appended to the collection. Zero when cancelled.
    pub pages_added: usize,
    pub failures: Vec<FileFailure>,
    pub cancelled: bool,
}

/// Progress of an ingestion batch. `progress` is the fraction of the batch
/// done, in `[0, 1]`.
#[derive(Debug, Clone)]
pub enum IngestEvent {
    /// A PDF was parsed; `page_count` page events follow unless it fails.
    FileOpened {
        file_index: usize,
        name: String,
        page_count: usize,
    },
    PageIngested {
        file_index: usize,
        page_index: usize,
        page_count: usize,
        progress: f32,
    },
    /// The file was rejected or failed part-way and contributes nothing.
    FileFailed { failure: FileFailure, progress: f32 },
    /// Staged pages were appended to the collection.
    Completed(IngestReport),
    /// Nothing was appended; staged previews were released.
    Cancelled(IngestReport),
}

/// What opening a file yields: a parsed PDF whose pages are rendered one by
/// one, or a ready image page.
enum Opened {
    Pdf(SourcePdf),
    Image(PageDescriptor),
}

/// Creates page descriptors, rendering PDF previews and allocating preview
/// handles.
pub struct Ingestor {
    allocator: Arc<dyn PreviewAllocator>,
    renderer: Arc<dyn PageRenderer>,
    config: AssemblyConfig,
}

impl Ingestor {
    /// Ingestor using the outline renderer at the configured JPEG quality.
    pub fn new(allocator: Arc<dyn PreviewAllocator>, config: AssemblyConfig) -> Self {
        let renderer = Arc::new(OutlineRenderer::new(config.preview_jpeg_quality));
        Self {
            allocator,
            renderer,
            config,
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn PageRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    /// Start ingesting `files` in order. Nothing happens until the returned
    /// run is iterated; dropping it early is the same as cancelling.
    #[instrument(skip_all, fields(files = files.len()))]
    pub fn ingest<'a>(
        &'a self,
        collection: &'a mut PageCollection,
        files: Vec<SourceFile>,
        cancel: CancelToken,
    ) -> IngestRun<'a> {
        info!("Ingestion batch started");
        IngestRun {
            ingestor: self,
            collection,
            report: IngestReport {
                files_total: files.len(),
                ..IngestReport::default()
            },
            pending: files.into_iter().enumerate(),
            current: None,
            staged: Vec::new(),
            files_done: 0,
            cancel,
            done: false,
        }
    }

    /// All pages of one file, or the first error. Nothing is kept on error.
    pub fn ingest_file(&self, file: SourceFile) -> Result<Vec<PageDescriptor>> {
        let source = Arc::new(file);
        match self.open(Arc::clone(&source))? {
            Opened::Image(page) => Ok(vec![page]),
            Opened::Pdf(pdf) => (0..pdf.page_count())
                .map(|index| self.pdf_page(&source, &pdf, index))
                .collect(),
        }
    }

    /// Replace the page at `index` with every page of `file`. The new file is
    /// fully ingested before the collection is touched, so on error the
    /// collection is unchanged. Returns the number of pages spliced in.
    #[instrument(skip(self, collection, file), fields(file = file.name()))]
    pub fn replace(
        &self,
        collection: &mut PageCollection,
        index: usize,
        file: SourceFile,
    ) -> Result<usize> {
        if index >= collection.len() {
            return Err(QuickSideError::IndexOutOfRange {
                index,
                len: collection.len(),
            });
        }
        let pages = self.ingest_file(file)?;
        let count = pages.len();
        collection.splice(index, pages);
        info!(index, pages = count, len = collection.len(), "Page replaced");
        Ok(count)
    }

    fn open(&self, source: Arc<SourceFile>) -> Result<Opened> {
        let Some(media_type) = source.media_type() else {
            let declared = source.declared_type();
            return Err(QuickSideError::UnsupportedInput {
                name: source.name().to_string(),
                media_type: if declared.is_empty() { "unknown".into() } else { declared.into() },
            });
        };

        if media_type.is_pdf() {
            let pdf = SourcePdf::from_bytes(source.bytes())?;
            debug!(file = source.name(), pages = pdf.page_count(), "PDF opened");
            Ok(Opened::Pdf(pdf))
        } else {
            self.image_page(source, media_type).map(Opened::Image)
        }
    }

    /// Images preview as themselves, at native size.
    fn image_page(&self, source: Arc<SourceFile>, media_type: MediaType) -> Result<PageDescriptor> {
        let dimensions = ImageProcessor::probe_dimensions(source.bytes())?;
        let preview = RenderedPreview {
            bytes: source.bytes().to_vec(),
            media_type,
            width: dimensions.width as u32,
            height: dimensions.height as u32,
        };
        let handle = PreviewHandle::allocate(&self.allocator, preview)?;
        Ok(PageDescriptor::new(source, 0, PageKind::ImagePage, handle, dimensions))
    }

    fn pdf_page(
        &self,
        source: &Arc<SourceFile>,
        pdf: &SourcePdf,
        index: usize,
    ) -> Result<PageDescriptor> {
        let dimensions = pdf.page_dimensions(index)?;
        let preview = self.renderer.render_page(pdf, index, self.config.preview_scale)?;
        let handle = PreviewHandle::allocate(&self.allocator, preview)?;
        Ok(PageDescriptor::new(
            Arc::clone(source),
            index,
            PageKind::PdfPage,
            handle,
            dimensions,
        ))
    }
}

/// A PDF whose pages are being rendered.
struct OpenPdf {
    file_index: usize,
    source: Arc<SourceFile>,
    pdf: SourcePdf,
    next_page: usize,
    pages: Vec<PageDescriptor>,
}

/// An ingestion batch in progress. Yields one event per unit of work and
/// ends with exactly one `Completed` or `Cancelled`.
pub struct IngestRun<'a> {
    ingestor: &'a Ingestor,
    collection: &'a mut PageCollection,
    pending: std::iter::Enumerate<std::vec::IntoIter<SourceFile>>,
    current: Option<OpenPdf>,
    staged: Vec<PageDescriptor>,
    report: IngestReport,
    /// Files ingested or failed so far.
    files_done: usize,
    cancel: CancelToken,
    done: bool,
}

impl IngestRun<'_> {
    /// Drive the batch to the end and return its report.
    pub fn finish(mut self) -> IngestReport {
        for event in self.by_ref() {
            if let IngestEvent::Completed(report) | IngestEvent::Cancelled(report) = event {
                return report;
            }
        }
        self.report.clone()
    }

    fn progress(&self) -> f32 {
        if self.report.files_total == 0 {
            return 1.0;
        }
        let partial = self
            .current
            .as_ref()
            .map(|open| open.next_page as f32 / open.pdf.page_count() as f32)
            .unwrap_or(0.0);
        (self.files_done as f32 + partial) / self.report.files_total as f32
    }

    fn fail(&mut self, file_index: usize, name: &str, err: &QuickSideError) -> IngestEvent {
        warn!(file = name, error = %err, "File contributes no pages");
        let failure = FileFailure::new(file_index, name, err);
        self.report.failures.push(failure.clone());
        self.files_done += 1;
        IngestEvent::FileFailed {
            failure,
            progress: self.progress(),
        }
    }

    fn open_next(&mut self, file_index: usize, file: SourceFile) -> IngestEvent {
        let source = Arc::new(file);
        match self.ingestor.open(Arc::clone(&source)) {
            Ok(Opened::Pdf(pdf)) => {
                let page_count = pdf.page_count();
                self.current = Some(OpenPdf {
                    file_index,
                    source: Arc::clone(&source),
                    pdf,
                    next_page: 0,
                    pages: Vec::with_capacity(page_count),
                });
                IngestEvent::FileOpened {
                    file_index,
                    name: source.name().to_string(),
                    page_count,
                }
            }
            Ok(Opened::Image(page)) => {
                self.staged.push(page);
                self.report.files_ingested += 1;
                self.files_done += 1;
                debug!(file = source.name(), "Image staged");
                IngestEvent::PageIngested {
                    file_index,
                    page_index: 0,
                    page_count: 1,
                    progress: self.progress(),
                }
            }
            Err(err) => self.fail(file_index, source.name(), &err),
        }
    }

    /// Render the next page of the open PDF, if there is one.
    fn step_current(&mut self) -> Option<IngestEvent> {
        let mut open = self.current.take()?;
        let index = open.next_page;

        match self.ingestor.pdf_page(&open.source, &open.pdf, index) {
            Ok(page) => {
                open.pages.push(page);
                open.next_page += 1;
                let page_count = open.pdf.page_count();
                let file_index = open.file_index;

                if open.next_page == page_count {
                    debug!(file = open.source.name(), pages = page_count, "PDF staged");
                    self.staged.append(&mut open.pages);
                    self.report.files_ingested += 1;
                    self.files_done += 1;
                } else {
                    self.current = Some(open);
                }
                Some(IngestEvent::PageIngested {
                    file_index,
                    page_index: index,
                    page_count,
                    progress: self.progress(),
                })
            }
            // Pages rendered so far are dropped with `open`.
            Err(err) => Some(self.fail(open.file_index, open.source.name(), &err)),
        }
    }

    fn commit(&mut self) -> IngestEvent {
        let pages = std::mem::take(&mut self.staged);
        self.report.pages_added = pages.len();
        self.collection.extend(pages);
        self.done = true;
        info!(
            pages = self.report.pages_added,
            failed = self.report.failures.len(),
            len = self.collection.len(),
            "Ingestion batch completed"
        );
        IngestEvent::Completed(self.report.clone())
    }

    fn abort(&mut self) -> IngestEvent {
        self.current = None;
        self.staged.clear();
        self.report.cancelled = true;
        self.report.pages_added = 0;
        self.done = true;
        info!(files_done = self.files_done, "Ingestion batch cancelled");
        IngestEvent::Cancelled(self.report.clone())
    }
}

impl Iterator for IngestRun<'_> {
    type Item = IngestEvent;

    fn next(&mut self) -> Option<IngestEvent> {
        if self.done {
            return None;
        }
        if self.cancel.is_cancelled() {
            return Some(self.abort());
        }
        if let Some(event) = self.step_current() {
            return Some(event);
        }
        match self.pending.next() {
            Some((file_index, file)) => Some(self.open_next(file_index, file)),
            None => Some(self.commit()),
        }
    }
}
