// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — loads configuration, owns the preview store, and
// drives ingestion and export batches for the command line.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use quickside_assembly::{
    CancelToken, ExportArtifact, ExportEvent, Exporter, IngestEvent, IngestReport, Ingestor,
    PageCollection, PreviewStats, PreviewStore, SourceFile,
};
use quickside_core::error::{QuickSideError, Result};
use quickside_core::{AssemblyConfig, humanize_error};
use tracing::{debug, info, warn};

use super::data_dir;

const CONFIG_FILE: &str = "config.json";

/// Everything a command needs, initialised once at startup.
pub struct AppServices {
    config: AssemblyConfig,
    previews: Arc<PreviewStore>,
    ingestor: Ingestor,
    exporter: Exporter,
}

impl AppServices {
    /// Initialise services. An explicit `config_path` must load; otherwise the
    /// per-user config is used if present and valid, else defaults.
    pub fn init(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => AssemblyConfig::load(path)?,
            None => load_config(&data_dir::config_dir()).unwrap_or_default(),
        };
        debug!(?config, "configuration loaded");
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: AssemblyConfig) -> Self {
        let previews = PreviewStore::new().shared();
        let ingestor = Ingestor::new(previews.clone(), config.clone());
        let exporter = Exporter::new(config.clone());
        Self {
            config,
            previews,
            ingestor,
            exporter,
        }
    }

    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    pub fn preview_stats(&self) -> PreviewStats {
        self.previews.stats()
    }

    // -- Ingestion -----------------------------------------------------------

    /// Read `paths` and ingest them in order. Unreadable paths are reported
    /// and skipped; they do not appear in the returned report.
    pub fn ingest(&self, collection: &mut PageCollection, paths: &[PathBuf]) -> IngestReport {
        let files: Vec<SourceFile> = paths
            .iter()
            .filter_map(|path| match SourceFile::from_path(path) {
                Ok(file) => Some(file),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "cannot read input");
                    eprintln!("{}: {}", path.display(), humanize_error(&err));
                    None
                }
            })
            .collect();

        let run = self.ingestor.ingest(collection, files, CancelToken::new());
        let mut report = IngestReport::default();
        for event in run {
            match event {
                IngestEvent::FileOpened { name, page_count, .. } => {
                    info!(file = %name, pages = page_count, "reading PDF");
                }
                IngestEvent::PageIngested { progress, .. } => {
                    debug!(progress, "page ingested");
                }
                IngestEvent::FileFailed { failure, .. } => {
                    eprintln!("{}: {}", failure.name, failure.human);
                }
                IngestEvent::Completed(done) | IngestEvent::Cancelled(done) => report = done,
            }
        }
        report
    }

    /// Replace the page at `index` with every page of the file at `path`.
    pub fn replace(
        &self,
        collection: &mut PageCollection,
        index: usize,
        path: &Path,
    ) -> Result<usize> {
        let file = SourceFile::from_path(path)?;
        self.ingestor.replace(collection, index, file)
    }

    // -- Export --------------------------------------------------------------

    /// Export the collection, reporting skipped pages as they happen.
    pub fn export(&self, collection: &PageCollection) -> Result<ExportArtifact> {
        let run = self.exporter.export(collection, CancelToken::new())?;
        for event in run {
            match event {
                ExportEvent::PageAdded { position, total, .. } => {
                    debug!(page = position + 1, total, "page exported");
                }
                ExportEvent::PageSkipped { skipped, .. } => {
                    eprintln!(
                        "page {} ({}) skipped: {}",
                        skipped.position + 1,
                        skipped.label,
                        skipped.human
                    );
                }
                ExportEvent::Finished(artifact) => return Ok(artifact),
                ExportEvent::Failed(err) => return Err(err),
                ExportEvent::Cancelled { processed, total } => {
                    return Err(QuickSideError::PdfError(format!(
                        "export cancelled after {processed} of {total} pages"
                    )));
                }
            }
        }
        Err(QuickSideError::PdfError("export ended without a result".into()))
    }
}

/// Load `config.json` from `dir`. A missing file is silent; an invalid one is
/// logged and ignored.
fn load_config(dir: &Path) -> Option<AssemblyConfig> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return None;
    }
    match AssemblyConfig::load(&path) {
        Ok(config) => Some(config),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring invalid config");
            None
        }
    }
}
