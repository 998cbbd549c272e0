// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommand implementations.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use quickside_assembly::{DirectorySink, DownloadSink, IngestReport, PageCollection};
use quickside_core::error::Result;
use tracing::{debug, info};

use crate::edits::EditPlan;
use crate::services::app_services::AppServices;

/// Ingest, edit, export, and write the combined PDF into `out_dir`.
pub fn assemble(
    services: &AppServices,
    files: &[PathBuf],
    edits: &EditPlan,
    out_dir: &Path,
) -> Result<ExitCode> {
    let mut collection = PageCollection::new();
    let report = services.ingest(&mut collection, files);
    if collection.is_empty() {
        eprintln!("Nothing to combine: none of the files contributed a page.");
        return Ok(ExitCode::FAILURE);
    }
    summarise(&report, collection.len());

    if !edits.is_empty() {
        edits.apply(services, &mut collection)?;
        info!(pages = collection.len(), "edits applied");
    }

    info!(pages = collection.len(), pdf_version = %services.config().pdf_version, "exporting");
    let artifact = services.export(&collection)?;
    let path = DirectorySink::new(out_dir).deliver(&artifact)?;
    println!("{}", path.display());
    debug!(previews = ?services.preview_stats(), "preview store after export");
    eprintln!(
        "Wrote {} page(s){}.",
        artifact.page_count,
        match artifact.skipped.len() {
            0 => String::new(),
            n => format!(", skipped {n}"),
        }
    );
    Ok(ExitCode::SUCCESS)
}

/// Print the pages `files` would contribute, one line per page.
pub fn inspect(services: &AppServices, files: &[PathBuf]) -> Result<ExitCode> {
    let mut collection = PageCollection::new();
    let report = services.ingest(&mut collection, files);

    for (position, page) in collection.iter().enumerate() {
        println!(
            "{:>4}  {:<40}  {:<5}  {}",
            position + 1,
            page.label(),
            page.kind(),
            page.dimensions()
        );
    }
    summarise(&report, collection.len());

    Ok(if collection.is_empty() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn summarise(report: &IngestReport, pages: usize) {
    eprintln!(
        "{} page(s) from {} of {} file(s){}.",
        pages,
        report.files_ingested,
        report.files_total,
        match report.failures.len() {
            0 => String::new(),
            n => format!(", {n} failed"),
        }
    );
}
