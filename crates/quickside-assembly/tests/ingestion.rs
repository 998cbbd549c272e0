// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ingestion and editing of a page collection, end to end.

mod common;

use std::sync::Arc;

use common::{entries, layout, pdf_file, png_file, setup};
use quickside_assembly::{
    CancelToken, IngestEvent, Ingestor, PageCollection, PreviewStore, SourceFile,
};
use quickside_core::error::QuickSideError;
use quickside_core::{AssemblyConfig, PageKind, Severity};
use quickside_document::{ImageProcessor, OutlineRenderer, PageRenderer, RenderedPreview, SourcePdf};

/// Renders like the outline renderer but fails on one page index.
struct FailingRenderer {
    fail_at: usize,
}

impl PageRenderer for FailingRenderer {
    fn render_page(
        &self,
        pdf: &SourcePdf,
        index: usize,
        scale: f32,
    ) -> Result<RenderedPreview, QuickSideError> {
        if index == self.fail_at {
            return Err(QuickSideError::PdfError("renderer gave up".into()));
        }
        OutlineRenderer::default().render_page(pdf, index, scale)
    }
}

#[test]
fn pages_are_appended_in_file_then_page_order() {
    let (store, ingestor) = setup();
    let mut collection = PageCollection::new();
    let files = vec![pdf_file("A.pdf", &[101, 102, 103]), png_file("B.png", 40, 30)];

    let events: Vec<IngestEvent> = ingestor
        .ingest(&mut collection, files, CancelToken::new())
        .collect();

    assert_eq!(events.len(), 6);
    assert!(matches!(&events[0], IngestEvent::FileOpened { page_count: 3, .. }));
    assert!(matches!(
        events.last(),
        Some(IngestEvent::Completed(report)) if report.pages_added == 4
    ));
    assert_eq!(
        layout(&collection),
        entries(&[("A.pdf", 0), ("A.pdf", 1), ("A.pdf", 2), ("B.png", 0)])
    );

    let kinds: Vec<PageKind> = collection.iter().map(|p| p.kind()).collect();
    assert_eq!(
        kinds,
        vec![PageKind::PdfPage, PageKind::PdfPage, PageKind::PdfPage, PageKind::ImagePage]
    );
    assert_eq!(collection.get(1).unwrap().dimensions().width, 102.0);
    assert_eq!(collection.get(3).unwrap().dimensions().width, 40.0);
    assert_eq!(store.stats().live, 4);
}

#[test]
fn pdf_previews_are_half_scale_and_images_preview_as_themselves() {
    let (store, ingestor) = setup();
    let mut collection = PageCollection::new();
    let image = png_file("B.png", 40, 30);
    let image_bytes = image.bytes().to_vec();
    ingestor
        .ingest(&mut collection, vec![pdf_file("A.pdf", &[200]), image], CancelToken::new())
        .finish();

    let pdf_preview = store.get(collection.get(0).unwrap().preview().id()).unwrap();
    let dims = ImageProcessor::probe_dimensions(&pdf_preview).unwrap();
    assert_eq!((dims.width, dims.height), (100.0, 396.0));

    let image_preview = store.get(collection.get(1).unwrap().preview().id()).unwrap();
    assert_eq!(image_preview, image_bytes);
}

#[test]
fn progress_rises_to_one() {
    let (_store, ingestor) = setup();
    let mut collection = PageCollection::new();
    let files = vec![pdf_file("A.pdf", &[100, 100]), png_file("B.png", 5, 5)];

    let progress: Vec<f32> = ingestor
        .ingest(&mut collection, files, CancelToken::new())
        .filter_map(|event| match event {
            IngestEvent::PageIngested { progress, .. } => Some(progress),
            _ => None,
        })
        .collect();

    assert_eq!(progress, vec![0.25, 0.5, 1.0]);
}

#[test]
fn bad_files_are_reported_and_good_files_still_land() {
    let (_store, ingestor) = setup();
    let mut collection = PageCollection::new();
    let files = vec![
        pdf_file("A.pdf", &[100]),
        SourceFile::new("notes.txt", "text/plain", b"hello".to_vec()),
        SourceFile::new("broken.pdf", "application/pdf", b"%PDF-1.7 truncated".to_vec()),
        png_file("B.png", 8, 8),
    ];

    let report = ingestor.ingest(&mut collection, files, CancelToken::new()).finish();

    assert_eq!(report.files_total, 4);
    assert_eq!(report.files_ingested, 2);
    assert_eq!(report.pages_added, 2);
    let failed: Vec<usize> = report.failures.iter().map(|f| f.file_index).collect();
    assert_eq!(failed, vec![1, 2]);
    assert_eq!(report.failures[0].human.severity, Severity::Permanent);
    assert_eq!(layout(&collection), entries(&[("A.pdf", 0), ("B.png", 0)]));
}

#[test]
fn oversized_page_fails_only_its_file() {
    let (store, ingestor) = setup();
    let mut collection = PageCollection::new();
    let files = vec![pdf_file("huge.pdf", &[100_000_000]), png_file("B.png", 8, 8)];

    let report = ingestor.ingest(&mut collection, files, CancelToken::new()).finish();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].name, "huge.pdf");
    assert_eq!(report.pages_added, 1);
    assert_eq!(layout(&collection), entries(&[("B.png", 0)]));
    assert_eq!(store.stats().live, 1);
}

#[test]
fn missing_mime_type_falls_back_to_extension() {
    let (_store, ingestor) = setup();
    let mut collection = PageCollection::new();
    let pdf = SourceFile::new("scan.PDF", "", common::pdf_with_widths(&[100]));
    let png = SourceFile::new(
        "photo.png",
        "application/octet-stream",
        common::encoded_image(3, 3, image::ImageFormat::Png),
    );

    let report = ingestor.ingest(&mut collection, vec![pdf, png], CancelToken::new()).finish();
    assert!(report.failures.is_empty());
    assert_eq!(collection.len(), 2);
}

#[test]
fn preview_failure_drops_the_whole_file() {
    let store = PreviewStore::new().shared();
    let ingestor = Ingestor::new(store.clone(), AssemblyConfig::default())
        .with_renderer(Arc::new(FailingRenderer { fail_at: 1 }));
    let mut collection = PageCollection::new();
    let files = vec![pdf_file("A.pdf", &[100, 100, 100]), png_file("B.png", 4, 4)];

    let report = ingestor.ingest(&mut collection, files, CancelToken::new()).finish();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].name, "A.pdf");
    assert_eq!(layout(&collection), entries(&[("B.png", 0)]));
    let stats = store.stats();
    assert_eq!(stats.live, 1);
    assert_eq!(stats.allocated, stats.released + 1);
}

#[test]
fn exhausted_preview_budget_is_reported_per_file() {
    let store = PreviewStore::with_budget(1).shared();
    let ingestor = Ingestor::new(store.clone(), AssemblyConfig::default());
    let mut collection = PageCollection::new();

    let report = ingestor
        .ingest(&mut collection, vec![pdf_file("A.pdf", &[100])], CancelToken::new())
        .finish();

    assert!(collection.is_empty());
    assert!(report.failures[0].error.contains("preview"));
    assert_eq!(report.failures[0].human.severity, Severity::Transient);
}

#[test]
fn cancelled_batch_leaves_collection_untouched() {
    let (store, ingestor) = setup();
    let mut collection = PageCollection::new();
    ingestor
        .ingest(&mut collection, vec![png_file("existing.png", 4, 4)], CancelToken::new())
        .finish();
    let before = layout(&collection);

    let cancel = CancelToken::new();
    let files = vec![
        pdf_file("A.pdf", &[100, 100, 100]),
        png_file("B.png", 4, 4),
        pdf_file("C.pdf", &[100]),
    ];
    let mut last = None;
    let mut pages_seen = 0;
    for event in ingestor.ingest(&mut collection, files, cancel.clone()) {
        if let IngestEvent::PageIngested { .. } = event {
            pages_seen += 1;
            if pages_seen == 4 {
                cancel.cancel();
            }
        }
        last = Some(event);
    }

    assert!(matches!(
        last,
        Some(IngestEvent::Cancelled(report)) if report.cancelled && report.pages_added == 0
    ));
    assert_eq!(layout(&collection), before);
    assert_eq!(store.stats().live, 1);
    assert_eq!(store.stats().invalid_releases, 0);
}

#[test]
fn abandoned_batch_is_a_cancellation() {
    let (store, ingestor) = setup();
    let mut collection = PageCollection::new();
    {
        let mut run = ingestor.ingest(
            &mut collection,
            vec![pdf_file("A.pdf", &[100, 100]), png_file("B.png", 4, 4)],
            CancelToken::new(),
        );
        run.next();
        run.next();
    }
    assert!(collection.is_empty());
    assert_eq!(store.stats().live, 0);
}

#[test]
fn replace_splices_every_page_of_the_new_file() {
    let (store, ingestor) = setup();
    let mut collection = PageCollection::new();
    ingestor
        .ingest(
            &mut collection,
            vec![pdf_file("A.pdf", &[100, 100]), png_file("B.png", 4, 4)],
            CancelToken::new(),
        )
        .finish();
    let replaced = collection.get(1).unwrap().preview().id();

    let added = ingestor
        .replace(&mut collection, 1, pdf_file("C.pdf", &[300, 301, 302]))
        .unwrap();

    assert_eq!(added, 3);
    assert_eq!(
        layout(&collection),
        entries(&[("A.pdf", 0), ("C.pdf", 0), ("C.pdf", 1), ("C.pdf", 2), ("B.png", 0)])
    );
    assert!(!store.contains(replaced));
    assert_eq!(store.stats().live, 5);
}

#[test]
fn failed_replace_keeps_the_original_page() {
    let (store, ingestor) = setup();
    let mut collection = PageCollection::new();
    ingestor
        .ingest(&mut collection, vec![pdf_file("A.pdf", &[100, 100])], CancelToken::new())
        .finish();
    let before = layout(&collection);

    let result = ingestor.replace(
        &mut collection,
        0,
        SourceFile::new("broken.pdf", "application/pdf", b"not a pdf".to_vec()),
    );

    assert!(matches!(result, Err(QuickSideError::PdfError(_))));
    assert_eq!(layout(&collection), before);
    assert_eq!(store.stats().live, 2);
}

#[test]
fn every_handle_is_released_exactly_once() {
    let (store, ingestor) = setup();
    let mut collection = PageCollection::new();
    ingestor
        .ingest(
            &mut collection,
            vec![pdf_file("A.pdf", &[100, 100, 100, 100]), png_file("B.png", 4, 4)],
            CancelToken::new(),
        )
        .finish();

    collection.remove(0);
    collection.remove_many(&[0, 2]);
    ingestor
        .replace(&mut collection, 0, png_file("C.png", 2, 2))
        .unwrap();
    collection.clear();
    drop(collection);

    let stats = store.stats();
    assert_eq!(stats.live, 0);
    assert_eq!(stats.allocated, 6);
    assert_eq!(stats.released, 6);
    assert_eq!(stats.invalid_releases, 0);
}
