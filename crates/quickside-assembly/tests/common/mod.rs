// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fixture builders shared by the integration tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lopdf::{Document, Object, Stream, dictionary};
use quickside_assembly::{Ingestor, PageCollection, PageDescriptor, PreviewStore, SourceFile};
use quickside_core::AssemblyConfig;

/// A PDF whose pages are `widths[i]` points wide and 792 tall. All pages
/// share one font through the inherited /Resources of the page tree.
pub fn pdf_with_widths(widths: &[i64]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids: Vec<Object> = Vec::new();
    for (index, &width) in widths.iter().enumerate() {
        let text = format!("BT /F1 12 Tf 20 20 Td (page {}) Tj ET", index + 1);
        let content_id = doc.add_object(Stream::new(dictionary! {}, text.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), 792.into()],
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => widths.len() as i64,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

pub fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 40, 40])));
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, format).unwrap();
    cursor.into_inner()
}

pub fn pdf_file(name: &str, widths: &[i64]) -> SourceFile {
    SourceFile::new(name, "application/pdf", pdf_with_widths(widths))
}

pub fn png_file(name: &str, width: u32, height: u32) -> SourceFile {
    SourceFile::new(name, "image/png", encoded_image(width, height, ImageFormat::Png))
}

pub fn setup() -> (Arc<PreviewStore>, Ingestor) {
    let store = PreviewStore::new().shared();
    let ingestor = Ingestor::new(store.clone(), AssemblyConfig::default());
    (store, ingestor)
}

/// `(file name, source page index)` for every page, in order.
pub fn layout(collection: &PageCollection) -> Vec<(String, usize)> {
    collection
        .iter()
        .map(|page: &PageDescriptor| (page.source().name().to_string(), page.source_page_index()))
        .collect()
}

pub fn entries(items: &[(&str, usize)]) -> Vec<(String, usize)> {
    items.iter().map(|(name, index)| (name.to_string(), *index)).collect()
}
