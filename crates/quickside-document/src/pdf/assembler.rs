// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output assembler — the composite document pages are appended to, one at a
// time, before it is serialised.

use chrono::Utc;
use lopdf::{Document, Object, ObjectId, dictionary};
use quickside_core::MediaType;
use quickside_core::error::QuickSideError;
use tracing::{debug, info, instrument};

use super::copy::PageCopier;
use super::reader::SourcePdf;
use super::writer::PdfWriter;

const PRODUCER: &str = "QuickSide";

/// An output PDF under construction.
pub struct OutputDocument {
    document: Document,
    /// Root /Pages node every appended page hangs off.
    pages_id: ObjectId,
    page_count: usize,
    image_writer: PdfWriter,
}

impl OutputDocument {
    /// An empty document with a catalog and an empty page tree.
    pub fn new(pdf_version: &str) -> Self {
        let mut document = Document::with_version(pdf_version);
        let pages_id = document.new_object_id();
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0i64,
            }),
        );
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        Self {
            document,
            pages_id,
            page_count: 0,
            image_writer: PdfWriter::default(),
        }
    }

    /// Pages appended so far.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Copy page `index` of `source` onto the end of the document.
    ///
    /// `copier` must be dedicated to `source` for the lifetime of this
    /// document. `extra_rotation` (degrees) is added to the page's own
    /// rotation.
    pub fn append_pdf_page(
        &mut self,
        source: &SourcePdf,
        copier: &mut PageCopier,
        index: usize,
        extra_rotation: u16,
    ) -> Result<(), QuickSideError> {
        let base_rotation = source.page_rotation(index);
        let page_id = copier.copy_page(source, index, &mut self.document)?;
        self.link_page(page_id, base_rotation + extra_rotation as i64)
    }

    /// Place an image on a new page sized to its pixel dimensions.
    pub fn append_image_page(
        &mut self,
        image_bytes: &[u8],
        media_type: &MediaType,
        extra_rotation: u16,
    ) -> Result<(), QuickSideError> {
        let single_page = self.image_writer.create_image_page(image_bytes, media_type)?;
        let source = SourcePdf::from_bytes(&single_page)?;
        let mut copier = PageCopier::new();
        let page_id = copier.copy_page(&source, 0, &mut self.document)?;
        self.link_page(page_id, extra_rotation as i64)
    }

    /// Attach a copied page to the page tree.
    fn link_page(&mut self, page_id: ObjectId, rotation: i64) -> Result<(), QuickSideError> {
        let page = self
            .document
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|err| QuickSideError::PdfError(format!("copied page missing: {}", err)))?;
        page.set("Parent", Object::Reference(self.pages_id));
        let rotation = rotation.rem_euclid(360);
        if rotation == 0 {
            page.remove(b"Rotate");
        } else {
            page.set("Rotate", Object::Integer(rotation));
        }

        let pages = self
            .document
            .get_object_mut(self.pages_id)
            .and_then(Object::as_dict_mut)
            .map_err(|err| QuickSideError::PdfError(format!("page tree missing: {}", err)))?;
        if let Ok(Object::Array(kids)) = pages.get_mut(b"Kids") {
            kids.push(Object::Reference(page_id));
        }
        self.page_count += 1;
        pages.set("Count", Object::Integer(self.page_count as i64));

        debug!(?page_id, position = self.page_count, rotation, "Page linked");
        Ok(())
    }

    /// Serialise the document. Stamps /Info with producer and creation date
    /// and compresses unfiltered streams.
    #[instrument(skip(self), fields(pages = self.page_count))]
    pub fn finish(mut self) -> Result<Vec<u8>, QuickSideError> {
        let created = Utc::now().format("D:%Y%m%d%H%M%SZ").to_string();
        let info_id = self.document.add_object(dictionary! {
            "Producer" => Object::string_literal(PRODUCER),
            "CreationDate" => Object::string_literal(created),
        });
        self.document.trailer.set("Info", info_id);
        self.document.compress();

        let mut output = Vec::new();
        self.document.save_to(&mut output).map_err(|err| {
            QuickSideError::PdfError(format!("failed to serialise output PDF: {}", err))
        })?;

        info!(pages = self.page_count, output_bytes = output.len(), "Output PDF serialised");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbImage};

    fn source_with_pages(count: usize) -> Vec<u8> {
        let mut doc = OutputDocument::new("1.5");
        for i in 0..count {
            let img = DynamicImage::ImageRgb8(RgbImage::new(10 + i as u32, 20));
            let mut cursor = std::io::Cursor::new(Vec::new());
            img.write_to(&mut cursor, ImageFormat::Png).unwrap();
            doc.append_image_page(&cursor.into_inner(), &MediaType::Png, 0).unwrap();
        }
        doc.finish().unwrap()
    }

    #[test]
    fn empty_document_serialises() {
        let bytes = OutputDocument::new("1.5").finish().unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 0);
        assert!(doc.trailer.get(b"Info").is_ok());
    }

    #[test]
    fn pages_keep_append_order() {
        let source = SourcePdf::from_bytes(&source_with_pages(3)).unwrap();
        let mut out = OutputDocument::new("1.5");
        let mut copier = PageCopier::new();
        for index in [2, 0, 1] {
            out.append_pdf_page(&source, &mut copier, index, 0).unwrap();
        }
        let result = SourcePdf::from_bytes(&out.finish().unwrap()).unwrap();

        let widths: Vec<f32> = (0..3)
            .map(|i| result.page_dimensions(i).unwrap().width.round())
            .collect();
        assert_eq!(widths, vec![12.0, 10.0, 11.0]);
    }

    #[test]
    fn extra_rotation_adds_to_source_rotation() {
        let source = SourcePdf::from_bytes(&source_with_pages(1)).unwrap();
        let mut out = OutputDocument::new("1.5");
        let mut copier = PageCopier::new();
        out.append_pdf_page(&source, &mut copier, 0, 270).unwrap();
        out.append_image_page(&source_with_pages(1), &MediaType::Pdf, 0)
            .expect_err("PDF bytes are not an embeddable image");
        assert_eq!(out.page_count(), 1);

        let result = SourcePdf::from_bytes(&out.finish().unwrap()).unwrap();
        assert_eq!(result.page_rotation(0), 270);
    }
}
