// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — build a single-page PDF holding one image at its native size
// using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use quickside_core::MediaType;
use quickside_core::error::QuickSideError;
use tracing::{debug, instrument, warn};

use crate::image::processor::ImageProcessor;

/// At 72 DPI one image pixel maps to one PDF point.
const NATIVE_DPI: f32 = 72.0;

const MM_PER_PT: f32 = 25.4 / 72.0;

/// Title of the intermediate single-page document. Only its page is kept.
const IMAGE_PAGE_TITLE: &str = "QuickSide image page";

/// Creates image pages for the output document.
#[derive(Debug, Default)]
pub struct PdfWriter;

impl PdfWriter {
    /// Create a single-page PDF whose page is exactly the image's pixel size
    /// (one pixel per point), with the image filling the page.
    ///
    /// Only JPEG and PNG are embeddable; anything else is
    /// [`QuickSideError::UnsupportedImageFormat`].
    #[instrument(skip(self, image_bytes), fields(bytes_len = image_bytes.len(), %media_type))]
    pub fn create_image_page(
        &self,
        image_bytes: &[u8],
        media_type: &MediaType,
    ) -> Result<Vec<u8>, QuickSideError> {
        if !media_type.is_embeddable_image() {
            return Err(QuickSideError::UnsupportedImageFormat(
                media_type.mime_type().to_string(),
            ));
        }

        let processor = ImageProcessor::from_bytes_as(image_bytes, media_type)?;
        let img_width = processor.width() as usize;
        let img_height = processor.height() as usize;

        let raw = RawImage {
            pixels: RawImageData::U8(processor.flatten_to_rgb8()),
            width: img_width,
            height: img_height,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };

        let mut doc = PdfDocument::new(IMAGE_PAGE_TITLE);
        let xobject_id = doc.add_image(&raw);

        let page_w = Mm(img_width as f32 * MM_PER_PT);
        let page_h = Mm(img_height as f32 * MM_PER_PT);
        let ops = vec![Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(0.0)),
                translate_y: Some(Pt(0.0)),
                scale_x: Some(1.0),
                scale_y: Some(1.0),
                dpi: Some(NATIVE_DPI),
                rotate: None,
            },
        }];
        doc.with_pages(vec![PdfPage::new(page_w, page_h, ops)]);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            warn!(count = warnings.len(), "printpdf reported warnings for image page");
        }

        debug!(img_width, img_height, output_bytes = output.len(), "Image page created");
        Ok(output)
    }
}
