// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preview rendering — low-resolution thumbnails for PDF pages.

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use quickside_core::MediaType;
use quickside_core::error::QuickSideError;
use tracing::debug;

use crate::image::processor::ImageProcessor;
use crate::pdf::reader::SourcePdf;

/// Largest page side PDF allows, in default user space units.
pub const MAX_PAGE_SIDE: f32 = 14_400.0;

/// Longest side of a rendered outline preview, in pixels.
pub const MAX_PREVIEW_SIDE: f32 = 2048.0;

/// Encoded thumbnail of one page.
#[derive(Debug, Clone)]
pub struct RenderedPreview {
    pub bytes: Vec<u8>,
    pub media_type: MediaType,
    pub width: u32,
    pub height: u32,
}

/// Renders a preview for one page of a source PDF.
///
/// Implementations backed by a real rasteriser plug in here; the assembly
/// core only depends on this trait.
pub trait PageRenderer: Send + Sync {
    /// Render page `index` (zero-based) at `scale` times its natural size.
    fn render_page(
        &self,
        pdf: &SourcePdf,
        index: usize,
        scale: f32,
    ) -> Result<RenderedPreview, QuickSideError>;
}

/// Draws the page outline at the page's scaled size: a white sheet with a
/// grey border, JPEG-encoded. Conveys size and orientation without
/// rasterising content.
#[derive(Debug, Clone)]
pub struct OutlineRenderer {
    jpeg_quality: u8,
}

impl OutlineRenderer {
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }
}

impl Default for OutlineRenderer {
    fn default() -> Self {
        Self::new(50)
    }
}

impl PageRenderer for OutlineRenderer {
    fn render_page(
        &self,
        pdf: &SourcePdf,
        index: usize,
        scale: f32,
    ) -> Result<RenderedPreview, QuickSideError> {
        let page = pdf.page_dimensions(index)?;
        if !(page.width <= MAX_PAGE_SIDE && page.height <= MAX_PAGE_SIDE) {
            return Err(QuickSideError::PdfError(format!(
                "page {} is {} units, beyond the {} unit limit",
                index + 1,
                page,
                MAX_PAGE_SIDE
            )));
        }

        let dims = page.scaled(scale);
        let longest = dims.width.max(dims.height);
        let dims = if longest > MAX_PREVIEW_SIDE {
            dims.scaled(MAX_PREVIEW_SIDE / longest)
        } else {
            dims
        };
        let width = dims.width.round() as u32;
        let height = dims.height.round() as u32;

        let mut canvas = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        draw_hollow_rect_mut(
            &mut canvas,
            Rect::at(0, 0).of_size(width, height),
            Rgb([160, 160, 160]),
        );

        let bytes = ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(canvas))
            .to_jpeg_bytes(self.jpeg_quality)?;
        debug!(index, width, height, "Outline preview rendered");

        Ok(RenderedPreview {
            bytes,
            media_type: MediaType::Jpeg,
            width,
            height,
        })
    }
}
