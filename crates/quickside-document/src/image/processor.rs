// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode uploaded images, read their dimensions cheaply,
// flatten transparency, and encode preview thumbnails. Operates on in-memory
// images using the `image` crate.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, ImageReader};
use quickside_core::error::QuickSideError;
use quickside_core::{MediaType, PageDimensions};

/// A single decoded image.
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Decode bytes that must be in the format `media_type` declares.
    pub fn from_bytes_as(data: &[u8], media_type: &MediaType) -> Result<Self, QuickSideError> {
        let format = image_format(media_type).ok_or_else(|| {
            QuickSideError::UnsupportedImageFormat(media_type.mime_type().to_string())
        })?;
        let img = image::load_from_memory_with_format(data, format).map_err(|err| {
            QuickSideError::ImageError(format!("failed to decode {}: {}", media_type, err))
        })?;
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    /// Read width and height from the image header without decoding pixels.
    pub fn probe_dimensions(data: &[u8]) -> Result<PageDimensions, QuickSideError> {
        let (width, height) = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|err| QuickSideError::ImageError(format!("unreadable image: {}", err)))?
            .into_dimensions()
            .map_err(|err| {
                QuickSideError::ImageError(format!("unreadable image header: {}", err))
            })?;
        if width == 0 || height == 0 {
            return Err(QuickSideError::ImageError(format!(
                "image has empty dimensions {}x{}",
                width, height
            )));
        }
        Ok(PageDimensions::new(width as f32, height as f32))
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    // -- Output ---------------------------------------------------------------

    /// RGB8 pixel data with any alpha channel composited onto white.
    pub fn flatten_to_rgb8(&self) -> Vec<u8> {
        if !self.image.color().has_alpha() {
            return self.image.to_rgb8().into_raw();
        }
        let rgba = self.image.to_rgba8();
        let mut out = Vec::with_capacity(rgba.len() / 4 * 3);
        for image::Rgba([r, g, b, a]) in rgba.pixels().copied() {
            let alpha = a as u32;
            let blend = |channel: u8| -> u8 {
                ((channel as u32 * alpha + 255 * (255 - alpha)) / 255) as u8
            };
            out.extend_from_slice(&[blend(r), blend(g), blend(b)]);
        }
        out
    }

    /// Encode the current image as JPEG bytes with the given quality (1-100).
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>, QuickSideError> {
        let mut buffer = Vec::new();
        let rgb = self.image.to_rgb8();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
        rgb.write_with_encoder(encoder).map_err(|err| {
            QuickSideError::ImageError(format!("JPEG encoding failed: {}", err))
        })?;
        Ok(buffer)
    }
}

/// Decoder format for an embeddable media type.
fn image_format(media_type: &MediaType) -> Option<ImageFormat> {
    match media_type {
        MediaType::Jpeg => Some(ImageFormat::Jpeg),
        MediaType::Png => Some(ImageFormat::Png),
        MediaType::OtherImage(mime) => ImageFormat::from_mime_type(mime),
        MediaType::Pdf => None,
    }
}
