// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the QuickSide page assembler.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one uploaded source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceId(pub Uuid);

impl SourceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one page descriptor. Survives reordering, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageId(pub Uuid);

impl PageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Media types accepted at the ingestion boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    Pdf,
    Jpeg,
    Png,
    /// Any other `image/*` subtype. Accepted for preview, not embeddable.
    OtherImage(String),
}

impl MediaType {
    /// MIME type string.
    pub fn mime_type(&self) -> &str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::OtherImage(mime) => mime.as_str(),
        }
    }

    /// Parse a declared MIME type. Parameters (`; charset=...`) are ignored.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "application/pdf" | "application/x-pdf" => Some(Self::Pdf),
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            other => other
                .strip_prefix("image/")
                .filter(|subtype| !subtype.is_empty())
                .map(|_| Self::OtherImage(other.to_string())),
        }
    }

    /// Infer media type from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "jpg" | "jpeg" | "jfif" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::OtherImage("image/gif".into())),
            "webp" => Some(Self::OtherImage("image/webp".into())),
            "bmp" => Some(Self::OtherImage("image/bmp".into())),
            "tif" | "tiff" => Some(Self::OtherImage("image/tiff".into())),
            _ => None,
        }
    }

    /// Resolve the media type of an upload.
    ///
    /// The declared type wins; an empty or generic declaration falls back to
    /// the filename extension.
    pub fn detect(declared: &str, filename: &str) -> Option<Self> {
        let declared = declared.trim();
        let generic = declared.is_empty()
            || declared.eq_ignore_ascii_case("application/octet-stream");
        if !generic {
            return Self::from_mime(declared);
        }
        filename
            .rsplit_once('.')
            .and_then(|(_, ext)| Self::from_extension(ext))
    }

    pub fn is_pdf(&self) -> bool {
        matches!(self, Self::Pdf)
    }

    pub fn is_image(&self) -> bool {
        !self.is_pdf()
    }

    /// Whether an image of this type can be placed on an output page.
    pub fn is_embeddable_image(&self) -> bool {
        matches!(self, Self::Jpeg | Self::Png)
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Variant tag of a page descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageKind {
    /// One page copied from a source PDF.
    PdfPage,
    /// A standalone image placed on its own page.
    ImagePage,
}

impl std::fmt::Display for PageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PdfPage => f.write_str("pdf"),
            Self::ImagePage => f.write_str("image"),
        }
    }
}

/// Width and height of a source page.
///
/// Pixels for image pages, PDF points (1/72 in) for PDF pages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageDimensions {
    pub width: f32,
    pub height: f32,
}

impl PageDimensions {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Both sides multiplied by `factor`, never below one unit.
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            width: (self.width * factor).max(1.0),
            height: (self.height * factor).max(1.0),
        }
    }
}

impl std::fmt::Display for PageDimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}x{:.0}", self.width, self.height)
    }
}

/// Clockwise page rotation, always one of 0, 90, 180, 270.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rotation(u16);

impl Rotation {
    pub const NONE: Rotation = Rotation(0);

    /// Normalise `degrees` into a rotation. `None` unless a multiple of 90.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }
        Some(Self(degrees.rem_euclid(360) as u16))
    }

    pub fn degrees(&self) -> u16 {
        self.0
    }

    /// Add `degrees` to this rotation. `None` unless a multiple of 90.
    pub fn rotated_by(self, degrees: i32) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }
        Self::from_degrees(self.0 as i32 + degrees.rem_euclid(360))
    }

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }
}
