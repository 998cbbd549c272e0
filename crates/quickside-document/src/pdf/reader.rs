// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open an uploaded PDF and inspect its pages using the `lopdf`
// crate. Page indices at this boundary are zero-based.

use lopdf::{Document, Object, ObjectId};
use quickside_core::PageDimensions;
use quickside_core::error::QuickSideError;
use tracing::{debug, instrument};

/// US Letter, used when a page tree carries no usable /MediaBox.
const FALLBACK_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Attributes a page may inherit from its ancestors in the page tree.
pub(crate) const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// A parsed source PDF.
///
/// Wraps `lopdf::Document` together with the page object IDs in page order,
/// so that page lookups by index do not rebuild the page map.
pub struct SourcePdf {
    document: Document,
    page_ids: Vec<ObjectId>,
}

impl SourcePdf {
    /// Parse PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, QuickSideError> {
        let document = Document::load_mem(data).map_err(|err| {
            QuickSideError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        // get_pages() is keyed by 1-based page number, so values() is in order.
        let page_ids: Vec<ObjectId> = document.get_pages().values().copied().collect();
        if page_ids.is_empty() {
            return Err(QuickSideError::PdfError("document has no pages".to_string()));
        }

        debug!(pages = page_ids.len(), "PDF loaded from bytes");
        Ok(Self { document, page_ids })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Object ID of the page at `index` (zero-based).
    pub fn page_id(&self, index: usize) -> Result<ObjectId, QuickSideError> {
        self.page_ids.get(index).copied().ok_or_else(|| {
            QuickSideError::PdfError(format!(
                "page {} out of range (document has {} pages)",
                index,
                self.page_ids.len()
            ))
        })
    }

    /// Look up `key` on the page at `index`, walking up /Parent links when the
    /// page itself does not define it.
    pub fn inherited_attribute(&self, index: usize, key: &[u8]) -> Option<&Object> {
        let page_id = self.page_id(index).ok()?;
        resolve_inherited(&self.document, page_id, key)
    }

    /// Size of the page at `index` in PDF points, from its (inherited)
    /// /MediaBox. Quarter-turn rotations swap width and height.
    pub fn page_dimensions(&self, index: usize) -> Result<PageDimensions, QuickSideError> {
        self.page_id(index)?;
        let rect = self
            .inherited_attribute(index, b"MediaBox")
            .and_then(|obj| resolve_rect(&self.document, obj))
            .unwrap_or(FALLBACK_MEDIA_BOX);

        let width = (rect[2] - rect[0]).abs();
        let height = (rect[3] - rect[1]).abs();
        let rotation = self.page_rotation(index);
        if rotation % 180 == 90 {
            Ok(PageDimensions::new(height, width))
        } else {
            Ok(PageDimensions::new(width, height))
        }
    }

    /// The page's own (or inherited) /Rotate, normalised to 0..360.
    pub fn page_rotation(&self, index: usize) -> i64 {
        self.inherited_attribute(index, b"Rotate")
            .and_then(|obj| obj.as_i64().ok())
            .map(|deg| deg.rem_euclid(360))
            .unwrap_or(0)
    }
}

/// Walk from `page_id` towards the page tree root looking for `key`.
pub(crate) fn resolve_inherited<'a>(
    document: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current = page_id;
    // Bounded walk: malformed files can contain /Parent cycles.
    for _ in 0..64 {
        let dict = document.get_object(current).and_then(Object::as_dict).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
    }
    None
}

fn resolve_rect(document: &Document, obj: &Object) -> Option<[f32; 4]> {
    let obj = match obj {
        Object::Reference(id) => document.get_object(*id).ok()?,
        other => other,
    };
    let items = obj.as_array().ok()?;
    if items.len() != 4 {
        return None;
    }
    let mut rect = [0.0f32; 4];
    for (slot, item) in rect.iter_mut().zip(items) {
        *slot = match item {
            Object::Integer(i) => *i as f32,
            Object::Real(r) => *r,
            _ => return None,
        };
    }
    Some(rect)
}
