// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The page collection — the ordered list of pages the user is assembling.
//
// Position in the collection is the output page order. Descriptors own their
// preview handles, so removing a page (or dropping the collection) releases
// its preview. Out-of-range mutations are no-ops and report `false`.

use std::sync::Arc;

use quickside_core::{PageDimensions, PageId, PageKind, Rotation};
use tracing::debug;

use crate::preview::PreviewHandle;
use crate::source::SourceFile;

/// One page in the collection.
#[derive(Debug)]
pub struct PageDescriptor {
    id: PageId,
    source: Arc<SourceFile>,
    source_page_index: usize,
    kind: PageKind,
    preview: PreviewHandle,
    dimensions: PageDimensions,
    rotation: Rotation,
}

impl PageDescriptor {
    pub(crate) fn new(
        source: Arc<SourceFile>,
        source_page_index: usize,
        kind: PageKind,
        preview: PreviewHandle,
        dimensions: PageDimensions,
    ) -> Self {
        Self {
            id: PageId::new(),
            source,
            source_page_index,
            kind,
            preview,
            dimensions,
            rotation: Rotation::NONE,
        }
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn source(&self) -> &Arc<SourceFile> {
        &self.source
    }

    /// Zero-based page index within the source. Always 0 for images.
    pub fn source_page_index(&self) -> usize {
        self.source_page_index
    }

    pub fn kind(&self) -> PageKind {
        self.kind
    }

    pub fn preview(&self) -> &PreviewHandle {
        &self.preview
    }

    /// Natural size of the source page: points for PDF pages, pixels for
    /// images.
    pub fn dimensions(&self) -> PageDimensions {
        self.dimensions
    }

    /// Rotation applied on top of the source page's own rotation at export.
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Short label for logs and listings, e.g. `report.pdf p3`.
    pub fn label(&self) -> String {
        match self.kind {
            PageKind::PdfPage => format!("{} p{}", self.source.name(), self.source_page_index + 1),
            PageKind::ImagePage => self.source.name().to_string(),
        }
    }
}

/// Ordered sequence of page descriptors.
#[derive(Debug, Default)]
pub struct PageCollection {
    pages: Vec<PageDescriptor>,
}

impl PageCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PageDescriptor> {
        self.pages.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PageDescriptor> {
        self.pages.iter()
    }

    pub fn as_slice(&self) -> &[PageDescriptor] {
        &self.pages
    }

    /// Move the page at `from` so it ends up at `to`; pages in between shift
    /// by one. `from == to` leaves the collection untouched.
    pub fn move_page(&mut self, from: usize, to: usize) -> bool {
        let len = self.pages.len();
        if from >= len || to >= len {
            debug!(from, to, len, "Move ignored: index out of range");
            return false;
        }
        if from < to {
            self.pages[from..=to].rotate_left(1);
        } else if to < from {
            self.pages[to..=from].rotate_right(1);
        }
        debug!(from, to, "Page moved");
        true
    }

    /// Remove the page at `index`, releasing its preview.
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.pages.len() {
            debug!(index, len = self.pages.len(), "Remove ignored: index out of range");
            return false;
        }
        let page = self.pages.remove(index);
        debug!(index, page = %page.label(), "Page removed");
        true
    }

    /// Remove every page whose index is listed. Indices refer to positions
    /// before any removal; duplicates and out-of-range entries are ignored.
    /// Returns the number of pages removed.
    pub fn remove_many(&mut self, indices: &[usize]) -> usize {
        let mut targets: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&index| index < self.pages.len())
            .collect();
        targets.sort_unstable_by(|a, b| b.cmp(a));
        targets.dedup();
        for &index in &targets {
            self.pages.remove(index);
        }
        debug!(removed = targets.len(), remaining = self.pages.len(), "Pages removed");
        targets.len()
    }

    /// Rotate the page at `index` clockwise by `degrees` (a multiple of 90,
    /// negative for counter-clockwise).
    pub fn rotate(&mut self, index: usize, degrees: i32) -> bool {
        let Some(page) = self.pages.get_mut(index) else {
            return false;
        };
        match page.rotation.rotated_by(degrees) {
            Some(rotation) => {
                page.rotation = rotation;
                debug!(index, degrees = rotation.degrees(), "Page rotated");
                true
            }
            None => false,
        }
    }

    /// Remove every page, releasing all previews.
    pub fn clear(&mut self) {
        let count = self.pages.len();
        self.pages.clear();
        debug!(count, "Collection cleared");
    }

    /// Append pages at the end, in order.
    pub(crate) fn extend(&mut self, pages: Vec<PageDescriptor>) {
        self.pages.extend(pages);
    }

    /// Replace the page at `index` with `pages`, in order. The replaced
    /// descriptor is dropped, releasing its preview.
    pub(crate) fn splice(&mut self, index: usize, pages: Vec<PageDescriptor>) -> bool {
        if index >= self.pages.len() {
            return false;
        }
        let removed: Vec<PageDescriptor> = self.pages.splice(index..=index, pages).collect();
        debug!(index, removed = removed.len(), len = self.pages.len(), "Page replaced");
        true
    }
}

impl<'a> IntoIterator for &'a PageCollection {
    type Item = &'a PageDescriptor;
    type IntoIter = std::slice::Iter<'a, PageDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.iter()
    }
}
