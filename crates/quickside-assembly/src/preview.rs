// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preview handles — revocable references to rendered thumbnails.
//
// A `PreviewHandle` is released in `Drop`, so whoever owns it (a page
// descriptor, a staging buffer of an in-flight ingestion) releases it exactly
// once on every exit path.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use quickside_core::error::{QuickSideError, Result};
use quickside_document::RenderedPreview;
use tracing::{debug, warn};

/// Opaque identifier of an allocated preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(pub u64);

impl std::fmt::Display for HandleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "preview:{}", self.0)
    }
}

/// Allocates and releases preview resources (object URLs in a browser, a
/// texture cache in a desktop UI, an in-memory map in tests).
///
/// Contract: one `release` per successful `allocate`, never a use after
/// release. `PreviewHandle` upholds it; implementors only store and free.
pub trait PreviewAllocator: Send + Sync {
    fn allocate(&self, preview: RenderedPreview) -> Result<HandleId>;
    fn release(&self, id: HandleId);
}

/// Owning handle to an allocated preview. Not `Clone`.
pub struct PreviewHandle {
    id: HandleId,
    allocator: Arc<dyn PreviewAllocator>,
}

impl PreviewHandle {
    pub fn allocate(
        allocator: &Arc<dyn PreviewAllocator>,
        preview: RenderedPreview,
    ) -> Result<Self> {
        let id = allocator.allocate(preview)?;
        Ok(Self {
            id,
            allocator: Arc::clone(allocator),
        })
    }

    pub fn id(&self) -> HandleId {
        self.id
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.allocator.release(self.id);
    }
}

impl std::fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PreviewHandle").field(&self.id).finish()
    }
}

/// Counters describing allocator activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreviewStats {
    pub allocated: u64,
    pub released: u64,
    pub live: usize,
    pub live_bytes: usize,
    /// Releases of IDs that were not live. Always zero when handles are used.
    pub invalid_releases: u64,
}

#[derive(Default)]
struct StoreInner {
    next_id: u64,
    live: HashMap<HandleId, RenderedPreview>,
    stats: PreviewStats,
}

/// In-memory preview allocator with an optional byte budget.
#[derive(Default)]
pub struct PreviewStore {
    inner: Mutex<StoreInner>,
    max_bytes: Option<usize>,
}

impl PreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that refuses allocations once `max_bytes` of previews are live.
    pub fn with_budget(max_bytes: usize) -> Self {
        Self {
            inner: Mutex::default(),
            max_bytes: Some(max_bytes),
        }
    }

    /// Shorthand for the `Arc<dyn PreviewAllocator>` the ingestion side wants.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Encoded bytes of a live preview.
    pub fn get(&self, id: HandleId) -> Option<Vec<u8>> {
        self.lock().live.get(&id).map(|preview| preview.bytes.clone())
    }

    pub fn contains(&self, id: HandleId) -> bool {
        self.lock().live.contains_key(&id)
    }

    pub fn stats(&self) -> PreviewStats {
        self.lock().stats
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PreviewAllocator for PreviewStore {
    fn allocate(&self, preview: RenderedPreview) -> Result<HandleId> {
        let mut inner = self.lock();
        let size = preview.bytes.len();

        if let Some(max) = self.max_bytes.filter(|&max| inner.stats.live_bytes + size > max) {
            return Err(QuickSideError::PreviewAllocation(format!(
                "preview budget of {} bytes exhausted ({} live, {} requested)",
                max, inner.stats.live_bytes, size
            )));
        }

        inner.next_id += 1;
        let id = HandleId(inner.next_id);
        inner.live.insert(id, preview);
        inner.stats.allocated += 1;
        inner.stats.live = inner.live.len();
        inner.stats.live_bytes += size;
        debug!(%id, size, live = inner.stats.live, "Preview allocated");
        Ok(id)
    }

    fn release(&self, id: HandleId) {
        let mut inner = self.lock();
        match inner.live.remove(&id) {
            Some(preview) => {
                inner.stats.released += 1;
                inner.stats.live = inner.live.len();
                inner.stats.live_bytes = inner.stats.live_bytes.saturating_sub(preview.bytes.len());
            }
            None => {
                inner.stats.invalid_releases += 1;
                warn!(%id, "Release of a preview that is not live");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickside_core::MediaType;

    fn preview(len: usize) -> RenderedPreview {
        RenderedPreview {
            bytes: vec![0u8; len],
            media_type: MediaType::Jpeg,
            width: 1,
            height: 1,
        }
    }

    #[test]
    fn drop_releases_exactly_once() {
        let store = PreviewStore::new().shared();
        let allocator: Arc<dyn PreviewAllocator> = store.clone();

        let handle = PreviewHandle::allocate(&allocator, preview(10)).unwrap();
        let id = handle.id();
        assert!(store.contains(id));
        assert_eq!(store.get(id).map(|b| b.len()), Some(10));

        drop(handle);
        assert!(!store.contains(id));
        let stats = store.stats();
        assert_eq!((stats.allocated, stats.released, stats.live), (1, 1, 0));
        assert_eq!(stats.live_bytes, 0);
        assert_eq!(stats.invalid_releases, 0);
    }

    #[test]
    fn budget_refuses_and_recovers() {
        let store = PreviewStore::with_budget(15).shared();
        let allocator: Arc<dyn PreviewAllocator> = store.clone();

        let first = PreviewHandle::allocate(&allocator, preview(10)).unwrap();
        let refused = PreviewHandle::allocate(&allocator, preview(10));
        assert!(matches!(refused, Err(QuickSideError::PreviewAllocation(_))));

        drop(first);
        assert!(PreviewHandle::allocate(&allocator, preview(10)).is_ok());
    }

    #[test]
    fn unknown_release_is_counted() {
        let store = PreviewStore::new();
        store.release(HandleId(42));
        assert_eq!(store.stats().invalid_releases, 1);
        assert_eq!(store.stats().released, 0);
    }
}
