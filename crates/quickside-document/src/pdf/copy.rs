// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page copying — deep-clone one page of a source document, and every object it
// transitively references, into a target document.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use quickside_core::error::QuickSideError;
use tracing::{debug, warn};

use super::reader::{INHERITABLE_KEYS, SourcePdf, resolve_inherited};

/// Copies pages from one source document into a target document.
///
/// Keeps a source-to-target object ID map, so resources shared between pages
/// (fonts, images, colour spaces) are copied once no matter how many pages of
/// the same source end up in the target. Use one copier per
/// (source, target) pair.
#[derive(Debug, Default)]
pub struct PageCopier {
    id_map: HashMap<ObjectId, ObjectId>,
}

impl PageCopier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone the page at `index` (zero-based) of `source` into `target`.
    ///
    /// Returns the new page's object ID. The page is NOT attached to the
    /// target's page tree and has no /Parent; the caller links it. Inheritable
    /// attributes the page picked up from its ancestors are written onto the
    /// copy, since the ancestors are not copied.
    pub fn copy_page(
        &mut self,
        source: &SourcePdf,
        index: usize,
        target: &mut Document,
    ) -> Result<ObjectId, QuickSideError> {
        let page_id = source.page_id(index)?;
        let src_doc = source.document();
        let page_dict = src_doc.get_dictionary(page_id).map_err(|err| {
            QuickSideError::PdfError(format!("cannot read page object {:?}: {}", page_id, err))
        })?;

        let new_page_id = target.new_object_id();
        // Back-references to this page (annotation /P) resolve to the copy.
        self.id_map.insert(page_id, new_page_id);

        let mut new_dict = self.clone_dictionary(src_doc, target, page_dict);
        for key in INHERITABLE_KEYS {
            if new_dict.has(key) {
                continue;
            }
            if let Some(value) = resolve_inherited(src_doc, page_id, key) {
                let cloned = self.clone_object(src_doc, target, value);
                new_dict.set(key.to_vec(), cloned);
            }
        }

        // Every appearance of a page needs its own page object.
        self.id_map.remove(&page_id);
        target.objects.insert(new_page_id, Object::Dictionary(new_dict));

        debug!(
            ?page_id,
            ?new_page_id,
            copied_objects = self.id_map.len(),
            "Page copied"
        );
        Ok(new_page_id)
    }

    fn clone_object(
        &mut self,
        source: &Document,
        target: &mut Document,
        object: &Object,
    ) -> Object {
        match object {
            Object::Reference(id) => Object::Reference(self.clone_reference(source, target, *id)),
            Object::Dictionary(dict) => {
                Object::Dictionary(self.clone_dictionary(source, target, dict))
            }
            Object::Array(items) => Object::Array(
                items
                    .iter()
                    .map(|item| self.clone_object(source, target, item))
                    .collect(),
            ),
            Object::Stream(stream) => {
                let dict = self.clone_dictionary(source, target, &stream.dict);
                Object::Stream(Stream::new(dict, stream.content.clone()))
            }
            // Boolean, Integer, Real, String, Name, Null.
            other => other.clone(),
        }
    }

    /// /Parent is skipped: following it would drag in the whole source page
    /// tree. The caller patches the page's /Parent.
    fn clone_dictionary(
        &mut self,
        source: &Document,
        target: &mut Document,
        dict: &Dictionary,
    ) -> Dictionary {
        let mut new_dict = Dictionary::new();
        for (key, value) in dict.iter() {
            if key == b"Parent" {
                continue;
            }
            let cloned = self.clone_object(source, target, value);
            new_dict.set(key.clone(), cloned);
        }
        new_dict
    }

    fn clone_reference(
        &mut self,
        source: &Document,
        target: &mut Document,
        id: ObjectId,
    ) -> ObjectId {
        if let Some(&mapped) = self.id_map.get(&id) {
            return mapped;
        }

        // Reserve the target ID before recursing so reference cycles terminate.
        let new_id = target.new_object_id();
        self.id_map.insert(id, new_id);

        let cloned = match source.get_object(id) {
            Ok(object) => self.clone_object(source, target, object),
            Err(err) => {
                warn!(?id, %err, "Cannot resolve reference, using Null");
                Object::Null
            }
        };
        target.objects.insert(new_id, cloned);
        new_id
    }
}
