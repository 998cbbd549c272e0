// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Uploaded source files — the raw `(bytes, declared type, filename)` triple the
// file picker hands over, plus a content fingerprint used as the file's
// identity when exporting.

use std::path::Path;
use std::sync::Arc;

use quickside_core::error::Result;
use quickside_core::{MediaType, SourceId};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

/// One uploaded file. Immutable once created; shared between every page
/// descriptor that references it.
#[derive(Debug)]
pub struct SourceFile {
    id: SourceId,
    name: String,
    declared_type: String,
    bytes: Arc<[u8]>,
    /// Lowercase hex SHA-256 of `bytes`.
    fingerprint: String,
}

impl SourceFile {
    pub fn new(
        name: impl Into<String>,
        declared_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        let bytes: Arc<[u8]> = bytes.into().into();
        let fingerprint = fingerprint(&bytes);
        Self {
            id: SourceId::new(),
            name: name.into(),
            declared_type: declared_type.into(),
            bytes,
            fingerprint,
        }
    }

    /// Read a file from disk. No MIME type is declared, so the media type
    /// comes from the extension.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        debug!(bytes = bytes.len(), "Source file read");
        Ok(Self::new(name, "", bytes))
    }

    pub fn id(&self) -> SourceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The MIME type as declared by the uploader (may be empty).
    pub fn declared_type(&self) -> &str {
        &self.declared_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Content identity: equal bytes give equal fingerprints regardless of
    /// filename.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Resolved media type, or `None` if the file is neither a PDF nor an
    /// image.
    pub fn media_type(&self) -> Option<MediaType> {
        MediaType::detect(&self.declared_type, &self.name)
    }
}

fn fingerprint(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_ignores_name() {
        let a = SourceFile::new("a.pdf", "application/pdf", b"same".to_vec());
        let b = SourceFile::new("b.pdf", "application/pdf", b"same".to_vec());
        let c = SourceFile::new("a.pdf", "application/pdf", b"other".to_vec());
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn fingerprint_is_sha256_hex() {
        let file = SourceFile::new("x", "", b"hello".to_vec());
        assert_eq!(
            file.fingerprint(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn from_path_detects_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Scan.PNG");
        std::fs::write(&path, b"bytes").unwrap();

        let file = SourceFile::from_path(&path).unwrap();
        assert_eq!(file.name(), "Scan.PNG");
        assert_eq!(file.declared_type(), "");
        assert_eq!(file.media_type(), Some(MediaType::Png));
        assert_eq!(file.len(), 5);
    }

    #[test]
    fn unknown_kind_has_no_media_type() {
        let file = SourceFile::new("notes.txt", "text/plain", b"hi".to_vec());
        assert_eq!(file.media_type(), None);
    }
}
