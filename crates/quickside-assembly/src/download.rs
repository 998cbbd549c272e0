// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Delivery of an exported PDF to the user.
//
// The bytes are written to a temporary file beside the destination and
// renamed into place. If anything fails before the rename, the temporary
// file is removed when its handle drops.

use std::io::Write;
use std::path::{Path, PathBuf};

use quickside_core::error::{QuickSideError, Result};
use tracing::{info, instrument};

use crate::export::ExportArtifact;

/// Fallback name when the suggested filename has no usable final component.
const FALLBACK_FILENAME: &str = "combined.pdf";

/// Somewhere an export can be handed to the user.
pub trait DownloadSink {
    /// Deliver `artifact` under its suggested filename. Returns where it went.
    fn deliver(&self, artifact: &ExportArtifact) -> Result<PathBuf>;
}

/// Writes exports into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    #[instrument(skip_all, fields(dir = %self.dir.display(), filename = %artifact.filename))]
    fn deliver(&self, artifact: &ExportArtifact) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let target = self.dir.join(safe_filename(&artifact.filename));

        let mut temp = tempfile::NamedTempFile::new_in(&self.dir)?;
        temp.write_all(&artifact.bytes)?;
        temp.flush()?;
        // A failed persist hands the temp file back inside the error; dropping
        // it removes the file.
        temp.persist(&target).map_err(|err| QuickSideError::Io(err.error))?;

        info!(path = %target.display(), bytes = artifact.bytes.len(), "Export delivered");
        Ok(target)
    }
}

/// Final path component of `name`, so a suggested name cannot escape the
/// sink directory.
fn safe_filename(name: &str) -> &str {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or(FALLBACK_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn artifact(filename: &str) -> ExportArtifact {
        ExportArtifact {
            bytes: b"%PDF-1.5 test".to_vec(),
            filename: filename.to_string(),
            page_count: 1,
            skipped: Vec::new(),
            sources_parsed: 0,
            finished_at: Utc::now(),
        }
    }

    #[test]
    fn delivers_under_suggested_name_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());

        let path = sink.deliver(&artifact("combined_1_pages.pdf")).unwrap();
        assert_eq!(path, dir.path().join("combined_1_pages.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.5 test");

        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn failed_rename_removes_the_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let occupied = dir.path().join("a.pdf");
        std::fs::create_dir(&occupied).unwrap();
        std::fs::write(occupied.join("keep.txt"), b"x").unwrap();

        let result = DirectorySink::new(dir.path()).deliver(&artifact("a.pdf"));
        assert!(matches!(result, Err(QuickSideError::Io(_))));

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("a.pdf")]);
        assert!(occupied.join("keep.txt").exists());
    }

    #[test]
    fn path_components_are_stripped() {
        assert_eq!(safe_filename("../../etc/out.pdf"), "out.pdf");
        assert_eq!(safe_filename(".."), FALLBACK_FILENAME);
        assert_eq!(safe_filename(""), FALLBACK_FILENAME);
    }

    #[test]
    fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out").join("pdfs");
        let path = DirectorySink::new(&nested).deliver(&artifact("a.pdf")).unwrap();
        assert!(path.exists());
    }
}
