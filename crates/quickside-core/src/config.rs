// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Assembly configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{QuickSideError, Result};

/// Placeholder in [`AssemblyConfig::output_filename_template`] replaced by the
/// number of pages written.
pub const PAGES_PLACEHOLDER: &str = "{pages}";

/// Settings shared by ingestion and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Scale applied to PDF pages when rendering preview thumbnails.
    pub preview_scale: f32,
    /// JPEG quality (1-100) of rendered previews.
    pub preview_jpeg_quality: u8,
    /// Suggested download name; `{pages}` expands to the page count.
    pub output_filename_template: String,
    /// Header version of the exported PDF.
    pub pdf_version: String,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            preview_scale: 0.5,
            preview_jpeg_quality: 50,
            output_filename_template: format!("combined_{PAGES_PLACEHOLDER}_pages.pdf"),
            pdf_version: "1.5".to_string(),
        }
    }
}

impl AssemblyConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Write this config as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.preview_scale > 0.0 && self.preview_scale <= 1.0) {
            return Err(QuickSideError::Config(format!(
                "preview_scale must be in (0, 1], got {}",
                self.preview_scale
            )));
        }
        if !(1..=100).contains(&self.preview_jpeg_quality) {
            return Err(QuickSideError::Config(format!(
                "preview_jpeg_quality must be in 1..=100, got {}",
                self.preview_jpeg_quality
            )));
        }
        if !self.output_filename_template.to_ascii_lowercase().ends_with(".pdf") {
            return Err(QuickSideError::Config(format!(
                "output_filename_template must end in .pdf, got {:?}",
                self.output_filename_template
            )));
        }
        Ok(())
    }

    /// Download name for an export of `pages` pages.
    pub fn output_filename(&self, pages: usize) -> String {
        self.output_filename_template
            .replace(PAGES_PLACEHOLDER, &pages.to_string())
    }
}
