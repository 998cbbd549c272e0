// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for ingestion and export reports.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity drives how the front end presents it.

use crate::error::QuickSideError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Worth retrying as-is (I/O hiccup, allocation failure).
    Transient,
    /// User must do something (pick another file, fix a setting).
    ActionRequired,
    /// This input will never work.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether retrying the same action may succeed.
    pub retriable: bool,
    pub severity: Severity,
}

impl std::fmt::Display for HumanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.message, self.suggestion)
    }
}

/// Convert a `QuickSideError` into a `HumanError`.
pub fn humanize_error(err: &QuickSideError) -> HumanError {
    match err {
        QuickSideError::UnsupportedInput { name, media_type } => HumanError {
            message: format!("\"{name}\" isn't a PDF or an image."),
            suggestion: format!(
                "Only PDF files and images (PNG, JPEG) can be combined. (File type: {media_type})"
            ),
            retriable: false,
            severity: Severity::Permanent,
        },

        QuickSideError::PdfError(detail) => {
            let lower = detail.to_ascii_lowercase();
            if lower.contains("encrypt") || lower.contains("password") {
                HumanError {
                    message: "This PDF is password protected.".into(),
                    suggestion: "Unlock the PDF first, then add it again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There's a problem with this PDF file.".into(),
                    suggestion: "The file may be damaged. Try opening it in a PDF viewer first, or use a different copy.".into(),
                    retriable: false,
                    severity: Severity::Permanent,
                }
            }
        }

        QuickSideError::ImageError(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        QuickSideError::UnsupportedImageFormat(format) => HumanError {
            message: "This image type can't be placed in a PDF.".into(),
            suggestion: format!(
                "Convert the image to JPEG or PNG and replace the page. (Image type: {format})"
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        QuickSideError::PreviewAllocation(_) => HumanError {
            message: "We ran out of room for page previews.".into(),
            suggestion: "Remove some pages or close other tabs, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        QuickSideError::IndexOutOfRange { index, len } => HumanError {
            message: "That page no longer exists.".into(),
            suggestion: format!(
                "Pick a page between 1 and {len}. (Requested position {})",
                index + 1
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        QuickSideError::EmptyCollection => HumanError {
            message: "There are no pages to combine yet.".into(),
            suggestion: "Add at least one PDF or image first.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        QuickSideError::NothingExported { skipped } => HumanError {
            message: "None of the pages could be added to the PDF.".into(),
            suggestion: format!("All {skipped} pages failed. Check the files and try again."),
            retriable: false,
            severity: Severity::Permanent,
        },

        QuickSideError::Config(detail) => HumanError {
            message: "A setting has an invalid value.".into(),
            suggestion: format!("Fix the configuration file and try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        QuickSideError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "We don't have permission to use that file or folder.".into(),
                    suggestion: "Check the permissions, or pick a different location.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your disk may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        QuickSideError::Serialization(_) => HumanError {
            message: "The settings file couldn't be read.".into(),
            suggestion: "Check that it is valid JSON.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_input_names_the_file() {
        let err = QuickSideError::UnsupportedInput {
            name: "notes.txt".into(),
            media_type: "text/plain".into(),
        };
        let human = humanize_error(&err);
        assert!(human.message.contains("notes.txt"));
        assert_eq!(human.severity, Severity::Permanent);
    }

    #[test]
    fn encrypted_pdf_asks_for_unlock() {
        let err = QuickSideError::PdfError("failed to open a.pdf: document is encrypted".into());
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.suggestion.contains("Unlock"));
    }

    #[test]
    fn allocation_failure_is_transient() {
        let human = humanize_error(&QuickSideError::PreviewAllocation("limit".into()));
        assert!(human.retriable);
        assert_eq!(human.severity, Severity::Transient);
    }

    #[test]
    fn out_of_range_uses_one_based_positions() {
        let human = humanize_error(&QuickSideError::IndexOutOfRange { index: 9, len: 4 });
        assert!(human.suggestion.contains("between 1 and 4"));
        assert!(human.suggestion.contains("position 10"));
    }
}
