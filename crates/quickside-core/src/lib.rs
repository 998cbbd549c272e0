// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// QuickSide — Core types and error definitions shared across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod types;

pub use config::AssemblyConfig;
pub use error::{QuickSideError, Result};
pub use human_errors::{HumanError, Severity, humanize_error};
pub use types::*;
