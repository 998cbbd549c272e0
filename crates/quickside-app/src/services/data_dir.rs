// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware config directory resolution.

use std::path::PathBuf;

/// Directory holding `config.json`. Not created; a missing directory just
/// means defaults.
pub fn config_dir() -> PathBuf {
    config_base().join("quickside")
}

fn config_base() -> PathBuf {
    // Try XDG config dir, then fallback to home
    if let Some(xdg) = std::env::var("XDG_CONFIG_HOME").ok().filter(|dir| !dir.is_empty()) {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config");
    }
    PathBuf::from(".")
}
