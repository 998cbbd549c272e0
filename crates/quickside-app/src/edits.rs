// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Collection edits given on the command line.
//
// Positions are 1-based here, as printed by `inspect`, and converted to
// 0-based indices while parsing.

use std::path::PathBuf;
use std::str::FromStr;

use quickside_assembly::PageCollection;
use quickside_core::error::Result;
use tracing::warn;

use crate::services::app_services::AppServices;

/// Parse a 1-based page position into a 0-based index.
pub fn parse_position(value: &str) -> std::result::Result<usize, String> {
    let position: usize = value
        .trim()
        .parse()
        .map_err(|_| format!("'{value}' is not a page position"))?;
    position
        .checked_sub(1)
        .ok_or_else(|| "page positions start at 1".to_string())
}

/// `--move FROM:TO`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveEdit {
    pub from: usize,
    pub to: usize,
}

impl FromStr for MoveEdit {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, String> {
        let (from, to) = value
            .split_once(':')
            .ok_or_else(|| format!("expected FROM:TO, got '{value}'"))?;
        Ok(Self {
            from: parse_position(from)?,
            to: parse_position(to)?,
        })
    }
}

/// `--rotate POS:DEGREES`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotateEdit {
    pub index: usize,
    pub degrees: i32,
}

impl FromStr for RotateEdit {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, String> {
        let (index, degrees) = value
            .split_once(':')
            .ok_or_else(|| format!("expected POS:DEGREES, got '{value}'"))?;
        let degrees: i32 = degrees
            .trim()
            .parse()
            .map_err(|_| format!("'{degrees}' is not a number of degrees"))?;
        if degrees % 90 != 0 {
            return Err(format!("rotation must be a multiple of 90, got {degrees}"));
        }
        Ok(Self {
            index: parse_position(index)?,
            degrees,
        })
    }
}

/// `--replace POS=FILE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceEdit {
    pub index: usize,
    pub path: PathBuf,
}

impl FromStr for ReplaceEdit {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, String> {
        let (index, path) = value
            .split_once('=')
            .ok_or_else(|| format!("expected POS=FILE, got '{value}'"))?;
        if path.is_empty() {
            return Err("replacement file is empty".into());
        }
        Ok(Self {
            index: parse_position(index)?,
            path: PathBuf::from(path),
        })
    }
}

/// All edits for one run, applied as replaces, then moves, then rotations,
/// then removals. Each group sees the collection as left by the previous one;
/// removal positions all refer to the collection after rotations.
#[derive(Debug, Clone, Default)]
pub struct EditPlan {
    pub replacements: Vec<ReplaceEdit>,
    pub moves: Vec<MoveEdit>,
    pub rotations: Vec<RotateEdit>,
    pub removals: Vec<usize>,
}

impl EditPlan {
    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
            && self.moves.is_empty()
            && self.rotations.is_empty()
            && self.removals.is_empty()
    }

    /// Apply every edit. A failed replace stops the run; out-of-range moves,
    /// rotations and removals are ignored with a warning.
    pub fn apply(&self, services: &AppServices, collection: &mut PageCollection) -> Result<()> {
        for edit in &self.replacements {
            services.replace(collection, edit.index, &edit.path)?;
        }
        for edit in &self.moves {
            if !collection.move_page(edit.from, edit.to) {
                warn!(
                    from = edit.from + 1,
                    to = edit.to + 1,
                    len = collection.len(),
                    "move ignored"
                );
            }
        }
        for edit in &self.rotations {
            if !collection.rotate(edit.index, edit.degrees) {
                warn!(position = edit.index + 1, len = collection.len(), "rotation ignored");
            }
        }
        let removed = collection.remove_many(&self.removals);
        if removed < self.removals.len() {
            warn!(requested = self.removals.len(), removed, "some removals ignored");
        }
        Ok(())
    }
}
