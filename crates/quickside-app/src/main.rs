// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// QuickSide — combine PDF pages and images into one reordered PDF.
//
// Entry point. Initialises logging, loads configuration, and dispatches the
// subcommand.

mod commands;
mod edits;
mod services;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use quickside_core::humanize_error;

use edits::{EditPlan, MoveEdit, ReplaceEdit, RotateEdit, parse_position};
use services::app_services::AppServices;

#[derive(Parser)]
#[command(name = "quickside", about = "Combine PDF pages and images into one PDF", version)]
struct Cli {
    /// JSON config file (defaults to the per-user config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Combine files into one PDF, optionally reordering and editing pages
    Assemble {
        /// Input PDFs and images, in order
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,

        /// Move the page at FROM to TO (1-based, repeatable)
        #[arg(long = "move", value_name = "FROM:TO")]
        moves: Vec<MoveEdit>,

        /// Remove the page at POS (1-based, repeatable)
        #[arg(long = "remove", value_name = "POS", value_parser = parse_position)]
        removals: Vec<usize>,

        /// Rotate the page at POS clockwise by DEG, a multiple of 90
        #[arg(long = "rotate", value_name = "POS:DEG", allow_hyphen_values = true)]
        rotations: Vec<RotateEdit>,

        /// Replace the page at POS with every page of FILE
        #[arg(long = "replace", value_name = "POS=FILE")]
        replacements: Vec<ReplaceEdit>,

        /// Directory the combined PDF is written to
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// List the pages the files contribute
    Inspect {
        /// Input PDFs and images, in order
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let services = match AppServices::init(cli.config.as_deref()) {
        Ok(services) => services,
        Err(err) => {
            tracing::error!(error = %err, "configuration failed");
            eprintln!("{}", humanize_error(&err));
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Assemble {
            files,
            moves,
            removals,
            rotations,
            replacements,
            out_dir,
        } => {
            let edits = EditPlan {
                replacements,
                moves,
                rotations,
                removals,
            };
            commands::assemble(&services, &files, &edits, &out_dir)
        }
        Commands::Inspect { files } => commands::inspect(&services, &files),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("{}", humanize_error(&err));
            ExitCode::FAILURE
        }
    }
}
