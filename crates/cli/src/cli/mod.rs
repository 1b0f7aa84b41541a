// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "portal")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Send and receive files through a relay backend")]
#[command(
    long_about = "Send and receive files through a relay backend.\n\n\
    Files uploaded by one client are pushed to every listening client; the \
    inventory backend keeps a browsable copy."
)]
pub struct Cli {
    /// Configuration file (default: $XDG_CONFIG_HOME/portal/config.toml)
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, value_name = "path")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Receive files pushed by the relay until interrupted
    #[command(after_help = "\
Examples:
  portal listen                      Write received files to the current directory
  portal listen --out inbox          Write received files to ./inbox
  portal listen --materialize        Also save each file to the inventory backend")]
    Listen {
        /// Directory received files are written to
        #[arg(long, value_name = "dir", default_value = ".")]
        out: PathBuf,

        /// Save each received file to the inventory backend
        #[arg(long)]
        materialize: bool,
    },

    /// Upload files through the relay
    #[command(after_help = "\
Examples:
  portal upload report.pdf           Upload one file
  portal upload *.png                Upload several files concurrently")]
    Upload {
        /// Files to upload
        #[arg(required = true, value_name = "path")]
        paths: Vec<PathBuf>,
    },

    /// Show the inventory file tree
    Tree {
        /// Print file names only, one per line
        #[arg(long)]
        flat: bool,
    },

    /// Print file names as the inventory announces them
    Watch,

    /// Download a file from the inventory
    Fetch {
        /// File name in the inventory
        name: String,

        /// Output path (default: ./<name>)
        #[arg(long, short, value_name = "path")]
        out: Option<PathBuf>,
    },
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
