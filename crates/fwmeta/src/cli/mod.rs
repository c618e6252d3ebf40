//! Command-line interface for fwmeta.
//!
//! The three positionals are required; every flag is optional and leaves the
//! default behaviour untouched when omitted.

use std::path::PathBuf;

use clap::Parser;

use crate::logging::Verbosity;

/// fwmeta - Generate OTA metadata for a firmware image
///
/// Computes the SHA-256 of a firmware file and writes a JSON descriptor
/// with its version, download URL and checksum.
#[derive(Debug, Parser)]
#[command(name = "fwmeta")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Version string to publish (not validated)
    #[arg(value_name = "VERSION")]
    pub release: String,

    /// Firmware image to describe
    #[arg(value_name = "FIRMWARE")]
    pub firmware: PathBuf,

    /// Where to write the metadata JSON (overwritten if present)
    #[arg(value_name = "METADATA")]
    pub output: PathBuf,

    /// TOML configuration file (none is read unless given)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Base URL the firmware file name is appended to
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}
