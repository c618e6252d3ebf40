//! `fwmeta` - CLI for generating firmware metadata
//!
//! Usage: `fwmeta <VERSION> <FIRMWARE> <METADATA>`

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;

use fwmeta::cli::Cli;
use fwmeta::{init_logging, Config, Generator};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let mut config = Config::load_from(cli.config.clone()).context("loading configuration")?;
    if let Some(base_url) = cli.base_url {
        config = config.with_base_url(base_url)?;
    }

    Generator::new(config)
        .generate(&cli.release, &cli.firmware, &cli.output)
        .with_context(|| {
            format!(
                "generating metadata for {} into {}",
                cli.firmware.display(),
                cli.output.display()
            )
        })?;
    Ok(())
}
