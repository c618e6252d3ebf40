//! `fwmeta` - Firmware metadata generator for OTA updates
//!
//! This library hashes a firmware image with SHA-256 and writes the JSON
//! descriptor (`version`, `url`, `sha256`) that OTA clients poll to decide
//! whether to download a new image.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod checksum;
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
pub mod metadata;
pub mod version;

pub use config::Config;
pub use error::{Error, Result};
pub use generator::Generator;
pub use logging::init_logging;
pub use metadata::Metadata;
pub use version::Version;
