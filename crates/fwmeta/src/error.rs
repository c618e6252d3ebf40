//! Error types for fwmeta.
//!
//! This module defines the error type returned by every library operation,
//! with enough context (paths, underlying I/O errors) to produce a useful
//! message when the binary exits.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for fwmeta operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Firmware Errors ===
    /// The firmware file is missing or could not be read.
    #[error("failed to read firmware {path}: {source}")]
    FirmwareRead {
        /// Path to the firmware file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The firmware path exists but is not a regular file.
    #[error("firmware path {path} is not a regular file")]
    NotAFile {
        /// The offending path.
        path: PathBuf,
    },

    /// The firmware path has no usable file name to put in the download URL.
    #[error("firmware path {path} has no UTF-8 file name")]
    InvalidFirmwareName {
        /// The offending path.
        path: PathBuf,
    },

    // === Metadata Errors ===
    /// The metadata file could not be written.
    #[error("failed to write metadata {path}: {source}")]
    MetadataWrite {
        /// Path to the metadata file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// An existing metadata file could not be read.
    #[error("failed to read metadata {path}: {source}")]
    MetadataRead {
        /// Path to the metadata file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    // === Configuration Errors ===
    /// A configuration file was named but does not exist.
    #[error("configuration file {path} not found")]
    ConfigNotFound {
        /// The path that was given.
        path: PathBuf,
    },

    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for fwmeta operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a firmware read error.
    #[must_use]
    pub fn firmware_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FirmwareRead {
            path: path.into(),
            source,
        }
    }

    /// Create a metadata write error.
    #[must_use]
    pub fn metadata_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::MetadataWrite {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Check if this error was caused by a missing file.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.io_kind() == Some(io::ErrorKind::NotFound)
    }

    /// Check if this error was caused by missing permissions.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        self.io_kind() == Some(io::ErrorKind::PermissionDenied)
    }

    fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::FirmwareRead { source, .. }
            | Self::MetadataWrite { source, .. }
            | Self::MetadataRead { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}
