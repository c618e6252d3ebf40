//! The firmware metadata record and its on-disk JSON form.
//!
//! A metadata file tells OTA clients which version is published, where to
//! download it, and which SHA-256 the downloaded image must have.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Upper bound on how much of an existing metadata file is read back.
const MAX_METADATA_BYTES: u64 = 64 * 1024;

/// Published description of one firmware image.
///
/// Field order is the serialized key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Caller-supplied version string, not validated.
    pub version: String,

    /// Download location: base URL followed by the firmware file name.
    pub url: String,

    /// Lowercase hex SHA-256 of the firmware image.
    pub sha256: String,
}

impl Metadata {
    /// Create a record from already-derived values.
    #[must_use]
    pub fn new(
        version: impl Into<String>,
        url: impl Into<String>,
        sha256: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            url: url.into(),
            sha256: sha256.into(),
        }
    }

    /// Create a record for a firmware file whose digest is already known.
    ///
    /// Only the file name of `firmware` ends up in the URL; directory
    /// components are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFirmwareName`] if `firmware` has no UTF-8
    /// file name.
    pub fn for_firmware(
        version: impl Into<String>,
        firmware: &Path,
        base_url: &str,
        sha256: impl Into<String>,
    ) -> Result<Self> {
        let name = firmware_file_name(firmware)?;
        Ok(Self::new(version, download_url(base_url, name), sha256))
    }

    /// Serialize as JSON indented by two spaces, without a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a metadata document.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a metadata object.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a metadata file.
    ///
    /// At most 64 KiB are read; anything longer fails to parse.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MetadataRead`] if the file cannot be read, or a JSON
    /// error if it does not contain metadata.
    pub fn read_from(path: &Path) -> Result<Self> {
        let err = |source: std::io::Error| Error::MetadataRead {
            path: path.to_path_buf(),
            source,
        };
        let mut json = String::new();
        fs::File::open(path)
            .map_err(err)?
            .take(MAX_METADATA_BYTES)
            .read_to_string(&mut json)
            .map_err(err)?;
        Self::from_json(&json)
    }

    /// Write the metadata file, replacing any existing content.
    ///
    /// With `atomic` set the document is written to a temporary file in the
    /// destination directory and renamed into place, so readers never see
    /// a partially written file. Symlinks are followed and the rename
    /// happens at their target. Outputs that cannot be replaced by a rename
    /// (devices, FIFOs, dangling links, read-only files) are opened and
    /// truncated like a plain write.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MetadataWrite`] if the file cannot be written.
    pub fn write_to(&self, path: &Path, atomic: bool) -> Result<()> {
        let json = self.to_json()?;
        match atomic.then(|| rename_target(path)).flatten() {
            Some(target) => write_atomic(&target, json.as_bytes())
                .map_err(|e| Error::metadata_write(path, e)),
            None => fs::write(path, json).map_err(|e| Error::metadata_write(path, e)),
        }
    }
}

/// The file name component of a firmware path.
///
/// # Errors
///
/// Returns [`Error::InvalidFirmwareName`] for paths such as `/` or `..`, or
/// names that are not valid UTF-8.
pub fn firmware_file_name(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| Error::InvalidFirmwareName {
            path: path.to_path_buf(),
        })
}

/// Join a base URL and a file name with exactly one `/` between them.
#[must_use]
pub fn download_url(base_url: &str, file_name: &str) -> String {
    if base_url.ends_with('/') {
        format!("{base_url}{file_name}")
    } else {
        format!("{base_url}/{file_name}")
    }
}

/// Where a temp file can be renamed to so that `path` ends up with the new
/// content, or `None` if `path` has to be written in place.
fn rename_target(path: &Path) -> Option<PathBuf> {
    let Ok(meta) = fs::symlink_metadata(path) else {
        return Some(path.to_path_buf());
    };
    let target = if meta.file_type().is_symlink() {
        fs::canonicalize(path).ok()?
    } else {
        path.to_path_buf()
    };
    let meta = fs::metadata(&target).ok()?;
    (meta.is_file() && !meta.permissions().readonly()).then_some(target)
}

fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;

    // Temp files are created 0600; keep the destination readable like a plain write would.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(path).map_or(0o644, |m| m.permissions().mode());
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(mode))?;
    }

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
