//! SHA-256 checksums of firmware images.
//!
//! Files are hashed in fixed-size chunks so large images never have to be
//! held in memory.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

const BUF_SIZE: usize = 64 * 1024;

/// Compute SHA-256 of a file and return the digest as lowercase hex.
///
/// # Errors
///
/// Returns [`Error::FirmwareRead`] if the file cannot be opened or read.
pub fn sha256_path(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| Error::firmware_read(path, e))?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; BUF_SIZE];
    let mut total: u64 = 0;
    loop {
        let n = file
            .read(&mut buf)
            .map_err(|e| Error::firmware_read(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        total += n as u64;
    }
    tracing::trace!(path = %path.display(), bytes = total, "hashed firmware");
    Ok(hex::encode(hasher.finalize()))
}

/// Compute SHA-256 of an in-memory buffer as lowercase hex.
#[must_use]
pub fn sha256_bytes(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
