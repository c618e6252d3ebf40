//! Lenient firmware version ordering.
//!
//! Devices that consume the metadata file compare their running version
//! with the published one as a plain `major.minor.patch` triple and only
//! update when the published triple is strictly greater. This module
//! implements the same ordering so the generator can warn before a
//! release would be ignored by devices in the field.

/// A numeric `major.minor.patch` triple, ordered by major, then minor, then patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    /// Major component.
    pub major: u64,
    /// Minor component.
    pub minor: u64,
    /// Patch component.
    pub patch: u64,
}

impl Version {
    /// Create a version from its components.
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version string leniently.
    ///
    /// An optional leading `v` is skipped. Each of the first three
    /// `.`-separated components contributes its leading ASCII digits, so
    /// `1.2.3-rc1` parses as `1.2.3`. Missing components count as zero.
    /// Returns `None` when the major component has no leading digit.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s.strip_prefix(|c: char| c == 'v' || c == 'V').unwrap_or(s);
        let mut parts = s.split('.').map(leading_number);

        let major = parts.next().flatten()?;
        let minor = parts.next().flatten().unwrap_or(0);
        let patch = parts.next().flatten().unwrap_or(0);
        Some(Self::new(major, minor, patch))
    }
}

fn leading_number(part: &str) -> Option<u64> {
    let end = part
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(part.len());
    part[..end].parse().ok()
}

/// Whether `candidate` would be picked up by a device running `current`.
///
/// Returns `None` if either string does not parse as a version.
#[must_use]
pub fn is_newer(current: &str, candidate: &str) -> Option<bool> {
    let current = Version::parse(current)?;
    let candidate = Version::parse(candidate)?;
    Some(candidate > current)
}
