//! Pinned runtime versions.
//!
//! A [`Version`] is the exact `v<major>.<minor>.<patch>` identifier of a
//! Node.js release. Parsing is strict: anything that is not exactly three
//! decimal components behind a `v` marker is rejected, so a version always
//! maps to exactly one cache directory and one download URL.
//!
//! # Example
//!
//! ```
//! use toolchain::Version;
//!
//! let version = Version::parse(" v14.2.0 ").unwrap();
//! assert_eq!(version, Version::new(14, 2, 0));
//! assert_eq!(version.to_string(), "v14.2.0");
//! assert!(Version::parse("14.2.0").is_none());
//! ```

use std::fmt;
use std::str::FromStr;

/// Leading marker of every version string.
const PREFIX: char = 'v';

/// An immutable three-part runtime version.
///
/// Ordering is lexicographic over (major, minor, patch), which is exactly
/// what deriving `Ord` over the fields in declaration order gives us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version {
    major: u32,
    minor: u32,
    patch: u32,
}

impl Version {
    /// Create a version from already-validated components.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse the strict `v<major>.<minor>.<patch>` form.
    ///
    /// Surrounding whitespace is ignored. Returns `None` for anything else:
    /// a missing `v`, fewer or more than three components, empty components,
    /// signs, or any non-digit character.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let rest = text.trim().strip_prefix(PREFIX)?;

        let mut parts = rest.split('.');
        let major = parse_component(parts.next()?)?;
        let minor = parse_component(parts.next()?)?;
        let patch = parse_component(parts.next()?)?;

        if parts.next().is_some() {
            return None;
        }

        Some(Self::new(major, minor, patch))
    }

    /// Major component.
    #[must_use]
    pub const fn major(&self) -> u32 {
        self.major
    }

    /// Minor component.
    #[must_use]
    pub const fn minor(&self) -> u32 {
        self.minor
    }

    /// Patch component.
    #[must_use]
    pub const fn patch(&self) -> u32 {
        self.patch
    }
}

/// `u32::from_str` accepts a leading `+`, so digits are checked first.
fn parse_component(segment: &str) -> Option<u32> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Error returned by [`Version::from_str`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version '{input}', expected the form v<major>.<minor>.<patch>")]
pub struct ParseVersionError {
    /// The rejected input.
    pub input: String,
}

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ParseVersionError {
            input: s.to_string(),
        })
    }
}
