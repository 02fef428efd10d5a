//! Platform detection for Node.js downloads.
//!
//! Node.js publishes one archive per `<os>-<arch>` pair, using its own
//! naming (`darwin`, `win`, `x64`, `armv7l`, ...). This module turns what the
//! host reports into that naming.
//!
//! Detection is split in two steps so it can be tested on any machine:
//! [`HostInfo::detect`] snapshots what the host reports, and
//! [`Platform::resolve`] applies the normalization rules to a snapshot.
//!
//! # Example
//!
//! ```
//! use toolchain::platform::{HostInfo, Platform};
//!
//! let host = HostInfo::new("linux", "aarch64", "5.15.0");
//! let platform = Platform::resolve(&host).unwrap();
//! assert_eq!(platform.qualifier(), "linux-arm64");
//! ```

use crate::archive::ArchiveFormat;
use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable only present on 64-bit Windows.
const PROGRAM_FILES_X86: &str = "ProgramFiles(x86)";

/// Location of the kernel release string on Linux.
const OS_RELEASE_FILE: &str = "/proc/sys/kernel/osrelease";

/// A snapshot of what the host reports about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    /// Operating system, as in [`std::env::consts::OS`].
    pub os: String,
    /// Architecture, named the way the host reports it (`x86_64`, `aarch64`,
    /// `arm`, `ppc64le`, ...).
    pub arch: String,
    /// OS version string; on Linux the kernel release (e.g. `5.10.17-v7+`).
    pub os_version: String,
    /// Whether the 64-bit program files indicator is set (Windows only).
    pub program_files_x86: bool,
}

impl HostInfo {
    /// Build a snapshot by hand.
    pub fn new(
        os: impl Into<String>,
        arch: impl Into<String>,
        os_version: impl Into<String>,
    ) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
            os_version: os_version.into(),
            program_files_x86: false,
        }
    }

    /// Set the 64-bit program files indicator.
    #[must_use]
    pub fn program_files_x86(mut self, present: bool) -> Self {
        self.program_files_x86 = present;
        self
    }

    /// Snapshot the current host.
    #[must_use]
    pub fn detect() -> Self {
        let os_version = std::fs::read_to_string(OS_RELEASE_FILE)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        Self {
            os: std::env::consts::OS.to_string(),
            arch: reported_arch(std::env::consts::ARCH).to_string(),
            os_version,
            program_files_x86: std::env::var_os(PROGRAM_FILES_X86).is_some(),
        }
    }
}

/// Map Rust's architecture names onto the names hosts usually report.
fn reported_arch(rust_arch: &str) -> &str {
    match rust_arch {
        "powerpc64" if cfg!(target_endian = "little") => "ppc64le",
        other => other,
    }
}

/// OS family, which decides archive format and install layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformFamily {
    /// Linux, macOS, AIX, SunOS: `.tar.gz` archives, binaries under `bin/`.
    Unix,
    /// Windows: `.zip` archives, binaries at the root.
    Windows,
}

impl PlatformFamily {
    /// Archive format Node.js publishes for this family.
    #[must_use]
    pub fn archive_format(&self) -> ArchiveFormat {
        match self {
            Self::Unix => ArchiveFormat::TarGz,
            Self::Windows => ArchiveFormat::Zip,
        }
    }

    /// Path of the `node` executable inside an installation.
    #[must_use]
    pub fn node_path(&self, root: &Path) -> PathBuf {
        match self {
            Self::Unix => root.join("bin").join("node"),
            Self::Windows => root.join("node.exe"),
        }
    }

    /// Directory holding the bundled npm package inside an installation.
    #[must_use]
    pub fn npm_package_dir(&self, root: &Path) -> PathBuf {
        match self {
            Self::Unix => root.join("lib").join("node_modules").join("npm"),
            Self::Windows => root.join("node_modules").join("npm"),
        }
    }
}

/// The resolved Node.js platform for a host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
    /// OS family.
    pub family: PlatformFamily,
    /// Node.js OS id (`linux`, `darwin`, `win`, ...).
    pub os: String,
    /// Node.js architecture id (`x64`, `arm64`, `armv7l`, ...).
    pub arch: String,
}

impl Platform {
    /// Create a platform from already-normalized ids.
    pub fn new(family: PlatformFamily, os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            family,
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Resolve the platform of the current host.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedPlatform` if Node.js has no build for it.
    pub fn detect() -> Result<Self> {
        Self::resolve(&HostInfo::detect())
    }

    /// Resolve a platform from a host snapshot.
    ///
    /// | Host OS            | Node OS  | Family  |
    /// |--------------------|----------|---------|
    /// | linux              | linux    | Unix    |
    /// | macos              | darwin   | Unix    |
    /// | aix                | aix      | Unix    |
    /// | solaris, illumos   | sunos    | Unix    |
    /// | windows            | win      | Windows |
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedPlatform` for any other OS or for an
    /// architecture the family cannot map.
    pub fn resolve(host: &HostInfo) -> Result<Self> {
        let (family, os) = match host.os.as_str() {
            "linux" => (PlatformFamily::Unix, "linux"),
            "macos" => (PlatformFamily::Unix, "darwin"),
            "aix" => (PlatformFamily::Unix, "aix"),
            "solaris" | "illumos" => (PlatformFamily::Unix, "sunos"),
            "windows" => (PlatformFamily::Windows, "win"),
            _ => {
                return Err(Error::UnsupportedPlatform {
                    os: host.os.clone(),
                    arch: host.arch.clone(),
                });
            }
        };

        let arch = match family {
            PlatformFamily::Unix => unix_arch(&host.arch, &host.os_version),
            PlatformFamily::Windows => Some(windows_arch(host.program_files_x86)),
        }
        .ok_or_else(|| Error::UnsupportedPlatform {
            os: os.to_string(),
            arch: host.arch.clone(),
        })?;

        log::debug!(
            "Resolved platform {os}-{arch} from host {}/{}",
            host.os,
            host.arch
        );

        Ok(Self::new(family, os, arch))
    }

    /// The `<os>-<arch>` qualifier used in archive names.
    #[must_use]
    pub fn qualifier(&self) -> String {
        format!("{}-{}", self.os, self.arch)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

/// Normalize a unix architecture name. `None` means unsupported.
fn unix_arch(arch: &str, os_version: &str) -> Option<&'static str> {
    match arch {
        "arm" if os_version.contains("v7") => Some("armv7l"),
        "arm" => None,
        "aarch64" => Some("arm64"),
        "ppc64le" => Some("ppc64le"),
        "s390x" => Some("s390x"),
        other if other.contains("64") => Some("x64"),
        _ => None,
    }
}

/// A 32-bit process on 64-bit Windows still sees `ProgramFiles(x86)`.
fn windows_arch(program_files_x86: bool) -> &'static str {
    if program_files_x86 { "x64" } else { "x86" }
}
