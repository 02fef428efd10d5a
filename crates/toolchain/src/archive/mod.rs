//! Archive extraction for Node.js distributions.
//!
//! Node.js archives wrap everything in a single top-level folder
//! (`node-v14.2.0-linux-x64/`). Both formats strip that folder, so the
//! contents land directly in the destination directory.
//!
//! Entries are decoded and written one at a time; an archive is never held
//! in memory as a whole.
//!
//! The official archives list every directory before its contents. Missing
//! parent directories are still created on demand.

mod targz;
mod zipfile;

use crate::error::{Error, Result};
use std::fmt;
use std::io::{Read, Seek};
use std::path::{Component, Path, PathBuf};

/// Archive formats published by Node.js.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// Gzip-compressed tar (unix family).
    TarGz,
    /// Zip (windows family).
    Zip,
}

impl ArchiveFormat {
    /// File extension, without the leading dot.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::TarGz => "tar.gz",
            Self::Zip => "zip",
        }
    }

    /// Whether the format can be decoded straight off a stream.
    ///
    /// Zip keeps its index at the end of the file, so it needs random access.
    #[must_use]
    pub fn is_streamable(&self) -> bool {
        matches!(self, Self::TarGz)
    }

    /// Extract an archive read from `reader` into `dest`.
    ///
    /// For zip, the reader must also be seekable; use [`extract_zip`].
    ///
    /// # Errors
    ///
    /// Returns `Error::ExtractionFailed` for malformed archives and unsafe
    /// entry paths, and `Error::Io` for filesystem failures.
    pub fn extract_stream(&self, reader: impl Read, dest: &Path) -> Result<()> {
        match self {
            Self::TarGz => targz::extract(reader, dest),
            Self::Zip => Err(Error::extraction(
                "zip archives need a seekable reader",
            )),
        }
    }
}

/// Extract a zip archive into `dest`.
///
/// # Errors
///
/// Returns `Error::ExtractionFailed` for malformed archives and unsafe
/// entry paths, and `Error::Io` for filesystem failures.
pub fn extract_zip(reader: impl Read + Seek, dest: &Path) -> Result<()> {
    zipfile::extract(reader, dest)
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Map an archive entry path to its path below the destination.
///
/// Returns `Ok(None)` for the top-level folder itself (single segment), and
/// the path without its first segment otherwise.
///
/// # Errors
///
/// Returns `Error::ExtractionFailed` for absolute paths and paths that
/// climb out of the destination with `..`.
pub fn strip_root(entry: &Path) -> Result<Option<PathBuf>> {
    let mut components = Vec::new();

    for component in entry.components() {
        match component {
            Component::Normal(part) => components.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::extraction(format!(
                    "refusing to extract unsafe path: {}",
                    entry.display()
                )));
            }
        }
    }

    if components.len() <= 1 {
        return Ok(None);
    }

    Ok(Some(components[1..].iter().collect()))
}

/// Refuse a path below `dest` that passes through a symbolic link.
///
/// Every existing prefix of `relative`, including `relative` itself, must be
/// a real file or directory. A link created by an earlier entry could
/// otherwise redirect a later write outside `dest`.
///
/// # Errors
///
/// Returns `Error::ExtractionFailed` when a prefix is a symbolic link.
fn reject_symlinked_path(dest: &Path, relative: &Path) -> Result<()> {
    let mut current = dest.to_path_buf();

    for component in relative.components() {
        current.push(component);
        match std::fs::symlink_metadata(&current) {
            Ok(meta) if meta.file_type().is_symlink() => {
                return Err(Error::extraction(format!(
                    "refusing to extract through symbolic link: {}",
                    relative.display()
                )));
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(Error::io(&current, e)),
        }
    }

    Ok(())
}

/// Create the parent directory of `path` if the archive did not list it.
fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.exists() => {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))
        }
        _ => Ok(()),
    }
}

/// Read, write and execute bits for one class of users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Access {
    /// `r`
    pub read: bool,
    /// `w`
    pub write: bool,
    /// `x`
    pub execute: bool,
}

impl Access {
    /// Decode one octal digit.
    #[must_use]
    pub fn from_digit(digit: u32) -> Self {
        Self {
            read: digit & 0o4 != 0,
            write: digit & 0o2 != 0,
            execute: digit & 0o1 != 0,
        }
    }

    /// Encode back into one octal digit.
    #[must_use]
    pub fn digit(&self) -> u32 {
        (u32::from(self.read) << 2) | (u32::from(self.write) << 1) | u32::from(self.execute)
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |set: bool, c: char| if set { c } else { '-' };
        write!(
            f,
            "{}{}{}",
            flag(self.read, 'r'),
            flag(self.write, 'w'),
            flag(self.execute, 'x')
        )
    }
}

/// POSIX permission set decoded from an archive entry mode.
///
/// The mode is read as three octal digits (owner, group, other). Anything
/// above the permission bits (setuid, setgid, sticky) is not carried over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PermissionSet {
    /// Owner access.
    pub owner: Access,
    /// Group access.
    pub group: Access,
    /// Everyone else.
    pub other: Access,
}

impl PermissionSet {
    /// Decode a Unix mode.
    #[must_use]
    pub fn from_mode(mode: u32) -> Self {
        Self {
            owner: Access::from_digit((mode >> 6) & 0o7),
            group: Access::from_digit((mode >> 3) & 0o7),
            other: Access::from_digit(mode & 0o7),
        }
    }

    /// Encode as a Unix mode.
    #[must_use]
    pub fn mode(&self) -> u32 {
        (self.owner.digit() << 6) | (self.group.digit() << 3) | self.other.digit()
    }
}

impl fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.owner, self.group, self.other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension() {
        assert_eq!(ArchiveFormat::TarGz.extension(), "tar.gz");
        assert_eq!(ArchiveFormat::Zip.extension(), "zip");
        assert_eq!(ArchiveFormat::Zip.to_string(), "zip");
    }

    #[test]
    fn test_streamable() {
        assert!(ArchiveFormat::TarGz.is_streamable());
        assert!(!ArchiveFormat::Zip.is_streamable());
    }

    #[test]
    fn test_zip_rejects_plain_stream() {
        let result = ArchiveFormat::Zip.extract_stream(&b""[..], Path::new("/nonexistent"));
        assert!(matches!(result, Err(Error::ExtractionFailed { .. })));
    }

    #[test]
    fn test_strip_root_skips_top_level() {
        assert_eq!(strip_root(Path::new("node-v14.2.0-linux-x64")).unwrap(), None);
        assert_eq!(strip_root(Path::new("node-v14.2.0-linux-x64/")).unwrap(), None);
        assert_eq!(strip_root(Path::new("./node-v14.2.0")).unwrap(), None);
    }

    #[test]
    fn test_strip_root_removes_first_segment() {
        assert_eq!(
            strip_root(Path::new("node-v14.2.0-linux-x64/bin/node")).unwrap(),
            Some(PathBuf::from("bin/node"))
        );
        assert_eq!(
            strip_root(Path::new("node-v14.2.0-linux-x64/README.md")).unwrap(),
            Some(PathBuf::from("README.md"))
        );
    }

    #[test]
    fn test_strip_root_rejects_unsafe_paths() {
        assert!(strip_root(Path::new("root/../../etc/passwd")).is_err());
        assert!(strip_root(Path::new("/etc/passwd")).is_err());
    }

    #[test]
    fn test_permission_set_from_mode() {
        let perms = PermissionSet::from_mode(0o755);
        assert!(perms.owner.read && perms.owner.write && perms.owner.execute);
        assert!(perms.group.read && !perms.group.write && perms.group.execute);
        assert!(perms.other.read && !perms.other.write && perms.other.execute);
        assert_eq!(perms.to_string(), "rwxr-xr-x");
    }

    #[test]
    fn test_permission_set_round_trip() {
        for mode in [0o644, 0o755, 0o600, 0o421, 0o000, 0o777] {
            assert_eq!(PermissionSet::from_mode(mode).mode(), mode);
        }
    }

    #[test]
    fn test_permission_set_drops_special_bits() {
        let perms = PermissionSet::from_mode(0o104_755);
        assert_eq!(perms.mode(), 0o755);
        assert_eq!(PermissionSet::from_mode(0o1777).to_string(), "rwxrwxrwx");
    }

    #[test]
    fn test_access_display() {
        assert_eq!(Access::from_digit(0o6).to_string(), "rw-");
        assert_eq!(Access::from_digit(0o1).to_string(), "--x");
        assert_eq!(Access::default().to_string(), "---");
    }

    #[cfg(unix)]
    #[test]
    fn test_reject_symlinked_path() {
        let temp = tempfile::tempdir().unwrap();
        let dest = temp.path();
        std::fs::create_dir(dest.join("real")).unwrap();
        std::os::unix::fs::symlink("/tmp", dest.join("link")).unwrap();

        assert!(reject_symlinked_path(dest, Path::new("real/file")).is_ok());
        assert!(reject_symlinked_path(dest, Path::new("missing/deeper")).is_ok());
        assert!(matches!(
            reject_symlinked_path(dest, Path::new("link/file")),
            Err(Error::ExtractionFailed { .. })
        ));
        assert!(matches!(
            reject_symlinked_path(dest, Path::new("link")),
            Err(Error::ExtractionFailed { .. })
        ));
    }
}
