//! Gzip-compressed tar extraction (unix family).

use super::{PermissionSet, ensure_parent, reject_symlinked_path, strip_root};
use crate::error::{Error, Result};
use flate2::read::GzDecoder;
use std::fs::{self, OpenOptions};
use std::io::{self, Read};
use std::path::Path;
use tar::Archive;

pub(super) fn extract(reader: impl Read, dest: &Path) -> Result<()> {
    let mut archive = Archive::new(GzDecoder::new(reader));
    let entries = archive
        .entries()
        .map_err(|e| stream_error("invalid tar.gz archive", e))?;

    let mut extracted = 0usize;

    for entry in entries {
        let mut entry = entry.map_err(|e| stream_error("invalid tar entry", e))?;
        let path = entry
            .path()
            .map_err(|e| Error::extraction(format!("invalid tar entry path: {e}")))?
            .into_owned();

        let Some(relative) = strip_root(&path)? else {
            continue;
        };
        let target = dest.join(&relative);
        let entry_type = entry.header().entry_type();

        if entry_type.is_symlink() {
            let link = entry
                .link_name()
                .map_err(|e| Error::extraction(format!("invalid link target: {e}")))?
                .ok_or_else(|| {
                    Error::extraction(format!("symlink without target: {}", path.display()))
                })?
                .into_owned();
            log::trace!("{} -> {}", relative.display(), link.display());
            if let Some(parent) = relative.parent() {
                reject_symlinked_path(dest, parent)?;
            }
            ensure_parent(&target)?;
            create_symlink(&link, &target)?;
        } else if entry_type.is_hard_link() {
            let link = entry
                .link_name()
                .map_err(|e| Error::extraction(format!("invalid link target: {e}")))?
                .ok_or_else(|| {
                    Error::extraction(format!("hard link without target: {}", path.display()))
                })?
                .into_owned();
            let Some(source) = strip_root(&link)? else {
                return Err(Error::extraction(format!(
                    "hard link to archive root: {}",
                    path.display()
                )));
            };
            reject_symlinked_path(dest, &source)?;
            reject_symlinked_path(dest, &relative)?;
            ensure_parent(&target)?;
            fs::hard_link(dest.join(source), &target).map_err(|e| Error::io(&target, e))?;
        } else if entry_type.is_dir() || entry_type.is_file() {
            let mode = entry
                .header()
                .mode()
                .map_err(|e| Error::extraction(format!("invalid mode: {e}")))?;
            let perms = PermissionSet::from_mode(mode);
            log::trace!("{} {}", perms, relative.display());
            reject_symlinked_path(dest, &relative)?;

            if entry_type.is_dir() {
                fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;
                apply_permissions(&target, perms)?;
            } else {
                write_file(&mut entry, &target, perms)?;
            }
        } else {
            log::trace!("Skipping {:?} entry {}", entry_type, path.display());
            continue;
        }

        extracted += 1;
    }

    log::debug!("Extracted {extracted} entries into {}", dest.display());
    Ok(())
}

/// Classify a failure reading the compressed stream.
///
/// A stream that ends early keeps its `UnexpectedEof` kind so callers can
/// tell a cut-off download from a malformed archive.
fn stream_error(context: &str, e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        Error::io("<archive stream>", e)
    } else {
        Error::extraction(format!("{context}: {e}"))
    }
}

fn write_file(entry: &mut impl Read, target: &Path, perms: PermissionSet) -> Result<()> {
    ensure_parent(target)?;

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(perms.mode());
    }

    let mut file = options.open(target).map_err(|e| Error::io(target, e))?;
    io::copy(entry, &mut file).map_err(|e| Error::io(target, e))?;

    // The umask may have masked bits off at creation
    apply_permissions(target, perms)
}

#[cfg(unix)]
fn apply_permissions(path: &Path, perms: PermissionSet) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(perms.mode()))
        .map_err(|e| Error::io(path, e))
}

#[cfg(not(unix))]
fn apply_permissions(_path: &Path, _perms: PermissionSet) -> Result<()> {
    Ok(())
}

#[cfg(unix)]
fn create_symlink(link: &Path, target: &Path) -> Result<()> {
    std::os::unix::fs::symlink(link, target).map_err(|e| Error::io(target, e))
}

#[cfg(not(unix))]
fn create_symlink(_link: &Path, target: &Path) -> Result<()> {
    Err(Error::extraction(format!(
        "symbolic links are not supported on this platform: {}",
        target.display()
    )))
}
