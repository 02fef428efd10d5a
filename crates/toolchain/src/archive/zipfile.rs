//! Zip extraction (windows family). Permissions are not modelled.

use super::{ensure_parent, strip_root};
use crate::error::{Error, Result};
use std::fs::{self, File};
use std::io::{self, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

pub(super) fn extract(reader: impl Read + Seek, dest: &Path) -> Result<()> {
    let mut archive = ZipArchive::new(reader)?;
    let mut extracted = 0usize;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_string();

        // `enclosed_name` is None for absolute paths and `..` escapes
        let path = entry.enclosed_name().ok_or_else(|| {
            Error::extraction(format!("refusing to extract unsafe path: {name}"))
        })?;

        let Some(relative) = strip_root(&path)? else {
            continue;
        };
        let target = dest.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;
        } else {
            ensure_parent(&target)?;
            let mut file = File::create(&target).map_err(|e| Error::io(&target, e))?;
            io::copy(&mut entry, &mut file).map_err(|e| Error::io(&target, e))?;
        }

        log::trace!("{}", relative.display());
        extracted += 1;
    }

    log::debug!("Extracted {extracted} entries into {}", dest.display());
    Ok(())
}
