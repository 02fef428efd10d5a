//! In-memory archive fixtures for tests.

use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::{Cursor, Write};
use tar::{EntryType, Header};
use zip::write::SimpleFileOptions;

/// One entry of a fixture archive.
pub enum FixtureEntry {
    Dir(&'static str),
    File(&'static str, u32, &'static [u8]),
    Symlink(&'static str, &'static str),
    HardLink(&'static str, &'static str),
    /// A file whose name is written to the header unchecked.
    RawFile(&'static str, &'static [u8]),
}

impl FixtureEntry {
    pub fn dir(path: &'static str) -> Self {
        Self::Dir(path)
    }

    pub fn file(path: &'static str, mode: u32, data: &'static [u8]) -> Self {
        Self::File(path, mode, data)
    }

    pub fn symlink(path: &'static str, target: &'static str) -> Self {
        Self::Symlink(path, target)
    }

    pub fn hard_link(path: &'static str, target: &'static str) -> Self {
        Self::HardLink(path, target)
    }

    pub fn raw_file(path: &'static str, data: &'static [u8]) -> Self {
        Self::RawFile(path, data)
    }
}

pub fn tar_gz(entries: &[FixtureEntry]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for entry in entries {
        let mut header = Header::new_gnu();
        match entry {
            FixtureEntry::Dir(path) => {
                header.set_entry_type(EntryType::Directory);
                header.set_size(0);
                header.set_mode(0o755);
                builder
                    .append_data(&mut header, format!("{path}/"), std::io::empty())
                    .unwrap();
            }
            FixtureEntry::File(path, mode, data) => {
                header.set_entry_type(EntryType::Regular);
                header.set_size(data.len() as u64);
                header.set_mode(*mode);
                builder.append_data(&mut header, path, *data).unwrap();
            }
            FixtureEntry::Symlink(path, target) => {
                header.set_entry_type(EntryType::Symlink);
                header.set_size(0);
                header.set_mode(0o777);
                builder.append_link(&mut header, path, target).unwrap();
            }
            FixtureEntry::HardLink(path, target) => {
                header.set_entry_type(EntryType::Link);
                header.set_size(0);
                header.set_mode(0o644);
                builder.append_link(&mut header, path, target).unwrap();
            }
            FixtureEntry::RawFile(path, data) => {
                let name = path.as_bytes();
                header.as_old_mut().name[..name.len()].copy_from_slice(name);
                header.set_entry_type(EntryType::Regular);
                header.set_size(data.len() as u64);
                header.set_mode(0o644);
                header.set_cksum();
                builder.append(&header, *data).unwrap();
            }
        }
    }

    builder.into_inner().unwrap().finish().unwrap()
}

pub fn zip(entries: &[FixtureEntry]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));

    for entry in entries {
        match entry {
            FixtureEntry::Dir(path) => {
                writer
                    .add_directory(*path, SimpleFileOptions::default())
                    .unwrap();
            }
            FixtureEntry::File(path, _, data) | FixtureEntry::RawFile(path, data) => {
                writer
                    .start_file(*path, SimpleFileOptions::default())
                    .unwrap();
                writer.write_all(data).unwrap();
            }
            FixtureEntry::Symlink(..) | FixtureEntry::HardLink(..) => {
                panic!("zip fixtures only hold files and directories")
            }
        }
    }

    writer.finish().unwrap().into_inner()
}
