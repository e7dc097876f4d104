use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::entry::ArchiveEntry;
use crate::error::{Error, Result, zip_to_io};
use crate::format;

/// An entry read from the input but not yet processed.
///
/// The reader borrows the source, so it must be consumed or dropped before
/// the next entry is requested.
pub struct PendingEntry<'a> {
    pub entry: ArchiveEntry,
    pub reader: Box<dyn Read + 'a>,
}

/// Archive-specific entry source.
pub trait EntrySource {
    /// Names of all entries in iteration order, each with its directory
    /// flag, without reading content.
    fn entry_names(&self) -> Vec<(String, bool)>;

    fn next_entry(&mut self) -> Option<Result<PendingEntry<'_>>>;

    /// Label used in error messages.
    fn label(&self) -> &Path;
}

pub struct ZipSource<R: Read + Seek> {
    archive: ZipArchive<R>,
    index: usize,
    label: PathBuf,
}

impl ZipSource<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let invalid = |source| Error::InvalidInput {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = BufReader::new(File::open(path).map_err(invalid)?);
        if !format::detect_zip(&mut reader).map_err(invalid)? {
            return Err(invalid(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "not a zip archive",
            )));
        }
        Self::new(reader, path)
    }
}

impl<R: Read + Seek> ZipSource<R> {
    pub fn new(reader: R, label: impl Into<PathBuf>) -> Result<Self> {
        let label = label.into();
        let archive = ZipArchive::new(reader).map_err(|e| Error::InvalidInput {
            path: label.clone(),
            source: zip_to_io(e),
        })?;
        Ok(Self {
            archive,
            index: 0,
            label,
        })
    }

    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }
}

impl<R: Read + Seek> EntrySource for ZipSource<R> {
    fn entry_names(&self) -> Vec<(String, bool)> {
        (0..self.archive.len())
            .filter_map(|i| self.archive.name_for_index(i))
            .map(|name| (name.to_string(), ArchiveEntry::is_directory_name(name)))
            .collect()
    }

    fn next_entry(&mut self) -> Option<Result<PendingEntry<'_>>> {
        if self.index >= self.archive.len() {
            return None;
        }
        let index = self.index;
        self.index += 1;

        let file = match self.archive.by_index(index) {
            Ok(f) => f,
            Err(e) => {
                return Some(Err(Error::io(
                    format!("reading entry #{index} of '{}'", self.label.display()),
                    zip_to_io(e),
                )));
            }
        };

        let is_directory = ArchiveEntry::is_directory_name(file.name());
        let entry = ArchiveEntry::new(index, file.name(), file.size(), is_directory);
        Some(Ok(PendingEntry {
            entry,
            reader: Box::new(file),
        }))
    }

    fn label(&self) -> &Path {
        &self.label
    }
}
