use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Output file written under a temporary name next to its destination.
///
/// The destination only appears once [`StagedOutput::commit`] renames the
/// staged file into place. Dropping an uncommitted stage removes it.
pub struct StagedOutput {
    file: Option<NamedTempFile>,
    destination: PathBuf,
}

impl StagedOutput {
    pub fn create(destination: impl AsRef<Path>) -> Result<Self> {
        let destination = destination.as_ref().to_path_buf();
        let parent = destination
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let file = tempfile::Builder::new()
            .prefix(".remix-")
            .suffix(".tmp")
            .tempfile_in(parent)
            .map_err(|e| Error::Staging {
                path: destination.clone(),
                source: e,
            })?;
        debug!(staged = %file.path().display(), destination = %destination.display(), "staging output");

        Ok(Self {
            file: Some(file),
            destination,
        })
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn staged_path(&self) -> Option<&Path> {
        self.file.as_ref().map(|f| f.path())
    }

    /// Flush, optionally fsync, and move the staged file to its destination.
    pub fn commit(mut self, sync: bool) -> Result<PathBuf> {
        let destination = self.destination.clone();
        let staging_err = |source| Error::Staging {
            path: destination.clone(),
            source,
        };

        let mut file = self
            .file
            .take()
            .ok_or_else(|| staging_err(io::Error::other("output already committed")))?;
        file.flush().map_err(staging_err)?;
        if sync {
            file.as_file().sync_all().map_err(staging_err)?;
        }
        file.persist(&destination).map_err(|e| staging_err(e.error))?;

        debug!(destination = %destination.display(), "committed output");
        Ok(destination)
    }

    fn file_mut(&mut self) -> io::Result<&mut NamedTempFile> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::other("output already committed"))
    }
}

impl Write for StagedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file_mut()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file_mut()?.flush()
    }
}

impl Seek for StagedOutput {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file_mut()?.seek(pos)
    }
}

impl Drop for StagedOutput {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            warn!(destination = %self.destination.display(), "discarding uncommitted output");
            if let Err(e) = file.close() {
                warn!(error = %e, "failed to remove staged output");
            }
        }
    }
}
