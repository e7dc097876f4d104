use std::io;
use std::path::PathBuf;

/// Coarse failure classes surfaced to callers that only need to branch on
/// the kind of failure, not its details.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    InvalidInput,
    NoMatchingContent,
    IoFailure,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("'{path}' is not a readable archive: {source}")]
    InvalidInput { path: PathBuf, source: io::Error },

    #[error("no matching audio files ({filter}) found in '{path}'")]
    NoMatchingContent { path: PathBuf, filter: String },

    #[error("{context}: {source}")]
    Io { context: String, source: io::Error },

    #[error("failed to write configuration payload '{name}': {source}")]
    Payload { name: String, source: io::Error },

    #[error("failed to stage output '{path}': {source}")]
    Staging { path: PathBuf, source: io::Error },
}

impl Error {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidInput { .. } => FailureKind::InvalidInput,
            Self::NoMatchingContent { .. } => FailureKind::NoMatchingContent,
            Self::Io { .. } | Self::Payload { .. } | Self::Staging { .. } => FailureKind::IoFailure,
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Flatten a zip error into an `io::Error`, keeping the inner one when there is one.
pub(crate) fn zip_to_io(e: zip::result::ZipError) -> io::Error {
    match e {
        zip::result::ZipError::Io(inner) => inner,
        other => io::Error::new(io::ErrorKind::InvalidData, other),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
