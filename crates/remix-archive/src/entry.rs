use std::path::PathBuf;

use crate::options::EntryFilter;

/// Metadata of one input archive member. The content is streamed separately
/// and never outlives the iteration step that produced it.
#[derive(Clone, Debug)]
pub struct ArchiveEntry {
    pub index: usize,
    pub name: String,
    pub size: u64,
    pub is_directory: bool,
}

impl ArchiveEntry {
    pub fn new(index: usize, name: impl Into<String>, size: u64, is_directory: bool) -> Self {
        Self {
            index,
            name: name.into(),
            size,
            is_directory,
        }
    }

    /// Whether `name` denotes a directory member. Zip tools write either
    /// separator as the trailing marker.
    pub fn is_directory_name(name: &str) -> bool {
        name.ends_with('/') || name.ends_with('\\')
    }

    pub fn is_audio(&self, filter: &EntryFilter) -> bool {
        !self.is_directory && filter.matches(&self.name)
    }
}

/// An audio track copied into the output archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackEntry {
    pub original_name: String,
    pub target_name: String,
    pub bytes: u64,
}

#[derive(Clone, Debug)]
pub struct TranscodeReport {
    pub output: PathBuf,
    pub entries_seen: usize,
    pub tracks: Vec<TrackEntry>,
    pub skipped: Vec<String>,
    /// Audio entries whose sanitized name is reused by a later entry.
    pub superseded: Vec<String>,
    pub payloads: Vec<String>,
    pub total_bytes: u64,
}

impl TranscodeReport {
    pub(crate) fn new(output: PathBuf) -> Self {
        Self {
            output,
            entries_seen: 0,
            tracks: Vec::new(),
            skipped: Vec::new(),
            superseded: Vec::new(),
            payloads: Vec::new(),
            total_bytes: 0,
        }
    }

    /// Entry names in the output archive, tracks first.
    pub fn output_names(&self) -> Vec<&str> {
        self.tracks
            .iter()
            .map(|t| t.target_name.as_str())
            .chain(self.payloads.iter().map(String::as_str))
            .collect()
    }
}
