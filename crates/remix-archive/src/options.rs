use std::fmt;
use std::sync::Arc;

use regex::Regex;

pub const DEFAULT_AUDIO_SUFFIX: &str = ".ogg";
pub const DEFAULT_DESTINATION_PREFIX: &str = "audio/music/";
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Progress callback. Called inline on the transcoding thread.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Emitted before the entry at `index` is read.
    EntryProcessed(usize),
    PhaseChanged(String),
    Completed,
}

/// Decides which input entries are audio tracks.
#[derive(Clone, Debug)]
pub enum EntryFilter {
    /// Case-sensitive name suffix.
    Suffix(String),
    Pattern(Regex),
}

impl Default for EntryFilter {
    fn default() -> Self {
        Self::Suffix(DEFAULT_AUDIO_SUFFIX.to_string())
    }
}

impl EntryFilter {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Suffix(suffix) => name.ends_with(suffix.as_str()),
            Self::Pattern(re) => re.is_match(name),
        }
    }
}

impl fmt::Display for EntryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Suffix(suffix) => write!(f, "*{suffix}"),
            Self::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

/// Compression applied to entries written to the output archive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    Deflated,
    Stored,
}

impl Compression {
    pub(crate) fn method(self) -> zip::CompressionMethod {
        match self {
            Self::Deflated => zip::CompressionMethod::Deflated,
            Self::Stored => zip::CompressionMethod::Stored,
        }
    }
}

#[derive(Clone)]
pub struct TranscodeOptions {
    pub filter: EntryFilter,
    pub destination_prefix: String,
    pub chunk_size: usize,
    pub compression: Compression,
    pub sync: bool,
    pub on_progress: Option<ProgressCallback>,
}

impl Default for TranscodeOptions {
    fn default() -> Self {
        Self {
            filter: EntryFilter::default(),
            destination_prefix: DEFAULT_DESTINATION_PREFIX.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            compression: Compression::default(),
            sync: false,
            on_progress: None,
        }
    }
}

impl fmt::Debug for TranscodeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscodeOptions")
            .field("filter", &self.filter)
            .field("destination_prefix", &self.destination_prefix)
            .field("chunk_size", &self.chunk_size)
            .field("compression", &self.compression)
            .field("sync", &self.sync)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

impl TranscodeOptions {
    pub fn filter(mut self, filter: EntryFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn audio_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.filter = EntryFilter::Suffix(suffix.into());
        self
    }

    pub fn destination_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.destination_prefix = prefix.into();
        self
    }

    /// Copy buffer size. Zero is treated as one byte.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// fsync the staged output before it is moved into place.
    pub fn sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    pub(crate) fn emit(&self, event: ProgressEvent) {
        if let Some(ref callback) = self.on_progress {
            callback(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn options_default() {
        let options = TranscodeOptions::default();
        assert!(matches!(options.filter, EntryFilter::Suffix(ref s) if s == ".ogg"));
        assert_eq!(options.destination_prefix, "audio/music/");
        assert_eq!(options.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(options.compression, Compression::Deflated);
        assert!(!options.sync);
        assert!(options.on_progress.is_none());
    }

    #[test]
    fn options_builder_pattern() {
        let options = TranscodeOptions::default()
            .audio_suffix(".flac")
            .destination_prefix("sfx/")
            .chunk_size(0)
            .compression(Compression::Stored)
            .sync(true);

        assert!(options.filter.matches("track.flac"));
        assert_eq!(options.destination_prefix, "sfx/");
        assert_eq!(options.chunk_size, 1);
        assert_eq!(options.compression, Compression::Stored);
        assert!(options.sync);
    }

    #[test]
    fn suffix_filter_is_case_sensitive() {
        let filter = EntryFilter::default();
        assert!(filter.matches("01 Song.ogg"));
        assert!(!filter.matches("01 Song.OGG"));
        assert!(!filter.matches("cover.jpg"));
        assert!(!filter.matches("ogg"));
    }

    #[test]
    fn pattern_filter() {
        let filter = EntryFilter::Pattern(Regex::new(r"(?i)\.ogg$").unwrap());
        assert!(filter.matches("01 Song.OGG"));
        assert!(!filter.matches("01 Song.ogg.txt"));
        assert_eq!(filter.to_string(), r"/(?i)\.ogg$/");
    }

    #[test]
    fn emit_forwards_to_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let options = TranscodeOptions::default().on_progress(Arc::new(move |event| {
            sink.lock().unwrap().push(event);
        }));

        options.emit(ProgressEvent::EntryProcessed(0));
        options.emit(ProgressEvent::Completed);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![ProgressEvent::EntryProcessed(0), ProgressEvent::Completed]
        );
    }

    #[test]
    fn emit_without_callback_is_noop() {
        TranscodeOptions::default().emit(ProgressEvent::Completed);
    }
}
