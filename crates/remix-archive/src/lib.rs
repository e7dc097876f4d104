//! Streaming archive transcoding for game mod packaging.
//!
//! # Architecture
//!
//! - `format.rs` - Input container detection
//! - `sanitize.rs` - Entry name sanitization
//! - `staging.rs` - Output staged next to its destination, committed on success
//! - `payload.rs` - Configuration payloads injected into the output
//! - `transcode/` - Entry sources and the transcoding driver
//! - `entry.rs` - Entry metadata and the run report

pub use entry::{ArchiveEntry, TrackEntry, TranscodeReport};
pub use error::{Error, FailureKind, Result};
pub use options::{Compression, EntryFilter, ProgressCallback, ProgressEvent, TranscodeOptions};
pub use payload::{ConfigPayload, LoadError, PayloadProvider, XmlFragment};
pub use sanitize::{SanitizedName, sanitize_name};
pub use staging::StagedOutput;
pub use transcode::{PHASE_BUILDING_METADATA, TranscodeResult, transcode, transcode_with_source};

pub mod entry;
mod error;
pub mod format;
pub mod options;
pub mod payload;
mod sanitize;
mod staging;
pub mod transcode;
