//! The transcoding driver.
//!
//! Reads the input archive entry by entry, copies matching audio tracks to
//! `destination_prefix + sanitize(name)` in the output archive, then appends
//! the configuration payloads. The output is staged next to its destination
//! and only moved into place once the archive has been finalized.

use std::collections::HashMap;
use std::io::{self, Read, Seek, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::entry::{TrackEntry, TranscodeReport};
use crate::error::{Error, Result, zip_to_io};
use crate::options::{ProgressEvent, TranscodeOptions};
use crate::payload::ConfigPayload;
use crate::sanitize::SanitizedName;
use crate::staging::StagedOutput;

mod source;

pub use source::{EntrySource, PendingEntry, ZipSource};

/// Label of the phase entered once all tracks are copied.
pub const PHASE_BUILDING_METADATA: &str = "building metadata";

/// Entries at or above this size need zip64 extensions.
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// Outcome of one run: the report on success, the failure otherwise.
pub type TranscodeResult = Result<TranscodeReport>;

/// Transcode the archive at `input` into a new archive at `output`.
///
/// Nothing is left at `output` unless the run succeeds; a pre-existing file
/// there is replaced only on success.
pub fn transcode(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    payloads: &[Box<dyn ConfigPayload>],
    options: &TranscodeOptions,
) -> TranscodeResult {
    let input = input.as_ref();
    let output = output.as_ref();
    info!(input = %input.display(), output = %output.display(), "transcoding archive");

    let mut source = ZipSource::open(input)?;
    let staged = StagedOutput::create(output)?;

    let (staged, mut report) = transcode_with_source(&mut source, staged, payloads, options)?;
    report.output = staged.commit(options.sync)?;

    options.emit(ProgressEvent::Completed);
    info!(
        output = %report.output.display(),
        tracks = report.tracks.len(),
        bytes = report.total_bytes,
        "transcoding complete"
    );
    Ok(report)
}

/// Run the transformation from `source` into a zip written to `writer`.
///
/// Returns the writer after the archive's central directory has been
/// written. Emits every progress event except the final `Completed`, which
/// belongs to whoever persists the writer.
pub fn transcode_with_source<S, W>(
    source: &mut S,
    writer: W,
    payloads: &[Box<dyn ConfigPayload>],
    options: &TranscodeOptions,
) -> Result<(W, TranscodeReport)>
where
    S: EntrySource,
    W: Write + Seek,
{
    let label = source.label().to_path_buf();
    // `output` is filled in by whoever persists the writer.
    let mut report = TranscodeReport::new(PathBuf::new());
    let mut zip = ZipWriter::new(writer);
    let base = SimpleFileOptions::default().compression_method(options.compression.method());

    let last_writer = last_writer_by_name(&source.entry_names(), options);
    let mut buffer = vec![0u8; options.chunk_size.max(1)];
    let mut seen_audio = false;

    while let Some(pending) = source.next_entry() {
        let PendingEntry { entry, mut reader } = pending?;
        options.emit(ProgressEvent::EntryProcessed(entry.index));
        report.entries_seen += 1;

        if !entry.is_audio(&options.filter) {
            debug!(entry = %entry.name, "skipping non-audio entry");
            report.skipped.push(entry.name);
            continue;
        }
        seen_audio = true;

        let target = SanitizedName::new(&entry.name, &options.destination_prefix);
        if last_writer.get(target.as_str()) != Some(&entry.index) {
            warn!(entry = %entry.name, target = %target, "superseded by a later entry with the same name");
            report.superseded.push(entry.name);
            continue;
        }

        let file_options = base.large_file(entry.size >= ZIP64_THRESHOLD);
        zip.start_file(target.as_str(), file_options)
            .map_err(|e| Error::io(format!("creating entry '{target}'"), zip_to_io(e)))?;
        let bytes = copy_entry(&mut reader, &mut zip, &mut buffer, &entry.name, &target)?;
        debug!(entry = %entry.name, target = %target, bytes, "copied track");

        report.total_bytes += bytes;
        report.tracks.push(TrackEntry {
            original_name: target.original,
            target_name: target.resolved,
            bytes,
        });
    }

    if !seen_audio {
        return Err(Error::NoMatchingContent {
            path: label,
            filter: options.filter.to_string(),
        });
    }

    info!(phase = PHASE_BUILDING_METADATA, tracks = report.tracks.len(), "tracks copied");
    options.emit(ProgressEvent::PhaseChanged(PHASE_BUILDING_METADATA.to_string()));

    for payload in payloads {
        write_payload(&mut zip, payload.as_ref(), base)?;
        report.payloads.push(payload.destination().to_string());
    }

    let writer = zip
        .finish()
        .map_err(|e| Error::io(format!("finalizing archive for '{}'", label.display()), zip_to_io(e)))?;
    Ok((writer, report))
}

/// For every sanitized audio name, the index of the last entry producing it.
fn last_writer_by_name(names: &[(String, bool)], options: &TranscodeOptions) -> HashMap<String, usize> {
    names
        .iter()
        .enumerate()
        .filter(|(_, (name, is_directory))| !is_directory && options.filter.matches(name))
        .map(|(index, (name, _))| {
            let target = SanitizedName::new(name, &options.destination_prefix);
            (target.resolved, index)
        })
        .collect()
}

fn copy_entry<R: Read + ?Sized, W: Write>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut [u8],
    name: &str,
    target: &SanitizedName,
) -> Result<u64> {
    let mut total = 0u64;
    loop {
        let n = match reader.read(buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::io(format!("reading entry '{name}'"), e)),
        };
        writer
            .write_all(&buffer[..n])
            .map_err(|e| Error::io(format!("writing entry '{target}'"), e))?;
        total += n as u64;
    }
    Ok(total)
}

fn write_payload<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    payload: &dyn ConfigPayload,
    options: SimpleFileOptions,
) -> Result<()> {
    let name = payload.destination();
    let payload_err = |source| Error::Payload {
        name: name.to_string(),
        source,
    };

    zip.start_file(name, options)
        .map_err(|e| payload_err(zip_to_io(e)))?;
    payload.render(zip).map_err(payload_err)?;
    debug!(payload = name, "wrote configuration payload");
    Ok(())
}
