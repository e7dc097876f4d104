//! Configuration payloads injected into the output archive.
//!
//! Payloads are opaque to the transcoder: it asks each one for its
//! destination entry name and lets it render itself into the open entry.

use std::io::{self, Write};
use std::path::PathBuf;

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read template '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("template for '{destination}' is malformed: {reason}")]
    Malformed { destination: String, reason: String },
}

/// A fixed document written verbatim to a fixed entry of the output archive.
pub trait ConfigPayload: Send + Sync {
    /// Entry name inside the output archive.
    fn destination(&self) -> &str;

    fn render(&self, writer: &mut dyn Write) -> io::Result<()>;
}

/// Supplies the payloads for a process. Called once at startup; a failure
/// here means no run can produce a valid output.
pub trait PayloadProvider {
    fn load(&self) -> Result<Vec<Box<dyn ConfigPayload>>, LoadError>;
}

/// An XML document stored as a content fragment, without its `<?xml ?>`
/// declaration, the way the mod loader expects it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmlFragment {
    destination: String,
    body: String,
}

impl XmlFragment {
    /// Prepare `source` for output.
    ///
    /// The document must be well-formed. The byte-order mark, the XML
    /// declaration and whitespace outside the root element are dropped, and
    /// each attribute named in `strip_attributes` is removed from the root
    /// element. Everything else is written back as read.
    pub fn parse(
        destination: impl Into<String>,
        source: &str,
        strip_attributes: &[String],
    ) -> Result<Self, LoadError> {
        let destination = destination.into();
        let malformed = |reason: String| LoadError::Malformed {
            destination: destination.clone(),
            reason,
        };

        let mut reader = Reader::from_str(source.trim_start_matches('\u{feff}'));
        let mut writer = Writer::new(Vec::new());
        let mut depth = 0usize;
        let mut seen_root = false;

        loop {
            let event = match reader.read_event() {
                Ok(Event::Eof) => break,
                Ok(event) => event,
                Err(e) => {
                    return Err(malformed(format!(
                        "XML parse error at position {}: {e}",
                        reader.buffer_position()
                    )));
                }
            };

            let event = match event {
                Event::Decl(_) => continue,
                Event::Text(ref text) if depth == 0 => {
                    if text.iter().all(u8::is_ascii_whitespace) {
                        continue;
                    }
                    return Err(malformed("text outside the root element".to_string()));
                }
                Event::Start(start) | Event::Empty(start) if depth == 0 && seen_root => {
                    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                    return Err(malformed(format!("second root element <{name}>")));
                }
                Event::Start(start) if depth == 0 => {
                    seen_root = true;
                    depth += 1;
                    Event::Start(without_attributes(&start, strip_attributes).map_err(&malformed)?)
                }
                Event::Empty(start) if depth == 0 => {
                    seen_root = true;
                    Event::Empty(without_attributes(&start, strip_attributes).map_err(&malformed)?)
                }
                Event::Start(start) => {
                    depth += 1;
                    Event::Start(start)
                }
                Event::End(end) => {
                    depth = depth.checked_sub(1).ok_or_else(|| {
                        let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                        malformed(format!("unmatched end tag </{name}>"))
                    })?;
                    Event::End(end)
                }
                other => other,
            };

            writer
                .write_event(event)
                .map_err(|e| malformed(e.to_string()))?;
        }

        if !seen_root {
            return Err(malformed("no root element".to_string()));
        }
        if depth != 0 {
            return Err(malformed("root element is not closed".to_string()));
        }

        let body = String::from_utf8(writer.into_inner()).map_err(|e| malformed(e.to_string()))?;
        Ok(Self { destination, body })
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

impl ConfigPayload for XmlFragment {
    fn destination(&self) -> &str {
        &self.destination
    }

    fn render(&self, writer: &mut dyn Write) -> io::Result<()> {
        writer.write_all(self.body.as_bytes())
    }
}

/// Copy of `start` without the attributes named in `strip`. Attribute values
/// are carried over in their escaped form.
fn without_attributes(start: &BytesStart<'_>, strip: &[String]) -> Result<BytesStart<'static>, String> {
    let mut root = start.clone().into_owned();
    root.clear_attributes();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| e.to_string())?;
        if strip.iter().any(|name| name.as_bytes() == attribute.key.as_ref()) {
            continue;
        }
        root.push_attribute(attribute);
    }
    Ok(root)
}
