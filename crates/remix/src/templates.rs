use std::fs;

use remix_archive::{ConfigPayload, LoadError, PayloadProvider, XmlFragment};
use tracing::debug;

use crate::config::{METADATA_DESTINATION, PayloadConfig, SOUNDS_DESTINATION};

const APPEND_SOUNDS_XML: &str = include_str!("../assets/appendSounds.xml");
const METADATA_XML: &str = include_str!("../assets/metadata.xml");

fn builtin(destination: &str) -> Option<&'static str> {
    match destination {
        SOUNDS_DESTINATION => Some(APPEND_SOUNDS_XML),
        METADATA_DESTINATION => Some(METADATA_XML),
        _ => None,
    }
}

/// Loads the configured XML templates, falling back to the built-in ones.
pub struct TemplateProvider {
    payloads: Vec<PayloadConfig>,
}

impl TemplateProvider {
    pub fn new(payloads: Vec<PayloadConfig>) -> Self {
        Self { payloads }
    }

    fn load_one(config: &PayloadConfig) -> Result<XmlFragment, LoadError> {
        let text = match config.source {
            Some(ref path) => fs::read_to_string(path).map_err(|source| LoadError::Read {
                path: path.clone(),
                source,
            })?,
            None => builtin(&config.destination)
                .ok_or_else(|| LoadError::Malformed {
                    destination: config.destination.clone(),
                    reason: "no template source configured".to_string(),
                })?
                .to_string(),
        };
        debug!(destination = %config.destination, "loaded template");
        XmlFragment::parse(config.destination.clone(), &text, &config.strip_attributes)
    }
}

impl PayloadProvider for TemplateProvider {
    fn load(&self) -> Result<Vec<Box<dyn ConfigPayload>>, LoadError> {
        self.payloads
            .iter()
            .map(|config| Self::load_one(config).map(|p| Box::new(p) as Box<dyn ConfigPayload>))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RemixConfig;
    use std::path::PathBuf;

    #[test]
    fn builtin_templates_load() {
        let provider = TemplateProvider::new(RemixConfig::default().payloads);
        let payloads = provider.load().unwrap();

        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0].destination(), SOUNDS_DESTINATION);
        assert_eq!(payloads[1].destination(), METADATA_DESTINATION);

        let mut sounds = Vec::new();
        payloads[0].render(&mut sounds).unwrap();
        let sounds = String::from_utf8(sounds).unwrap();
        assert!(sounds.starts_with("<music>"));
        assert!(!sounds.contains("<?xml"));
        assert!(sounds.contains("<mod:findLike"));

        let mut metadata = Vec::new();
        payloads[1].render(&mut metadata).unwrap();
        assert!(metadata.starts_with(b"<metadata>"));
    }

    #[test]
    fn template_file_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blueprints.xml");
        fs::write(&path, "<?xml version=\"1.0\"?>\n<blueprints/>").unwrap();

        let provider = TemplateProvider::new(vec![PayloadConfig {
            destination: "data/blueprints.xml.append".to_string(),
            source: Some(path),
            strip_attributes: Vec::new(),
        }]);
        let payloads = provider.load().unwrap();

        let mut out = Vec::new();
        payloads[0].render(&mut out).unwrap();
        assert_eq!(out, b"<blueprints/>");
    }

    #[test]
    fn builtin_sounds_template_is_marked_placeholder() {
        let provider = TemplateProvider::new(RemixConfig::default().payloads);
        let payloads = provider.load().unwrap();

        let mut sounds = Vec::new();
        payloads[0].render(&mut sounds).unwrap();
        let sounds = String::from_utf8(sounds).unwrap();
        assert!(sounds.contains("<!-- Placeholder"));
        assert!(!sounds.contains("xmlns:mod"));
    }

    #[test]
    fn malformed_template_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.xml");
        fs::write(&path, "<metadata><title>x</metadata>").unwrap();

        let provider = TemplateProvider::new(vec![PayloadConfig {
            destination: METADATA_DESTINATION.to_string(),
            source: Some(path),
            strip_attributes: Vec::new(),
        }]);
        assert!(matches!(
            provider.load(),
            Err(LoadError::Malformed { ref destination, .. }) if destination == METADATA_DESTINATION
        ));
    }

    #[test]
    fn missing_template_file_fails() {
        let provider = TemplateProvider::new(vec![PayloadConfig {
            destination: METADATA_DESTINATION.to_string(),
            source: Some(PathBuf::from("/no/such/metadata.xml")),
            strip_attributes: Vec::new(),
        }]);
        assert!(matches!(provider.load(), Err(LoadError::Read { .. })));
    }

    #[test]
    fn unknown_destination_without_source_fails() {
        let provider = TemplateProvider::new(vec![PayloadConfig {
            destination: "data/unknown.xml".to_string(),
            source: None,
            strip_attributes: Vec::new(),
        }]);
        assert!(matches!(provider.load(), Err(LoadError::Malformed { .. })));
    }
}
