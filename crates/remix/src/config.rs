use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use regex::Regex;
use remix_archive::{Compression, EntryFilter, TranscodeOptions};
use serde::{Deserialize, Serialize};

pub const SOUNDS_DESTINATION: &str = "data/sounds.xml.append";
pub const METADATA_DESTINATION: &str = "mod-appendix/metadata.xml";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionSetting {
    #[default]
    Deflated,
    Stored,
}

impl From<CompressionSetting> for Compression {
    fn from(setting: CompressionSetting) -> Self {
        match setting {
            CompressionSetting::Deflated => Compression::Deflated,
            CompressionSetting::Stored => Compression::Stored,
        }
    }
}

/// One configuration document injected into the mod.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadConfig {
    /// Entry name inside the mod archive.
    pub destination: String,
    /// Template file. The built-in template for `destination` is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    /// Attributes removed from the template's root element.
    #[serde(default)]
    pub strip_attributes: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemixConfig {
    pub output_name: String,
    pub audio_suffix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_pattern: Option<String>,
    pub destination_prefix: String,
    /// Number of entries in the album, used to size the progress bar.
    pub expected_entries: u64,
    pub compression: CompressionSetting,
    pub sync: bool,
    pub payloads: Vec<PayloadConfig>,
}

impl Default for RemixConfig {
    fn default() -> Self {
        Self {
            output_name: "744remix.ftl".to_string(),
            audio_suffix: remix_archive::options::DEFAULT_AUDIO_SUFFIX.to_string(),
            audio_pattern: None,
            destination_prefix: remix_archive::options::DEFAULT_DESTINATION_PREFIX.to_string(),
            expected_entries: 27,
            compression: CompressionSetting::default(),
            sync: true,
            payloads: vec![
                PayloadConfig {
                    destination: SOUNDS_DESTINATION.to_string(),
                    source: None,
                    strip_attributes: vec!["xmlns:mod".to_string()],
                },
                PayloadConfig {
                    destination: METADATA_DESTINATION.to_string(),
                    source: None,
                    strip_attributes: Vec::new(),
                },
            ],
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Figment(#[from] Box<figment::Error>),

    #[error("invalid audio_pattern '{pattern}': {source}")]
    Pattern { pattern: String, source: regex::Error },
}

impl RemixConfig {
    /// Built-in defaults, overlaid with the TOML file at `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut fig = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            fig = fig.merge(Toml::file_exact(path));
        }
        fig.extract().map_err(|e| ConfigError::Figment(Box::new(e)))
    }

    pub fn filter(&self) -> Result<EntryFilter, ConfigError> {
        match self.audio_pattern {
            Some(ref pattern) => Regex::new(pattern)
                .map(EntryFilter::Pattern)
                .map_err(|source| ConfigError::Pattern {
                    pattern: pattern.clone(),
                    source,
                }),
            None => Ok(EntryFilter::Suffix(self.audio_suffix.clone())),
        }
    }

    pub fn transcode_options(&self) -> Result<TranscodeOptions, ConfigError> {
        Ok(TranscodeOptions::default()
            .filter(self.filter()?)
            .destination_prefix(self.destination_prefix.clone())
            .compression(self.compression.into())
            .sync(self.sync))
    }

    /// Where the mod is written when no output path is given: next to the album.
    pub fn default_output(&self, input: &Path) -> PathBuf {
        input.with_file_name(&self.output_name)
    }
}
