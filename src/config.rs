//! Writer configuration, optionally loaded from a TOML file.
//!
//! The config file is optional: a missing file yields `WriterConfig::default()`.
//! Unknown keys are silently ignored by serde, though we log a warning when
//! the file contains potential typos.
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::content::Attribute;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC-014: Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Settings shared by formatters and feed writers.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
///
/// ```toml
/// use_cdata = false
/// indent = 2
///
/// [namespaces]
/// a10 = "http://www.w3.org/2005/Atom"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Prefix → namespace URI. The empty prefix declares the default namespace.
    pub namespaces: BTreeMap<String, String>,

    /// Write scalar text values as CDATA sections.
    pub use_cdata: bool,

    /// Indentation width in spaces. `None` or `0` writes compact output.
    pub indent: Option<usize>,
}

impl WriterConfig {
    /// SEC-014: Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(WriterConfig::default())`
    /// - Empty file → `Ok(WriterConfig::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // SEC-014: Check file size before reading
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            tracing::debug!("Config is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = ["namespaces", "use_cdata", "indent"];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: WriterConfig = toml::from_str(content)?;
        tracing::info!(
            namespaces = config.namespaces.len(),
            use_cdata = config.use_cdata,
            "Loaded writer configuration"
        );
        Ok(config)
    }

    /// Adds a namespace declaration. An empty prefix declares the default namespace.
    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.insert(prefix.into(), uri.into());
        self
    }

    /// The configured namespaces as `xmlns` / `xmlns:prefix` attributes.
    pub fn known_attributes(&self) -> Vec<Attribute> {
        self.namespaces
            .iter()
            .map(|(prefix, uri)| {
                let name = if prefix.is_empty() {
                    "xmlns".to_string()
                } else {
                    format!("xmlns:{prefix}")
                };
                Attribute::new(name, uri.clone())
            })
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
