//! Configuration for gem-manifest

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::edit::QuoteStyle;
use crate::file_types::ManifestKind;

/// Default indentation unit (two spaces, as in most Ruby code)
const DEFAULT_INDENT: &str = "  ";

/// Directory under the platform config dir holding `config.toml`
const CONFIG_DIR_NAME: &str = "gem-manifest";

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Formatting of inserted and rewritten declarations
    pub formatting: FormattingConfig,
}

/// Formatting configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FormattingConfig {
    /// Quote style used in a Gemfile when nothing in the file decides
    pub gemfile_quote: QuoteStyle,
    /// Quote style used in a gemspec when nothing in the file decides
    pub gemspec_quote: QuoteStyle,
    /// One indentation level
    pub indent: String,
}

impl Default for FormattingConfig {
    fn default() -> Self {
        Self {
            gemfile_quote: QuoteStyle::Single,
            gemspec_quote: QuoteStyle::Double,
            indent: DEFAULT_INDENT.to_string(),
        }
    }
}

impl FormattingConfig {
    pub fn default_quote(&self, kind: ManifestKind) -> QuoteStyle {
        match kind {
            ManifestKind::Gemfile => self.gemfile_quote,
            ManifestKind::Gemspec => self.gemspec_quote,
        }
    }
}

impl Config {
    /// Parse configuration from a JSON options object
    pub fn from_init_options(options: Option<serde_json::Value>) -> Self {
        match options {
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid configuration: {}", e);
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Default location of the user configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join("config.toml"))
    }

    /// Load the user configuration if there is one, defaults otherwise
    pub fn discover() -> Self {
        let Some(path) = Self::default_path().filter(|p| p.is_file()) else {
            return Self::default();
        };

        match Self::load(&path) {
            Ok(config) => {
                tracing::debug!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Ignoring configuration: {:#}", e);
                Self::default()
            }
        }
    }

    pub fn default_quote(&self, kind: ManifestKind) -> QuoteStyle {
        self.formatting.default_quote(kind)
    }
}
