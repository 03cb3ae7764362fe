//! Site Configuration

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration load failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Deployment settings for the site tooling.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Public origin used for absolute URLs, without a trailing slash.
    pub site_url: String,
    /// Suffix appended to page titles.
    pub title_suffix: String,
    /// Directory that receives build artifacts.
    pub output_dir: PathBuf,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_url: "https://mycompany.com".to_string(),
            title_suffix: "My Company".to_string(),
            output_dir: PathBuf::from("dist"),
        }
    }
}

impl SiteConfig {
    /// Load from a TOML file, falling back to defaults when the file is
    /// absent. Unset keys take their default values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config: SiteConfig = if path.exists() {
            toml::from_str(&fs::read_to_string(path)?)?
        } else {
            Self::default()
        };
        while config.site_url.ends_with('/') {
            config.site_url.pop();
        }
        Ok(config)
    }
}
