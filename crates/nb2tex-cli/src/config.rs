//! Configuration file support for the nb2tex CLI
//!
//! Loads settings from `_nb2tex.toml` configuration file.

use anyhow::{Context, Result};
use nb2tex_core::ConvertOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "_nb2tex.toml";

/// Root configuration structure
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Code listing configuration
    #[serde(skip_serializing_if = "ListingsConfig::is_empty")]
    pub listings: ListingsConfig,
    /// Bibliography configuration
    #[serde(skip_serializing_if = "BibliographyConfig::is_empty")]
    pub bibliography: BibliographyConfig,
    /// Extracted image configuration
    #[serde(skip_serializing_if = "ImagesConfig::is_empty")]
    pub images: ImagesConfig,
    /// Standard preamble configuration
    #[serde(skip_serializing_if = "DocumentConfig::is_empty")]
    pub document: DocumentConfig,
}

/// Code listing configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct ListingsConfig {
    /// Place listings in the text instead of a closing Listings chapter (default: false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline: Option<bool>,
}

impl ListingsConfig {
    fn is_empty(&self) -> bool {
        self.inline.is_none()
    }
}

/// Bibliography configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct BibliographyConfig {
    /// BibTeX style (default: "IEEEtran")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[doc = r"Wrap URLs in \url{} in entries and link text (default: false)"]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_command: Option<bool>,
}

impl BibliographyConfig {
    fn is_empty(&self) -> bool {
        self.style.is_none() && self.url_command.is_none()
    }
}

/// Extracted image configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct ImagesConfig {
    /// Directory for extracted images (default: "./pic/")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

impl ImagesConfig {
    fn is_empty(&self) -> bool {
        self.dir.is_none()
    }
}

/// Standard preamble configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct DocumentConfig {
    /// Document title (default: "Title")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Document author (default: "Author")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl DocumentConfig {
    fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none()
    }
}

impl Config {
    /// Load configuration from a specific file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Try to load configuration from a directory (looks for `_nb2tex.toml`)
    ///
    /// Returns `Ok(None)` if the config file doesn't exist.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Generate JSON schema as a string
    pub fn json_schema_string() -> Result<String> {
        let schema = schemars::schema_for!(Config);
        serde_json::to_string_pretty(&schema).context("Failed to serialize JSON schema")
    }

    /// Serialize configuration to a TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config to TOML")
    }

    /// Create a sample configuration with the built-in defaults for `--init-config`
    pub fn sample() -> Self {
        let defaults = ConvertOptions::default();
        Config {
            listings: ListingsConfig {
                inline: Some(defaults.inline_listings),
            },
            bibliography: BibliographyConfig {
                style: Some(defaults.bib_style),
                url_command: Some(defaults.url_command),
            },
            images: ImagesConfig {
                dir: Some(defaults.image_dir),
            },
            document: DocumentConfig {
                title: Some(defaults.title),
                author: Some(defaults.author),
            },
        }
    }

    /// Conversion options from the file, with built-in defaults for unset keys
    pub fn convert_options(&self) -> ConvertOptions {
        let defaults = ConvertOptions::default();
        ConvertOptions {
            inline_listings: self.listings.inline.unwrap_or(defaults.inline_listings),
            url_command: self.bibliography.url_command.unwrap_or(defaults.url_command),
            bib_style: self.bibliography.style.clone().unwrap_or(defaults.bib_style),
            image_dir: self.images.dir.clone().unwrap_or(defaults.image_dir),
            title: self.document.title.clone().unwrap_or(defaults.title),
            author: self.document.author.clone().unwrap_or(defaults.author),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.listings.inline.is_none());
        assert!(config.bibliography.style.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            [listings]
            inline = true

            [bibliography]
            style = "plain"
            url_command = true

            [images]
            dir = "figures"

            [document]
            title = "Report"
            author = "Team"
            "#,
        )
        .unwrap();

        let options = config.convert_options();
        assert!(options.inline_listings);
        assert!(options.url_command);
        assert_eq!(options.bib_style, "plain");
        assert_eq!(options.image_dir, "figures");
        assert_eq!(options.title, "Report");
        assert_eq!(options.author, "Team");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [bibliography]
            style = "alpha"
            "#,
        )
        .unwrap();

        let options = config.convert_options();
        assert_eq!(options.bib_style, "alpha");
        assert!(!options.url_command);
        assert!(!options.inline_listings);
        assert_eq!(options.image_dir, "./pic/");
        assert_eq!(options.title, "Title");
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result: std::result::Result<Config, _> = toml::from_str(
            r#"
            [listings]
            inline = "yes"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_empty_config() {
        let toml = Config::default().to_toml().unwrap();
        assert!(!toml.contains("[listings]"));
    }

    #[test]
    fn test_serialize_sample_config() {
        let toml = Config::sample().to_toml().unwrap();
        assert!(toml.contains("[bibliography]"));
        assert!(toml.contains("style = \"IEEEtran\""));
        assert!(toml.contains("dir = \"./pic/\""));
    }

    #[test]
    fn test_json_schema_generation() {
        let schema = Config::json_schema_string().unwrap();
        assert!(schema.contains("\"title\""));
        assert!(schema.contains("BibliographyConfig"));
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[document]\nauthor = \"Me\"\n",
        )
        .unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.document.author.as_deref(), Some("Me"));
    }
}
