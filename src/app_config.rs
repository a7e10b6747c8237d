use anyhow::{Context, Result, anyhow};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::asset::EPISODE_PLACEHOLDER;

/// Application configuration module
/// This module handles loading, validating and saving the configuration
/// stored in `conf.json`.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// SQLite file, platform data directory when unset
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Public site settings
    #[serde(default)]
    pub site: SiteConfig,

    /// Remote transcript asset settings
    #[serde(default)]
    pub assets: AssetConfig,

    /// Feed announcement settings
    #[serde(default)]
    pub feed: FeedConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Public site settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SiteConfig {
    // @field: Prefix of every episode permalink
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Where the transcript file of an episode can be fetched from
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AssetConfig {
    // @field: URL template containing `{episode}`, none means no asset assigned
    #[serde(default)]
    pub transcript_url_template: Option<String>,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            transcript_url_template: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Feed announcement settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct FeedConfig {
    #[serde(default)]
    pub transcripts: FeedTranscripts,
}

/// Which transcript links an episode feed item carries
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeedTranscripts {
    // @mode: No transcript links
    None,
    // @mode: Links to the rendered webvtt and podcast index documents
    #[default]
    Generated,
    // @mode: Link to an external file, URL template containing `{episode}`
    Asset(String),
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn validate_template(name: &str, template: &str) -> Result<()> {
    if !template.contains(EPISODE_PLACEHOLDER) {
        return Err(anyhow!("{} must contain {}: {}", name, EPISODE_PLACEHOLDER, template));
    }
    Ok(())
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.site.base_url)
            .with_context(|| format!("Invalid site base URL: {}", self.site.base_url))?;

        if let Some(template) = &self.assets.transcript_url_template {
            validate_template("Transcript asset URL template", template)?;
        }

        if self.assets.timeout_secs == 0 {
            return Err(anyhow!("Asset timeout must be greater than zero"));
        }

        if let FeedTranscripts::Asset(template) = &self.feed.transcripts {
            validate_template("Feed transcript URL template", template)?;
        }

        Ok(())
    }

    /// Load the configuration file, writing a default one when it is missing
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;

            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }
}
