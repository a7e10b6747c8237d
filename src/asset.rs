use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::app_config::AssetConfig;
use crate::directory::EpisodeRef;
use crate::errors::AssetError;

// @module: Remote transcript file retrieval

/// Placeholder replaced by the episode slug in asset URL templates
pub const EPISODE_PLACEHOLDER: &str = "{episode}";

/// Source of the raw captions file attached to an episode
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Fetch the raw bytes of the episode's transcript file
    async fn fetch_transcript(&self, episode: &EpisodeRef) -> Result<Vec<u8>, AssetError>;
}

/// Expand an asset URL template for one episode
pub fn expand_template(template: &str, episode: &EpisodeRef) -> String {
    template.replace(EPISODE_PLACEHOLDER, &episode.slug)
}

/// Fetches transcript files over HTTP from a URL template
pub struct HttpAssetFetcher {
    /// HTTP client for asset requests
    client: Client,
    /// URL template, `None` when no asset is assigned
    url_template: Option<String>,
}

impl HttpAssetFetcher {
    pub fn new(config: &AssetConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            url_template: config.transcript_url_template.clone(),
        }
    }

    /// URL of the episode's transcript file, if an asset is assigned
    pub fn asset_url(&self, episode: &EpisodeRef) -> Option<String> {
        self.url_template
            .as_deref()
            .map(|template| expand_template(template, episode))
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch_transcript(&self, episode: &EpisodeRef) -> Result<Vec<u8>, AssetError> {
        let url = self.asset_url(episode).ok_or(AssetError::NotAssigned)?;
        debug!("Fetching transcript asset {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AssetError::Transport(format!("Failed to fetch {}: {}", url, e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AssetError::NotFound(url));
        }
        if !status.is_success() {
            error!("Transcript asset request failed ({}): {}", status, url);
            return Err(AssetError::Transport(format!(
                "Transcript asset request failed ({}): {}",
                status, url
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AssetError::Transport(format!("Failed to read {}: {}", url, e)))?;

        Ok(bytes.to_vec())
    }
}
