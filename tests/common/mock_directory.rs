/*!
 * Mock collaborator implementations for testing
 *
 * Stand-ins for the contributor directory and the asset fetcher so tests
 * control lookups and remote files without a host application or network.
 */

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use castscript::asset::AssetFetcher;
use castscript::{AssetError, ContributorDirectory, ContributorRef, EpisodeRef};

/// Contributor directory backed by a fixed list
#[derive(Debug, Default)]
pub struct MockContributors {
    contributors: Vec<ContributorRef>,
    /// Identifiers looked up so far
    pub lookups: Mutex<Vec<String>>,
}

impl MockContributors {
    pub fn new(contributors: Vec<ContributorRef>) -> Self {
        Self {
            contributors,
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn single(id: i64, identifier: &str, display_name: &str) -> Self {
        Self::new(vec![ContributorRef {
            id,
            identifier: identifier.to_string(),
            display_name: Some(display_name.to_string()),
        }])
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.lock().unwrap().len()
    }
}

#[async_trait]
impl ContributorDirectory for MockContributors {
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<ContributorRef>> {
        self.lookups.lock().unwrap().push(identifier.to_string());
        Ok(self
            .contributors
            .iter()
            .find(|contributor| contributor.identifier == identifier)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ContributorRef>> {
        Ok(self.contributors.iter().find(|contributor| contributor.id == id).cloned())
    }
}

/// Canned asset responses keyed by episode slug
#[derive(Debug, Clone)]
pub enum MockAsset {
    Bytes(Vec<u8>),
    Missing,
    Failing(String),
}

#[derive(Debug, Default)]
pub struct MockAssetFetcher {
    assets: HashMap<String, MockAsset>,
    /// Number of fetches performed
    pub fetches: Mutex<usize>,
}

impl MockAssetFetcher {
    pub fn with_asset(slug: &str, asset: MockAsset) -> Self {
        let mut assets = HashMap::new();
        assets.insert(slug.to_string(), asset);
        Self {
            assets,
            fetches: Mutex::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        *self.fetches.lock().unwrap()
    }
}

#[async_trait]
impl AssetFetcher for MockAssetFetcher {
    async fn fetch_transcript(&self, episode: &EpisodeRef) -> Result<Vec<u8>, AssetError> {
        *self.fetches.lock().unwrap() += 1;
        match self.assets.get(&episode.slug) {
            Some(MockAsset::Bytes(bytes)) => Ok(bytes.clone()),
            Some(MockAsset::Missing) => Err(AssetError::NotFound(episode.slug.clone())),
            Some(MockAsset::Failing(message)) => Err(AssetError::Transport(message.clone())),
            None => Err(AssetError::NotAssigned),
        }
    }
}
