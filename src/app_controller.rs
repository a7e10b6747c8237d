use anyhow::Context;
use log::info;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use url::Url;

use crate::app_config::Config;
use crate::asset::HttpAssetFetcher;
use crate::backup::{self, TranscriptExport};
use crate::database::{DatabaseConnection, DatabaseStats, Repository};
use crate::directory::{ContributorDirectory, ContributorRef, EpisodeDirectory, EpisodeRef};
use crate::errors::AppError;
use crate::import::{ImportPipeline, ImportSummary};
use crate::links::{LinkBuilder, TranscriptLink};
use crate::render::{RenderedTranscript, TranscriptFormat, TranscriptRenderer};
use crate::voice::VoiceResolver;

// @module: Application controller wiring storage, import and rendering

/// A voice label of an episode and the contributor it resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceEntry {
    pub voice: String,
    pub contributor: Option<ContributorRef>,
}

/// Every public URL of an episode's transcript
#[derive(Debug, Clone)]
pub struct EpisodeLinks {
    pub permalink: Url,
    pub formats: Vec<(TranscriptFormat, Url)>,
    pub feed: Vec<TranscriptLink>,
    pub player: Option<Url>,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    repo: Repository,
    pipeline: ImportPipeline,
    renderer: TranscriptRenderer,
    resolver: VoiceResolver,
    links: LinkBuilder,
    fetcher: HttpAssetFetcher,
}

impl Controller {
    /// Create a controller backed by an in-memory database
    pub fn new_for_test() -> Result<Self, AppError> {
        Self::with_repository(Config::default(), Repository::new_in_memory()?)
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        let db = match &config.database_path {
            Some(path) => DatabaseConnection::new(path),
            None => DatabaseConnection::new_default(),
        }
        .context("Failed to open transcript database")?;

        Self::with_repository(config, Repository::new(db))
    }

    pub fn with_repository(config: Config, repo: Repository) -> Result<Self, AppError> {
        config
            .validate()
            .map_err(|e| AppError::Config(format!("{:#}", e)))?;

        let links = LinkBuilder::new(&config.site, config.feed.transcripts.clone())
            .map_err(|e| AppError::Config(e.to_string()))?;
        let contributors: Arc<dyn ContributorDirectory> = Arc::new(repo.clone());
        let resolver = VoiceResolver::new(repo.clone(), contributors.clone());

        Ok(Self {
            pipeline: ImportPipeline::new(repo.clone(), contributors),
            renderer: TranscriptRenderer::new(repo.clone(), resolver.clone()),
            fetcher: HttpAssetFetcher::new(&config.assets),
            resolver,
            links,
            repo,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    async fn episode(&self, slug: &str) -> Result<EpisodeRef, AppError> {
        self.repo
            .find_episode(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Episode '{}'", slug)))
    }

    // =========================================================================
    // Registry
    // =========================================================================

    pub async fn add_episode(&self, slug: &str) -> Result<EpisodeRef, AppError> {
        let episode = self.repo.create_episode(slug).await?;
        info!("Registered episode '{}'", episode.slug);
        Ok(episode)
    }

    /// Remove an episode together with its transcript and voice assignments
    pub async fn delete_episode(&self, slug: &str) -> Result<(), AppError> {
        let episode = self.episode(slug).await?;
        self.repo.delete_episode(episode.id).await?;
        info!("Deleted episode '{}'", slug);
        Ok(())
    }

    pub async fn add_contributor(
        &self,
        identifier: &str,
        display_name: Option<&str>,
    ) -> Result<ContributorRef, AppError> {
        let contributor = self.repo.create_contributor(identifier, display_name).await?;
        info!("Registered contributor '{}'", contributor.label());
        Ok(contributor)
    }

    pub async fn list_contributors(&self) -> Result<Vec<ContributorRef>, AppError> {
        Ok(self.repo.list_contributors().await?)
    }

    // =========================================================================
    // Import
    // =========================================================================

    /// Import a local captions file
    pub async fn import_file(&self, slug: &str, path: &Path) -> Result<ImportSummary, AppError> {
        let episode = self.episode(slug).await?;
        let bytes = std::fs::read(path)
            .map_err(|e| AppError::File(format!("Failed to read {}: {}", path.display(), e)))?;

        Ok(self.pipeline.import(episode.id, &bytes).await?)
    }

    /// Import the episode's remote transcript asset
    pub async fn import_asset(&self, slug: &str) -> Result<ImportSummary, AppError> {
        let episode = self.episode(slug).await?;
        Ok(self.pipeline.import_from_asset(&episode, &self.fetcher).await?)
    }

    /// Re-import after an episode asset changed, `None` for non-transcript files
    pub async fn asset_changed(
        &self,
        slug: &str,
        extension: &str,
    ) -> Result<Option<ImportSummary>, AppError> {
        let episode = self.episode(slug).await?;
        Ok(self
            .pipeline
            .handle_changed_asset(&episode, extension, &self.fetcher)
            .await?)
    }

    // =========================================================================
    // Rendering and Voices
    // =========================================================================

    pub async fn render(
        &self,
        slug: &str,
        format: TranscriptFormat,
    ) -> Result<RenderedTranscript, AppError> {
        let episode = self.episode(slug).await?;
        Ok(self.renderer.render(episode.id, format).await?)
    }

    /// Voices found in the transcript or the assignment table, with their contributor
    pub async fn voices(&self, slug: &str) -> Result<Vec<VoiceEntry>, AppError> {
        let episode = self.episode(slug).await?;
        let stored = self.repo.transcript_snapshot(episode.id).await?;
        let resolved = self.resolver.voice_map(&stored.assignments).await?;

        let labels: BTreeSet<String> = crate::cue::distinct_voices(&stored.cues)
            .into_iter()
            .chain(stored.assignments.into_iter().map(|assignment| assignment.voice))
            .collect();

        Ok(labels
            .into_iter()
            .map(|voice| VoiceEntry {
                contributor: resolved.get(&voice).cloned(),
                voice,
            })
            .collect())
    }

    /// Map a voice label to a contributor by hand, replacing any earlier mapping
    pub async fn assign_voice(
        &self,
        slug: &str,
        voice: &str,
        identifier: &str,
    ) -> Result<ContributorRef, AppError> {
        let episode = self.episode(slug).await?;
        let contributor = self
            .repo
            .find_by_identifier(identifier)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Contributor '{}'", identifier)))?;

        self.repo
            .set_voice_assignment(episode.id, voice, contributor.id)
            .await?;
        info!("Assigned voice '{}' of '{}' to {}", voice, slug, contributor.label());
        Ok(contributor)
    }

    pub async fn links(&self, slug: &str) -> Result<EpisodeLinks, AppError> {
        let episode = self.episode(slug).await?;
        let has_cues = self.repo.has_transcript(episode.id).await?;

        let formats = TranscriptFormat::ALL
            .into_iter()
            .map(|format| -> anyhow::Result<(TranscriptFormat, Url)> {
                Ok((format, self.links.transcript_url(&episode, format)?))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(EpisodeLinks {
            permalink: self.links.permalink(&episode)?,
            formats,
            feed: self.links.feed_links(&episode, has_cues)?,
            player: self.links.player_transcript_url(&episode, has_cues)?,
        })
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    pub async fn export(&self, path: &Path) -> Result<TranscriptExport, AppError> {
        Ok(backup::export_to_file(&self.repo, path).await?)
    }

    pub async fn restore(&self, path: &Path) -> Result<TranscriptExport, AppError> {
        Ok(backup::restore_from_file(&self.repo, path).await?)
    }

    pub fn stats(&self) -> Result<DatabaseStats, AppError> {
        Ok(self.repo.connection().stats()?)
    }
}
