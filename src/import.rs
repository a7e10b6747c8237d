/*!
 * Transcript import pipeline.
 *
 * Raw bytes go through UTF-8 validation and the WebVTT parser before storage
 * is touched. The cue set is then swapped in one transaction together with
 * the voice assignments discovered for labels that match a contributor
 * identifier. Any failure leaves the stored state of the episode as it was.
 */

use log::{debug, error, info, warn};
use std::sync::Arc;

use crate::asset::AssetFetcher;
use crate::cue::{Cue, distinct_voices};
use crate::database::Repository;
use crate::directory::{ContributorDirectory, EpisodeRef};
use crate::errors::ImportError;
use crate::webvtt;

/// File extension that triggers a re-import when an episode asset changes
pub const TRANSCRIPT_EXTENSION: &str = "vtt";

/// Outcome of a successful import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub episode_id: i64,
    /// Number of cues now stored
    pub cue_count: usize,
    /// Distinct non-empty voice labels of the document
    pub voices: Vec<String>,
    /// Voices that were mapped to a contributor by this import
    pub new_assignments: Vec<String>,
    /// Source bytes are identical to the previous import
    pub unchanged_source: bool,
}

/// Parses captions documents and replaces an episode's cue set
#[derive(Clone)]
pub struct ImportPipeline {
    repo: Repository,
    contributors: Arc<dyn ContributorDirectory>,
}

impl ImportPipeline {
    pub fn new(repo: Repository, contributors: Arc<dyn ContributorDirectory>) -> Self {
        Self { repo, contributors }
    }

    /// Import raw captions bytes for an episode.
    ///
    /// Existing voice assignments are never overwritten, and assignments for
    /// voices absent from the new document are kept.
    pub async fn import(&self, episode_id: i64, bytes: &[u8]) -> Result<ImportSummary, ImportError> {
        if !self.repo.episode_exists(episode_id).await? {
            warn!("Refusing transcript import for unknown episode {}", episode_id);
            return Err(ImportError::NotFound(format!("Episode {}", episode_id)));
        }

        let text = std::str::from_utf8(bytes).map_err(|e| {
            error!("Transcript for episode {} is not valid UTF-8: {}", episode_id, e);
            ImportError::Encoding(e)
        })?;

        let parsed = webvtt::parse(text).map_err(|e| {
            error!("Failed to parse transcript for episode {}: {}", episode_id, e);
            ImportError::Parse(e)
        })?;

        let cues: Vec<Cue> = parsed
            .iter()
            .map(|parsed_cue| Cue::from_parsed(episode_id, parsed_cue))
            .collect();
        let voices = distinct_voices(&cues);

        let source_hash = Repository::hash_source(bytes);
        let unchanged_source = self
            .repo
            .last_import(episode_id)
            .await?
            .is_some_and(|record| record.source_hash == source_hash);
        if unchanged_source {
            debug!("Transcript source of episode {} is unchanged, replacing anyway", episode_id);
        }

        let candidates = self.voice_candidates(episode_id, &voices).await?;
        let outcome = self
            .repo
            .replace_transcript(episode_id, cues, candidates, source_hash)
            .await?;

        info!(
            "Imported {} cues for episode {} ({} voices, {} newly assigned)",
            outcome.cue_count,
            episode_id,
            voices.len(),
            outcome.new_assignments.len()
        );

        Ok(ImportSummary {
            episode_id,
            cue_count: outcome.cue_count,
            voices,
            new_assignments: outcome.new_assignments,
            unchanged_source,
        })
    }

    /// Voices without an assignment whose label matches a contributor
    async fn voice_candidates(
        &self,
        episode_id: i64,
        voices: &[String],
    ) -> Result<Vec<(String, i64)>, ImportError> {
        let assigned: Vec<String> = self
            .repo
            .list_voice_assignments(episode_id)
            .await?
            .into_iter()
            .map(|assignment| assignment.voice)
            .collect();

        let mut candidates = Vec::new();
        for voice in voices.iter().filter(|voice| !assigned.contains(voice)) {
            match self.contributors.find_by_identifier(voice).await? {
                Some(contributor) => candidates.push((voice.clone(), contributor.id)),
                None => debug!("No contributor matches voice '{}'", voice),
            }
        }

        Ok(candidates)
    }

    /// Fetch the episode's transcript asset and import it
    pub async fn import_from_asset(
        &self,
        episode: &EpisodeRef,
        fetcher: &dyn AssetFetcher,
    ) -> Result<ImportSummary, ImportError> {
        let bytes = fetcher.fetch_transcript(episode).await.map_err(|e| {
            warn!("Could not fetch transcript asset for episode '{}': {}", episode.slug, e);
            ImportError::from(e)
        })?;

        self.import(episode.id, &bytes).await
    }

    /// React to a changed episode asset; only `vtt` files are imported
    pub async fn handle_changed_asset(
        &self,
        episode: &EpisodeRef,
        extension: &str,
        fetcher: &dyn AssetFetcher,
    ) -> Result<Option<ImportSummary>, ImportError> {
        if extension != TRANSCRIPT_EXTENSION {
            debug!("Ignoring changed '{}' asset of episode '{}'", extension, episode.slug);
            return Ok(None);
        }

        self.import_from_asset(episode, fetcher).await.map(Some)
    }
}
