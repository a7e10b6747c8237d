use anyhow::Result;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

use crate::database::Repository;
use crate::database::models::VoiceAssignmentRecord;
use crate::directory::{ContributorDirectory, ContributorRef};

// @module: Voice label resolution, read-only

/// Resolved contributors keyed by raw voice label
pub type VoiceMap = HashMap<String, ContributorRef>;

/// Looks up the contributor assigned to a voice label
#[derive(Clone)]
pub struct VoiceResolver {
    repo: Repository,
    contributors: Arc<dyn ContributorDirectory>,
}

impl VoiceResolver {
    pub fn new(repo: Repository, contributors: Arc<dyn ContributorDirectory>) -> Self {
        Self { repo, contributors }
    }

    /// Contributor assigned to `voice` in the episode, if any.
    ///
    /// An assignment pointing at a contributor that no longer exists
    /// resolves to `None`.
    pub async fn resolve(&self, episode_id: i64, voice: &str) -> Result<Option<ContributorRef>> {
        if voice.is_empty() {
            return Ok(None);
        }

        match self.repo.get_voice_assignment(episode_id, voice).await? {
            Some(assignment) => self.contributors.find_by_id(assignment.contributor_id).await,
            None => Ok(None),
        }
    }

    /// Resolve a batch of assignments, skipping stale ones
    pub async fn voice_map(&self, assignments: &[VoiceAssignmentRecord]) -> Result<VoiceMap> {
        let mut voices = VoiceMap::with_capacity(assignments.len());

        for assignment in assignments {
            match self.contributors.find_by_id(assignment.contributor_id).await? {
                Some(contributor) => {
                    voices.insert(assignment.voice.clone(), contributor);
                }
                None => debug!(
                    "Voice '{}' points at missing contributor {}",
                    assignment.voice, assignment.contributor_id
                ),
            }
        }

        Ok(voices)
    }
}
