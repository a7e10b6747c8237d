/*!
 * Lookup seams for entities owned by the hosting application.
 *
 * Episodes and contributors live outside the transcript core; the core only
 * needs to find them by their external identifier. The SQLite `Repository`
 * provides a default implementation of both traits.
 */

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Reference to an episode
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EpisodeRef {
    /// Foreign key used by cue and voice tables
    pub id: i64,
    /// External identifier, also the permalink path segment
    pub slug: String,
}

/// Reference to a contributor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorRef {
    pub id: i64,
    /// Identifier compared exactly against voice labels
    pub identifier: String,
    pub display_name: Option<String>,
}

impl ContributorRef {
    /// Name shown to listeners; the identifier when no display name is set
    pub fn label(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.identifier,
        }
    }
}

/// Finds episodes by external identifier
#[async_trait]
pub trait EpisodeDirectory: Send + Sync {
    async fn find_episode(&self, slug: &str) -> Result<Option<EpisodeRef>>;
}

/// Finds contributors, read-only
#[async_trait]
pub trait ContributorDirectory: Send + Sync {
    /// Exact, case-sensitive identifier match
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<ContributorRef>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<ContributorRef>>;
}
