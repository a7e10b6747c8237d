/*!
 * Database entity models and DTOs.
 *
 * These structures map directly to database tables and provide
 * type-safe access to persisted data.
 */

use serde::{Deserialize, Serialize};

use crate::cue::Cue;

/// Stored cue row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CueRecord {
    /// Database ID
    pub id: i64,
    /// Owning episode
    pub episode_id: i64,
    /// Insertion order within the episode
    pub position: i64,
    /// Start time in milliseconds
    pub start_ms: i64,
    /// End time in milliseconds
    pub end_ms: i64,
    /// Raw voice label
    pub voice: String,
    /// Cue payload
    pub content: String,
}

impl From<CueRecord> for Cue {
    fn from(record: CueRecord) -> Self {
        Cue {
            episode_id: record.episode_id,
            start_ms: record.start_ms,
            end_ms: record.end_ms,
            voice: record.voice,
            content: record.content,
        }
    }
}

/// Sticky mapping of a raw voice label to a contributor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceAssignmentRecord {
    /// Database ID
    pub id: i64,
    /// Owning episode
    pub episode_id: i64,
    /// Raw voice label, unique per episode
    pub voice: String,
    /// Assigned contributor
    pub contributor_id: i64,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
}

impl VoiceAssignmentRecord {
    /// Create a new assignment (without database ID)
    pub fn new(episode_id: i64, voice: String, contributor_id: i64) -> Self {
        Self {
            id: 0, // Will be assigned by database
            episode_id,
            voice,
            contributor_id,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Summary of the last successful import for an episode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub episode_id: i64,
    /// SHA256 of the imported source bytes
    pub source_hash: String,
    pub cue_count: i64,
    pub imported_at: String,
}
