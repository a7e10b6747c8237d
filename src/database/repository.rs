/*!
 * Repository layer for database operations.
 *
 * This module provides a high-level API for all database operations,
 * abstracting away the SQL details and providing type-safe access.
 */

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use log::debug;
use rusqlite::{Connection, OptionalExtension, params};
use sha2::{Digest, Sha256};

use super::connection::DatabaseConnection;
use super::models::{CueRecord, ImportRecord, VoiceAssignmentRecord};
use crate::cue::Cue;
use crate::directory::{ContributorDirectory, ContributorRef, EpisodeDirectory, EpisodeRef};

/// Result of replacing an episode's transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceOutcome {
    /// Number of cues now stored for the episode
    pub cue_count: usize,
    /// Voices that received a new assignment in this import
    pub new_assignments: Vec<String>,
}

/// Cues and voice assignments read under one lock
#[derive(Debug, Clone, Default)]
pub struct StoredTranscript {
    pub cues: Vec<Cue>,
    pub assignments: Vec<VoiceAssignmentRecord>,
}

/// Full contents of the transcript tables
#[derive(Debug, Clone, Default)]
pub struct TableDump {
    pub cues: Vec<CueRecord>,
    pub assignments: Vec<VoiceAssignmentRecord>,
}

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self> {
        let db = DatabaseConnection::new_default()?;
        Ok(Self::new(db))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// Underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Compute SHA256 hash of raw source bytes
    pub fn hash_source(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        format!("{:x}", hasher.finalize())
    }

    // =========================================================================
    // Episode Operations
    // =========================================================================

    /// Register an episode
    pub async fn create_episode(&self, slug: &str) -> Result<EpisodeRef> {
        let slug = slug.to_string();
        let now = chrono::Utc::now().to_rfc3339();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    "INSERT INTO episodes (slug, created_at) VALUES (?1, ?2)",
                    params![slug, now],
                )?;
                Ok(EpisodeRef {
                    id: conn.last_insert_rowid(),
                    slug,
                })
            })
            .await
    }

    /// Get an episode by its external identifier
    pub async fn find_episode_by_slug(&self, slug: &str) -> Result<Option<EpisodeRef>> {
        let slug = slug.to_string();

        self.db
            .execute_async(move |conn| {
                let episode = conn
                    .query_row(
                        "SELECT id, slug FROM episodes WHERE slug = ?1",
                        [&slug],
                        |row| {
                            Ok(EpisodeRef {
                                id: row.get(0)?,
                                slug: row.get(1)?,
                            })
                        },
                    )
                    .optional()?;
                Ok(episode)
            })
            .await
    }

    pub async fn episode_exists(&self, episode_id: i64) -> Result<bool> {
        self.db
            .execute_async(move |conn| {
                let found = conn
                    .query_row("SELECT 1 FROM episodes WHERE id = ?1", [episode_id], |_| Ok(()))
                    .optional()?;
                Ok(found.is_some())
            })
            .await
    }

    /// Delete an episode; its cues, assignments and import record go with it
    pub async fn delete_episode(&self, episode_id: i64) -> Result<bool> {
        self.db
            .execute_async(move |conn| {
                // Due to CASCADE, dependent rows are deleted as well
                let deleted = conn.execute("DELETE FROM episodes WHERE id = ?1", [episode_id])?;
                Ok(deleted > 0)
            })
            .await
    }

    // =========================================================================
    // Contributor Operations
    // =========================================================================

    /// Register a contributor
    pub async fn create_contributor(
        &self,
        identifier: &str,
        display_name: Option<&str>,
    ) -> Result<ContributorRef> {
        let identifier = identifier.to_string();
        let display_name = display_name.map(str::to_string);
        let now = chrono::Utc::now().to_rfc3339();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    "INSERT INTO contributors (identifier, display_name, created_at) VALUES (?1, ?2, ?3)",
                    params![identifier, display_name, now],
                )?;
                Ok(ContributorRef {
                    id: conn.last_insert_rowid(),
                    identifier,
                    display_name,
                })
            })
            .await
    }

    fn parse_contributor_row(row: &rusqlite::Row) -> rusqlite::Result<ContributorRef> {
        Ok(ContributorRef {
            id: row.get(0)?,
            identifier: row.get(1)?,
            display_name: row.get(2)?,
        })
    }

    /// List all contributors ordered by identifier
    pub async fn list_contributors(&self) -> Result<Vec<ContributorRef>> {
        self.db
            .execute_async(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, identifier, display_name FROM contributors ORDER BY identifier",
                )?;
                let contributors = stmt
                    .query_map([], Self::parse_contributor_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(contributors)
            })
            .await
    }

    // =========================================================================
    // Transcript Operations
    // =========================================================================

    /// Atomically replace the cue set of an episode.
    ///
    /// Deletes every stored cue, inserts `cues` in order, adds the candidate
    /// voice assignments that do not exist yet and records the import. All of
    /// it commits together or not at all.
    pub async fn replace_transcript(
        &self,
        episode_id: i64,
        cues: Vec<Cue>,
        voice_candidates: Vec<(String, i64)>,
        source_hash: String,
    ) -> Result<ReplaceOutcome> {
        let now = chrono::Utc::now().to_rfc3339();

        self.db
            .transaction_async(move |tx| {
                let removed = tx.execute("DELETE FROM transcripts WHERE episode_id = ?1", [episode_id])?;
                debug!("Removed {} cues of episode {}", removed, episode_id);

                {
                    let mut insert = tx.prepare_cached(
                        r#"
                        INSERT INTO transcripts (episode_id, position, start_ms, end_ms, voice, content)
                        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                        "#,
                    )?;
                    for (position, cue) in cues.iter().enumerate() {
                        insert.execute(params![
                            episode_id,
                            position as i64,
                            cue.start_ms,
                            cue.end_ms,
                            cue.voice,
                            cue.content,
                        ])?;
                    }
                }

                let mut new_assignments = Vec::new();
                {
                    let mut assign = tx.prepare_cached(
                        r#"
                        INSERT OR IGNORE INTO voice_assignments (episode_id, voice, contributor_id, created_at)
                        VALUES (?1, ?2, ?3, ?4)
                        "#,
                    )?;
                    for (voice, contributor_id) in voice_candidates {
                        if assign.execute(params![episode_id, voice, contributor_id, now])? > 0 {
                            new_assignments.push(voice);
                        }
                    }
                }

                tx.execute(
                    r#"
                    INSERT INTO transcript_imports (episode_id, source_hash, cue_count, imported_at)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(episode_id) DO UPDATE SET
                        source_hash = excluded.source_hash,
                        cue_count = excluded.cue_count,
                        imported_at = excluded.imported_at
                    "#,
                    params![episode_id, source_hash, cues.len() as i64, now],
                )?;

                Ok(ReplaceOutcome {
                    cue_count: cues.len(),
                    new_assignments,
                })
            })
            .await
    }

    /// Whether the episode has any cue
    pub async fn has_transcript(&self, episode_id: i64) -> Result<bool> {
        self.db
            .execute_async(move |conn| {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM transcripts WHERE episode_id = ?1)",
                    [episode_id],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
    }

    /// All cues of an episode in insertion order
    pub async fn get_cues(&self, episode_id: i64) -> Result<Vec<Cue>> {
        self.db
            .execute_async(move |conn| Self::get_cues_sync(conn, episode_id))
            .await
    }

    fn get_cues_sync(conn: &Connection, episode_id: i64) -> Result<Vec<Cue>> {
        let mut stmt = conn.prepare_cached(
            r#"
            SELECT id, episode_id, position, start_ms, end_ms, voice, content
            FROM transcripts
            WHERE episode_id = ?1
            ORDER BY position
            "#,
        )?;

        let cues = stmt
            .query_map([episode_id], Self::parse_cue_row)?
            .map(|r| r.map(Cue::from))
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(cues)
    }

    fn parse_cue_row(row: &rusqlite::Row) -> rusqlite::Result<CueRecord> {
        Ok(CueRecord {
            id: row.get(0)?,
            episode_id: row.get(1)?,
            position: row.get(2)?,
            start_ms: row.get(3)?,
            end_ms: row.get(4)?,
            voice: row.get(5)?,
            content: row.get(6)?,
        })
    }

    /// Cues and voice assignments of an episode from one consistent read
    pub async fn transcript_snapshot(&self, episode_id: i64) -> Result<StoredTranscript> {
        self.db
            .execute_async(move |conn| {
                Ok(StoredTranscript {
                    cues: Self::get_cues_sync(conn, episode_id)?,
                    assignments: Self::list_voice_assignments_sync(conn, episode_id)?,
                })
            })
            .await
    }

    /// Delete the cues of an episode, keeping its voice assignments
    pub async fn delete_transcript(&self, episode_id: i64) -> Result<usize> {
        self.db
            .transaction_async(move |tx| {
                let deleted = tx.execute("DELETE FROM transcripts WHERE episode_id = ?1", [episode_id])?;
                tx.execute("DELETE FROM transcript_imports WHERE episode_id = ?1", [episode_id])?;
                Ok(deleted)
            })
            .await
    }

    /// Summary of the last successful import
    pub async fn last_import(&self, episode_id: i64) -> Result<Option<ImportRecord>> {
        self.db
            .execute_async(move |conn| {
                let record = conn
                    .query_row(
                        r#"
                        SELECT episode_id, source_hash, cue_count, imported_at
                        FROM transcript_imports WHERE episode_id = ?1
                        "#,
                        [episode_id],
                        |row| {
                            Ok(ImportRecord {
                                episode_id: row.get(0)?,
                                source_hash: row.get(1)?,
                                cue_count: row.get(2)?,
                                imported_at: row.get(3)?,
                            })
                        },
                    )
                    .optional()?;
                Ok(record)
            })
            .await
    }

    // =========================================================================
    // Voice Assignment Operations
    // =========================================================================

    fn parse_assignment_row(row: &rusqlite::Row) -> rusqlite::Result<VoiceAssignmentRecord> {
        Ok(VoiceAssignmentRecord {
            id: row.get(0)?,
            episode_id: row.get(1)?,
            voice: row.get(2)?,
            contributor_id: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    /// Get the assignment for one voice label
    pub async fn get_voice_assignment(
        &self,
        episode_id: i64,
        voice: &str,
    ) -> Result<Option<VoiceAssignmentRecord>> {
        let voice = voice.to_string();

        self.db
            .execute_async(move |conn| {
                let record = conn
                    .query_row(
                        r#"
                        SELECT id, episode_id, voice, contributor_id, created_at
                        FROM voice_assignments
                        WHERE episode_id = ?1 AND voice = ?2
                        "#,
                        params![episode_id, voice],
                        Self::parse_assignment_row,
                    )
                    .optional()?;
                Ok(record)
            })
            .await
    }

    /// All assignments of an episode ordered by voice
    pub async fn list_voice_assignments(&self, episode_id: i64) -> Result<Vec<VoiceAssignmentRecord>> {
        self.db
            .execute_async(move |conn| Self::list_voice_assignments_sync(conn, episode_id))
            .await
    }

    fn list_voice_assignments_sync(
        conn: &Connection,
        episode_id: i64,
    ) -> Result<Vec<VoiceAssignmentRecord>> {
        let mut stmt = conn.prepare_cached(
            r#"
            SELECT id, episode_id, voice, contributor_id, created_at
            FROM voice_assignments
            WHERE episode_id = ?1
            ORDER BY voice
            "#,
        )?;

        let records = stmt
            .query_map([episode_id], Self::parse_assignment_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(records)
    }

    /// Assign a voice explicitly, replacing any earlier mapping
    pub async fn set_voice_assignment(
        &self,
        episode_id: i64,
        voice: &str,
        contributor_id: i64,
    ) -> Result<()> {
        let record = VoiceAssignmentRecord::new(episode_id, voice.to_string(), contributor_id);

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO voice_assignments (episode_id, voice, contributor_id, created_at)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(episode_id, voice) DO UPDATE SET
                        contributor_id = excluded.contributor_id
                    "#,
                    params![record.episode_id, record.voice, record.contributor_id, record.created_at],
                )?;
                Ok(())
            })
            .await
    }

    // =========================================================================
    // Export / Restore Operations
    // =========================================================================

    /// Dump both transcript tables
    pub async fn export_tables(&self) -> Result<TableDump> {
        self.db
            .execute_async(|conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, episode_id, position, start_ms, end_ms, voice, content
                    FROM transcripts
                    ORDER BY episode_id, position
                    "#,
                )?;
                let cues = stmt
                    .query_map([], Self::parse_cue_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;

                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, episode_id, voice, contributor_id, created_at
                    FROM voice_assignments
                    ORDER BY episode_id, voice
                    "#,
                )?;
                let assignments = stmt
                    .query_map([], Self::parse_assignment_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;

                Ok(TableDump { cues, assignments })
            })
            .await
    }

    /// Replace both transcript tables with a dump, all or nothing.
    ///
    /// Import records describe sources the dump did not come from, so they
    /// are cleared as well.
    pub async fn restore_tables(&self, dump: TableDump) -> Result<()> {
        self.db
            .transaction_async(move |tx| {
                tx.execute("DELETE FROM transcripts", [])?;
                tx.execute("DELETE FROM voice_assignments", [])?;
                tx.execute("DELETE FROM transcript_imports", [])?;

                for cue in &dump.cues {
                    if cue.end_ms <= cue.start_ms || cue.start_ms < 0 {
                        return Err(anyhow!(
                            "Invalid cue timing {}..{} for episode {}",
                            cue.start_ms,
                            cue.end_ms,
                            cue.episode_id
                        ));
                    }
                    tx.execute(
                        r#"
                        INSERT INTO transcripts (episode_id, position, start_ms, end_ms, voice, content)
                        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                        "#,
                        params![cue.episode_id, cue.position, cue.start_ms, cue.end_ms, cue.voice, cue.content],
                    )?;
                }

                for assignment in &dump.assignments {
                    tx.execute(
                        r#"
                        INSERT INTO voice_assignments (episode_id, voice, contributor_id, created_at)
                        VALUES (?1, ?2, ?3, ?4)
                        "#,
                        params![
                            assignment.episode_id,
                            assignment.voice,
                            assignment.contributor_id,
                            assignment.created_at,
                        ],
                    )?;
                }

                Ok(())
            })
            .await
    }
}

#[async_trait]
impl EpisodeDirectory for Repository {
    async fn find_episode(&self, slug: &str) -> Result<Option<EpisodeRef>> {
        self.find_episode_by_slug(slug).await
    }
}

#[async_trait]
impl ContributorDirectory for Repository {
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<ContributorRef>> {
        let identifier = identifier.to_string();

        self.db
            .execute_async(move |conn| {
                let contributor = conn
                    .query_row(
                        "SELECT id, identifier, display_name FROM contributors WHERE identifier = ?1",
                        [&identifier],
                        Self::parse_contributor_row,
                    )
                    .optional()?;
                Ok(contributor)
            })
            .await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ContributorRef>> {
        self.db
            .execute_async(move |conn| {
                let contributor = conn
                    .query_row(
                        "SELECT id, identifier, display_name FROM contributors WHERE id = ?1",
                        [id],
                        Self::parse_contributor_row,
                    )
                    .optional()?;
                Ok(contributor)
            })
            .await
    }
}
