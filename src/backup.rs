use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::database::models::{CueRecord, VoiceAssignmentRecord};
use crate::database::{Repository, TableDump};

// @module: JSON export and restore of transcript tables

/// Current export document version
pub const EXPORT_VERSION: u32 = 1;

/// Portable snapshot of every stored cue and voice assignment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptExport {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub transcripts: Vec<CueRecord>,
    pub voice_assignments: Vec<VoiceAssignmentRecord>,
}

impl TranscriptExport {
    pub fn from_dump(dump: TableDump) -> Self {
        Self {
            version: EXPORT_VERSION,
            exported_at: Utc::now(),
            transcripts: dump.cues,
            voice_assignments: dump.assignments,
        }
    }

    pub fn into_dump(self) -> TableDump {
        TableDump {
            cues: self.transcripts,
            assignments: self.voice_assignments,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize transcript export")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let export: Self =
            serde_json::from_str(json).context("Failed to parse transcript export")?;
        if export.version != EXPORT_VERSION {
            return Err(anyhow!("Unsupported export version: {}", export.version));
        }
        Ok(export)
    }
}

/// Read both tables into an export document
pub async fn export(repo: &Repository) -> Result<TranscriptExport> {
    let export = TranscriptExport::from_dump(repo.export_tables().await?);
    info!(
        "Exported {} cues and {} voice assignments",
        export.transcripts.len(),
        export.voice_assignments.len()
    );
    Ok(export)
}

/// Replace both tables with the contents of an export document
pub async fn restore(repo: &Repository, export: TranscriptExport) -> Result<()> {
    let cues = export.transcripts.len();
    let assignments = export.voice_assignments.len();
    repo.restore_tables(export.into_dump()).await?;
    info!("Restored {} cues and {} voice assignments", cues, assignments);
    Ok(())
}

pub async fn export_to_file(repo: &Repository, path: &Path) -> Result<TranscriptExport> {
    let export = export(repo).await?;
    std::fs::write(path, export.to_json()?)
        .with_context(|| format!("Failed to write export file: {}", path.display()))?;
    Ok(export)
}

pub async fn restore_from_file(repo: &Repository, path: &Path) -> Result<TranscriptExport> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read export file: {}", path.display()))?;
    let export = TranscriptExport::from_json(&json)?;
    restore(repo, export.clone()).await?;
    Ok(export)
}
