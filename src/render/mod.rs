/*!
 * Multi-format transcript rendering.
 *
 * Renderers are pure functions over a `TranscriptSnapshot`; the
 * `TranscriptRenderer` reads the snapshot for an episode from storage
 * and hands it to the renderer of the requested format.
 */

use anyhow::{Result, anyhow};
use std::fmt;

use crate::cue::Cue;
use crate::database::Repository;
use crate::voice::{VoiceMap, VoiceResolver};

pub mod json;
pub mod webvtt;
pub mod xml;

/// Output dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranscriptFormat {
    WebVtt,
    Xml,
    /// One object per cue
    JsonFlat,
    /// Consecutive same-voice cues merged
    JsonGrouped,
    /// Podcast index transcript schema
    JsonPodcastIndex,
}

impl TranscriptFormat {
    pub const ALL: [TranscriptFormat; 5] = [
        Self::WebVtt,
        Self::Xml,
        Self::JsonFlat,
        Self::JsonGrouped,
        Self::JsonPodcastIndex,
    ];

    /// Name used on the URL contract
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebVtt => "webvtt",
            Self::Xml => "xml",
            Self::JsonFlat => "json",
            Self::JsonGrouped => "json_grouped",
            Self::JsonPodcastIndex => "json_podcastindex",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::WebVtt => "text/vtt",
            Self::Xml => "application/xml",
            Self::JsonFlat | Self::JsonGrouped | Self::JsonPodcastIndex => "application/json",
        }
    }
}

impl fmt::Display for TranscriptFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TranscriptFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "webvtt" => Ok(Self::WebVtt),
            "xml" => Ok(Self::Xml),
            "json" | "json_flat" => Ok(Self::JsonFlat),
            "json_grouped" => Ok(Self::JsonGrouped),
            "json_podcastindex" => Ok(Self::JsonPodcastIndex),
            _ => Err(anyhow!("Invalid transcript format: {}", s)),
        }
    }
}

/// An episode's cues together with their resolved voices
#[derive(Debug, Clone, Default)]
pub struct TranscriptSnapshot {
    pub cues: Vec<Cue>,
    pub voices: VoiceMap,
}

impl TranscriptSnapshot {
    pub fn new(cues: Vec<Cue>, voices: VoiceMap) -> Self {
        Self { cues, voices }
    }

    /// Resolved display name for a voice label
    pub fn voice_label(&self, voice: &str) -> Option<&str> {
        self.voices.get(voice).map(|contributor| contributor.label())
    }
}

/// Formatted output plus its content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTranscript {
    pub body: String,
    pub content_type: &'static str,
}

/// Render a snapshot in the given format
pub fn render(snapshot: &TranscriptSnapshot, format: TranscriptFormat) -> Result<String> {
    let body = match format {
        TranscriptFormat::WebVtt => webvtt::render(&snapshot.cues),
        TranscriptFormat::Xml => xml::render(&snapshot.cues),
        TranscriptFormat::JsonFlat => json::render_flat(snapshot)?,
        TranscriptFormat::JsonGrouped => json::render_grouped(&snapshot.cues)?,
        TranscriptFormat::JsonPodcastIndex => json::render_podcastindex(snapshot)?,
    };
    Ok(body)
}

/// Reads episodes from storage and renders them
#[derive(Clone)]
pub struct TranscriptRenderer {
    repo: Repository,
    resolver: VoiceResolver,
}

impl TranscriptRenderer {
    pub fn new(repo: Repository, resolver: VoiceResolver) -> Self {
        Self { repo, resolver }
    }

    /// Load the cue sequence and voice map of an episode
    pub async fn snapshot(&self, episode_id: i64) -> Result<TranscriptSnapshot> {
        let stored = self.repo.transcript_snapshot(episode_id).await?;
        let voices = self.resolver.voice_map(&stored.assignments).await?;
        Ok(TranscriptSnapshot::new(stored.cues, voices))
    }

    pub async fn render(&self, episode_id: i64, format: TranscriptFormat) -> Result<RenderedTranscript> {
        let snapshot = self.snapshot(episode_id).await?;
        Ok(RenderedTranscript {
            body: render(&snapshot, format)?,
            content_type: format.content_type(),
        })
    }
}
