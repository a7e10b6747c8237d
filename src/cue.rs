use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::webvtt::ParsedCue;

// @module: Normalized cue model

/// One caption unit owned by an episode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cue {
    /// Owning episode
    pub episode_id: i64,
    /// Start offset in milliseconds
    pub start_ms: i64,
    /// End offset in milliseconds, always greater than `start_ms`
    pub end_ms: i64,
    /// Raw speaker label as written in the source, possibly empty
    pub voice: String,
    /// Payload, inline markup kept verbatim
    pub content: String,
}

impl Cue {
    /// Creates a cue - used by tests and external consumers
    pub fn new(episode_id: i64, start_ms: i64, end_ms: i64, voice: &str, content: &str) -> Self {
        Self {
            episode_id,
            start_ms,
            end_ms,
            voice: voice.to_string(),
            content: content.to_string(),
        }
    }

    /// Normalize a parsed cue into millisecond timings
    pub fn from_parsed(episode_id: i64, parsed: &ParsedCue) -> Self {
        Self {
            episode_id,
            start_ms: seconds_to_ms(parsed.start_seconds),
            end_ms: seconds_to_ms(parsed.end_seconds),
            voice: parsed.voice.clone(),
            content: parsed.text.clone(),
        }
    }

    pub fn start_seconds(&self) -> f64 {
        self.start_ms as f64 / 1000.0
    }

    pub fn end_seconds(&self) -> f64 {
        self.end_ms as f64 / 1000.0
    }

    pub fn has_voice(&self) -> bool {
        !self.voice.is_empty()
    }
}

/// `round(seconds * 1000)`
pub fn seconds_to_ms(seconds: f64) -> i64 {
    (seconds * 1000.0).round() as i64
}

/// Distinct non-empty voice labels, sorted
pub fn distinct_voices(cues: &[Cue]) -> Vec<String> {
    cues.iter()
        .filter(|cue| cue.has_voice())
        .map(|cue| cue.voice.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
