use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::TranscriptSnapshot;
use crate::cue::Cue;

/// Joins the contents of merged cues
pub const GROUP_SEPARATOR: &str = " ";

/// Flat dialect entry, timings in milliseconds
#[derive(Debug, Serialize)]
struct FlatEntry<'a> {
    start: i64,
    end: i64,
    voice: &'a str,
    #[serde(rename = "voiceLabel")]
    voice_label: Option<&'a str>,
    text: &'a str,
}

/// A run of consecutive cues sharing one voice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CueGroup {
    pub start: i64,
    pub end: i64,
    pub voice: String,
    pub text: String,
}

/// Podcast index segment, timings in seconds
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PodcastIndexSegment<'a> {
    speaker: &'a str,
    start_time: f64,
    end_time: f64,
    body: &'a str,
}

pub fn render_flat(snapshot: &TranscriptSnapshot) -> Result<String> {
    let entries: Vec<FlatEntry> = snapshot
        .cues
        .iter()
        .map(|cue| FlatEntry {
            start: cue.start_ms,
            end: cue.end_ms,
            voice: &cue.voice,
            voice_label: snapshot.voice_label(&cue.voice),
            text: &cue.content,
        })
        .collect();

    Ok(serde_json::to_string(&entries)?)
}

pub fn render_grouped(cues: &[Cue]) -> Result<String> {
    Ok(serde_json::to_string(&group_by_voice(cues))?)
}

pub fn render_podcastindex(snapshot: &TranscriptSnapshot) -> Result<String> {
    let segments: Vec<PodcastIndexSegment> = snapshot
        .cues
        .iter()
        .map(|cue| PodcastIndexSegment {
            speaker: snapshot.voice_label(&cue.voice).unwrap_or(&cue.voice),
            start_time: cue.start_seconds(),
            end_time: cue.end_seconds(),
            body: &cue.content,
        })
        .collect();

    Ok(serde_json::to_string(&segments)?)
}

/// Merge contiguous cues with an identical voice value.
///
/// The empty voice is a group of its own; any change of voice starts a new
/// group.
pub fn group_by_voice(cues: &[Cue]) -> Vec<CueGroup> {
    let mut groups: Vec<CueGroup> = Vec::new();

    for cue in cues {
        match groups.last_mut() {
            Some(group) if group.voice == cue.voice => {
                group.end = cue.end_ms;
                group.text.push_str(GROUP_SEPARATOR);
                group.text.push_str(&cue.content);
            }
            _ => groups.push(CueGroup {
                start: cue.start_ms,
                end: cue.end_ms,
                voice: cue.voice.clone(),
                text: cue.content.clone(),
            }),
        }
    }

    groups
}
