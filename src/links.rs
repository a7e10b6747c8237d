use anyhow::{Context, Result};
use url::Url;

use crate::app_config::{FeedTranscripts, SiteConfig};
use crate::asset::expand_template;
use crate::directory::EpisodeRef;
use crate::render::TranscriptFormat;
use crate::render::xml::escape;

// @module: Public URL contract for rendered transcripts

/// Query parameter selecting the transcript format on an episode permalink
pub const FORMAT_QUERY_KEY: &str = "transcript";

/// One `<podcast:transcript>` entry of an episode feed item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLink {
    pub url: String,
    pub mime_type: &'static str,
}

impl TranscriptLink {
    pub fn to_feed_tag(&self) -> String {
        format!(
            "<podcast:transcript url=\"{}\" type=\"{}\" />",
            escape(&self.url),
            self.mime_type
        )
    }
}

/// Builds transcript URLs for episodes of one site
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    base_url: Url,
    feed_mode: FeedTranscripts,
}

impl LinkBuilder {
    pub fn new(site: &SiteConfig, feed_mode: FeedTranscripts) -> Result<Self> {
        let mut base_url = Url::parse(&site.base_url)
            .with_context(|| format!("Invalid site base URL: {}", site.base_url))?;

        // Url::join replaces the last segment unless the path ends in a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { base_url, feed_mode })
    }

    /// `<base_url>/<slug>/`
    pub fn permalink(&self, episode: &EpisodeRef) -> Result<Url> {
        self.base_url
            .join(&format!("{}/", episode.slug))
            .with_context(|| format!("Invalid episode slug: {}", episode.slug))
    }

    /// Permalink with the format query appended
    pub fn transcript_url(&self, episode: &EpisodeRef, format: TranscriptFormat) -> Result<Url> {
        let mut url = self.permalink(episode)?;
        url.query_pairs_mut()
            .clear()
            .append_pair(FORMAT_QUERY_KEY, format.as_str());
        Ok(url)
    }

    /// Transcript links announced in the episode's feed item
    pub fn feed_links(&self, episode: &EpisodeRef, has_cues: bool) -> Result<Vec<TranscriptLink>> {
        let links = match &self.feed_mode {
            FeedTranscripts::None => Vec::new(),
            FeedTranscripts::Generated if has_cues => vec![
                TranscriptLink {
                    url: self.transcript_url(episode, TranscriptFormat::WebVtt)?.to_string(),
                    mime_type: TranscriptFormat::WebVtt.content_type(),
                },
                TranscriptLink {
                    url: self
                        .transcript_url(episode, TranscriptFormat::JsonPodcastIndex)?
                        .to_string(),
                    mime_type: TranscriptFormat::JsonPodcastIndex.content_type(),
                },
            ],
            FeedTranscripts::Generated => Vec::new(),
            FeedTranscripts::Asset(template) => vec![TranscriptLink {
                url: expand_template(template, episode),
                mime_type: TranscriptFormat::WebVtt.content_type(),
            }],
        };

        Ok(links)
    }

    /// Flat JSON URL handed to web players, only for episodes with cues
    pub fn player_transcript_url(&self, episode: &EpisodeRef, has_cues: bool) -> Result<Option<Url>> {
        if !has_cues {
            return Ok(None);
        }
        self.transcript_url(episode, TranscriptFormat::JsonFlat).map(Some)
    }
}
