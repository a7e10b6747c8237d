/*!
 * Tests for the transcript output formats
 */

use serde_json::{Value, json};

use castscript::cue::Cue;
use castscript::render::{TranscriptFormat, TranscriptSnapshot, render};
use castscript::voice::VoiceMap;
use castscript::webvtt::parse;
use castscript::ContributorRef;

use crate::common::SAMPLE_VTT;

fn sample_cues() -> Vec<Cue> {
    parse(SAMPLE_VTT)
        .unwrap()
        .iter()
        .map(|parsed| Cue::from_parsed(1, parsed))
        .collect()
}

fn roger_voices() -> VoiceMap {
    let mut voices = VoiceMap::new();
    voices.insert(
        "roger".to_string(),
        ContributorRef {
            id: 42,
            identifier: "roger".to_string(),
            display_name: Some("Roger Bingham".to_string()),
        },
    );
    voices
}

#[test]
fn test_renderWebvtt_thenParse_shouldReproduceSampleCues() {
    let snapshot = TranscriptSnapshot::new(sample_cues(), roger_voices());

    let rendered = render(&snapshot, TranscriptFormat::WebVtt).unwrap();
    let reparsed: Vec<Cue> = parse(&rendered)
        .unwrap()
        .iter()
        .map(|parsed| Cue::from_parsed(1, parsed))
        .collect();

    assert_eq!(reparsed, sample_cues());
    // Raw labels, never resolved names
    assert!(rendered.contains("<v roger>"));
    assert!(!rendered.contains("Roger Bingham"));
}

#[test]
fn test_renderFlat_andXml_shouldUseMilliseconds() {
    let snapshot = TranscriptSnapshot::new(sample_cues(), roger_voices());

    let flat: Value =
        serde_json::from_str(&render(&snapshot, TranscriptFormat::JsonFlat).unwrap()).unwrap();
    let xml = render(&snapshot, TranscriptFormat::Xml).unwrap();

    assert_eq!(flat[0]["start"], json!(1500));
    assert_eq!(flat[0]["end"], json!(4200));
    assert_eq!(flat[0]["voiceLabel"], json!("Roger Bingham"));
    assert_eq!(flat[2]["voiceLabel"], Value::Null);
    assert!(xml.contains(r#"start="1500" end="4200" voice="roger""#));
}

#[test]
fn test_renderPodcastindex_shouldUseSeconds() {
    let snapshot = TranscriptSnapshot::new(sample_cues(), roger_voices());

    let segments: Value =
        serde_json::from_str(&render(&snapshot, TranscriptFormat::JsonPodcastIndex).unwrap())
            .unwrap();

    assert_eq!(segments[0]["startTime"], json!(1.5));
    assert_eq!(segments[0]["endTime"], json!(4.2));
    assert_eq!(segments[0]["speaker"], json!("Roger Bingham"));
    assert_eq!(segments[2]["speaker"], json!("Anna"));
    assert_eq!(segments.as_array().unwrap().len(), 3);
}

#[test]
fn test_renderGrouped_shouldMergeRogerCues() {
    let snapshot = TranscriptSnapshot::new(sample_cues(), VoiceMap::new());

    let groups: Value =
        serde_json::from_str(&render(&snapshot, TranscriptFormat::JsonGrouped).unwrap()).unwrap();

    assert_eq!(
        groups,
        json!([
            { "start": 1500, "end": 6000, "voice": "roger", "text": "Welcome to the show. Today we talk about captions." },
            { "start": 6000, "end": 62345, "voice": "Anna", "text": "Thanks for having me!\nGlad to be here." }
        ])
    );
}

#[test]
fn test_render_withNoCues_shouldProduceEmptyOutput() {
    let snapshot = TranscriptSnapshot::default();

    for format in TranscriptFormat::ALL {
        let rendered = render(&snapshot, format).unwrap();
        match format {
            TranscriptFormat::WebVtt => assert_eq!(parse(&rendered).unwrap().len(), 0),
            TranscriptFormat::Xml => assert!(!rendered.contains("<cue")),
            _ => assert_eq!(rendered, "[]"),
        }
    }
}
