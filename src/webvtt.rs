use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::ParseError;

// @module: WebVTT captions parsing

// @const: Cue timestamp, hours optional
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d{2,}):)?([0-5]\d):([0-5]\d)\.(\d{3})$").unwrap()
});

/// Mandatory first token of every document
pub const HEADER: &str = "WEBVTT";

const TIMING_ARROW: &str = "-->";

/// Largest offset accepted; below 2^40 seconds the f64 seconds of a cue
/// still round back to the same millisecond
pub const MAX_TIMESTAMP_MS: u64 = 1_000_000_000_000_000;

/// One cue as read from a document, timings in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedCue {
    /// Start offset in seconds, millisecond precision
    pub start_seconds: f64,
    /// End offset in seconds, millisecond precision
    pub end_seconds: f64,
    /// Speaker label from a leading `<v NAME>` span, empty when absent
    pub voice: String,
    /// Payload with the voice span stripped
    pub text: String,
}

/// Parse a complete WebVTT document.
///
/// Fails on the first structurally invalid block; a partial cue list is
/// never returned.
pub fn parse(content: &str) -> Result<Vec<ParsedCue>, ParseError> {
    let normalized = content
        .strip_prefix('\u{feff}')
        .unwrap_or(content)
        .replace("\r\n", "\n")
        .replace('\r', "\n");
    let lines: Vec<&str> = normalized.split('\n').collect();

    if !is_header_line(lines[0]) {
        return Err(ParseError::new(1, "missing WEBVTT header"));
    }

    // Header metadata runs until the first blank line
    let mut i = 1;
    while i < lines.len() && !is_blank(lines[i]) && !lines[i].contains(TIMING_ARROW) {
        i += 1;
    }

    let mut cues = Vec::new();

    loop {
        while i < lines.len() && is_blank(lines[i]) {
            i += 1;
        }
        if i >= lines.len() {
            break;
        }

        if is_comment_block(&lines, i) {
            while i < lines.len() && !is_blank(lines[i]) {
                i += 1;
            }
            continue;
        }

        // Optional cue identifier precedes the timing line
        let timing_index = if lines[i].contains(TIMING_ARROW) {
            i
        } else {
            let next = i + 1;
            if next >= lines.len() || !lines[next].contains(TIMING_ARROW) {
                return Err(ParseError::new(
                    next.min(lines.len()) + 1,
                    format!("expected a timing line after cue identifier '{}'", lines[i].trim()),
                ));
            }
            next
        };

        let (start_ms, end_ms) = parse_timing_line(lines[timing_index], timing_index + 1)?;

        let mut payload_end = timing_index + 1;
        while payload_end < lines.len() && !is_blank(lines[payload_end]) {
            payload_end += 1;
        }
        let payload = lines[timing_index + 1..payload_end].join("\n");
        let (voice, text) = split_voice(&payload, timing_index + 2)?;

        cues.push(ParsedCue {
            start_seconds: start_ms as f64 / 1000.0,
            end_seconds: end_ms as f64 / 1000.0,
            voice,
            text,
        });

        i = payload_end;
    }

    Ok(cues)
}

/// Parse a single `[HH:]MM:SS.mmm` timestamp into milliseconds
pub fn parse_timestamp(timestamp: &str) -> Option<u64> {
    timestamp_ms(timestamp).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimestampFault {
    Invalid,
    OutOfRange,
}

fn timestamp_ms(timestamp: &str) -> Result<u64, TimestampFault> {
    let caps = TIMESTAMP_REGEX
        .captures(timestamp)
        .ok_or(TimestampFault::Invalid)?;
    let field = |index: usize| -> Result<u64, TimestampFault> {
        match caps.get(index) {
            // Digits only, so a failed parse is an overflow
            Some(m) => m.as_str().parse().map_err(|_| TimestampFault::OutOfRange),
            None => Ok(0),
        }
    };

    let (hours, minutes, seconds, millis) = (field(1)?, field(2)?, field(3)?, field(4)?);

    hours
        .checked_mul(3600)
        .and_then(|total| total.checked_add(minutes * 60 + seconds))
        .and_then(|total| total.checked_mul(1000))
        .and_then(|total| total.checked_add(millis))
        .filter(|ms| *ms <= MAX_TIMESTAMP_MS)
        .ok_or(TimestampFault::OutOfRange)
}

/// Format milliseconds as `HH:MM:SS.mmm`
pub fn format_timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

fn is_header_line(line: &str) -> bool {
    match line.strip_prefix(HEADER) {
        Some(rest) => rest.is_empty() || rest.starts_with(' ') || rest.starts_with('\t'),
        None => false,
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

// NOTE blocks are always comments. STYLE and REGION only when they are not
// acting as the identifier of a cue.
fn is_comment_block(lines: &[&str], index: usize) -> bool {
    let first = lines[index];
    if keyword_line(first, "NOTE") {
        return true;
    }
    if keyword_line(first, "STYLE") || keyword_line(first, "REGION") {
        return !lines
            .get(index + 1)
            .is_some_and(|next| next.contains(TIMING_ARROW));
    }
    false
}

fn keyword_line(line: &str, keyword: &str) -> bool {
    match line.strip_prefix(keyword) {
        Some(rest) => rest.is_empty() || rest.starts_with(' ') || rest.starts_with('\t'),
        None => false,
    }
}

fn parse_timing_line(line: &str, line_number: usize) -> Result<(u64, u64), ParseError> {
    let (start_part, end_part) = line
        .split_once(TIMING_ARROW)
        .ok_or_else(|| ParseError::new(line_number, "missing '-->' separator"))?;

    let start_str = start_part.trim();
    // Cue settings may follow the end timestamp
    let end_str = end_part
        .split_whitespace()
        .next()
        .ok_or_else(|| ParseError::new(line_number, "missing end timestamp"))?;

    let start_ms = timestamp_ms(start_str)
        .map_err(|kind| timestamp_error(line_number, "start", start_str, kind))?;
    let end_ms = timestamp_ms(end_str)
        .map_err(|kind| timestamp_error(line_number, "end", end_str, kind))?;

    if end_ms <= start_ms {
        return Err(ParseError::new(
            line_number,
            format!(
                "cue end {} is not after its start {}",
                format_timestamp(end_ms),
                format_timestamp(start_ms)
            ),
        ));
    }

    Ok((start_ms, end_ms))
}

fn timestamp_error(line_number: usize, which: &str, value: &str, kind: TimestampFault) -> ParseError {
    match kind {
        TimestampFault::Invalid => {
            ParseError::new(line_number, format!("invalid {} timestamp '{}'", which, value))
        }
        TimestampFault::OutOfRange => ParseError::new(
            line_number,
            format!("{} timestamp '{}' out of range", which, value),
        ),
    }
}

/// Extract a leading voice span: `<v NAME>`, `<v.class NAME>`, optionally
/// closed by `</v>`. Voice end tags are dropped from the text wherever they
/// appear, so text after the span is kept without its marker.
fn split_voice(payload: &str, line_number: usize) -> Result<(String, String), ParseError> {
    let Some(rest) = payload.strip_prefix("<v") else {
        return Ok((String::new(), payload.to_string()));
    };

    // `<video>` and friends are not voice spans
    if !rest.starts_with([' ', '\t', '.', '>']) {
        return Ok((String::new(), payload.to_string()));
    }

    let close = rest
        .find('>')
        .ok_or_else(|| ParseError::new(line_number, "malformed voice marker: missing '>'"))?;
    let tag = &rest[..close];

    let annotation = if tag.starts_with('.') {
        match tag.find([' ', '\t']) {
            Some(pos) => &tag[pos..],
            None => "",
        }
    } else {
        tag
    };

    let voice = annotation.trim();
    if voice.is_empty() {
        return Err(ParseError::new(
            line_number,
            "malformed voice marker: missing speaker name",
        ));
    }

    let inner = &rest[close + 1..];
    let text = inner.replace("</v>", "");

    Ok((voice.to_string(), text))
}
