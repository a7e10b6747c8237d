use crate::cue::Cue;
use crate::webvtt::{HEADER, format_timestamp};

/// Re-emit cues as a WebVTT document.
///
/// Voice spans carry the raw label, never the resolved contributor name,
/// so the output parses back to the same cue sequence.
pub fn render(cues: &[Cue]) -> String {
    let mut output = String::with_capacity(16 + cues.len() * 64);
    output.push_str(HEADER);
    output.push('\n');

    for cue in cues {
        output.push('\n');
        output.push_str(&format_timestamp(cue.start_ms.max(0) as u64));
        output.push_str(" --> ");
        output.push_str(&format_timestamp(cue.end_ms.max(0) as u64));
        output.push('\n');

        if cue.has_voice() {
            output.push_str("<v ");
            output.push_str(&cue.voice);
            output.push('>');
            output.push_str(&cue.content);
            output.push_str("</v>");
        } else {
            output.push_str(&cue.content);
        }
        output.push('\n');
    }

    output
}
