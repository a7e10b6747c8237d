use crate::cue::Cue;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// One `<cue>` element per cue under a `<transcript>` root, timings in
/// milliseconds
pub fn render(cues: &[Cue]) -> String {
    let mut output = String::with_capacity(64 + cues.len() * 96);
    output.push_str(XML_DECLARATION);
    output.push('\n');
    output.push_str("<transcript>\n");

    for cue in cues {
        output.push_str(&format!(
            "  <cue start=\"{}\" end=\"{}\" voice=\"{}\">{}</cue>\n",
            cue.start_ms,
            cue.end_ms,
            escape(&cue.voice),
            escape(&cue.content)
        ));
    }

    output.push_str("</transcript>\n");
    output
}

/// Escape text for use in XML character data and attribute values
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
