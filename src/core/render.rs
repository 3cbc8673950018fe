//! Two-tier message content rendering.
//!
//! The backend marks collapsible sections in structured replies with a bare
//! `+` where an `"expandable": true,` member belongs. Rendering first expands
//! those markers and tries to parse the result as JSON; on success the parsed
//! value is shown as an indented dump, otherwise the original content is shown
//! verbatim. Parse failures are expected for ordinary prose and are never
//! surfaced as errors.

use serde_json::Value;

/// How a message body should be displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// Pretty-printed (2-space indented) dump of parsed structured data.
    Structured(String),
    /// The original content, byte-for-byte, no markup interpretation.
    Plain(String),
}

/// Expansion policy for the backend's `+` markers.
///
/// Kept separate from [`render_content`] so the heuristic can be tested and
/// swapped without touching the render path. Note that a literal `+` in plain
/// prose is mangled too; the subsequent parse attempt then fails and the
/// untouched original is rendered instead.
pub fn expand_plus_markers(content: &str) -> String {
    content.replace('+', "\"expandable\": true,")
}

pub fn render_content(content: &str) -> Rendered {
    let expanded = expand_plus_markers(content);
    match serde_json::from_str::<Value>(&expanded) {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(pretty) => Rendered::Structured(pretty),
            Err(_) => Rendered::Plain(content.to_string()),
        },
        Err(_) => Rendered::Plain(content.to_string()),
    }
}
