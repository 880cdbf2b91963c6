use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

// Wire format for visual ideas embedded by the model:
// <div class="image-placeholder" data-prompt="...">...</div>
static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<div class="image-placeholder"[^>]*data-prompt="[^"]*"[^>]*>.*?</div>"#).unwrap()
});
static PROMPT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"data-prompt="([^"]*)""#).unwrap());

/// One renderable unit of the document, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Segment {
    /// Literal HTML between markers. May be empty around consecutive markers.
    Text { html: String },
    /// A recognized image placeholder; rendered interactively, keyed by prompt.
    Image { prompt: String },
}

/// Split a normalized document at image-placeholder markers.
///
/// Markers with a missing or empty prompt stay literal text, so interactive
/// blocks are never built without an actionable prompt.
pub fn split(doc: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for m in MARKER_RE.find_iter(doc) {
        segments.push(Segment::Text {
            html: doc[last..m.start()].to_string(),
        });
        let prompt = PROMPT_RE
            .captures(m.as_str())
            .map(|c| c[1].to_string())
            .unwrap_or_default();
        if prompt.is_empty() {
            segments.push(Segment::Text {
                html: m.as_str().to_string(),
            });
        } else {
            segments.push(Segment::Image { prompt });
        }
        last = m.end();
    }
    segments.push(Segment::Text {
        html: doc[last..].to_string(),
    });

    segments
}

/// Walk every well-formed marker and let `resolve` swap it for replacement
/// HTML (e.g. a rendered <figure>). Markers it declines stay verbatim, as
/// does everything else.
pub fn render_with(doc: &str, mut resolve: impl FnMut(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(doc.len());
    let mut last = 0;
    for m in MARKER_RE.find_iter(doc) {
        out.push_str(&doc[last..m.start()]);
        let prompt = PROMPT_RE
            .captures(m.as_str())
            .map(|c| c[1].to_string())
            .unwrap_or_default();
        match resolve(&prompt) {
            Some(replacement) if !prompt.is_empty() => out.push_str(&replacement),
            _ => out.push_str(m.as_str()),
        }
        last = m.end();
    }
    out.push_str(&doc[last..]);
    out
}

// ── Tests ──
