use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<h1>(.*?)</h1>").unwrap());
// Current id spelling first, then the legacy one still emitted by older prompts.
static META_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<div id="meta-description"[^>]*>(.*?)</div>"#).unwrap());
static META_LEGACY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<div id="meta-desc"[^>]*>(.*?)</div>"#).unwrap());
// No backreferences in the regex crate; the closing level is matched loosely.
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<h([23])[^>]*>(.*?)</h[23]>").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineEntry {
    /// Sequential per pass ("heading-0", ...), not stable across passes.
    pub id: String,
    pub text: String,
    pub level: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocStats {
    pub word_count: usize,
    pub title: String,
    pub description: String,
    pub outline: Vec<OutlineEntry>,
}

/// Derive word count, title, meta description and the h2/h3 outline from a
/// normalized document. Each field is independent; absent structure yields
/// empty defaults, never an error.
pub fn extract(doc: &str) -> DocStats {
    let text = TAG_RE.replace_all(doc, " ");
    let word_count = text.split_whitespace().count();

    let title = TITLE_RE
        .captures(doc)
        .map(|c| c[1].to_string())
        .unwrap_or_default();

    let description = META_RE
        .captures(doc)
        .or_else(|| META_LEGACY_RE.captures(doc))
        .map(|c| c[1].to_string())
        .unwrap_or_default();

    let outline: Vec<OutlineEntry> = HEADING_RE
        .captures_iter(doc)
        .enumerate()
        .map(|(i, caps)| OutlineEntry {
            id: format!("heading-{}", i),
            text: TAG_RE.replace_all(&caps[2], "").to_string(),
            level: caps[1].parse().unwrap_or(2),
        })
        .collect();

    DocStats {
        word_count,
        title,
        description,
        outline,
    }
}

// ── Tests ──
