use std::sync::LazyLock;

use regex::{Captures, Regex};

// Longest heading marker first so "###" is never eaten as "#".
static H3_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^###\s+(.+)$").unwrap());
static H2_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^##\s+(.+)$").unwrap());
static H1_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#\s+(.+)$").unwrap());

// Tolerates one space inside the delimiters; [^*] lets spans cross lines.
static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*\s?([^*]+?)\s?\*\*").unwrap());

// First arm swallows line-leading bullets ("* item") so the emphasis arm
// can never open on them; the replacement closure puts them back untouched.
static EM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(^\s*\*\s)|\*\s*([^*]+?)\s*\*").unwrap());

static LIST_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\s*[-*]\s+(.+)$").unwrap());

/// Repair markdown that leaked into the model's HTML output.
///
/// Ordered substitution passes: headings, bold, italics, list bullets,
/// then a cleanup that collapses doubled emphasis tags. Total and
/// deterministic; unrecognized markup passes through verbatim.
pub fn normalize(buffer: &str) -> String {
    if buffer.is_empty() {
        return String::new();
    }

    let cleaned = H3_RE.replace_all(buffer, "<h3>$1</h3>");
    let cleaned = H2_RE.replace_all(&cleaned, "<h2>$1</h2>");
    let cleaned = H1_RE.replace_all(&cleaned, "<h1>$1</h1>");

    let cleaned = BOLD_RE.replace_all(&cleaned, "<strong>$1</strong>");

    let cleaned = EM_RE.replace_all(&cleaned, |caps: &Captures| match caps.get(2) {
        Some(inner) => format!("<em>{}</em>", inner.as_str()),
        // Line-leading bullet: the list pass owns it.
        None => caps[0].to_string(),
    });

    let cleaned = LIST_RE.replace_all(&cleaned, "<li>$1</li>");

    collapse_doubles(cleaned.into_owned())
}

/// Overlapping matches can nest emphasis tags; squash them to one pair.
fn collapse_doubles(mut html: String) -> String {
    loop {
        let next = html
            .replace("<strong><strong>", "<strong>")
            .replace("</strong></strong>", "</strong>")
            .replace("<em><em>", "<em>")
            .replace("</em></em>", "</em>");
        if next == html {
            return html;
        }
        html = next;
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn heading_precedence() {
        let out = normalize("### Sub\n## Mid\n# Top");
        assert_eq!(out, "<h3>Sub</h3>\n<h2>Mid</h2>\n<h1>Top</h1>");
    }

    #[test]
    fn bold_basic() {
        assert_eq!(
            normalize("This is **bold** text."),
            "This is <strong>bold</strong> text."
        );
    }

    #[test]
    fn bold_with_inner_spaces() {
        assert_eq!(normalize("** spaced **"), "<strong>spaced</strong>");
        assert_eq!(normalize("**spaced **"), "<strong>spaced</strong>");
    }

    #[test]
    fn bold_spans_lines() {
        let out = normalize("**First sentence.\nSecond sentence.**");
        assert_eq!(out, "<strong>First sentence.\nSecond sentence.</strong>");
    }

    #[test]
    fn bullet_is_not_italic() {
        let out = normalize("* Item one");
        assert_eq!(out, "<li>Item one</li>");
    }

    #[test]
    fn midsentence_star_is_italic() {
        let out = normalize("a *word* here");
        assert_eq!(out, "a <em>word</em> here");
    }

    #[test]
    fn bullet_with_inline_emphasis() {
        let out = normalize("* Item with *em* inside");
        assert_eq!(out, "<li>Item with <em>em</em> inside</li>");
    }

    #[test]
    fn dash_list() {
        assert_eq!(normalize("- First\n- Second"), "<li>First</li>\n<li>Second</li>");
    }

    #[test]
    fn html_passes_through() {
        let html = "<h1>Title</h1>\n<p>Already <strong>clean</strong> HTML.</p>";
        assert_eq!(normalize(html), html);
    }

    #[test]
    fn idempotent_on_own_output() {
        let raw = "# Top\n**bold** and *em*\n- item\n* other";
        let once = normalize(raw);
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn doubled_strong_collapses() {
        assert_eq!(
            collapse_doubles("<strong><strong>x</strong></strong>".into()),
            "<strong>x</strong>"
        );
    }
}
