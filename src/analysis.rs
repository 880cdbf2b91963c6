use regex::RegexBuilder;
use serde::Serialize;

use crate::pipeline::extract::DocStats;

/// Minutes at ~200 words per minute.
pub fn reading_time(word_count: usize) -> usize {
    word_count.div_ceil(200)
}

/// Keyword occurrences per hundred words, case-insensitive. 0 when there
/// is nothing to measure.
pub fn keyword_density(doc: &str, keyword: &str, word_count: usize) -> f64 {
    if doc.is_empty() || keyword.trim().is_empty() || word_count == 0 {
        return 0.0;
    }
    let Ok(re) = RegexBuilder::new(&regex::escape(keyword))
        .case_insensitive(true)
        .build()
    else {
        return 0.0;
    };
    let matches = re.find_iter(doc).count();
    matches as f64 / word_count as f64 * 100.0
}

/// The dashboard scores, 0-100 each. Heuristic, tuned for article-length
/// content: target density is 1.5-2.5%.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentHealth {
    pub readability: u32,
    pub structure: u32,
    pub keywords: u32,
    pub length: u32,
}

impl ContentHealth {
    pub fn score(stats: &DocStats, density: f64) -> Self {
        let wc = stats.word_count as u32;
        ContentHealth {
            readability: (wc / 10 + 50).min(100),
            structure: (stats.outline.len() as u32 * 10).min(100),
            keywords: if density > 0.5 { 90 } else { 40 },
            length: (wc / 20).min(100),
        }
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_time_rounds_up() {
        assert_eq!(reading_time(0), 0);
        assert_eq!(reading_time(1), 1);
        assert_eq!(reading_time(200), 1);
        assert_eq!(reading_time(201), 2);
    }

    #[test]
    fn density_counts_case_insensitive() {
        let doc = "<p>Rust is great. I love rust. RUST!</p>";
        let d = keyword_density(doc, "rust", 8);
        assert!((d - 37.5).abs() < 1e-9);
    }

    #[test]
    fn density_zero_on_empty_inputs() {
        assert_eq!(keyword_density("", "rust", 10), 0.0);
        assert_eq!(keyword_density("<p>x</p>", "", 10), 0.0);
        assert_eq!(keyword_density("<p>x</p>", "rust", 0), 0.0);
    }

    #[test]
    fn density_escapes_regex_metacharacters() {
        let doc = "<p>c++ rocks, c++ rules</p>";
        let d = keyword_density(doc, "c++", 4);
        assert!((d - 50.0).abs() < 1e-9);
    }

    #[test]
    fn health_caps_at_100() {
        let stats = DocStats {
            word_count: 5000,
            ..Default::default()
        };
        let h = ContentHealth::score(&stats, 2.0);
        assert_eq!(h.readability, 100);
        assert_eq!(h.length, 100);
        assert_eq!(h.keywords, 90);
        assert_eq!(h.structure, 0);
    }
}
