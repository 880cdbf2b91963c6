pub mod extract;
pub mod normalize;
pub mod segments;

use serde::Serialize;

use extract::DocStats;
use segments::Segment;

/// Everything derived from one pass over the accumulated buffer. Rebuilt
/// wholesale on every chunk; nothing here survives a session reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// The normalized (HTML-vocabulary-only) document.
    pub html: String,
    pub stats: DocStats,
    pub segments: Vec<Segment>,
}

/// Three-stage pipeline: raw buffer → normalized HTML → stats + segments.
pub fn run(buffer: &str) -> Snapshot {
    let html = normalize::normalize(buffer);
    let stats = extract::extract(&html);
    let segments = segments::split(&html);
    Snapshot {
        html,
        stats,
        segments,
    }
}
