use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use crate::pipeline::{self, Snapshot};

/// Session lifecycle. `Failed` is transitional: the driver surfaces the
/// failure once and drops back to `Idle` with the partial buffer intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Generating,
    Failed,
}

/// Events delivered by the generative stream, strictly in arrival order.
#[derive(Debug)]
pub enum StreamEvent {
    Chunk(String),
    Done,
    Failed(String),
}

/// One generation session: the accumulating raw buffer plus the latest
/// derived snapshot. The buffer is append-only between resets and is the
/// only state that persists across chunks.
pub struct Session {
    phase: Phase,
    buffer: String,
    snapshot: Snapshot,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session {
            phase: Phase::Idle,
            buffer: String::new(),
            snapshot: Snapshot::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Begin a fresh generation. Rejects an empty keyword before any state
    /// is touched. Starting while already generating resets first; the
    /// caller drops the previous stream's receiver, which cancels it.
    pub fn start(&mut self, keyword: &str) -> bool {
        if keyword.trim().is_empty() {
            return false;
        }
        self.buffer.clear();
        self.snapshot = Snapshot::default();
        self.phase = Phase::Generating;
        true
    }

    /// Append one chunk and recompute every derived value from the full
    /// buffer. Chunks may split mid-tag or mid-marker; re-running the whole
    /// pipeline makes the split points irrelevant.
    pub fn push_chunk(&mut self, chunk: &str) -> &Snapshot {
        self.buffer.push_str(chunk);
        self.snapshot = pipeline::run(&self.buffer);
        &self.snapshot
    }

    pub fn finish(&mut self) {
        self.phase = Phase::Idle;
    }

    /// Abnormal stream termination. Partial content stays viewable and
    /// exportable.
    pub fn fail(&mut self, reason: &str) {
        warn!("generation stream failed: {}", reason);
        self.phase = Phase::Failed;
    }

    /// Acknowledge a surfaced failure and return to `Idle`.
    pub fn clear_failure(&mut self) {
        if self.phase == Phase::Failed {
            self.phase = Phase::Idle;
        }
    }

    /// The current normalized document, verbatim. This is the export
    /// artifact for copy/download.
    pub fn export(&self) -> &str {
        &self.snapshot.html
    }
}

/// Consume stream events until the source terminates, publishing a fresh
/// snapshot to observers after every chunk. Returns Err only for abnormal
/// termination (the single user-visible failure path).
pub async fn drive(
    session: &mut Session,
    mut rx: mpsc::Receiver<StreamEvent>,
    publish: watch::Sender<Snapshot>,
) -> Result<()> {
    while let Some(event) = rx.recv().await {
        match event {
            StreamEvent::Chunk(text) => {
                let snap = session.push_chunk(&text);
                let _ = publish.send(snap.clone());
            }
            StreamEvent::Done => {
                session.finish();
                info!(
                    "generation complete: {} words",
                    session.snapshot().stats.word_count
                );
                return Ok(());
            }
            StreamEvent::Failed(reason) => {
                session.fail(&reason);
                session.clear_failure();
                anyhow::bail!("generation stream failed: {}", reason);
            }
        }
    }

    // Producer hung up without a terminal event; treat as a clean end.
    session.finish();
    Ok(())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_keyword_rejected() {
        let mut s = Session::new();
        assert!(!s.start(""));
        assert!(!s.start("   "));
        assert_eq!(s.phase(), Phase::Idle);
    }

    #[test]
    fn start_resets_previous_session() {
        let mut s = Session::new();
        assert!(s.start("rust"));
        s.push_chunk("# Old title\n");
        assert!(s.start("rust again"));
        assert_eq!(s.export(), "");
        assert_eq!(s.snapshot().stats.word_count, 0);
        assert_eq!(s.phase(), Phase::Generating);
    }

    #[test]
    fn failure_keeps_partial_buffer() {
        let mut s = Session::new();
        s.start("rust");
        s.push_chunk("# Title\n<p>partial body</p>");
        s.fail("connection reset");
        assert_eq!(s.phase(), Phase::Failed);
        s.clear_failure();
        assert_eq!(s.phase(), Phase::Idle);
        assert!(s.export().contains("partial body"));
    }

    #[test]
    fn chunked_equals_whole() {
        let doc = "# Title\n<div id=\"meta-description\">Desc.</div>\n## A\n**b** *c*\n- d\n";

        let mut whole = Session::new();
        whole.start("k");
        whole.push_chunk(doc);

        let mut chunked = Session::new();
        chunked.start("k");
        // Split at arbitrary byte-ish points (char-safe, doc is ASCII here).
        for piece in doc.as_bytes().chunks(3) {
            chunked.push_chunk(std::str::from_utf8(piece).unwrap());
        }

        assert_eq!(whole.snapshot(), chunked.snapshot());
    }

    #[tokio::test]
    async fn drive_publishes_and_finishes() {
        let (tx, rx) = mpsc::channel(8);
        let (snap_tx, snap_rx) = watch::channel(Snapshot::default());
        tx.send(StreamEvent::Chunk("# Hello\n".into())).await.unwrap();
        tx.send(StreamEvent::Chunk("world".into())).await.unwrap();
        tx.send(StreamEvent::Done).await.unwrap();
        drop(tx);

        let mut s = Session::new();
        s.start("hello");
        drive(&mut s, rx, snap_tx).await.unwrap();

        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(snap_rx.borrow().stats.title, "Hello");
        assert_eq!(s.snapshot().stats.word_count, 2);
    }

    #[tokio::test]
    async fn drive_surfaces_stream_failure() {
        let (tx, rx) = mpsc::channel(8);
        let (snap_tx, _snap_rx) = watch::channel(Snapshot::default());
        tx.send(StreamEvent::Chunk("<p>partial</p>".into())).await.unwrap();
        tx.send(StreamEvent::Failed("boom".into())).await.unwrap();
        drop(tx);

        let mut s = Session::new();
        s.start("topic");
        let err = drive(&mut s, rx, snap_tx).await.unwrap_err();
        assert!(err.to_string().contains("boom"));
        assert_eq!(s.phase(), Phase::Idle);
        assert!(s.export().contains("partial"));
    }
}
