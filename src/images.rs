use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tracing::{info, warn};

use crate::gemini;
use crate::pipeline::segments::{self, Segment};

const CONCURRENCY: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageState {
    Pending,
    Ready(String),
    Failed,
}

/// Per-placeholder image results, keyed by prompt text. Segments are
/// re-derived on every chunk and their positions shift as the document
/// grows, so the prompt string is the only stable key.
#[derive(Debug, Default)]
pub struct ImageStore {
    by_prompt: HashMap<String, ImageState>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, prompt: &str) -> Option<&ImageState> {
        self.by_prompt.get(prompt)
    }

    pub fn set(&mut self, prompt: String, state: ImageState) {
        self.by_prompt.insert(prompt, state);
    }

    /// Distinct placeholder prompts that have no successful result yet.
    /// Failed prompts are included: retry is an explicit fresh call.
    pub fn unresolved(&self, segments: &[Segment]) -> Vec<String> {
        let mut seen = Vec::new();
        for s in segments {
            if let Segment::Image { prompt } = s {
                let resolved = matches!(self.get(prompt), Some(ImageState::Ready(_)));
                if !resolved && !seen.contains(prompt) {
                    seen.push(prompt.clone());
                }
            }
        }
        seen
    }
}

/// Fetch an image for every unresolved placeholder, one bounded task per
/// prompt. Each fetch succeeds or fails independently; failures leave the
/// placeholder in its unresolved state.
pub async fn fetch_all(client: &reqwest::Client, store: &mut ImageStore, segments: &[Segment]) {
    let prompts = store.unresolved(segments);
    if prompts.is_empty() {
        return;
    }
    info!("Fetching {} placeholder image(s)", prompts.len());

    let sem = Arc::new(Semaphore::new(CONCURRENCY));
    let (tx, mut rx) = mpsc::channel::<(String, Option<String>)>(prompts.len());

    for prompt in prompts {
        store.set(prompt.clone(), ImageState::Pending);
        let client = client.clone();
        let sem = Arc::clone(&sem);
        let tx = tx.clone();
        tokio::spawn(async move {
            let _permit = sem.acquire().await.unwrap();
            let result = gemini::generate_image(&client, &prompt).await;
            let _ = tx.send((prompt, result)).await;
        });
    }
    drop(tx);

    while let Some((prompt, result)) = rx.recv().await {
        match result {
            Some(url) => store.set(prompt, ImageState::Ready(url)),
            None => {
                warn!("no image for prompt {:?}", prompt);
                store.set(prompt, ImageState::Failed);
            }
        }
    }
}

/// Export rendering: resolved placeholders become <figure> blocks,
/// everything else stays verbatim.
pub fn render_html(doc: &str, store: &ImageStore) -> String {
    segments::render_with(doc, |prompt| match store.get(prompt) {
        Some(ImageState::Ready(url)) => Some(format!(
            "<figure><img src=\"{}\" alt=\"{}\" /><figcaption>{}</figcaption></figure>",
            url, prompt, prompt
        )),
        _ => None,
    })
}

// ── Tests ──
