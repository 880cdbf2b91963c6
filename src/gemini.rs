use anyhow::{anyhow, Context, Result};
use futures_util::StreamExt;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::ArticleConfig;
use crate::session::StreamEvent;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const TEXT_MODEL: &str = "gemini-2.5-flash";
const IMAGE_MODEL: &str = "imagen-3.0-generate-002";
const TEMPERATURE: f64 = 0.85;

fn api_key() -> Result<String> {
    std::env::var("GEMINI_API_KEY")
        .map_err(|_| anyhow!("GEMINI_API_KEY environment variable must be set"))
}

/// Stream article text into the session channel. Always terminates the
/// channel with exactly one `Done` or `Failed` event; no automatic retry.
pub async fn stream_article(
    client: reqwest::Client,
    config: ArticleConfig,
    tx: mpsc::Sender<StreamEvent>,
) {
    match stream_inner(&client, &config, &tx).await {
        Ok(()) => {
            let _ = tx.send(StreamEvent::Done).await;
        }
        Err(e) => {
            let _ = tx.send(StreamEvent::Failed(e.to_string())).await;
        }
    }
}

async fn stream_inner(
    client: &reqwest::Client,
    config: &ArticleConfig,
    tx: &mpsc::Sender<StreamEvent>,
) -> Result<()> {
    let key = api_key()?;
    let url = format!("{}/{}:streamGenerateContent?alt=sse&key={}", API_BASE, TEXT_MODEL, key);
    let body = json!({
        "contents": [{ "parts": [{ "text": config.user_prompt() }] }],
        "systemInstruction": { "parts": [{ "text": config.system_instruction() }] },
        "generationConfig": { "temperature": TEMPERATURE },
    });

    info!("Starting article stream for keyword {:?}", config.keyword);
    let resp = client
        .post(&url)
        .json(&body)
        .send()
        .await
        .context("Request to Gemini failed")?;
    if !resp.status().is_success() {
        anyhow::bail!("Gemini returned HTTP {}", resp.status());
    }

    let mut stream = resp.bytes_stream();
    let mut pending = String::new();

    while let Some(bytes) = stream.next().await {
        let bytes = bytes.context("Stream read failed")?;
        pending.push_str(&String::from_utf8_lossy(&bytes));

        // SSE events are newline-delimited; keep any unterminated tail.
        while let Some(pos) = pending.find('\n') {
            let line: String = pending.drain(..=pos).collect();
            let line = line.trim();
            let Some(payload) = line.strip_prefix("data:") else {
                continue;
            };
            let payload = payload.trim();
            if payload.is_empty() || payload == "[DONE]" {
                continue;
            }
            if let Some(text) = chunk_text(payload) {
                if tx.send(StreamEvent::Chunk(text)).await.is_err() {
                    // Consumer gone: the session was restarted. Stop quietly.
                    return Ok(());
                }
            }
        }
    }

    Ok(())
}

/// Pull the text part out of one SSE payload. Payloads without text
/// (safety metadata, usage stats) yield None.
fn chunk_text(payload: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(payload).ok()?;
    let text = v
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()?;
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Generate one image for a placeholder prompt. Returns a data URL, or
/// None on any failure — absence means "not yet available", and a retry
/// is a fresh explicit call.
pub async fn generate_image(client: &reqwest::Client, prompt: &str) -> Option<String> {
    let key = match api_key() {
        Ok(k) => k,
        Err(e) => {
            warn!("image generation skipped: {}", e);
            return None;
        }
    };
    let url = format!("{}/{}:predict?key={}", API_BASE, IMAGE_MODEL, key);
    let body = json!({
        "instances": [{ "prompt": prompt }],
        "parameters": { "sampleCount": 1 },
    });

    let resp = match client.post(&url).json(&body).send().await {
        Ok(r) => r,
        Err(e) => {
            warn!("image request failed for {:?}: {}", prompt, e);
            return None;
        }
    };
    if !resp.status().is_success() {
        warn!("image request for {:?} returned HTTP {}", prompt, resp.status());
        return None;
    }

    let v: serde_json::Value = match resp.json().await {
        Ok(v) => v,
        Err(e) => {
            warn!("image response parse failed for {:?}: {}", prompt, e);
            return None;
        }
    };
    let b64 = v
        .get("predictions")?
        .get(0)?
        .get("bytesBase64Encoded")?
        .as_str()?;
    Some(format!("data:image/png;base64,{}", b64))
}

// ── Tests ──
