//! Message sending and deletion through the REST API.

use super::types::{DcError, DcRateLimit};
use super::DiscordChannel;
use parley_core::{error::ParleyError, message::Embed};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Discord's per-message content limit.
pub(crate) const MAX_MESSAGE_LEN: usize = 2000;

/// How many 429s a single chunk may absorb before the send fails.
pub(crate) const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Longest wait honoured for a single 429.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

impl DiscordChannel {
    /// Send text to a channel, splitting long text. The embed rides on the last chunk.
    pub(crate) async fn send_message(
        &self,
        channel_id: &str,
        text: &str,
        embed: Option<&Embed>,
    ) -> Result<(), ParleyError> {
        let chunks = split_message(text, MAX_MESSAGE_LEN);
        let last = chunks.len() - 1;

        for (i, chunk) in chunks.into_iter().enumerate() {
            let mut body = json!({ "content": chunk });
            if i == last {
                if let Some(e) = embed {
                    body["embeds"] = json!([embed_json(e)]);
                }
            }

            self.post_chunk(channel_id, &body).await?;
        }

        Ok(())
    }

    /// POST one message body, waiting out rate limits.
    async fn post_chunk(&self, channel_id: &str, body: &Value) -> Result<(), ParleyError> {
        let url = format!("{}/channels/{channel_id}/messages", self.base_url);

        for attempt in 0..=MAX_RATE_LIMIT_RETRIES {
            let resp = self
                .client
                .post(&url)
                .header("Authorization", self.auth_header())
                .json(body)
                .send()
                .await
                .map_err(|e| ParleyError::ReplyDelivery(format!("discord send failed: {e}")))?;

            let status = resp.status();
            if status.is_success() {
                return Ok(());
            }
            if status == StatusCode::TOO_MANY_REQUESTS && attempt < MAX_RATE_LIMIT_RETRIES {
                let delay = retry_after(resp).await;
                warn!(
                    "discord rate limited (attempt {}/{MAX_RATE_LIMIT_RETRIES}), retrying in {:.2}s",
                    attempt + 1,
                    delay.as_secs_f64()
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            let detail = error_detail(resp).await;
            return Err(ParleyError::ReplyDelivery(format!(
                "discord send got {status}: {detail}"
            )));
        }

        Err(ParleyError::ReplyDelivery(
            "discord send still rate limited after retries".into(),
        ))
    }

    /// Delete a message from a channel.
    pub(crate) async fn remove_message(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> Result<(), ParleyError> {
        let url = format!(
            "{}/channels/{channel_id}/messages/{message_id}",
            self.base_url
        );
        debug!("discord: DELETE {url}");

        let resp = self
            .client
            .delete(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| ParleyError::Channel(format!("discord delete failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let detail = error_detail(resp).await;
            return Err(ParleyError::Channel(format!(
                "discord delete got {status}: {detail}"
            )));
        }
        Ok(())
    }
}

/// Wait time for a 429: the `Retry-After` header, else the body's `retry_after`.
async fn retry_after(resp: reqwest::Response) -> Duration {
    let header = resp
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok());
    let secs = match header {
        Some(secs) => secs,
        None => {
            let text = resp.text().await.unwrap_or_default();
            serde_json::from_str::<DcRateLimit>(&text)
                .map(|r| r.retry_after)
                .unwrap_or(1.0)
        }
    };
    retry_delay(secs)
}

/// Clamp a server-provided delay to something sane.
pub(crate) fn retry_delay(secs: f64) -> Duration {
    if !secs.is_finite() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(secs.min(MAX_RETRY_AFTER.as_secs_f64()))
}

async fn error_detail(resp: reqwest::Response) -> String {
    let text = resp.text().await.unwrap_or_default();
    serde_json::from_str::<DcError>(&text)
        .map(|e| e.message)
        .unwrap_or(text)
}

/// JSON body of a Discord embed object.
pub(crate) fn embed_json(embed: &Embed) -> Value {
    let mut author = json!({ "name": embed.author_name });
    if let Some(ref icon) = embed.author_icon {
        author["icon_url"] = json!(icon);
    }

    let mut out = json!({
        "title": embed.title,
        "author": author,
    });
    if let Some(ref url) = embed.url {
        out["url"] = json!(url);
    }
    if let Some(color) = embed.color {
        out["color"] = json!(color);
    }
    if let Some(ts) = embed.timestamp {
        out["timestamp"] = json!(ts.to_rfc3339());
    }
    out
}

/// Split text into chunks of at most `max_len` bytes, preferring line breaks
/// and never cutting inside a UTF-8 character.
pub(crate) fn split_message(text: &str, max_len: usize) -> Vec<&str> {
    if text.len() <= max_len {
        return vec![text];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + max_len).min(text.len());
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        let break_at = if end < text.len() {
            text[start..end]
                .rfind('\n')
                .map(|i| start + i + 1)
                .unwrap_or(end)
        } else {
            end
        };
        chunks.push(&text[start..break_at]);
        start = break_at;
    }

    chunks
}
