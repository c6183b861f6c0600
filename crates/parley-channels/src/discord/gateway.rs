//! Gateway websocket session loop and Channel trait implementation.

use super::events::{handle_dispatch, SessionState};
use super::types::{
    GatewayPayload, Hello, OP_DISPATCH, OP_HEARTBEAT, OP_HEARTBEAT_ACK, OP_HELLO, OP_IDENTIFY,
    OP_INVALID_SESSION, OP_RECONNECT,
};
use super::{DiscordChannel, GATEWAY_URL, INTENTS};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use parley_core::{
    error::ParleyError,
    message::{IncomingMessage, OutgoingMessage},
    traits::Channel,
};
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};
use tracing::{debug, error, info, warn};

/// Why a gateway session ended.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SessionEnd {
    /// Connection dropped or the server asked us to reconnect.
    Reconnect,
    /// The message receiver was dropped; stop for good.
    ReceiverClosed,
    /// The server rejected us in a way reconnecting cannot fix.
    Fatal(String),
}

/// Close codes after which reconnecting is pointless (bad token, bad intents, ...).
pub(crate) fn is_fatal_close(code: u16) -> bool {
    matches!(code, 4004 | 4010 | 4011 | 4012 | 4013 | 4014)
}

pub(crate) fn identify_payload(token: &str) -> serde_json::Value {
    json!({
        "op": OP_IDENTIFY,
        "d": {
            "token": token,
            "intents": INTENTS,
            "properties": {
                "os": std::env::consts::OS,
                "browser": "parley",
                "device": "parley",
            },
        },
    })
}

/// Tracks whether the last heartbeat was acknowledged.
#[derive(Debug, Default)]
pub(crate) struct HeartbeatState {
    awaiting_ack: bool,
}

impl HeartbeatState {
    /// Called on each interval tick. Returns false when the previous
    /// heartbeat never got an ACK, meaning the connection is dead.
    pub(crate) fn beat(&mut self) -> bool {
        if self.awaiting_ack {
            return false;
        }
        self.awaiting_ack = true;
        true
    }

    pub(crate) fn ack(&mut self) {
        self.awaiting_ack = false;
    }
}

pub(crate) fn heartbeat_payload(seq: Option<u64>) -> serde_json::Value {
    json!({ "op": OP_HEARTBEAT, "d": seq })
}

/// Run one gateway connection until it ends.
async fn run_session(
    token: &str,
    tx: &mpsc::Sender<IncomingMessage>,
) -> Result<SessionEnd, ParleyError> {
    let (ws, _) = connect_async(GATEWAY_URL)
        .await
        .map_err(|e| ParleyError::Channel(format!("gateway connect failed: {e}")))?;
    let (mut write, mut read) = ws.split();

    // First frame must be HELLO.
    let interval_ms = loop {
        match read.next().await {
            Some(Ok(WsMessage::Text(text))) => {
                let payload: GatewayPayload = serde_json::from_str(&text)?;
                if payload.op != OP_HELLO {
                    return Err(ParleyError::Channel(format!(
                        "expected HELLO, got op {}",
                        payload.op
                    )));
                }
                let hello: Hello = serde_json::from_value(payload.d)?;
                break hello.heartbeat_interval;
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(ParleyError::Channel(format!("gateway read failed: {e}"))),
            None => return Ok(SessionEnd::Reconnect),
        }
    };

    write
        .send(WsMessage::Text(identify_payload(token).to_string()))
        .await
        .map_err(|e| ParleyError::Channel(format!("identify failed: {e}")))?;

    let mut heartbeat = tokio::time::interval(Duration::from_millis(interval_ms));
    let mut seq: Option<u64> = None;
    let mut state = SessionState::default();
    let mut beats = HeartbeatState::default();

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                if !beats.beat() {
                    warn!("discord heartbeat not acknowledged, reconnecting");
                    return Ok(SessionEnd::Reconnect);
                }
                write
                    .send(WsMessage::Text(heartbeat_payload(seq).to_string()))
                    .await
                    .map_err(|e| ParleyError::Channel(format!("heartbeat failed: {e}")))?;
            }
            frame = read.next() => {
                let text = match frame {
                    Some(Ok(WsMessage::Text(text))) => text,
                    Some(Ok(WsMessage::Close(close))) => {
                        if let Some(frame) = close {
                            let code = u16::from(frame.code);
                            if is_fatal_close(code) {
                                return Ok(SessionEnd::Fatal(format!(
                                    "gateway closed with {code}: {}",
                                    frame.reason
                                )));
                            }
                            warn!("discord gateway closed with {code}: {}", frame.reason);
                        }
                        return Ok(SessionEnd::Reconnect);
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        return Err(ParleyError::Channel(format!("gateway read failed: {e}")));
                    }
                    None => return Ok(SessionEnd::Reconnect),
                };

                let payload: GatewayPayload = match serde_json::from_str(&text) {
                    Ok(p) => p,
                    Err(e) => {
                        warn!("discord: undecodable gateway frame: {e}");
                        continue;
                    }
                };
                if payload.s.is_some() {
                    seq = payload.s;
                }

                match payload.op {
                    OP_DISPATCH => {
                        let event = payload.t.unwrap_or_default();
                        if let Some(msg) = handle_dispatch(&mut state, &event, payload.d) {
                            if tx.send(msg).await.is_err() {
                                return Ok(SessionEnd::ReceiverClosed);
                            }
                        }
                    }
                    OP_HEARTBEAT => {
                        write
                            .send(WsMessage::Text(heartbeat_payload(seq).to_string()))
                            .await
                            .map_err(|e| ParleyError::Channel(format!("heartbeat failed: {e}")))?;
                    }
                    OP_RECONNECT | OP_INVALID_SESSION => {
                        info!("discord gateway requested reconnect (op {})", payload.op);
                        return Ok(SessionEnd::Reconnect);
                    }
                    OP_HEARTBEAT_ACK => {
                        beats.ack();
                        debug!("discord heartbeat acknowledged");
                    }
                    other => debug!("discord: ignoring gateway op {other}"),
                }
            }
        }
    }
}

#[async_trait]
impl Channel for DiscordChannel {
    fn name(&self) -> &str {
        "discord"
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingMessage>, ParleyError> {
        let (tx, rx) = mpsc::channel(64);
        let token = self.config.token.clone();
        let fatal = self.fatal.clone();

        info!("Discord channel connecting to gateway...");

        let handle = tokio::spawn(async move {
            let mut backoff_secs: u64 = 1;

            loop {
                match run_session(&token, &tx).await {
                    Ok(SessionEnd::ReceiverClosed) => {
                        info!("gateway receiver dropped, stopping discord session");
                        return;
                    }
                    Ok(SessionEnd::Fatal(reason)) => {
                        error!("discord gateway rejected the bot, giving up: {reason}");
                        *fatal.lock().await = Some(reason);
                        return;
                    }
                    Ok(SessionEnd::Reconnect) => {
                        backoff_secs = 1;
                    }
                    Err(e) => {
                        error!("discord session error (retry in {backoff_secs}s): {e}");
                    }
                }

                tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                backoff_secs = (backoff_secs * 2).min(60);
            }
        });

        *self.task.lock().await = Some(handle);
        Ok(rx)
    }

    async fn send(&self, message: OutgoingMessage) -> Result<(), ParleyError> {
        self.send_message(&message.channel_id, &message.text, message.embed.as_ref())
            .await
    }

    async fn delete_message(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> Result<(), ParleyError> {
        self.remove_message(channel_id, message_id).await
    }

    async fn stop(&self) -> Result<(), ParleyError> {
        if let Some(handle) = self.task.lock().await.take() {
            handle.abort();
            info!("Discord channel stopped");
        }
        Ok(())
    }

    async fn failure(&self) -> Option<ParleyError> {
        self.fatal.lock().await.clone().map(ParleyError::Channel)
    }
}
