use crate::{
    error::ParleyError,
    message::{IncomingMessage, OutgoingMessage, SupportedLocale, Translation},
};
use async_trait::async_trait;

/// Translation provider trait.
///
/// Treated as a remote call with no retry or partial-result semantics:
/// any error is a hard failure of the calling operation.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// List every supported locale, with names in `display_language`.
    async fn supported_locales(
        &self,
        display_language: &str,
    ) -> Result<Vec<SupportedLocale>, ParleyError>;

    /// Translate `text` into `target_locale`.
    async fn translate(
        &self,
        text: &str,
        target_locale: &str,
    ) -> Result<Vec<Translation>, ParleyError>;
}

/// Chat platform trait.
///
/// An ordered event source plus a reply sink. Connection lifecycle
/// (login, reconnect) is the implementation's business.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Start listening for incoming messages.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<IncomingMessage>, ParleyError>;

    /// Send a message into a channel.
    async fn send(&self, message: OutgoingMessage) -> Result<(), ParleyError>;

    /// Delete a message from a channel.
    async fn delete_message(&self, channel_id: &str, message_id: &str)
        -> Result<(), ParleyError>;

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), ParleyError>;

    /// Why the inbound stream closed on its own, if it was a failure.
    /// `None` means the stream ended cleanly.
    async fn failure(&self) -> Option<ParleyError> {
        None
    }
}
