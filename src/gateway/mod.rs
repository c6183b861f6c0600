//! Gateway: the event loop between the chat channel, command handlers, and the translator.
//!
//! Routing and all state mutation happen on the loop itself, one message at a
//! time. Network work (reply sends, deletes, translations) is spawned so that
//! a slow call never holds up the next event.

mod pipeline;


pub use pipeline::{translate_message, TranslationJob};

use crate::commands::{self, Command, CommandContext, Invocation};
use crate::errors::{ErrorPolicy, ErrorSink};
use crate::state::AppState;
use parley_core::{
    error::ParleyError,
    message::{IncomingMessage, OutgoingMessage},
    traits::{Channel, Translator},
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Where an inbound message goes.
#[derive(Debug)]
pub enum Route {
    /// Own messages, and chat from members without an active translation.
    Ignore,
    /// A prefixed message, already executed against the state.
    Command {
        replies: Vec<String>,
        delete_trigger: bool,
    },
    Translate(TranslationJob),
}

/// The central gateway that routes messages between the channel and the translator.
pub struct Gateway {
    channel: Arc<dyn Channel>,
    translator: Arc<dyn Translator>,
    state: AppState,
    errors: ErrorSink,
    reported: mpsc::UnboundedReceiver<ParleyError>,
    writer: Option<JoinHandle<()>>,
}

impl Gateway {
    /// Create a new gateway.
    ///
    /// `reported` is the receiving half of `errors`; `writer` is the settings
    /// writer task, awaited on shutdown so the last change reaches disk.
    pub fn new(
        channel: Arc<dyn Channel>,
        translator: Arc<dyn Translator>,
        state: AppState,
        errors: ErrorSink,
        reported: mpsc::UnboundedReceiver<ParleyError>,
        writer: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            channel,
            translator,
            state,
            errors,
            reported,
            writer,
        }
    }

    /// Run the main event loop until Ctrl-C, the channel closes, or a raised error.
    pub async fn run(mut self) -> Result<(), ParleyError> {
        info!(
            "Parley gateway running | channel: {} | translator: {} | locales: {} | errors: {:?}",
            self.channel.name(),
            self.translator.name(),
            self.state.catalog.len(),
            self.errors.policy(),
        );

        let mut inbound = self.channel.start().await?;
        info!("Channel started: {}", self.channel.name());

        let outcome = loop {
            tokio::select! {
                incoming = inbound.recv() => match incoming {
                    Some(msg) => self.dispatch(msg),
                    None => match self.channel.failure().await {
                        Some(err) => break Err(err),
                        None => {
                            info!("channel {} closed", self.channel.name());
                            break Ok(());
                        }
                    },
                },
                Some(err) = self.reported.recv() => {
                    if self.errors.policy() == ErrorPolicy::Raise {
                        break Err(err);
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break Ok(());
                }
            }
        };

        self.shutdown().await;
        outcome
    }

    /// Route one message and spawn whatever network work it needs.
    pub fn dispatch(&mut self, msg: IncomingMessage) {
        match self.route(&msg) {
            Ok(Route::Ignore) => {}
            Ok(Route::Command {
                replies,
                delete_trigger,
            }) => self.spawn_replies(&msg, replies, delete_trigger),
            Ok(Route::Translate(job)) => self.spawn_translation(job),
            Err(e) => self.errors.report(e),
        }
    }

    /// Decide what to do with a message, running commands in place.
    pub fn route(&mut self, msg: &IncomingMessage) -> Result<Route, ParleyError> {
        if msg.from_self {
            return Ok(Route::Ignore);
        }

        let prefix = self.state.settings.get().prefix.clone();
        if let Some(inv) = Invocation::parse(&msg.text, &prefix) {
            info!("Received command {} from {}", msg.clean_text, msg.author.tag);
            let replies = match Command::parse(inv.name) {
                Some(cmd) => {
                    let mut ctx = CommandContext {
                        state: &mut self.state,
                        message: msg,
                        args: &inv.args,
                    };
                    commands::handle(cmd, &mut ctx)
                }
                None => vec![commands::unknown_command(inv.name)],
            };
            return Ok(Route::Command {
                replies,
                delete_trigger: self.state.settings.get().delete_commands,
            });
        }

        let Some(target) = self.state.registry.get(&msg.author.id) else {
            return Ok(Route::Ignore);
        };
        if msg.clean_text.trim().is_empty() {
            debug!("skipping blank message {} from {}", msg.id, msg.author.tag);
            return Ok(Route::Ignore);
        }
        let target_name = self.state.catalog.display_name(target)?.to_string();

        Ok(Route::Translate(TranslationJob {
            message: msg.clone(),
            target: target.to_string(),
            target_name,
        }))
    }

    /// Send command replies in order on one task, then delete the trigger if asked.
    fn spawn_replies(&self, msg: &IncomingMessage, replies: Vec<String>, delete_trigger: bool) {
        let channel = self.channel.clone();
        let errors = self.errors.clone();
        let channel_id = msg.channel_id.clone();
        let message_id = msg.id.clone();

        tokio::spawn(async move {
            for text in replies {
                if let Err(e) = channel.send(OutgoingMessage::text(&channel_id, text)).await {
                    errors.report(as_delivery(e));
                }
            }
            if delete_trigger {
                if let Err(e) = channel.delete_message(&channel_id, &message_id).await {
                    warn!("failed to delete command message {message_id}: {e}");
                }
            }
        });
    }

    fn spawn_translation(&self, job: TranslationJob) {
        let channel = self.channel.clone();
        let translator = self.translator.clone();
        let errors = self.errors.clone();

        tokio::spawn(async move {
            let reply = match translate_message(translator.as_ref(), &job).await {
                Ok(reply) => reply,
                Err(e) => {
                    errors.report(e);
                    return;
                }
            };
            debug!(
                "translated {} from {} to {}",
                job.message.id, job.message.author.tag, job.target
            );
            if let Err(e) = channel.send(reply).await {
                errors.report(as_delivery(e));
            }
        });
    }

    /// Stop the channel and flush pending settings writes.
    async fn shutdown(self) {
        info!("Shutting down...");

        if let Err(e) = self.channel.stop().await {
            warn!("failed to stop channel {}: {e}", self.channel.name());
        }

        // Dropping the state drops the store's sender, which ends the writer.
        let Self { state, writer, .. } = self;
        drop(state);
        if let Some(writer) = writer {
            if let Err(e) = writer.await {
                warn!("settings writer ended abnormally: {e}");
            }
        }

        info!("Shutdown complete.");
    }
}

fn as_delivery(err: ParleyError) -> ParleyError {
    match err {
        ParleyError::ReplyDelivery(_) => err,
        other => ParleyError::ReplyDelivery(other.to_string()),
    }
}
