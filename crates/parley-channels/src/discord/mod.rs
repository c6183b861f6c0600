//! Discord channel.
//!
//! Receives events over the gateway websocket and replies through the REST API.
//! Docs: <https://discord.com/developers/docs>

mod cache;
pub(crate) mod events;
mod gateway;
pub(crate) mod send;
pub(crate) mod types;


use parley_core::config::DiscordConfig;
use std::sync::Arc;
use tokio::sync::Mutex;

const API_BASE: &str = "https://discord.com/api/v10";
const GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";

/// GUILDS | GUILD_MEMBERS | GUILD_MESSAGES | MESSAGE_CONTENT.
const INTENTS: u64 = (1 << 0) | (1 << 1) | (1 << 9) | (1 << 15);

/// Discord channel using the gateway websocket and REST API.
pub struct DiscordChannel {
    config: DiscordConfig,
    client: reqwest::Client,
    base_url: String,
    /// Background gateway task, aborted on stop.
    task: Arc<Mutex<Option<tokio::task::JoinHandle<()>>>>,
    /// Set when the gateway gave up on a close it cannot recover from.
    fatal: Arc<Mutex<Option<String>>>,
}

impl DiscordChannel {
    /// Create a new Discord channel from config.
    pub fn new(config: DiscordConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            base_url: API_BASE.to_string(),
            task: Arc::new(Mutex::new(None)),
            fatal: Arc::new(Mutex::new(None)),
        }
    }

    /// Point REST calls at another host.
    #[cfg(test)]
    pub(crate) fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.config.token)
    }
}
