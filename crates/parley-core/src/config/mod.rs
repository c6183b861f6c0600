//! Durable bot settings and process-level connection configuration.


use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::ParleyError;

/// Durable bot settings, mirrored to a TOML file on every mutation.
///
/// No field carries a serde default: the file is expected to be complete,
/// and a missing key is reported as [`ParleyError::ConfigUnreadable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Leading string that marks a message as a command. Never empty.
    pub prefix: String,
    /// Whitelisted role identifiers, in insertion order, without duplicates.
    pub roles: Vec<String>,
    /// Delete the triggering message after a command is dispatched.
    #[serde(alias = "del_commands")]
    pub delete_commands: bool,
    /// Emit operational logs (login, commands received, settings written).
    pub verbose: bool,
    /// Stop the bot on the first runtime error instead of logging it.
    pub throw_errors: bool,
}

impl Settings {
    /// Whether `role_id` is on the whitelist.
    pub fn has_role(&self, role_id: &str) -> bool {
        self.roles.iter().any(|r| r == role_id)
    }
}

/// Discord connection config.
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    /// Bot token used for the gateway identify and REST `Authorization` header.
    pub token: String,
}

/// Google Cloud Translation config.
#[derive(Debug, Clone)]
pub struct TranslateConfig {
    /// Cloud project identifier.
    pub project: String,
    /// Location scope (e.g. "global").
    pub location: String,
    /// Static OAuth access token. When `None`, tokens come from Application
    /// Default Credentials or the metadata server.
    pub access_token: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// API root, overridable for testing.
    pub base_url: String,
}

impl TranslateConfig {
    /// Config for `project` with every other field at its default.
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            location: default_location(),
            access_token: None,
            timeout_secs: default_timeout_secs(),
            base_url: default_translate_base_url(),
        }
    }
}

pub fn default_location() -> String {
    "global".to_string()
}
pub fn default_timeout_secs() -> u64 {
    30
}
fn default_translate_base_url() -> String {
    "https://translation.googleapis.com".to_string()
}

/// Parse settings from TOML text, rejecting an empty prefix.
pub fn parse_settings(content: &str) -> Result<Settings, ParleyError> {
    let settings: Settings = toml::from_str(content)
        .map_err(|e| ParleyError::ConfigUnreadable(format!("failed to parse settings: {e}")))?;
    if settings.prefix.is_empty() {
        return Err(ParleyError::ConfigUnreadable(
            "prefix must not be empty".to_string(),
        ));
    }
    Ok(settings)
}

/// Render settings as TOML text.
pub fn render_settings(settings: &Settings) -> Result<String, ParleyError> {
    toml::to_string_pretty(settings)
        .map_err(|e| ParleyError::ConfigWrite(format!("failed to serialize settings: {e}")))
}

/// Load settings from a TOML file. A missing or incomplete file is an error.
pub fn load(path: &str) -> Result<Settings, ParleyError> {
    let path = Path::new(path);
    let content = std::fs::read_to_string(path).map_err(|e| {
        ParleyError::ConfigUnreadable(format!("failed to read {}: {e}", path.display()))
    })?;
    let settings = parse_settings(&content)?;
    debug!("loaded settings from {}", path.display());
    Ok(settings)
}

/// Overwrite the settings file with the full current value.
pub async fn save(path: &Path, settings: &Settings) -> Result<(), ParleyError> {
    let content = render_settings(settings)?;
    tokio::fs::write(path, content).await.map_err(|e| {
        ParleyError::ConfigWrite(format!("failed to write {}: {e}", path.display()))
    })
}
