//! Discord gateway and REST deserialization types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub(crate) const OP_DISPATCH: u8 = 0;
pub(crate) const OP_HEARTBEAT: u8 = 1;
pub(crate) const OP_IDENTIFY: u8 = 2;
pub(crate) const OP_RECONNECT: u8 = 7;
pub(crate) const OP_INVALID_SESSION: u8 = 9;
pub(crate) const OP_HELLO: u8 = 10;
pub(crate) const OP_HEARTBEAT_ACK: u8 = 11;

/// Envelope for every gateway frame.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct GatewayPayload {
    pub op: u8,
    #[serde(default)]
    pub d: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Hello {
    pub heartbeat_interval: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Ready {
    pub user: DcUser,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DcUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DcMember {
    /// Absent on the `member` object embedded in MESSAGE_CREATE.
    #[serde(default)]
    pub user: Option<DcUser>,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// A user mentioned in a message, with partial member data in guilds.
#[derive(Debug, Deserialize)]
pub(crate) struct DcMention {
    #[serde(flatten)]
    pub user: DcUser,
    #[serde(default)]
    pub member: Option<DcMember>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DcMessage {
    pub id: String,
    pub channel_id: String,
    #[serde(default)]
    pub guild_id: Option<String>,
    pub author: DcUser,
    #[serde(default)]
    pub member: Option<DcMember>,
    #[serde(default)]
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub mentions: Vec<DcMention>,
    #[serde(default)]
    pub mention_roles: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DcRole {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub position: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DcChannel {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DcGuild {
    pub id: String,
    #[serde(default)]
    pub roles: Vec<DcRole>,
    #[serde(default)]
    pub members: Vec<DcMember>,
    #[serde(default)]
    pub channels: Vec<DcChannel>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GuildDelete {
    pub id: String,
}

/// GUILD_MEMBER_ADD and GUILD_MEMBER_UPDATE.
#[derive(Debug, Deserialize)]
pub(crate) struct GuildMemberEvent {
    pub guild_id: String,
    #[serde(flatten)]
    pub member: DcMember,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GuildMemberRemove {
    pub guild_id: String,
    pub user: DcUser,
}

/// GUILD_ROLE_CREATE and GUILD_ROLE_UPDATE.
#[derive(Debug, Deserialize)]
pub(crate) struct GuildRoleEvent {
    pub guild_id: String,
    pub role: DcRole,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GuildRoleDelete {
    pub guild_id: String,
    pub role_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DcError {
    #[serde(default)]
    pub message: String,
}

/// Body of a 429 response.
#[derive(Debug, Deserialize)]
pub(crate) struct DcRateLimit {
    /// Seconds to wait before retrying.
    pub retry_after: f64,
}
