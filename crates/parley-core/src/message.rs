use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A member of a chat space (guild), with its space-local display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub display_name: String,
    /// Role identifiers held by this member.
    #[serde(default)]
    pub roles: Vec<String>,
}

/// A role defined in a chat space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    /// RGB colour, 0 when the role is uncoloured.
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub position: i64,
}

/// Snapshot of a chat space's current membership and roles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    pub id: String,
    pub members: HashMap<String, Member>,
    pub roles: HashMap<String, Role>,
}

impl Space {
    pub fn member(&self, id: &str) -> Option<&Member> {
        self.members.get(id)
    }

    pub fn role(&self, id: &str) -> Option<&Role> {
        self.roles.get(id)
    }

    /// Colour of the member's highest-positioned coloured role.
    pub fn member_color(&self, member_id: &str) -> Option<u32> {
        let member = self.members.get(member_id)?;
        member
            .roles
            .iter()
            .filter_map(|r| self.roles.get(r))
            .filter(|r| r.color != 0)
            .max_by_key(|r| r.position)
            .map(|r| r.color)
    }
}

/// The sender of an incoming message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Author {
    pub id: String,
    /// Global account tag (e.g. username), used in logs.
    pub tag: String,
    /// Space-local display name.
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub color: Option<u32>,
}

/// An incoming message from a channel.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Platform-specific message ID.
    pub id: String,
    /// Channel (text room) the message was posted in; replies go here.
    pub channel_id: String,
    pub author: Author,
    /// Whether the bot itself sent this message.
    pub from_self: bool,
    /// Raw message text, as typed.
    pub text: String,
    /// Text with mentions rewritten to readable names.
    pub clean_text: String,
    pub timestamp: DateTime<Utc>,
    /// Permalink to the message.
    pub url: String,
    /// Members mentioned in the message, in mention order.
    pub mentions: Vec<Member>,
    /// Roles mentioned in the message, in mention order.
    pub role_mentions: Vec<Role>,
    /// Membership and roles of the containing space at receive time.
    pub space: Arc<Space>,
}

/// Rich annotation attached to an outgoing message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub url: Option<String>,
    pub author_name: String,
    pub author_icon: Option<String>,
    pub color: Option<u32>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// An outgoing message to send back through a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub channel_id: String,
    pub text: String,
    #[serde(default)]
    pub embed: Option<Embed>,
}

impl OutgoingMessage {
    /// Plain-text reply into `channel_id`.
    pub fn text(channel_id: &str, text: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.to_string(),
            text: text.into(),
            embed: None,
        }
    }
}

/// A locale the translation provider supports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedLocale {
    pub code: String,
    pub display_name: String,
}

/// One segment of a translation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub translated_text: String,
}
