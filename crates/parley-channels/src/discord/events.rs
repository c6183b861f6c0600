//! Dispatch event handling: cache upkeep and MESSAGE_CREATE conversion.

use super::cache::{display_name, GuildCache};
use super::types::{
    DcMessage, DcUser, GuildDelete, GuildMemberEvent, GuildMemberRemove, GuildRoleDelete,
    GuildRoleEvent, Ready, DcGuild,
};
use parley_core::message::{Author, IncomingMessage, Member, Space};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Mutable state owned by one gateway connection task.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub cache: GuildCache,
    /// The bot's own user ID, known after READY.
    pub self_id: Option<String>,
}

fn decode<T: DeserializeOwned>(event: &str, data: Value) -> Option<T> {
    match serde_json::from_value(data) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("discord: failed to decode {event}: {e}");
            None
        }
    }
}

/// Apply one dispatch event. Returns a message to forward for MESSAGE_CREATE.
pub(crate) fn handle_dispatch(
    state: &mut SessionState,
    event: &str,
    data: Value,
) -> Option<IncomingMessage> {
    match event {
        "READY" => {
            let ready: Ready = decode(event, data)?;
            info!("Logged in to Discord as {}", ready.user.username);
            state.self_id = Some(ready.user.id);
        }
        "GUILD_CREATE" => {
            let guild: DcGuild = decode(event, data)?;
            debug!(
                "discord: cached guild {} ({} members, {} roles)",
                guild.id,
                guild.members.len(),
                guild.roles.len()
            );
            state.cache.upsert_guild(guild);
        }
        "GUILD_DELETE" => {
            let gone: GuildDelete = decode(event, data)?;
            state.cache.remove_guild(&gone.id);
        }
        "GUILD_MEMBER_ADD" | "GUILD_MEMBER_UPDATE" => {
            let ev: GuildMemberEvent = decode(event, data)?;
            if let Some(ref user) = ev.member.user {
                state.cache.upsert_member(&ev.guild_id, user, &ev.member);
            }
        }
        "GUILD_MEMBER_REMOVE" => {
            let ev: GuildMemberRemove = decode(event, data)?;
            state.cache.remove_member(&ev.guild_id, &ev.user.id);
        }
        "GUILD_ROLE_CREATE" | "GUILD_ROLE_UPDATE" => {
            let ev: GuildRoleEvent = decode(event, data)?;
            state.cache.upsert_role(&ev.guild_id, ev.role);
        }
        "GUILD_ROLE_DELETE" => {
            let ev: GuildRoleDelete = decode(event, data)?;
            state.cache.remove_role(&ev.guild_id, &ev.role_id);
        }
        "MESSAGE_CREATE" => {
            let msg: DcMessage = decode(event, data)?;
            return Some(to_incoming(state, msg));
        }
        _ => {}
    }
    None
}

/// CDN URL for a user's avatar, if they have one.
pub(crate) fn avatar_url(user: &DcUser) -> Option<String> {
    user.avatar
        .as_ref()
        .map(|hash| format!("https://cdn.discordapp.com/avatars/{}/{hash}.png", user.id))
}

/// Permalink for a message; DMs use the `@me` pseudo-guild.
pub(crate) fn message_url(guild_id: Option<&str>, channel_id: &str, message_id: &str) -> String {
    format!(
        "https://discord.com/channels/{}/{channel_id}/{message_id}",
        guild_id.unwrap_or("@me")
    )
}

/// Build an [`IncomingMessage`], refreshing the cache from the author and
/// mention data the event carries.
pub(crate) fn to_incoming(state: &mut SessionState, msg: DcMessage) -> IncomingMessage {
    let guild_id = msg.guild_id.as_deref();

    if let Some(gid) = guild_id {
        if let Some(ref member) = msg.member {
            state.cache.upsert_member(gid, &msg.author, member);
        }
        for mention in &msg.mentions {
            if let Some(ref member) = mention.member {
                state.cache.upsert_member(gid, &mention.user, member);
            }
        }
    }

    let space = state.cache.snapshot(guild_id);

    let mentions: Vec<Member> = msg
        .mentions
        .iter()
        .filter_map(|m| match space.member(&m.user.id) {
            Some(member) => Some(member.clone()),
            None if guild_id.is_none() => Some(Member {
                id: m.user.id.clone(),
                display_name: display_name(&m.user, None),
                roles: Vec::new(),
            }),
            None => None,
        })
        .collect();

    let role_mentions = msg
        .mention_roles
        .iter()
        .filter_map(|id| space.role(id).cloned())
        .collect();

    let author = Author {
        id: msg.author.id.clone(),
        tag: msg.author.username.clone(),
        display_name: display_name(&msg.author, msg.member.as_ref()),
        avatar_url: avatar_url(&msg.author),
        color: space.member_color(&msg.author.id),
    };

    let clean_text = clean_content(&msg.content, &space, &state.cache);
    let from_self = state.self_id.as_deref() == Some(msg.author.id.as_str());

    IncomingMessage {
        url: message_url(guild_id, &msg.channel_id, &msg.id),
        id: msg.id,
        channel_id: msg.channel_id,
        author,
        from_self,
        text: msg.content,
        clean_text,
        timestamp: msg.timestamp,
        mentions,
        role_mentions,
        space,
    }
}

/// Rewrite `<@id>`, `<@!id>`, `<@&id>` and `<#id>` tokens into readable names.
///
/// Unknown IDs are left untouched.
pub(crate) fn clean_content(text: &str, space: &Space, cache: &GuildCache) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let Some(close) = tail.find('>') else {
            out.push_str(tail);
            return out;
        };
        let token = &tail[1..close];
        match resolve_token(token, space, cache) {
            Some(name) => out.push_str(&name),
            None => out.push_str(&tail[..=close]),
        }
        rest = &tail[close + 1..];
    }

    out.push_str(rest);
    out
}

fn resolve_token(token: &str, space: &Space, cache: &GuildCache) -> Option<String> {
    let is_id = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    if let Some(id) = token.strip_prefix("@&") {
        return is_id(id)
            .then(|| space.role(id).map(|r| format!("@{}", r.name)))
            .flatten();
    }
    if let Some(id) = token.strip_prefix('@') {
        let id = id.strip_prefix('!').unwrap_or(id);
        return is_id(id)
            .then(|| space.member(id).map(|m| format!("@{}", m.display_name)))
            .flatten();
    }
    if let Some(id) = token.strip_prefix('#') {
        return is_id(id)
            .then(|| cache.channel_name(id).map(|n| format!("#{n}")))
            .flatten();
    }
    None
}
