//! Guild membership and role cache, fed by gateway events.

use super::types::{DcGuild, DcMember, DcRole, DcUser};
use parley_core::message::{Member, Role, Space};
use std::collections::HashMap;
use std::sync::Arc;

/// Per-guild snapshots plus channel names for mention cleanup.
///
/// Snapshots are shared with in-flight messages through `Arc`; updates
/// copy-on-write so a message keeps the view it was received with.
#[derive(Debug, Default)]
pub(crate) struct GuildCache {
    guilds: HashMap<String, Arc<Space>>,
    channel_names: HashMap<String, String>,
}

/// Space-local display name: nickname, then global name, then username.
pub(crate) fn display_name(user: &DcUser, member: Option<&DcMember>) -> String {
    member
        .and_then(|m| m.nick.clone())
        .or_else(|| user.global_name.clone())
        .unwrap_or_else(|| user.username.clone())
}

fn to_role(role: DcRole) -> Role {
    Role {
        id: role.id,
        name: role.name,
        color: role.color,
        position: role.position,
    }
}

impl GuildCache {
    fn space_mut(&mut self, guild_id: &str) -> &mut Space {
        let entry = self
            .guilds
            .entry(guild_id.to_string())
            .or_insert_with(|| {
                Arc::new(Space {
                    id: guild_id.to_string(),
                    ..Default::default()
                })
            });
        Arc::make_mut(entry)
    }

    /// Replace everything known about a guild (GUILD_CREATE).
    pub(crate) fn upsert_guild(&mut self, guild: DcGuild) {
        for ch in &guild.channels {
            if let Some(ref name) = ch.name {
                self.channel_names.insert(ch.id.clone(), name.clone());
            }
        }

        let mut space = Space {
            id: guild.id.clone(),
            ..Default::default()
        };
        for role in guild.roles {
            space.roles.insert(role.id.clone(), to_role(role));
        }
        for m in guild.members {
            if let Some(ref user) = m.user {
                space.members.insert(
                    user.id.clone(),
                    Member {
                        id: user.id.clone(),
                        display_name: display_name(user, Some(&m)),
                        roles: m.roles.clone(),
                    },
                );
            }
        }
        self.guilds.insert(guild.id, Arc::new(space));
    }

    pub(crate) fn remove_guild(&mut self, guild_id: &str) {
        self.guilds.remove(guild_id);
    }

    /// Insert or refresh a member. `member` may be partial (no `user`).
    pub(crate) fn upsert_member(&mut self, guild_id: &str, user: &DcUser, member: &DcMember) {
        let entry = Member {
            id: user.id.clone(),
            display_name: display_name(user, Some(member)),
            roles: member.roles.clone(),
        };
        self.space_mut(guild_id)
            .members
            .insert(user.id.clone(), entry);
    }

    pub(crate) fn remove_member(&mut self, guild_id: &str, user_id: &str) {
        if self.guilds.contains_key(guild_id) {
            self.space_mut(guild_id).members.remove(user_id);
        }
    }

    pub(crate) fn upsert_role(&mut self, guild_id: &str, role: DcRole) {
        self.space_mut(guild_id)
            .roles
            .insert(role.id.clone(), to_role(role));
    }

    pub(crate) fn remove_role(&mut self, guild_id: &str, role_id: &str) {
        if self.guilds.contains_key(guild_id) {
            self.space_mut(guild_id).roles.remove(role_id);
        }
    }

    /// Current snapshot of a guild; an empty space for unknown guilds and DMs.
    pub(crate) fn snapshot(&self, guild_id: Option<&str>) -> Arc<Space> {
        guild_id
            .and_then(|id| self.guilds.get(id))
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn channel_name(&self, channel_id: &str) -> Option<&str> {
        self.channel_names.get(channel_id).map(String::as_str)
    }
}
