//! `prefix` and `roles` commands, which mutate durable settings.

use super::{invalid_argument, CommandContext};

pub(super) fn handle_prefix(ctx: &mut CommandContext<'_>) -> Vec<String> {
    if ctx.args.is_empty() {
        return vec![format!(
            "Current prefix is `{}`.",
            ctx.state.settings.get().prefix
        )];
    }

    // Args are non-empty tokens, so the joined prefix is never empty.
    let prefix = ctx.args.join(" ");
    ctx.state.settings.set(|s| s.prefix = prefix.clone());
    vec![format!("New prefix set to `{prefix}`.")]
}

pub(super) fn handle_roles(ctx: &mut CommandContext<'_>) -> Vec<String> {
    let Some(&mode) = ctx.args.first() else {
        return vec![list_roles(ctx)];
    };

    match mode {
        "add" | "remove" if ctx.message.role_mentions.is_empty() => {
            vec!["You need to specify at least one role.".to_string()]
        }
        "add" => add_roles(ctx),
        "remove" => remove_roles(ctx),
        other => vec![invalid_argument(other)],
    }
}

fn list_roles(ctx: &CommandContext<'_>) -> String {
    let space = &ctx.message.space;
    let names: Vec<&str> = ctx
        .state
        .settings
        .get()
        .roles
        .iter()
        .filter_map(|id| space.role(id).map(|r| r.name.as_str()))
        .collect();

    if names.is_empty() {
        "No whitelisted roles.".to_string()
    } else {
        format!("Currently whitelisted roles are `{}`.", names.join(", "))
    }
}

/// Whitelist every mentioned role not already present. Persists only on change.
fn add_roles(ctx: &mut CommandContext<'_>) -> Vec<String> {
    let mut added: Vec<String> = Vec::new();
    let mut replies = Vec::with_capacity(ctx.message.role_mentions.len());

    for role in &ctx.message.role_mentions {
        if ctx.state.settings.get().has_role(&role.id) || added.contains(&role.id) {
            replies.push(format!("Role `{}` already whitelisted.", role.name));
        } else {
            added.push(role.id.clone());
            replies.push(format!("Role `{}` added to whitelist.", role.name));
        }
    }

    if !added.is_empty() {
        ctx.state.settings.set(|s| s.roles.extend(added));
    }
    replies
}

/// Drop every mentioned role that is present. Persists only on change.
fn remove_roles(ctx: &mut CommandContext<'_>) -> Vec<String> {
    let mut removed: Vec<String> = Vec::new();
    let mut replies = Vec::with_capacity(ctx.message.role_mentions.len());

    for role in &ctx.message.role_mentions {
        if ctx.state.settings.get().has_role(&role.id) && !removed.contains(&role.id) {
            removed.push(role.id.clone());
            replies.push(format!("Role `{}` removed from whitelist.", role.name));
        } else {
            replies.push(format!("Role `{}` is not whitelisted.", role.name));
        }
    }

    if !removed.is_empty() {
        ctx.state
            .settings
            .set(|s| s.roles.retain(|r| !removed.contains(r)));
    }
    replies
}
