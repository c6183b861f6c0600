//! `translate` and `locales` commands.

use super::{invalid_argument, CommandContext};

pub(super) fn handle_translate(ctx: &mut CommandContext<'_>) -> Vec<String> {
    let Some(&mode) = ctx.args.first() else {
        return vec![list_active(ctx)];
    };

    match mode {
        "clear" => {
            ctx.state.registry.clear();
            vec!["Active translations cleared.".to_string()]
        }
        "enable" | "disable" if ctx.message.mentions.is_empty() => {
            vec!["You need to specify at least one user.".to_string()]
        }
        "enable" => {
            let locale = ctx.args.get(1).copied();
            enable(ctx, locale)
        }
        "disable" => disable(ctx),
        other => vec![invalid_argument(other)],
    }
}

fn list_active(ctx: &CommandContext<'_>) -> String {
    let state = &ctx.state;
    let space = &ctx.message.space;
    let active: Vec<String> = state
        .registry
        .list()
        .filter_map(|(member_id, code)| {
            let member = space.member(member_id)?;
            let locale = state.catalog.display_name(code).unwrap_or(code);
            Some(format!("{}: {locale}", member.display_name))
        })
        .collect();

    if active.is_empty() {
        "No active translations.".to_string()
    } else {
        format!("Currently active translations are `{}`.", active.join(", "))
    }
}

/// Enable for every mentioned member, or for none if the locale is unknown.
fn enable(ctx: &mut CommandContext<'_>, locale: Option<&str>) -> Vec<String> {
    let state = &mut *ctx.state;
    let resolved = locale.and_then(|code| {
        let name = state.catalog.display_name(code).ok()?;
        Some((code, name.to_string()))
    });
    let Some((code, name)) = resolved else {
        return vec!["You need to specify a valid locale.".to_string()];
    };

    let mut replies = Vec::with_capacity(ctx.message.mentions.len());
    for member in &ctx.message.mentions {
        match state.registry.enable(&member.id, code, &state.catalog) {
            Ok(()) => replies.push(format!(
                "Enabled translation to `{name}` for `{}`.",
                member.display_name
            )),
            Err(e) => replies.push(format!("Could not enable translation: {e}")),
        }
    }
    replies
}

fn disable(ctx: &mut CommandContext<'_>) -> Vec<String> {
    ctx.message
        .mentions
        .iter()
        .map(|member| {
            if ctx.state.registry.disable(&member.id) {
                format!("Disabled translation for `{}`.", member.display_name)
            } else {
                format!(
                    "Translation is already disabled for `{}`.",
                    member.display_name
                )
            }
        })
        .collect()
}

pub(super) fn handle_locales(ctx: &CommandContext<'_>) -> String {
    if ctx.state.catalog.is_empty() {
        return "No locales available.".to_string();
    }
    ctx.state
        .catalog
        .iter()
        .map(|(code, name)| format!("`{code}`: {name}"))
        .collect::<Vec<_>>()
        .join("\n")
}
