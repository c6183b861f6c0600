use super::*;
use crate::state::{AppState, LocaleCatalog, SettingsStore};
use crate::testing::{locales, message, settings, with_mentions, with_role_mentions};
use parley_core::config::Settings;
use parley_core::message::IncomingMessage;
use tokio::sync::mpsc;

fn state() -> (AppState, mpsc::UnboundedReceiver<Settings>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let store = SettingsStore::new(settings(), tx);
    let state = AppState::new(store, LocaleCatalog::from_locales(locales()));
    (state, rx)
}

/// Parse `msg.text` against the current prefix and run it.
fn run(state: &mut AppState, msg: &IncomingMessage) -> Vec<String> {
    let prefix = state.settings.get().prefix.clone();
    let inv = Invocation::parse(&msg.text, &prefix).expect("not a command");
    let cmd = Command::parse(inv.name).expect("unknown command");
    let mut ctx = CommandContext {
        state,
        message: msg,
        args: &inv.args,
    };
    handle(cmd, &mut ctx)
}

fn writes(rx: &mut mpsc::UnboundedReceiver<Settings>) -> Vec<Settings> {
    let mut out = Vec::new();
    while let Ok(s) = rx.try_recv() {
        out.push(s);
    }
    out
}

// --- Parsing ---

#[test]
fn test_command_parse() {
    assert_eq!(Command::parse("translate"), Some(Command::Translate));
    assert_eq!(Command::parse("prefix"), Some(Command::Prefix));
    assert_eq!(Command::parse("roles"), Some(Command::Roles));
    assert_eq!(Command::parse("locales"), Some(Command::Locales));
    assert_eq!(Command::parse("Translate"), None);
    assert_eq!(Command::parse("help"), None);
}

#[test]
fn test_invocation_splits_name_and_args() {
    let inv = Invocation::parse("!translate  enable fr <@B>", "!").unwrap();
    assert_eq!(inv.name, "translate");
    assert_eq!(inv.args, vec!["enable", "fr", "<@B>"]);
}

#[test]
fn test_invocation_requires_exact_prefix() {
    assert!(Invocation::parse("hello", "!").is_none());
    assert!(Invocation::parse("?translate", "!").is_none());
    // A leading substring of the prefix is not enough.
    assert!(Invocation::parse("!translate", "!!").is_none());
    assert!(Invocation::parse("tr translate", "tr!").is_none());
    assert!(Invocation::parse("tr!translate", "tr!").is_some());
}

#[test]
fn test_invocation_bare_prefix_has_empty_name() {
    let inv = Invocation::parse("!", "!").unwrap();
    assert_eq!(inv.name, "");
    assert!(inv.args.is_empty());
}

#[test]
fn test_invocation_empty_prefix_matches_nothing() {
    assert!(Invocation::parse("translate", "").is_none());
}

#[test]
fn test_unknown_command_reply() {
    assert_eq!(unknown_command("help"), "Command `help` does not exist.");
}

// --- translate ---

#[test]
fn test_translate_enable_confirms_each_member() {
    let (mut state, _rx) = state();
    let msg = with_mentions(message("A", "!translate enable fr <@B> <@C>"), &["B", "C"]);

    let replies = run(&mut state, &msg);

    assert_eq!(
        replies,
        vec![
            "Enabled translation to `French` for `Bob`.",
            "Enabled translation to `French` for `Cleo`.",
        ]
    );
    assert_eq!(state.registry.get("B"), Some("fr"));
    assert_eq!(state.registry.get("C"), Some("fr"));
}

#[test]
fn test_translate_enable_twice_keeps_one_entry() {
    let (mut state, _rx) = state();
    let msg = with_mentions(message("A", "!translate enable fr <@B>"), &["B"]);
    run(&mut state, &msg);
    run(&mut state, &msg);
    assert_eq!(state.registry.len(), 1);

    let msg = with_mentions(message("A", "!translate enable de <@B>"), &["B"]);
    run(&mut state, &msg);
    assert_eq!(state.registry.get("B"), Some("de"));
    assert_eq!(state.registry.len(), 1);
}

#[test]
fn test_translate_enable_unknown_locale_mutates_nothing() {
    let (mut state, _rx) = state();
    let msg = with_mentions(message("A", "!translate enable xx <@B>"), &["B"]);

    let replies = run(&mut state, &msg);

    assert_eq!(replies, vec!["You need to specify a valid locale."]);
    assert!(state.registry.is_empty());
}

#[test]
fn test_translate_enable_missing_locale() {
    let (mut state, _rx) = state();
    let msg = with_mentions(message("A", "!translate enable"), &["B"]);
    // Mentions without a locale token.
    let replies = run(&mut state, &msg);
    assert_eq!(replies, vec!["You need to specify a valid locale."]);
    assert!(state.registry.is_empty());
}

#[test]
fn test_translate_enable_requires_mentions() {
    let (mut state, _rx) = state();
    let replies = run(&mut state, &message("A", "!translate enable fr"));
    assert_eq!(replies, vec!["You need to specify at least one user."]);
    assert!(state.registry.is_empty());
}

#[test]
fn test_translate_disable_reports_per_member() {
    let (mut state, _rx) = state();
    run(
        &mut state,
        &with_mentions(message("A", "!translate enable fr <@B>"), &["B"]),
    );

    let msg = with_mentions(message("A", "!translate disable <@B> <@C>"), &["B", "C"]);
    let replies = run(&mut state, &msg);
    assert_eq!(
        replies,
        vec![
            "Disabled translation for `Bob`.",
            "Translation is already disabled for `Cleo`.",
        ]
    );
    assert!(state.registry.is_empty());

    let again = run(&mut state, &with_mentions(message("A", "!translate disable <@B>"), &["B"]));
    assert_eq!(again, vec!["Translation is already disabled for `Bob`."]);
}

#[test]
fn test_translate_disable_requires_mentions() {
    let (mut state, _rx) = state();
    let replies = run(&mut state, &message("A", "!translate disable"));
    assert_eq!(replies, vec!["You need to specify at least one user."]);
}

#[test]
fn test_translate_clear_on_empty_registry_still_confirms() {
    let (mut state, _rx) = state();
    let replies = run(&mut state, &message("A", "!translate clear"));
    assert_eq!(replies, vec!["Active translations cleared."]);
    assert!(state.registry.is_empty());
}

#[test]
fn test_translate_clear_removes_everything() {
    let (mut state, _rx) = state();
    run(
        &mut state,
        &with_mentions(message("A", "!translate enable fr <@B> <@C>"), &["B", "C"]),
    );
    run(&mut state, &message("A", "!translate clear"));
    assert!(state.registry.is_empty());
}

#[test]
fn test_translate_invalid_argument() {
    let (mut state, _rx) = state();
    let msg = with_mentions(message("A", "!translate toggle <@B>"), &["B"]);
    let replies = run(&mut state, &msg);
    assert_eq!(replies, vec!["Invalid argument `toggle`"]);
    assert!(state.registry.is_empty());
}

#[test]
fn test_translate_invalid_argument_checked_before_mentions() {
    let (mut state, _rx) = state();
    let replies = run(&mut state, &message("A", "!translate toggle"));
    assert_eq!(replies, vec!["Invalid argument `toggle`"]);
}

#[test]
fn test_translate_lists_active() {
    let (mut state, _rx) = state();
    assert_eq!(
        run(&mut state, &message("A", "!translate")),
        vec!["No active translations."]
    );

    run(
        &mut state,
        &with_mentions(message("A", "!translate enable fr <@B>"), &["B"]),
    );
    run(
        &mut state,
        &with_mentions(message("A", "!translate enable de <@C>"), &["C"]),
    );
    // Members that left the space are not listed.
    state
        .registry
        .enable("gone", "fr", &state.catalog)
        .unwrap();

    assert_eq!(
        run(&mut state, &message("A", "!translate")),
        vec!["Currently active translations are `Bob: French, Cleo: German`."]
    );
}

#[test]
fn test_translate_never_persists() {
    let (mut state, mut rx) = state();
    run(
        &mut state,
        &with_mentions(message("A", "!translate enable fr <@B>"), &["B"]),
    );
    run(&mut state, &message("A", "!translate clear"));
    assert!(writes(&mut rx).is_empty());
}

// --- locales ---

#[test]
fn test_locales_lists_catalog() {
    let (mut state, _rx) = state();
    let replies = run(&mut state, &message("A", "!locales"));
    assert_eq!(replies, vec!["`de`: German\n`fr`: French"]);
}

#[test]
fn test_locales_empty_catalog() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut state = AppState::new(
        SettingsStore::new(settings(), tx),
        LocaleCatalog::from_locales(Vec::new()),
    );
    let replies = run(&mut state, &message("A", "!locales"));
    assert_eq!(replies, vec!["No locales available."]);
}

// --- prefix ---

#[test]
fn test_prefix_shows_current() {
    let (mut state, mut rx) = state();
    let replies = run(&mut state, &message("A", "!prefix"));
    assert_eq!(replies, vec!["Current prefix is `!`."]);
    assert!(writes(&mut rx).is_empty());
}

#[test]
fn test_prefix_sets_and_persists() {
    let (mut state, mut rx) = state();
    let replies = run(&mut state, &message("A", "!prefix ?"));
    assert_eq!(replies, vec!["New prefix set to `?`."]);
    assert_eq!(state.settings.get().prefix, "?");

    let written = writes(&mut rx);
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].prefix, "?");

    // The old prefix no longer matches.
    assert!(Invocation::parse("!prefix", &state.settings.get().prefix).is_none());
    assert_eq!(
        run(&mut state, &message("A", "?prefix")),
        vec!["Current prefix is `?`."]
    );
}

#[test]
fn test_prefix_joins_multiple_tokens() {
    let (mut state, _rx) = state();
    let replies = run(&mut state, &message("A", "!prefix hey bot"));
    assert_eq!(replies, vec!["New prefix set to `hey bot`."]);
    assert_eq!(state.settings.get().prefix, "hey bot");
}

// --- roles ---

#[test]
fn test_roles_add_twice_persists_once() {
    let (mut state, mut rx) = state();
    let msg = with_role_mentions(message("A", "!roles add <@&R1>"), &["R1"]);

    let first = run(&mut state, &msg);
    assert_eq!(first, vec!["Role `Role1` added to whitelist."]);
    assert_eq!(state.settings.get().roles, vec!["R1"]);
    let written = writes(&mut rx);
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].roles, vec!["R1"]);

    let second = run(&mut state, &msg);
    assert_eq!(second, vec!["Role `Role1` already whitelisted."]);
    assert_eq!(state.settings.get().roles, vec!["R1"]);
    assert!(writes(&mut rx).is_empty());
}

#[test]
fn test_roles_add_mixed_persists_once() {
    let (mut state, mut rx) = state();
    run(
        &mut state,
        &with_role_mentions(message("A", "!roles add <@&R1>"), &["R1"]),
    );
    writes(&mut rx);

    let msg = with_role_mentions(message("A", "!roles add <@&R1> <@&R2>"), &["R1", "R2"]);
    let replies = run(&mut state, &msg);
    assert_eq!(
        replies,
        vec![
            "Role `Role1` already whitelisted.",
            "Role `Role2` added to whitelist.",
        ]
    );
    assert_eq!(state.settings.get().roles, vec!["R1", "R2"]);
    assert_eq!(writes(&mut rx).len(), 1);
}

#[test]
fn test_roles_remove() {
    let (mut state, mut rx) = state();
    run(
        &mut state,
        &with_role_mentions(message("A", "!roles add <@&R1>"), &["R1"]),
    );
    writes(&mut rx);

    let msg = with_role_mentions(message("A", "!roles remove <@&R1> <@&R2>"), &["R1", "R2"]);
    let replies = run(&mut state, &msg);
    assert_eq!(
        replies,
        vec![
            "Role `Role1` removed from whitelist.",
            "Role `Role2` is not whitelisted.",
        ]
    );
    assert!(state.settings.get().roles.is_empty());
    assert_eq!(writes(&mut rx).len(), 1);

    let again = run(
        &mut state,
        &with_role_mentions(message("A", "!roles remove <@&R1>"), &["R1"]),
    );
    assert_eq!(again, vec!["Role `Role1` is not whitelisted."]);
    assert!(writes(&mut rx).is_empty());
}

#[test]
fn test_roles_requires_role_mentions() {
    let (mut state, mut rx) = state();
    assert_eq!(
        run(&mut state, &message("A", "!roles add")),
        vec!["You need to specify at least one role."]
    );
    assert_eq!(
        run(&mut state, &message("A", "!roles remove")),
        vec!["You need to specify at least one role."]
    );
    assert!(writes(&mut rx).is_empty());
}

#[test]
fn test_roles_invalid_argument() {
    let (mut state, mut rx) = state();
    let msg = with_role_mentions(message("A", "!roles grant <@&R1>"), &["R1"]);
    assert_eq!(run(&mut state, &msg), vec!["Invalid argument `grant`"]);
    assert!(state.settings.get().roles.is_empty());
    assert!(writes(&mut rx).is_empty());
}

#[test]
fn test_roles_lists_existing_only() {
    let (mut state, _rx) = state();
    assert_eq!(
        run(&mut state, &message("A", "!roles")),
        vec!["No whitelisted roles."]
    );

    state
        .settings
        .set(|s| s.roles = vec!["R2".into(), "deleted".into(), "R1".into()]);
    assert_eq!(
        run(&mut state, &message("A", "!roles")),
        vec!["Currently whitelisted roles are `Role2, Role1`."]
    );
}
