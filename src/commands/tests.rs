use super::*;
use crate::core::config::Config;
use crate::core::coordinator::TurnResult;
use crate::core::message::Message;
use crate::utils::test_utils::{create_test_app, create_test_app_with_config, Reply, ScriptedService};
use std::time::Duration;
use tempfile::TempDir;

fn run(app: &mut App, input: &str) -> CommandResult {
    match dispatch(input) {
        Action::RunCommand { name, args } => run_command(app, &name, &args),
        Action::SendToModel(text) => panic!("expected a command, got model turn {text:?}"),
    }
}

#[test]
fn plain_text_is_a_trimmed_model_turn() {
    assert_eq!(
        dispatch("  hello there \n"),
        Action::SendToModel("hello there".into())
    );
}

#[test]
fn registered_command_splits_name_and_args() {
    assert_eq!(
        dispatch("  /config   model  some/model "),
        Action::RunCommand {
            name: "/config".into(),
            args: "model  some/model".into(),
        }
    );
    assert_eq!(
        dispatch("/help"),
        Action::RunCommand {
            name: "/help".into(),
            args: String::new(),
        }
    );
}

#[test]
fn tab_separates_name_from_args() {
    assert_eq!(
        dispatch("/config\tmodel x"),
        Action::RunCommand {
            name: "/config".into(),
            args: "model x".into(),
        }
    );
}

#[test]
fn unknown_command_is_sent_to_model_verbatim() {
    assert_eq!(
        dispatch("/unknown-command"),
        Action::SendToModel("/unknown-command".into())
    );
    assert_eq!(
        dispatch("  /halp me  "),
        Action::SendToModel("  /halp me  ".into())
    );
}

#[test]
fn command_lookup_is_case_sensitive() {
    assert_eq!(dispatch("/CLEAR"), Action::SendToModel("/CLEAR".into()));
    assert!(find_command("/Clear").is_none());
    assert!(find_command("clear").is_none());
    assert!(find_command("/clear").is_some());
}

#[test]
fn classify_uses_supplied_registry() {
    let registry = |name: &str| name == "/only";
    assert_eq!(
        classify("/only now", registry),
        Action::RunCommand {
            name: "/only".into(),
            args: "now".into(),
        }
    );
    assert_eq!(classify("/clear", registry), Action::SendToModel("/clear".into()));
    assert_eq!(classify("   ", registry), Action::SendToModel(String::new()));
}

#[test]
fn clear_command_resets_history() {
    let mut app = create_test_app(ScriptedService::default());
    app.coordinator.store().append_user("Hello");
    app.coordinator.record_reply("Hi there!");

    assert_eq!(run(&mut app, "/clear"), CommandResult::HistoryCleared);
    assert!(app.coordinator.store().snapshot().is_empty());
}

#[tokio::test(start_paused = true)]
async fn clear_during_turn_keeps_in_flight_result_deliverable() {
    let service = ScriptedService::new([Reply::text("late", Duration::from_secs(1))]);
    let mut app = create_test_app(service);

    let pending = app.coordinator.submit("hello");
    assert_eq!(run(&mut app, "/clear"), CommandResult::HistoryCleared);

    let event = pending.await;
    assert_eq!(
        app.coordinator.resolve(event),
        Some(TurnResult::Success("late".into()))
    );
}

#[test]
fn exit_command_requests_exit() {
    let mut app = create_test_app(ScriptedService::default());
    assert_eq!(run(&mut app, "/exit"), CommandResult::Exit);
}

#[test]
fn help_lists_every_command_sorted() {
    let mut app = create_test_app(ScriptedService::default());
    let CommandResult::Message(text) = run(&mut app, "/help") else {
        panic!("expected help text");
    };

    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Available commands:"));
    let names: Vec<_> = lines
        .map(|line| line.split(" - ").next().unwrap())
        .collect();
    assert_eq!(names, vec!["/clear", "/config", "/exit", "/help"]);
    assert!(text.contains("/clear - Clear conversation history"));
}

#[test]
fn matching_commands_requires_slash_prefix() {
    assert_eq!(matching_commands("/c"), vec!["/clear", "/config"]);
    assert_eq!(matching_commands("/"), vec!["/clear", "/config", "/exit", "/help"]);
    assert!(matching_commands("c").is_empty());
    assert!(matching_commands("").is_empty());
    assert!(matching_commands("/x").is_empty());
}

#[test]
fn config_without_args_shows_masked_settings() {
    let config = Config {
        api_key: Some("sk-or-abcdefgh1234".into()),
        ..Default::default()
    };
    let mut app = create_test_app_with_config(ScriptedService::default(), config, None);

    let CommandResult::Message(text) = run(&mut app, "/config") else {
        panic!("expected config summary");
    };
    assert!(text.contains("Configuration (not saved):"));
    assert!(text.contains("api-key: sk-o...1234"));
    assert!(!text.contains("abcdefgh"));
    assert!(text.contains("base-url: (unset)"));
}

#[test]
fn config_model_updates_coordinator_and_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    let mut app = create_test_app_with_config(
        ScriptedService::default(),
        Config::default(),
        Some(path.clone()),
    );

    assert_eq!(
        run(&mut app, "/config model anthropic/claude-3-haiku-20240307"),
        CommandResult::Message("Set model to: anthropic/claude-3-haiku-20240307".into())
    );
    assert_eq!(app.coordinator.model(), "anthropic/claude-3-haiku-20240307");
    let saved = Config::load_from_path(&path).unwrap();
    assert_eq!(
        saved.model.as_deref(),
        Some("anthropic/claude-3-haiku-20240307")
    );
}

#[test]
fn config_key_echo_is_masked() {
    let mut app = create_test_app(ScriptedService::default());
    assert_eq!(
        run(&mut app, "/config api-key sk-or-v1-secretvalue"),
        CommandResult::Message("Set api-key to: sk-o...alue".into())
    );
}

#[test]
fn config_rejects_unknown_keys_and_missing_values() {
    let mut app = create_test_app(ScriptedService::default());

    let CommandResult::Message(text) = run(&mut app, "/config theme dark") else {
        panic!("expected error text");
    };
    assert!(text.starts_with("Unknown config key: theme"));

    let CommandResult::Message(text) = run(&mut app, "/config model") else {
        panic!("expected usage text");
    };
    assert!(text.starts_with("Usage: /config"));
}

#[test]
fn commands_do_not_touch_history_unless_clearing() {
    let mut app = create_test_app(ScriptedService::default());
    app.coordinator.store().append_user("keep me");

    run(&mut app, "/help");
    run(&mut app, "/config");

    assert_eq!(
        app.coordinator.store().snapshot(),
        vec![Message::user("keep me")]
    );
}
