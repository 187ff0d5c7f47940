use super::*;

mod test_helpers {
    use super::*;

    pub(super) fn parse_args(argv: &[&str]) -> Args {
        Args::try_parse_from(argv)
            .unwrap_or_else(|err| panic!("argv={argv:?} should parse successfully: {err}"))
    }
}

use test_helpers::parse_args;

#[test]
fn no_subcommand_means_chat() {
    let args = parse_args(&["codeaid"]);
    assert!(args.command.is_none());
    assert!(args.model.is_none());
}

#[test]
fn model_flag_is_global() {
    for argv in [
        &["codeaid", "-m", "meta-llama/llama-3-8b-instruct"][..],
        &["codeaid", "chat", "--model", "meta-llama/llama-3-8b-instruct"][..],
    ] {
        let args = parse_args(argv);
        assert_eq!(
            args.model.as_deref(),
            Some("meta-llama/llama-3-8b-instruct"),
            "argv={argv:?}"
        );
    }
}

#[test]
fn set_collects_multi_word_values() {
    let args = parse_args(&["codeaid", "set", "model", "some", "-odd", "id"]);
    assert_eq!(
        args.command,
        Some(Commands::Set {
            key: "model".into(),
            value: vec!["some".into(), "-odd".into(), "id".into()],
        })
    );
}

#[test]
fn set_without_value_parses_empty() {
    let args = parse_args(&["codeaid", "set", "model"]);
    assert_eq!(
        args.command,
        Some(Commands::Set {
            key: "model".into(),
            value: Vec::new(),
        })
    );
}

#[test]
fn unset_and_setup_parse() {
    assert_eq!(
        parse_args(&["codeaid", "unset", "base-url"]).command,
        Some(Commands::Unset {
            key: "base-url".into()
        })
    );
    assert_eq!(parse_args(&["codeaid", "setup"]).command, Some(Commands::Setup));
}

#[test]
fn unknown_subcommand_is_rejected() {
    assert!(Args::try_parse_from(["codeaid", "deauth"]).is_err());
}

#[test]
fn first_time_setup_only_without_file_or_key() {
    assert!(needs_first_time_setup(false, None));
    assert!(!needs_first_time_setup(true, None));
    assert!(!needs_first_time_setup(false, Some("sk-env".into())));
    assert!(!needs_first_time_setup(true, Some("sk-env".into())));
}

#[test]
fn apply_set_masks_api_key_echo() {
    let mut config = Config::default();
    assert_eq!(
        apply_set(&mut config, ConfigKey::ApiKey, "sk-or-v1-0123456789"),
        "sk-o...6789"
    );
    assert_eq!(config.api_key.as_deref(), Some("sk-or-v1-0123456789"));

    assert_eq!(
        apply_set(&mut config, ConfigKey::BaseUrl, " https://example.test/v1 "),
        "https://example.test/v1"
    );
}
