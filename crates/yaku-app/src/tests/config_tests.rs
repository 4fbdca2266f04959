use clap::Parser;
use yaku_config::Config;

use crate::state::AppState;
use crate::{Args, apply_overrides};

#[test]
fn test_cli_overrides_config() {
    let args = Args::parse_from([
        "yaku",
        "--from",
        "ja",
        "--to",
        "en",
        "--provider",
        "DeepL",
        "--fallback",
        "mymemory, google",
        "--monitor",
        "こんにちは",
    ]);
    let mut config = Config::default();
    apply_overrides(&mut config, &args);

    assert_eq!(config.translator.from_lang, "ja");
    assert_eq!(config.translator.to_lang, "en");
    assert_eq!(config.translator.active_provider, "deepl");
    assert_eq!(config.translator.fallback_order, ["mymemory", "google"]);
    assert!(config.monitor.enabled);
    assert_eq!(args.text, ["こんにちは"]);
}

#[test]
fn test_no_flags_keep_defaults() {
    let args = Args::parse_from(["yaku"]);
    let mut config = Config::default();
    apply_overrides(&mut config, &args);

    assert_eq!(config.translator.to_lang, "zh");
    assert_eq!(config.translator.fallback_order.len(), 6);
    assert!(!config.monitor.enabled);
}

#[tokio::test]
async fn test_state_selects_configured_provider() {
    let mut config = Config::default();
    config.translator.active_provider = "mymemory".to_string();

    let (state, _rx) = AppState::new(config).unwrap();
    assert_eq!(state.registry.active_name().as_deref(), Some("mymemory"));
    assert_eq!(state.registry.len(), 6);
}

#[tokio::test]
async fn test_unknown_configured_provider_keeps_first() {
    let mut config = Config::default();
    config.translator.active_provider = "nonexistent".to_string();

    let (state, _rx) = AppState::new(config).unwrap();
    assert_eq!(state.registry.active_name().as_deref(), Some("google"));
}
