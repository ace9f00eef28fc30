//! Configuration tests
//!
//! The default template must parse back into FileConfig, every persisted
//! field must survive the round trip, and secrets must never be written.

use super::*;
use std::collections::HashMap;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Round-trip tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_config_roundtrip_default() {
    let toml_str = Config::default().to_toml();

    let parsed: Result<FileConfig, _> = toml::from_str(&toml_str);
    assert!(
        parsed.is_ok(),
        "Default config should round-trip.\nTOML:\n{}\nError: {:?}",
        toml_str,
        parsed.err()
    );
}

#[test]
fn test_config_roundtrip_preserves_values() {
    let mut config = Config::default();
    config.bind_addr = "0.0.0.0:9000".parse().unwrap();
    config.data_dir = PathBuf::from("/var/lib/afrilearn");
    config.chat.model = "mistralai/Mixtral-8x7B".to_string();
    config.chat.temperature = 1.0;
    config.chat.max_tokens = 512;
    config.speech.voice_ids.insert("Alice".to_string(), "abc123".to_string());
    config.offline.max_length = 80;
    config.sessions.idle_timeout_secs = 0;
    config.sessions.sweep_interval_secs = 15;
    config.logging.file_enabled = true;
    config.logging.file_rotation = LogRotation::Hourly;

    let file: FileConfig = toml::from_str(&config.to_toml()).unwrap();
    let back = Config::resolve(file, env_from(&[])).unwrap();

    assert_eq!(back.bind_addr, config.bind_addr);
    assert_eq!(back.data_dir, config.data_dir);
    assert_eq!(back.chat.model, config.chat.model);
    assert_eq!(back.chat.temperature, 1.0);
    assert_eq!(back.chat.max_tokens, 512);
    assert_eq!(back.speech.voice_ids.get("Alice").map(String::as_str), Some("abc123"));
    assert_eq!(back.offline.max_length, 80);
    assert_eq!(back.sessions.idle_timeout(), None);
    assert_eq!(back.sessions.sweep_interval_secs, 15);
    assert!(back.logging.file_enabled);
    assert_eq!(back.logging.file_rotation, LogRotation::Hourly);
}

#[test]
fn test_secrets_never_serialized() {
    let mut config = Config::default();
    config.admin_pass = Some("hunter2".to_string());
    config.chat.api_key = Some("sk-chat-secret".to_string());
    config.speech.api_key = Some("xi-speech-secret".to_string());

    let toml_str = config.to_toml();
    assert!(!toml_str.contains("hunter2"));
    assert!(!toml_str.contains("sk-chat-secret"));
    assert!(!toml_str.contains("xi-speech-secret"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Precedence
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_defaults_without_file_or_env() {
    let config = Config::resolve(FileConfig::default(), env_from(&[])).unwrap();
    assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8501");
    assert_eq!(config.data_dir, PathBuf::from("."));
    assert!(config.admin_pass.is_none());
    assert!(!config.chat.is_configured());
    assert!(!config.speech.is_configured());
    assert_eq!(config.offline.max_length, 50);
}

#[test]
fn test_env_overrides_file() {
    let file: FileConfig = toml::from_str(
        r#"
bind_addr = "127.0.0.1:7000"
data_dir = "/from/file"
"#,
    )
    .unwrap();

    let config = Config::resolve(
        file,
        env_from(&[
            ("AFRILEARN_BIND", "0.0.0.0:8600"),
            ("ADMIN_PASS", "pw"),
            ("AIML_API_KEY", "chat-key"),
            ("ELEVENLABS_API_KEY", "speech-key"),
        ]),
    )
    .unwrap();

    assert_eq!(config.bind_addr.to_string(), "0.0.0.0:8600");
    assert_eq!(config.data_dir, PathBuf::from("/from/file"));
    assert_eq!(config.admin_pass.as_deref(), Some("pw"));
    assert_eq!(config.chat.api_key.as_deref(), Some("chat-key"));
    assert_eq!(config.speech.api_key.as_deref(), Some("speech-key"));
}

#[test]
fn test_empty_secrets_are_unset() {
    let config = Config::resolve(
        FileConfig::default(),
        env_from(&[("ADMIN_PASS", ""), ("AIML_API_KEY", "")]),
    )
    .unwrap();
    assert!(config.admin_pass.is_none());
    assert!(!config.chat.is_configured());
}

#[test]
fn test_invalid_bind_address_is_error() {
    let result = Config::resolve(
        FileConfig::default(),
        env_from(&[("AFRILEARN_BIND", "not-an-address")]),
    );
    assert!(result.is_err());
}

#[test]
fn test_unknown_rotation_falls_back_to_daily() {
    assert!("weekly".parse::<LogRotation>().is_err());
    assert_eq!("NEVER".parse::<LogRotation>(), Ok(LogRotation::Never));

    let logging = LoggingConfig::from_file(Some(FileLogging {
        file_rotation: Some("weekly".to_string()),
        level: Some("debug".to_string()),
        ..FileLogging::default()
    }));
    assert_eq!(logging.file_rotation, LogRotation::Daily);
    assert_eq!(logging.level, "debug");
}

#[test]
fn test_filter_directive() {
    let logging = LoggingConfig {
        level: "trace".to_string(),
        ..LoggingConfig::default()
    };
    assert_eq!(logging.filter_directive(), "afrilearn=trace,axum=debug");
}

#[test]
fn test_session_expiry_defaults() {
    let config = Config::resolve(FileConfig::default(), env_from(&[])).unwrap();
    assert_eq!(
        config.sessions.idle_timeout(),
        Some(std::time::Duration::from_secs(3600))
    );

    let file: FileConfig = toml::from_str("[sessions]\nsweep_interval_secs = 0\n").unwrap();
    let config = Config::resolve(file, env_from(&[])).unwrap();
    assert_eq!(config.sessions.sweep_interval_secs, 60);
}
