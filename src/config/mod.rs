//! Configuration for the tutor server
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/afrilearn/config.toml)
//! 3. Built-in defaults (lowest priority)
//!
//! Secrets (API keys, admin password) come from the environment only.

use anyhow::Context;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod backends;
mod logging;
mod serialization;
mod sessions;

#[cfg(test)]
mod tests;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports
// ─────────────────────────────────────────────────────────────────────────────

pub use backends::{
    ChatConfig, FileChatConfig, FileOfflineConfig, FileSpeechConfig, OfflineConfig, SpeechConfig,
};
pub use logging::{FileLogging, LogRotation, LoggingConfig};
pub use sessions::{FileSessionsConfig, SessionsConfig};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_BIND: &str = "127.0.0.1:8501";
const DEFAULT_DATA_DIR: &str = ".";

/// Environment variables read at startup
pub mod env {
    pub const BIND: &str = "AFRILEARN_BIND";
    pub const DATA_DIR: &str = "AFRILEARN_DATA_DIR";
    pub const ADMIN_PASS: &str = "ADMIN_PASS";
    pub const CHAT_API_KEY: &str = "AIML_API_KEY";
    pub const SPEECH_API_KEY: &str = "ELEVENLABS_API_KEY";
}

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the HTTP server to
    pub bind_addr: SocketAddr,

    /// Directory holding the two request CSV files
    pub data_dir: PathBuf,

    /// Admin shared secret (ADMIN_PASS). Unset or empty disables admin access.
    pub admin_pass: Option<String>,

    /// Hosted chat completion
    pub chat: ChatConfig,

    /// Text-to-speech
    pub speech: SpeechConfig,

    /// Local inference for offline mode
    pub offline: OfflineConfig,

    /// Idle expiry of tutor sessions
    pub sessions: SessionsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8501)),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            admin_pass: None,
            chat: ChatConfig::default(),
            speech: SpeechConfig::default(),
            offline: OfflineConfig::default(),
            sessions: SessionsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure (no secrets)
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub bind_addr: Option<String>,
    pub data_dir: Option<String>,

    /// Optional [chat] section
    pub chat: Option<FileChatConfig>,

    /// Optional [speech] section
    pub speech: Option<FileSpeechConfig>,

    /// Optional [offline] section
    pub offline: Option<FileOfflineConfig>,

    /// Optional [sessions] section
    pub sessions: Option<FileSessionsConfig>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get the config file path: ~/.config/afrilearn/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("afrilearn").join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        if path.exists() {
            return;
        }

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Config is optional
            }
        }

        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Write this config to the config file, replacing what's there
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let path = Self::config_path().context("Could not determine home directory")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, self.to_toml())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Load file config if it exists
    ///
    /// A config file that exists but can't be read or parsed is an error:
    /// a broken config should fail fast, not silently fall back to defaults.
    fn load_file_config() -> anyhow::Result<FileConfig> {
        let Some(path) = Self::config_path() else {
            return Ok(FileConfig::default());
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
            Err(e) => Err(e).with_context(|| format!("Cannot read config file {}", path.display())),
        }
    }

    /// Load configuration: env vars -> file -> defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let file = Self::load_file_config()?;
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Merge a parsed file with an environment lookup
    pub(crate) fn resolve(
        file: FileConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        // Bind address: env > file > default
        let bind_raw = lookup(env::BIND)
            .or(file.bind_addr)
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = bind_raw
            .parse()
            .with_context(|| format!("Invalid bind address '{}'", bind_raw))?;

        // Data directory: env > file > default
        let data_dir = lookup(env::DATA_DIR)
            .or(file.data_dir)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        // Secrets: env only
        let admin_pass = lookup(env::ADMIN_PASS).filter(|p| !p.is_empty());
        let chat = ChatConfig::from_file(file.chat, lookup(env::CHAT_API_KEY));
        let speech = SpeechConfig::from_file(file.speech, lookup(env::SPEECH_API_KEY));

        let offline = OfflineConfig::from_file(file.offline);
        let sessions = SessionsConfig::from_file(file.sessions);
        let logging = LoggingConfig::from_file(file.logging);

        Ok(Self {
            bind_addr,
            data_dir,
            admin_pass,
            chat,
            speech,
            offline,
            sessions,
            logging,
        })
    }
}
