//! Backend configuration: chat completion, speech synthesis, offline inference
//!
//! API keys are resolved from environment variables only and are never
//! written back to the config file.

use serde::Deserialize;
use std::collections::BTreeMap;

// ─────────────────────────────────────────────────────────────────────────────
// Chat Completion
// ─────────────────────────────────────────────────────────────────────────────

/// Hosted chat-completion settings (OpenAI-compatible API)
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// API base URL, `/chat/completions` is appended
    pub api_base: String,
    /// Bearer token (from AIML_API_KEY)
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Response cap in tokens
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.aimlapi.com/v1".to_string(),
            api_key: None,
            model: "mistralai/Mistral-7B-Instruct-v0.2".to_string(),
            temperature: 0.7,
            max_tokens: 256,
            timeout_secs: 120,
        }
    }
}

/// Chat settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileChatConfig {
    pub api_base: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
}

impl ChatConfig {
    /// Create from file config with defaults; key comes from the environment
    pub fn from_file(file: Option<FileChatConfig>, api_key: Option<String>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            api_base: file.api_base.unwrap_or(defaults.api_base),
            api_key: api_key.filter(|k| !k.is_empty()),
            model: file.model.unwrap_or(defaults.model),
            temperature: file.temperature.unwrap_or(defaults.temperature),
            max_tokens: file.max_tokens.unwrap_or(defaults.max_tokens),
            timeout_secs: file.timeout_secs.unwrap_or(defaults.timeout_secs),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Speech Synthesis
// ─────────────────────────────────────────────────────────────────────────────

/// Text-to-speech settings (ElevenLabs-compatible API)
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    /// API base URL, `/text-to-speech/{voice}` is appended
    pub api_base: String,
    /// Key sent as `xi-api-key` (from ELEVENLABS_API_KEY)
    pub api_key: Option<String>,
    /// Speech model identifier
    pub model: String,
    /// Voice name -> provider voice id. Unmapped names are sent as-is.
    pub voice_ids: BTreeMap<String, String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.elevenlabs.io/v1".to_string(),
            api_key: None,
            model: "eleven_multilingual_v2".to_string(),
            voice_ids: BTreeMap::new(),
            timeout_secs: 120,
        }
    }
}

/// Speech settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileSpeechConfig {
    pub api_base: Option<String>,
    pub model: Option<String>,
    pub voice_ids: Option<BTreeMap<String, String>>,
    pub timeout_secs: Option<u64>,
}

impl SpeechConfig {
    pub fn from_file(file: Option<FileSpeechConfig>, api_key: Option<String>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            api_base: file.api_base.unwrap_or(defaults.api_base),
            api_key: api_key.filter(|k| !k.is_empty()),
            model: file.model.unwrap_or(defaults.model),
            voice_ids: file.voice_ids.unwrap_or(defaults.voice_ids),
            timeout_secs: file.timeout_secs.unwrap_or(defaults.timeout_secs),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Offline Inference
// ─────────────────────────────────────────────────────────────────────────────

/// Local text-generation server used when a session enables offline mode
#[derive(Debug, Clone)]
pub struct OfflineConfig {
    /// Generation endpoint
    pub url: String,
    /// Model label (informational, sent along with the request)
    pub model: String,
    /// Output length cap passed to the model
    pub max_length: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8081/generate".to_string(),
            model: "castorini/afriberta_base".to_string(),
            max_length: 50,
            timeout_secs: 120,
        }
    }
}

/// Offline settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileOfflineConfig {
    pub url: Option<String>,
    pub model: Option<String>,
    pub max_length: Option<u32>,
    pub timeout_secs: Option<u64>,
}

impl OfflineConfig {
    pub fn from_file(file: Option<FileOfflineConfig>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            url: file.url.unwrap_or(defaults.url),
            model: file.model.unwrap_or(defaults.model),
            max_length: file.max_length.unwrap_or(defaults.max_length),
            timeout_secs: file.timeout_secs.unwrap_or(defaults.timeout_secs),
        }
    }
}
