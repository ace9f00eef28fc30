//! Config serialization to TOML
//!
//! Single source of truth for config file format. API keys and the admin
//! password are never written.

use super::Config;

/// Quote a string as a TOML basic string
fn quoted(s: &str) -> String {
    toml::Value::String(s.to_string()).to_string()
}

impl Config {
    /// Serialize voice-name -> voice-id mapping (commented example when empty)
    pub(super) fn voice_ids_to_toml(&self) -> String {
        if self.speech.voice_ids.is_empty() {
            return r#"
# Map voice names to provider voice ids. Unmapped names are sent as-is.
# [speech.voice_ids]
# George = "JBFqnCBsd6RMkjVDRZzb"
# Alice = "Xb7hH8MSUJpSbSDYk0k2"
"#
            .to_string();
        }

        // BTreeMap keeps output order deterministic
        let mut output = String::from("\n[speech.voice_ids]\n");
        for (name, id) in &self.speech.voice_ids {
            output.push_str(&format!("{} = {}\n", quoted(name), quoted(id)));
        }
        output
    }

    /// Serialize config to TOML string
    pub fn to_toml(&self) -> String {
        format!(
            r#"# afrilearn configuration
#
# Secrets are read from the environment only:
#   AIML_API_KEY        chat completion
#   ELEVENLABS_API_KEY  text-to-speech
#   ADMIN_PASS          admin dashboards (unset disables them)

# HTTP bind address (AFRILEARN_BIND overrides)
bind_addr = {bind}

# Directory for mentorship_requests.csv and career_requests.csv
# (AFRILEARN_DATA_DIR overrides)
data_dir = {data_dir}

# ─────────────────────────────────────────────────────────────────────────────
# CHAT COMPLETION (OpenAI-compatible)
# ─────────────────────────────────────────────────────────────────────────────
[chat]
api_base = {chat_base}
model = {chat_model}
temperature = {chat_temperature}
max_tokens = {chat_max_tokens}
timeout_secs = {chat_timeout}

# ─────────────────────────────────────────────────────────────────────────────
# TEXT-TO-SPEECH
# ─────────────────────────────────────────────────────────────────────────────
[speech]
api_base = {speech_base}
model = {speech_model}
timeout_secs = {speech_timeout}
{voice_ids}
# ─────────────────────────────────────────────────────────────────────────────
# OFFLINE MODE (local text-generation server)
# ─────────────────────────────────────────────────────────────────────────────
[offline]
url = {offline_url}
model = {offline_model}
max_length = {offline_max_length}
timeout_secs = {offline_timeout}

# ─────────────────────────────────────────────────────────────────────────────
# TUTOR SESSIONS
# ─────────────────────────────────────────────────────────────────────────────
[sessions]
# Drop sessions idle this long (0 = never)
idle_timeout_secs = {session_idle}
sweep_interval_secs = {session_sweep}

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = {log_level}
# JSON file logging (in addition to stdout)
file_enabled = {log_file_enabled}
file_dir = {log_file_dir}
file_rotation = {log_file_rotation}  # hourly, daily, never
file_prefix = {log_file_prefix}
"#,
            bind = quoted(&self.bind_addr.to_string()),
            data_dir = quoted(&self.data_dir.display().to_string()),
            chat_base = quoted(&self.chat.api_base),
            chat_model = quoted(&self.chat.model),
            chat_temperature = format_float(self.chat.temperature),
            chat_max_tokens = self.chat.max_tokens,
            chat_timeout = self.chat.timeout_secs,
            speech_base = quoted(&self.speech.api_base),
            speech_model = quoted(&self.speech.model),
            speech_timeout = self.speech.timeout_secs,
            voice_ids = self.voice_ids_to_toml(),
            offline_url = quoted(&self.offline.url),
            offline_model = quoted(&self.offline.model),
            offline_max_length = self.offline.max_length,
            offline_timeout = self.offline.timeout_secs,
            session_idle = self.sessions.idle_timeout_secs,
            session_sweep = self.sessions.sweep_interval_secs,
            log_level = quoted(&self.logging.level),
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = quoted(&self.logging.file_dir.display().to_string()),
            log_file_rotation = quoted(self.logging.file_rotation.as_str()),
            log_file_prefix = quoted(&self.logging.file_prefix),
        )
    }
}

/// TOML floats need a decimal point ("1" would parse as an integer)
fn format_float(value: f32) -> String {
    let s = value.to_string();
    if s.contains('.') || s.contains('e') || s.contains("inf") || s.contains("NaN") {
        s
    } else {
        format!("{}.0", s)
    }
}
