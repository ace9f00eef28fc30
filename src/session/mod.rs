// Session module - per-user chat state
//
// A session holds the active language, the offline flag, the selected voice
// and the ordered transcript. All mutation goes through the transition
// functions on SessionState so the language/transcript invariant holds:
// after a language change the transcript is exactly one assistant greeting
// in the new language.

pub mod manager;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use manager::{SessionId, SessionManager, SharedSession};

// ─────────────────────────────────────────────────────────────────────────────
// Language
// ─────────────────────────────────────────────────────────────────────────────

/// Supported UI/tutor languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    French,
    Swahili,
}

impl Language {
    /// All languages in selector order
    pub const ALL: [Language; 3] = [Language::English, Language::French, Language::Swahili];

    /// Display name, also used inside the tutor's system prompt
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::French => "French",
            Self::Swahili => "Swahili",
        }
    }

    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::French => "fr",
            Self::Swahili => "sw",
        }
    }

    /// Parse a display name or code (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s) || l.code().eq_ignore_ascii_case(s))
    }

    /// Voices offered for this language (first entry is the default)
    pub fn voices(&self) -> &'static [&'static str] {
        match self {
            Self::English => &["George", "Alice"],
            Self::French => &["Georges", "Alice"],
            Self::Swahili => &["George", "Alice"],
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opening assistant message for a language
pub fn greeting(language: Language) -> &'static str {
    match language {
        Language::English => "Jambo! I'm your AI tutor. Ask me anything about school subjects!",
        Language::French => {
            "Bonjour! Je suis votre tuteur IA. Posez-moi des questions sur les sujets scolaires!"
        }
        Language::Swahili => "Habari! Mimi ni mwalimu wako wa AI. Niulize chochote kuhusu masomo!",
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────────────────────────────────────

/// Who authored a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single transcript entry. Fields are private so a message can't be
/// edited after it's been appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    role: Role,
    content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session State
// ─────────────────────────────────────────────────────────────────────────────

/// Returned by `set_language` so the caller knows whether to redraw everything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageChange {
    /// Language was already active - nothing changed
    Unchanged,
    /// Language switched and transcript was reset; full re-render required
    Rerender,
}

/// Rejected voice selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVoice {
    pub voice: String,
    pub language: Language,
}

impl fmt::Display for UnknownVoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Voice '{}' is not available for {} (choose one of: {})",
            self.voice,
            self.language,
            self.language.voices().join(", ")
        )
    }
}

impl std::error::Error for UnknownVoice {}

/// Per-session state
#[derive(Debug, Clone)]
pub struct SessionState {
    language: Language,
    offline_mode: bool,
    transcript: Vec<ChatMessage>,
    selected_voice: String,
}

impl Default for SessionState {
    fn default() -> Self {
        let language = Language::default();
        Self {
            language,
            offline_mode: false,
            transcript: Vec::new(),
            selected_voice: language.voices()[0].to_string(),
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn offline_mode(&self) -> bool {
        self.offline_mode
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn selected_voice(&self) -> &str {
        &self.selected_voice
    }

    /// Switch language. A real change wipes the transcript down to the new
    /// greeting so no stale-language message survives.
    pub fn set_language(&mut self, language: Language) -> LanguageChange {
        if language == self.language {
            return LanguageChange::Unchanged;
        }

        self.language = language;
        self.transcript = vec![ChatMessage::assistant(greeting(language))];

        // Keep the voice if the new language offers it, otherwise fall back to its default
        if !language.voices().contains(&self.selected_voice.as_str()) {
            self.selected_voice = language.voices()[0].to_string();
        }

        LanguageChange::Rerender
    }

    /// Flip the offline flag. Transcript is untouched.
    pub fn set_offline_mode(&mut self, offline: bool) {
        self.offline_mode = offline;
    }

    /// Choose a voice from the current language's list
    pub fn select_voice(&mut self, voice: &str) -> Result<(), UnknownVoice> {
        match self.language.voices().iter().find(|v| **v == voice) {
            Some(v) => {
                self.selected_voice = (*v).to_string();
                Ok(())
            }
            None => Err(UnknownVoice {
                voice: voice.to_string(),
                language: self.language,
            }),
        }
    }

    /// Push a message to the end of the transcript (no size cap)
    pub fn append_message(&mut self, message: ChatMessage) {
        self.transcript.push(message);
    }

    /// Seed the greeting the first time the chat view is shown.
    /// From here on the transcript is never empty.
    pub fn enter_home(&mut self) {
        if self.transcript.is_empty() {
            self.transcript
                .push(ChatMessage::assistant(greeting(self.language)));
        }
    }

    /// Latest message if it was written by the assistant
    pub fn last_assistant_message(&self) -> Option<&ChatMessage> {
        self.transcript
            .last()
            .filter(|m| m.role() == Role::Assistant)
    }

    /// Serializable copy for the HTTP layer
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            language: self.language,
            offline_mode: self.offline_mode,
            selected_voice: self.selected_voice.clone(),
            voices: self.language.voices().to_vec(),
            transcript: self.transcript.clone(),
        }
    }
}

/// Point-in-time view of a session, returned after every command
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub language: Language,
    pub offline_mode: bool,
    pub selected_voice: String,
    pub voices: Vec<&'static str>,
    pub transcript: Vec<ChatMessage>,
}
