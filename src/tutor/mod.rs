// Tutor module - conversation turn controller
//
// One chat turn: append the student's message, ask either the local model
// (offline mode) or the hosted chat model, append the reply, hand back the
// transcript. Backend failures never propagate past `respond`: they become an
// assistant message prefixed with "⚠️ Error:" and are also reported in the
// outcome so the HTTP layer can flag them.

pub mod backends;
pub mod local;
pub mod remote;
pub mod speech;

use crate::config::Config;
use crate::session::{ChatMessage, Language, SessionState};
use backends::{ChatBackend, ChatRequest, LocalInference, SpeechBackend, SpeechRequest};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Instant;

pub use backends::{BackendError, Unconfigured};

/// Prefix of the assistant message written when a backend call fails
pub const ERROR_PREFIX: &str = "⚠️ Error:";

/// Build the tutor persona instructions for a language
pub fn system_prompt(language: Language) -> String {
    format!(
        "You are a friendly tutor for African students. Follow these rules:\n\
         1. Respond in {language}\n\
         2. Use examples from local culture (markets, farming, traditions)\n\
         3. Keep answers under 3 sentences\n\
         4. For math/science, use simple terms\n"
    )
}

/// Generation parameters applied to every turn
#[derive(Debug, Clone)]
pub struct TurnSettings {
    pub temperature: f32,
    pub max_tokens: u32,
    pub offline_max_length: u32,
    pub speech_model: String,
}

impl Default for TurnSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 256,
            offline_max_length: 50,
            speech_model: "eleven_multilingual_v2".to_string(),
        }
    }
}

impl TurnSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            temperature: config.chat.temperature,
            max_tokens: config.chat.max_tokens,
            offline_max_length: config.offline.max_length,
            speech_model: config.speech.model.clone(),
        }
    }
}

/// Result of one chat turn
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Assistant text appended to the transcript (error text on failure)
    pub reply: String,
    /// Set when the backend failed and `reply` is the fail-soft message
    pub failure: Option<BackendError>,
}

/// Conversation turn controller
///
/// Holds the backend clients built once at startup.
#[derive(Clone)]
pub struct Tutor {
    chat: Arc<dyn ChatBackend>,
    offline: Arc<dyn LocalInference>,
    speech: Arc<dyn SpeechBackend>,
    settings: TurnSettings,
}

impl Tutor {
    pub fn new(
        chat: Arc<dyn ChatBackend>,
        offline: Arc<dyn LocalInference>,
        speech: Arc<dyn SpeechBackend>,
        settings: TurnSettings,
    ) -> Self {
        Self {
            chat,
            offline,
            speech,
            settings,
        }
    }

    /// Build real backends from config, substituting `Unconfigured` for any
    /// that can't be created
    pub fn from_config(config: &Config) -> Self {
        let chat: Arc<dyn ChatBackend> = match remote::OpenAiChatBackend::new(&config.chat) {
            Ok(backend) => Arc::new(backend),
            Err(e) => {
                tracing::warn!("Chat backend unavailable: {}", e);
                Arc::new(Unconfigured("Chat"))
            }
        };

        let offline: Arc<dyn LocalInference> =
            match local::LocalInferenceBackend::new(&config.offline) {
                Ok(backend) => Arc::new(backend),
                Err(e) => {
                    tracing::warn!("Offline backend unavailable: {}", e);
                    Arc::new(Unconfigured("Offline"))
                }
            };

        let speech: Arc<dyn SpeechBackend> =
            match speech::ElevenLabsSpeechBackend::new(&config.speech) {
                Ok(backend) => Arc::new(backend),
                Err(e) => {
                    tracing::warn!("Speech backend unavailable: {}", e);
                    Arc::new(Unconfigured("Speech"))
                }
            };

        Self::new(chat, offline, speech, TurnSettings::from_config(config))
    }

    pub fn chat_ready(&self) -> bool {
        self.chat.is_ready()
    }

    pub fn offline_ready(&self) -> bool {
        self.offline.is_ready()
    }

    pub fn speech_ready(&self) -> bool {
        self.speech.is_ready()
    }

    /// Run one chat turn against the session
    pub async fn respond(&self, state: &mut SessionState, user_text: &str) -> TurnOutcome {
        state.append_message(ChatMessage::user(user_text));

        let start = Instant::now();
        let result = if state.offline_mode() {
            self.offline
                .generate(user_text, self.settings.offline_max_length)
                .await
        } else {
            let request = ChatRequest {
                system: system_prompt(state.language()),
                user: user_text.to_string(),
                temperature: self.settings.temperature,
                max_tokens: self.settings.max_tokens,
            };
            self.chat.complete(&request).await
        };

        let backend = if state.offline_mode() {
            self.offline.name()
        } else {
            self.chat.name()
        };

        let (reply, failure) = match result {
            Ok(text) => {
                tracing::debug!(
                    backend,
                    language = %state.language(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Tutor turn completed"
                );
                (text, None)
            }
            Err(e) => {
                tracing::warn!(
                    backend,
                    error = %e,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Tutor turn failed"
                );
                (format!("{} {}", ERROR_PREFIX, e), Some(e))
            }
        };

        state.append_message(ChatMessage::assistant(reply.clone()));

        TurnOutcome { reply, failure }
    }

    /// Speak the latest assistant message with the session's voice.
    ///
    /// Returns `Ok(None)` when the transcript doesn't end with an assistant message.
    pub async fn speak_latest(&self, state: &SessionState) -> Result<Option<Bytes>, BackendError> {
        let Some(message) = state.last_assistant_message() else {
            return Ok(None);
        };

        let request = SpeechRequest {
            text: message.content().to_string(),
            voice: state.selected_voice().to_string(),
            model: self.settings.speech_model.clone(),
        };

        let backend = self.speech.name();
        match self.speech.synthesize(&request).await {
            Ok(audio) => {
                tracing::debug!(backend, voice = %request.voice, bytes = audio.len(), "Speech synthesized");
                Ok(Some(audio))
            }
            Err(e) => {
                tracing::warn!(backend, voice = %request.voice, error = %e, "Speech synthesis failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording mock backends shared by tests across the crate

    use super::backends::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::Mutex;

    /// Chat backend that records requests and replays a fixed result
    pub struct MockChat {
        pub reply: Result<String, BackendError>,
        pub requests: Mutex<Vec<ChatRequest>>,
    }

    impl MockChat {
        pub fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(error: BackendError) -> Self {
            Self {
                reply: Err(error),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatBackend for MockChat {
        fn name(&self) -> &'static str {
            "mock-chat"
        }

        fn is_ready(&self) -> bool {
            true
        }

        async fn complete(&self, request: &ChatRequest) -> Result<String, BackendError> {
            self.requests.lock().unwrap().push(request.clone());
            self.reply.clone()
        }
    }

    /// Offline backend that records (prompt, max_length)
    pub struct MockLocal {
        pub reply: Result<String, BackendError>,
        pub calls: Mutex<Vec<(String, u32)>>,
    }

    impl MockLocal {
        pub fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(error: BackendError) -> Self {
            Self {
                reply: Err(error),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LocalInference for MockLocal {
        fn name(&self) -> &'static str {
            "mock-local"
        }

        fn is_ready(&self) -> bool {
            true
        }

        async fn generate(&self, prompt: &str, max_length: u32) -> Result<String, BackendError> {
            self.calls
                .lock()
                .unwrap()
                .push((prompt.to_string(), max_length));
            self.reply.clone()
        }
    }

    /// Speech backend returning canned audio
    pub struct MockSpeech {
        pub reply: Result<Bytes, BackendError>,
        pub requests: Mutex<Vec<SpeechRequest>>,
    }

    impl MockSpeech {
        pub fn ok(audio: &'static [u8]) -> Self {
            Self {
                reply: Ok(Bytes::from_static(audio)),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(error: BackendError) -> Self {
            Self {
                reply: Err(error),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SpeechBackend for MockSpeech {
        fn name(&self) -> &'static str {
            "mock-speech"
        }

        fn is_ready(&self) -> bool {
            true
        }

        async fn synthesize(&self, request: &SpeechRequest) -> Result<Bytes, BackendError> {
            self.requests.lock().unwrap().push(request.clone());
            self.reply.clone()
        }
    }
}
