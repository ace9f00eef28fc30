//! Backend abstraction for tutor inference and speech
//!
//! The turn controller talks to three collaborators through traits so the
//! hosted APIs can be swapped (or mocked in tests):
//!
//! ```text
//! ChatBackend      ── OpenAiChatBackend (OpenAI-compatible /chat/completions)
//! LocalInference   ── LocalInferenceBackend (text-generation server on localhost)
//! SpeechBackend    ── ElevenLabsSpeechBackend (/text-to-speech/{voice})
//!                    Unconfigured (any of the above without credentials)
//! ```
//!
//! Clients are built once at startup and shared for the life of the process.

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;

/// Errors returned by any backend call
///
/// These never escape a chat turn: the controller turns them into a visible
/// assistant message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Backend has no credentials/endpoint configured
    NotConfigured(&'static str),
    /// Rate limit exceeded (includes retry-after hint)
    RateLimited { retry_after_secs: Option<u64> },
    /// Non-success HTTP status from the backend
    Api { status: u16, message: String },
    /// Transport failure (connect, timeout, TLS)
    Network(String),
    /// Response arrived but didn't have the expected shape
    InvalidResponse(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured(what) => write!(f, "{} backend not configured", what),
            Self::RateLimited { retry_after_secs } => {
                if let Some(secs) = retry_after_secs {
                    write!(f, "Rate limited, retry after {} seconds", secs)
                } else {
                    write!(f, "Rate limited")
                }
            }
            Self::Api { status, message } => write!(f, "API error ({}): {}", status, message),
            Self::Network(msg) => write!(f, "Network error: {}", msg),
            Self::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// Map a non-success response to a BackendError, consuming the body for the message
pub(crate) async fn error_from_response(response: reqwest::Response) -> BackendError {
    let status = response.status().as_u16();

    if status == 429 {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());
        return BackendError::RateLimited { retry_after_secs };
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    BackendError::Api { status, message }
}

// ─────────────────────────────────────────────────────────────────────────────
// Requests
// ─────────────────────────────────────────────────────────────────────────────

/// One tutor turn sent to the hosted chat model
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Persona/instructions sent as the system message
    pub system: String,
    /// The student's message
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Text to synthesize with a given voice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub text: String,
    pub voice: String,
    pub model: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Traits
// ─────────────────────────────────────────────────────────────────────────────

/// Hosted chat-completion model
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Human-readable name for logging
    fn name(&self) -> &'static str;

    /// Whether the backend has what it needs to make calls
    fn is_ready(&self) -> bool;

    /// Generate the assistant reply for one turn
    async fn complete(&self, request: &ChatRequest) -> Result<String, BackendError>;
}

/// Local text-generation model used in offline mode
#[async_trait]
pub trait LocalInference: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_ready(&self) -> bool;

    /// Continue `prompt`, producing at most `max_length` tokens
    async fn generate(&self, prompt: &str, max_length: u32) -> Result<String, BackendError>;
}

/// Text-to-speech service
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_ready(&self) -> bool;

    /// Synthesize the text, returning MP3 audio
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Bytes, BackendError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Unconfigured fallback
// ─────────────────────────────────────────────────────────────────────────────

/// Stand-in for a backend that couldn't be built (missing API key, etc.)
///
/// Every call fails with `BackendError::NotConfigured`, which the chat turn
/// renders like any other backend failure.
#[derive(Debug, Clone, Copy)]
pub struct Unconfigured(pub &'static str);

#[async_trait]
impl ChatBackend for Unconfigured {
    fn name(&self) -> &'static str {
        "unconfigured"
    }

    fn is_ready(&self) -> bool {
        false
    }

    async fn complete(&self, _request: &ChatRequest) -> Result<String, BackendError> {
        Err(BackendError::NotConfigured(self.0))
    }
}

#[async_trait]
impl LocalInference for Unconfigured {
    fn name(&self) -> &'static str {
        "unconfigured"
    }

    fn is_ready(&self) -> bool {
        false
    }

    async fn generate(&self, _prompt: &str, _max_length: u32) -> Result<String, BackendError> {
        Err(BackendError::NotConfigured(self.0))
    }
}

#[async_trait]
impl SpeechBackend for Unconfigured {
    fn name(&self) -> &'static str {
        "unconfigured"
    }

    fn is_ready(&self) -> bool {
        false
    }

    async fn synthesize(&self, _request: &SpeechRequest) -> Result<Bytes, BackendError> {
        Err(BackendError::NotConfigured(self.0))
    }
}
