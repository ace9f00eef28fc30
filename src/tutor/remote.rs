//! OpenAI-compatible chat completion client
//!
//! Works with any endpoint exposing `POST {api_base}/chat/completions` with
//! bearer auth (AIML API, OpenAI, OpenRouter, ...).

use super::backends::{error_from_response, BackendError, ChatBackend, ChatRequest};
use crate::config::ChatConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Remote chat backend
pub struct OpenAiChatBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiChatBackend {
    /// Build the client
    ///
    /// # Errors
    /// `NotConfigured` if no API key is set, `Network` if the HTTP client can't be created
    pub fn new(config: &ChatConfig) -> Result<Self, BackendError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(BackendError::NotConfigured("Chat"))?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::Network(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized chat backend: {} (model: {})",
            config.api_base,
            config.model
        );

        Ok(Self {
            client,
            base_url: config.api_base.clone(),
            api_key,
            model: config.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn build_body<'a>(&'a self, request: &'a ChatRequest) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                WireMessage {
                    role: "system",
                    content: &request.system,
                },
                WireMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[async_trait]
impl ChatBackend for OpenAiChatBackend {
    fn name(&self) -> &'static str {
        "openai-compatible"
    }

    fn is_ready(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String, BackendError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&self.build_body(request))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let completion: ChatCompletion = response.json().await?;
        extract_content(completion)
    }
}

/// Pull the first choice's text out of a completion
fn extract_content(completion: ChatCompletion) -> Result<String, BackendError> {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| BackendError::InvalidResponse("completion has no message content".into()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ChatConfig {
        ChatConfig {
            api_key: Some("sk-test".to_string()),
            api_base: "https://example.test/v1/".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_requires_api_key() {
        let result = OpenAiChatBackend::new(&ChatConfig::default());
        assert!(matches!(result, Err(BackendError::NotConfigured("Chat"))));
    }

    #[tokio::test]
    async fn test_request_body_shape() {
        let backend = OpenAiChatBackend::new(&config()).unwrap();
        assert_eq!(backend.endpoint(), "https://example.test/v1/chat/completions");

        let request = ChatRequest {
            system: "Respond in French".to_string(),
            user: "Combien font 2+2?".to_string(),
            temperature: 0.7,
            max_tokens: 256,
        };
        let body = serde_json::to_value(backend.build_body(&request)).unwrap();

        assert_eq!(body["model"], "mistralai/Mistral-7B-Instruct-v0.2");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "Respond in French");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Combien font 2+2?");
        assert_eq!(body["max_tokens"], 256);
    }

    #[test]
    fn test_extract_content() {
        let completion: ChatCompletion = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"4"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_content(completion).unwrap(), "4");

        let empty: ChatCompletion = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            extract_content(empty),
            Err(BackendError::InvalidResponse(_))
        ));

        let null_content: ChatCompletion =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(extract_content(null_content).is_err());
    }
}
