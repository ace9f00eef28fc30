//! Offline-mode text generation against a local model server
//!
//! Speaks the Hugging Face text-generation shape:
//! `{"inputs": ..., "parameters": {"max_new_tokens": N}}` →
//! `[{"generated_text": ...}]` (a bare object is accepted too).

use super::backends::{error_from_response, BackendError, LocalInference};
use crate::config::OfflineConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub struct LocalInferenceBackend {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl LocalInferenceBackend {
    pub fn new(config: &OfflineConfig) -> Result<Self, BackendError> {
        if config.url.trim().is_empty() {
            return Err(BackendError::NotConfigured("Offline"));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::Network(format!("Failed to create HTTP client: {}", e)))?;

        tracing::debug!(url = %config.url, model = %config.model, "Initialized offline backend");

        Ok(Self {
            client,
            url: config.url.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl LocalInference for LocalInferenceBackend {
    fn name(&self) -> &'static str {
        "text-generation"
    }

    fn is_ready(&self) -> bool {
        true
    }

    async fn generate(&self, prompt: &str, max_length: u32) -> Result<String, BackendError> {
        let body = GenerateRequest {
            inputs: prompt,
            model: &self.model,
            parameters: GenerateParameters {
                max_new_tokens: max_length,
            },
        };

        let response = self.client.post(&self.url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let generated: GenerateResponse = response.json().await?;
        generated.into_text()
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
    model: &'a str,
    parameters: GenerateParameters,
}

#[derive(Debug, Serialize)]
struct GenerateParameters {
    max_new_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct Generation {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerateResponse {
    Batch(Vec<Generation>),
    Single(Generation),
}

impl GenerateResponse {
    fn into_text(self) -> Result<String, BackendError> {
        match self {
            Self::Single(g) => Ok(g.generated_text),
            Self::Batch(batch) => batch
                .into_iter()
                .next()
                .map(|g| g.generated_text)
                .ok_or_else(|| BackendError::InvalidResponse("empty generation batch".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_batch_and_single() {
        let batch: GenerateResponse =
            serde_json::from_str(r#"[{"generated_text":"Habari"}]"#).unwrap();
        assert_eq!(batch.into_text().unwrap(), "Habari");

        let single: GenerateResponse =
            serde_json::from_str(r#"{"generated_text":"Jambo"}"#).unwrap();
        assert_eq!(single.into_text().unwrap(), "Jambo");

        let empty: GenerateResponse = serde_json::from_str("[]").unwrap();
        assert!(empty.into_text().is_err());
    }

    #[test]
    fn test_empty_url_is_unconfigured() {
        let config = OfflineConfig {
            url: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            LocalInferenceBackend::new(&config),
            Err(BackendError::NotConfigured("Offline"))
        ));
    }
}
