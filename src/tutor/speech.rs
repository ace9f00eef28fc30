//! ElevenLabs-compatible text-to-speech client

use super::backends::{error_from_response, BackendError, SpeechBackend, SpeechRequest};
use crate::config::SpeechConfig;
use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use std::collections::BTreeMap;

pub struct ElevenLabsSpeechBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    voice_ids: BTreeMap<String, String>,
}

impl ElevenLabsSpeechBackend {
    pub fn new(config: &SpeechConfig) -> Result<Self, BackendError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(BackendError::NotConfigured("Speech"))?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::Network(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized speech backend: {} (model: {}, {} mapped voices)",
            config.api_base,
            config.model,
            config.voice_ids.len()
        );

        Ok(Self {
            client,
            base_url: config.api_base.clone(),
            api_key,
            voice_ids: config.voice_ids.clone(),
        })
    }

    /// Voice names map to provider ids when configured, otherwise pass through
    fn endpoint(&self, voice: &str) -> String {
        let voice_id = self
            .voice_ids
            .get(voice)
            .map(String::as_str)
            .unwrap_or(voice);
        format!(
            "{}/text-to-speech/{}",
            self.base_url.trim_end_matches('/'),
            voice_id
        )
    }
}

#[derive(Debug, Serialize)]
struct SynthesisBody<'a> {
    text: &'a str,
    model_id: &'a str,
}

#[async_trait]
impl SpeechBackend for ElevenLabsSpeechBackend {
    fn name(&self) -> &'static str {
        "elevenlabs"
    }

    fn is_ready(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn synthesize(&self, request: &SpeechRequest) -> Result<Bytes, BackendError> {
        let response = self
            .client
            .post(self.endpoint(&request.voice))
            .header("xi-api-key", &self.api_key)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(&SynthesisBody {
                text: &request.text,
                model_id: &request.model,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(BackendError::InvalidResponse("empty audio stream".into()));
        }
        Ok(audio)
    }
}
