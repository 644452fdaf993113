//! Anthropic backend — the Messages API for text generation.
//!
//! Anthropic has no speech endpoints; those operations return `Unsupported`
//! so flows fail loudly instead of pretending.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use manda_core::{
    GenerationError, ProviderChoice, SpeechAudio, SpeechRequest, TextRequest, TextResponse,
    Transcript, TranscriptRequest,
};

use crate::traits::GenerationBackend;

const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";
const API_VERSION: &str = "2023-06-01";

/// Anthropic Messages API client.
pub struct AnthropicBackend {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl AnthropicBackend {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: crate::registry::spec_for(ProviderChoice::Anthropic)
                .default_api_base
                .to_string(),
            api_key: api_key.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Point the backend at a different base URL (proxies, tests).
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/messages", self.api_base.trim_end_matches('/'))
    }
}

// ── Wire types ──

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<WireMessage>,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl GenerationBackend for AnthropicBackend {
    async fn generate_text(&self, request: &TextRequest) -> Result<TextResponse, GenerationError> {
        debug!(model = %self.model, "anthropic: messages request");

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&MessagesRequest {
                model: self.model.clone(),
                max_tokens: request.max_tokens,
                temperature: request.temperature,
                system: request.system.clone(),
                messages: vec![WireMessage {
                    role: "user",
                    content: request.prompt.clone(),
                }],
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "anthropic API error");
            return Err(GenerationError::api(
                ProviderChoice::Anthropic,
                status,
                &body,
            ));
        }

        let messages: MessagesResponse = response.json().await?;
        let text = messages
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| GenerationError::Backend {
                provider: ProviderChoice::Anthropic,
                message: "response contained no text block".to_string(),
            })?;

        Ok(TextResponse { text })
    }

    async fn synthesize_speech(
        &self,
        _request: &SpeechRequest,
    ) -> Result<SpeechAudio, GenerationError> {
        Err(GenerationError::Unsupported {
            provider: ProviderChoice::Anthropic,
            operation: "speech synthesis",
        })
    }

    async fn transcribe(
        &self,
        _request: &TranscriptRequest,
    ) -> Result<Transcript, GenerationError> {
        Err(GenerationError::Unsupported {
            provider: ProviderChoice::Anthropic,
            operation: "transcription",
        })
    }

    fn provider(&self) -> ProviderChoice {
        ProviderChoice::Anthropic
    }

    fn display_name(&self) -> &str {
        "Anthropic"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
