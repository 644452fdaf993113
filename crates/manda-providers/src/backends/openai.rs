//! OpenAI backend — chat completions for text, plus the audio endpoints
//! for speech synthesis and transcription.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use manda_core::{
    GenerationError, ProviderChoice, SpeechAudio, SpeechRequest, TextRequest, TextResponse,
    Transcript, TranscriptRequest,
};

use crate::traits::GenerationBackend;

const DEFAULT_TEXT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_SPEECH_MODEL: &str = "gpt-4o-mini-tts";
const DEFAULT_TRANSCRIBE_MODEL: &str = "whisper-1";
const DEFAULT_VOICE: &str = "alloy";

/// OpenAI client covering `/chat/completions`, `/audio/speech`, and
/// `/audio/transcriptions`.
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    text_model: String,
}

impl OpenAiBackend {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: crate::registry::spec_for(ProviderChoice::Openai)
                .default_api_base
                .to_string(),
            api_key: api_key.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
        }
    }

    /// Point the backend at a different base URL (proxies, tests).
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), path)
    }
}

// ── Wire types ──

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct SpeechBody {
    model: String,
    input: String,
    voice: String,
    response_format: &'static str,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[async_trait]
impl GenerationBackend for OpenAiBackend {
    async fn generate_text(&self, request: &TextRequest) -> Result<TextResponse, GenerationError> {
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: request.prompt.clone(),
        });

        debug!(model = %self.text_model, "openai: chat completion");

        let response = self
            .client
            .post(self.url("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&ChatRequest {
                model: self.text_model.clone(),
                messages,
                max_tokens: request.max_tokens,
                temperature: request.temperature,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "openai chat API error");
            return Err(GenerationError::api(ProviderChoice::Openai, status, &body));
        }

        let chat: ChatResponse = response.json().await?;
        let text = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GenerationError::Backend {
                provider: ProviderChoice::Openai,
                message: "response contained no text".to_string(),
            })?;

        Ok(TextResponse { text })
    }

    async fn synthesize_speech(
        &self,
        request: &SpeechRequest,
    ) -> Result<SpeechAudio, GenerationError> {
        let voice = request.voice.clone().unwrap_or_else(|| DEFAULT_VOICE.to_string());
        debug!(voice = %voice, chars = request.text.len(), "openai: speech synthesis");

        let response = self
            .client
            .post(self.url("audio/speech"))
            .bearer_auth(&self.api_key)
            .json(&SpeechBody {
                model: DEFAULT_SPEECH_MODEL.to_string(),
                input: request.text.clone(),
                voice,
                response_format: "mp3",
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "openai speech API error");
            return Err(GenerationError::api(ProviderChoice::Openai, status, &body));
        }

        let audio = response.bytes().await?.to_vec();
        Ok(SpeechAudio {
            audio,
            mime_type: "audio/mpeg".to_string(),
        })
    }

    async fn transcribe(
        &self,
        request: &TranscriptRequest,
    ) -> Result<Transcript, GenerationError> {
        debug!(bytes = request.audio.len(), mime = %request.mime_type, "openai: transcription");

        let file_part = reqwest::multipart::Part::bytes(request.audio.clone())
            .file_name("audio")
            .mime_str(&request.mime_type)
            .map_err(|err| GenerationError::Backend {
                provider: ProviderChoice::Openai,
                message: format!("invalid mime type: {err}"),
            })?;

        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", DEFAULT_TRANSCRIBE_MODEL);

        let response = self
            .client
            .post(self.url("audio/transcriptions"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "openai transcription API error");
            return Err(GenerationError::api(ProviderChoice::Openai, status, &body));
        }

        let transcription: TranscriptionResponse = response.json().await?;
        Ok(Transcript {
            text: transcription.text,
        })
    }

    fn provider(&self) -> ProviderChoice {
        ProviderChoice::Openai
    }

    fn display_name(&self) -> &str {
        "OpenAI"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
