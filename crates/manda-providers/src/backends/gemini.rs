//! Gemini backend — `generateContent` for text, speech, and transcription.
//!
//! All three operations go through the same endpoint with different models
//! and response modalities. Audio comes back as base64 `inlineData` parts;
//! transcription sends the audio the same way in the request.

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use manda_core::{
    GenerationError, ProviderChoice, SpeechAudio, SpeechRequest, TextRequest, TextResponse,
    Transcript, TranscriptRequest,
};

use crate::traits::GenerationBackend;

const DEFAULT_TEXT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_SPEECH_MODEL: &str = "gemini-2.5-flash-preview-tts";
const DEFAULT_VOICE: &str = "Algenib";

/// Gemini `generateContent` client.
pub struct GeminiBackend {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    text_model: String,
    speech_model: String,
}

impl GeminiBackend {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: crate::registry::spec_for(ProviderChoice::Gemini)
                .default_api_base
                .to_string(),
            api_key: api_key.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            speech_model: DEFAULT_SPEECH_MODEL.to_string(),
        }
    }

    /// Point the backend at a different base URL (proxies, tests).
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            model
        )
    }

    async fn generate(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenerationError> {
        let response = self
            .client
            .post(self.generate_url(model))
            .query(&[("key", &self.api_key)])
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "gemini API error");
            return Err(GenerationError::api(ProviderChoice::Gemini, status, &body));
        }

        Ok(response.json().await?)
    }
}

// ── Wire types ──

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum Part {
    Text(String),
    #[serde(rename_all = "camelCase")]
    InlineData { mime_type: String, data: String },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

impl GenerateContentResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content
            .parts
            .into_iter()
            .find_map(|part| part.text)
    }

    fn first_inline_data(self) -> Option<InlineData> {
        self.candidates
            .into_iter()
            .next()?
            .content
            .parts
            .into_iter()
            .find_map(|part| part.inline_data)
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn generate_text(&self, request: &TextRequest) -> Result<TextResponse, GenerationError> {
        debug!(model = %self.text_model, "gemini: text generation");

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::Text(request.prompt.clone())],
            }],
            system_instruction: request.system.as_ref().map(|system| Content {
                parts: vec![Part::Text(system.clone())],
            }),
            generation_config: Some(GenerationConfig {
                max_output_tokens: Some(request.max_tokens),
                temperature: Some(request.temperature),
                response_modalities: None,
                speech_config: None,
            }),
        };

        let text = self
            .generate(&self.text_model, &body)
            .await?
            .first_text()
            .ok_or_else(|| GenerationError::Backend {
                provider: ProviderChoice::Gemini,
                message: "response contained no text".to_string(),
            })?;

        Ok(TextResponse { text })
    }

    async fn synthesize_speech(
        &self,
        request: &SpeechRequest,
    ) -> Result<SpeechAudio, GenerationError> {
        let voice = request.voice.clone().unwrap_or_else(|| DEFAULT_VOICE.to_string());
        debug!(model = %self.speech_model, voice = %voice, "gemini: speech synthesis");

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::Text(request.text.clone())],
            }],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                max_output_tokens: None,
                temperature: None,
                response_modalities: Some(vec!["AUDIO"]),
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig { voice_name: voice },
                    },
                }),
            }),
        };

        let inline = self
            .generate(&self.speech_model, &body)
            .await?
            .first_inline_data()
            .ok_or_else(|| GenerationError::Backend {
                provider: ProviderChoice::Gemini,
                message: "response contained no audio".to_string(),
            })?;

        let audio = base64::engine::general_purpose::STANDARD
            .decode(&inline.data)
            .map_err(|err| GenerationError::Backend {
                provider: ProviderChoice::Gemini,
                message: format!("audio payload was not valid base64: {err}"),
            })?;

        Ok(SpeechAudio {
            audio,
            mime_type: inline.mime_type,
        })
    }

    async fn transcribe(
        &self,
        request: &TranscriptRequest,
    ) -> Result<Transcript, GenerationError> {
        debug!(bytes = request.audio.len(), mime = %request.mime_type, "gemini: transcription");

        let encoded = base64::engine::general_purpose::STANDARD.encode(&request.audio);
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text("Transcribe this audio recording verbatim.".to_string()),
                    Part::InlineData {
                        mime_type: request.mime_type.clone(),
                        data: encoded,
                    },
                ],
            }],
            system_instruction: None,
            generation_config: None,
        };

        let text = self
            .generate(&self.text_model, &body)
            .await?
            .first_text()
            .ok_or_else(|| GenerationError::Backend {
                provider: ProviderChoice::Gemini,
                message: "response contained no transcript".to_string(),
            })?;

        Ok(Transcript { text })
    }

    fn provider(&self) -> ProviderChoice {
        ProviderChoice::Gemini
    }

    fn display_name(&self) -> &str {
        "Gemini"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
