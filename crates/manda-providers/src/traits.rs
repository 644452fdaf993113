//! Backend abstractions — the seam between resolution and generation.
//!
//! [`GenerationBackend`] is what the flows call into; [`BackendFactory`] is
//! how the resolver turns a validated credential into a backend without the
//! resolver knowing HTTP details (and without tests needing the network).

use std::sync::Arc;

use async_trait::async_trait;
use manda_core::{
    GenerationError, ProviderChoice, SpeechAudio, SpeechRequest, TextRequest, TextResponse,
    Transcript, TranscriptRequest,
};

use crate::backends;

// ─────────────────────────────────────────────
// GenerationBackend
// ─────────────────────────────────────────────

/// A ready-to-use generative backend.
///
/// Each method issues exactly one backend operation; errors propagate to the
/// caller unchanged. Fallback between providers is the resolver's job, never
/// the backend's.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text from a prompt.
    async fn generate_text(&self, request: &TextRequest) -> Result<TextResponse, GenerationError>;

    /// Synthesize speech from text.
    async fn synthesize_speech(
        &self,
        request: &SpeechRequest,
    ) -> Result<SpeechAudio, GenerationError>;

    /// Transcribe audio to text.
    async fn transcribe(&self, request: &TranscriptRequest)
        -> Result<Transcript, GenerationError>;

    /// Which provider this backend talks to.
    fn provider(&self) -> ProviderChoice;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}

// ─────────────────────────────────────────────
// BackendFactory
// ─────────────────────────────────────────────

/// Constructs a backend for a provider with a validated credential.
///
/// Construction is infallible: it does not authenticate, it only wires up a
/// client. Authentication failures surface later as invocation errors.
pub trait BackendFactory: Send + Sync {
    fn create(&self, choice: ProviderChoice, api_key: &str) -> Arc<dyn GenerationBackend>;
}

/// The real factory — builds the HTTP backend for each provider.
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpBackendFactory;

impl BackendFactory for HttpBackendFactory {
    fn create(&self, choice: ProviderChoice, api_key: &str) -> Arc<dyn GenerationBackend> {
        match choice {
            ProviderChoice::Gemini => Arc::new(backends::gemini::GeminiBackend::new(api_key)),
            ProviderChoice::Openai => Arc::new(backends::openai::OpenAiBackend::new(api_key)),
            ProviderChoice::Anthropic => {
                Arc::new(backends::anthropic::AnthropicBackend::new(api_key))
            }
        }
    }
}
