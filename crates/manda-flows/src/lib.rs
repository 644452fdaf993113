//! Generation flows — the operations pages and commands actually call.
//!
//! Every flow is a pure function of `(&ActiveClient, typed input)`:
//! it validates its input first (failing fast with `InvalidInput`, no
//! backend call spent), issues exactly one backend operation, and
//! propagates any error unchanged. Flows never retry and never fall back
//! between providers — that decision was already made at resolution time.

pub mod feedback;
pub mod speech;
pub mod transcribe;

pub use feedback::generate_feedback;
pub use speech::synthesize;
pub use transcribe::transcribe_audio;

#[cfg(test)]
pub(crate) mod test_support {
    //! A scriptable backend shared by the flow tests.

    use std::sync::Arc;

    use async_trait::async_trait;
    use manda_core::{
        GenerationError, ProviderChoice, SpeechAudio, SpeechRequest, TextRequest, TextResponse,
        Transcript, TranscriptRequest,
    };
    use manda_providers::resolver::ActiveClient;
    use manda_providers::traits::{BackendFactory, GenerationBackend};
    use manda_providers::{NoSettingsStore, ProviderResolver};
    use std::sync::Mutex;

    /// Backend returning canned responses, recording each text request.
    pub struct ScriptedBackend {
        pub text: Result<String, String>,
        pub requests: Mutex<Vec<TextRequest>>,
    }

    impl ScriptedBackend {
        pub fn text(text: &str) -> Arc<Self> {
            Arc::new(Self {
                text: Ok(text.to_string()),
                requests: Mutex::new(Vec::new()),
            })
        }

        pub fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                text: Err(message.to_string()),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl GenerationBackend for ScriptedBackend {
        async fn generate_text(
            &self,
            request: &TextRequest,
        ) -> Result<TextResponse, GenerationError> {
            self.requests.lock().unwrap().push(request.clone());
            match &self.text {
                Ok(text) => Ok(TextResponse { text: text.clone() }),
                Err(message) => Err(GenerationError::Backend {
                    provider: ProviderChoice::Gemini,
                    message: message.clone(),
                }),
            }
        }

        async fn synthesize_speech(
            &self,
            request: &SpeechRequest,
        ) -> Result<SpeechAudio, GenerationError> {
            match &self.text {
                Ok(_) => Ok(SpeechAudio {
                    audio: request.text.as_bytes().to_vec(),
                    mime_type: "audio/mpeg".to_string(),
                }),
                Err(message) => Err(GenerationError::Backend {
                    provider: ProviderChoice::Gemini,
                    message: message.clone(),
                }),
            }
        }

        async fn transcribe(
            &self,
            _request: &TranscriptRequest,
        ) -> Result<Transcript, GenerationError> {
            match &self.text {
                Ok(text) => Ok(Transcript { text: text.clone() }),
                Err(message) => Err(GenerationError::Backend {
                    provider: ProviderChoice::Gemini,
                    message: message.clone(),
                }),
            }
        }

        fn provider(&self) -> ProviderChoice {
            ProviderChoice::Gemini
        }

        fn display_name(&self) -> &str {
            "Scripted"
        }
    }

    struct FixedFactory(Arc<ScriptedBackend>);

    impl BackendFactory for FixedFactory {
        fn create(&self, _choice: ProviderChoice, _api_key: &str) -> Arc<dyn GenerationBackend> {
            self.0.clone()
        }
    }

    struct OneKeyEnv;

    impl manda_core::ConfigSource for OneKeyEnv {
        fn get(&self, name: &str) -> Option<String> {
            (name == "GEMINI_API_KEY").then(|| "test-key".to_string())
        }
    }

    /// Resolve an `ActiveClient` wrapping the given scripted backend.
    pub async fn client_with(backend: Arc<ScriptedBackend>) -> ActiveClient {
        ProviderResolver::new(
            Arc::new(OneKeyEnv),
            Arc::new(NoSettingsStore),
            Arc::new(FixedFactory(backend)),
        )
        .resolve()
        .await
        .client
    }

    /// A client whose active set is empty.
    pub fn disabled_client() -> ActiveClient {
        ActiveClient::disabled()
    }
}
