//! Text-to-speech — narrate lesson text through the active backend.

use tracing::debug;

use manda_core::types::MAX_SPEECH_CHARS;
use manda_core::{GenerationError, SpeechAudio, SpeechRequest};
use manda_providers::resolver::ActiveClient;

/// Synthesize speech for the given text.
pub async fn synthesize(
    client: &ActiveClient,
    request: &SpeechRequest,
) -> Result<SpeechAudio, GenerationError> {
    if request.text.trim().is_empty() {
        return Err(GenerationError::InvalidInput("text must not be empty".into()));
    }
    if request.text.chars().count() > MAX_SPEECH_CHARS {
        return Err(GenerationError::InvalidInput(format!(
            "text exceeds {MAX_SPEECH_CHARS} characters"
        )));
    }

    let backend = client.active()?;
    debug!(
        backend = backend.display_name(),
        chars = request.text.len(),
        "synthesizing speech"
    );
    backend.synthesize_speech(request).await
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
