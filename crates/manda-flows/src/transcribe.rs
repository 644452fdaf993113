//! Speech-to-text — transcribe learner voice recordings.

use tracing::debug;

use manda_core::types::{ACCEPTED_AUDIO_MIMES, MAX_AUDIO_BYTES};
use manda_core::{GenerationError, Transcript, TranscriptRequest};
use manda_providers::resolver::ActiveClient;

/// Transcribe an audio recording.
pub async fn transcribe_audio(
    client: &ActiveClient,
    request: &TranscriptRequest,
) -> Result<Transcript, GenerationError> {
    if request.audio.is_empty() {
        return Err(GenerationError::InvalidInput("audio must not be empty".into()));
    }
    if request.audio.len() > MAX_AUDIO_BYTES {
        return Err(GenerationError::InvalidInput(format!(
            "audio exceeds {MAX_AUDIO_BYTES} bytes"
        )));
    }
    if !ACCEPTED_AUDIO_MIMES.contains(&request.mime_type.as_str()) {
        return Err(GenerationError::InvalidInput(format!(
            "unsupported audio type {:?}",
            request.mime_type
        )));
    }

    let backend = client.active()?;
    debug!(
        backend = backend.display_name(),
        bytes = request.audio.len(),
        mime = %request.mime_type,
        "transcribing audio"
    );
    backend.transcribe(request).await
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
