//! Typed requests and responses for the generation flows.
//!
//! Each flow validates its request against the limits declared here before
//! any backend call is made, so a malformed request fails fast with
//! `GenerationError::InvalidInput` instead of burning an API call.

use serde::{Deserialize, Serialize};

/// Longest submission text accepted by the feedback flow, in characters.
pub const MAX_SUBMISSION_CHARS: usize = 20_000;
/// Longest text accepted by the speech flow, in characters.
pub const MAX_SPEECH_CHARS: usize = 4_000;
/// Largest audio payload accepted by the transcription flow, in bytes.
pub const MAX_AUDIO_BYTES: usize = 20 * 1024 * 1024;

/// Audio mime types the transcription flow accepts.
pub const ACCEPTED_AUDIO_MIMES: &[&str] = &[
    "audio/ogg",
    "audio/opus",
    "audio/mpeg",
    "audio/mp4",
    "audio/wav",
    "audio/webm",
    "audio/flac",
];

// ─────────────────────────────────────────────
// Structured feedback
// ─────────────────────────────────────────────

/// A request for structured feedback on a learner submission.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    /// The learner's submitted text.
    pub submission: String,
    /// The rubric to grade against (free-form criteria).
    pub rubric: String,
    /// Optional course/assignment context shown to the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Structured feedback returned by the feedback flow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    /// Overall score, 0–100.
    pub score: u8,
    /// What the submission did well.
    pub strengths: Vec<String>,
    /// Concrete suggestions for improvement.
    pub improvements: Vec<String>,
    /// A short overall summary for the learner.
    pub summary: String,
}

// ─────────────────────────────────────────────
// Speech synthesis
// ─────────────────────────────────────────────

/// A text-to-speech request.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRequest {
    /// Text to speak.
    pub text: String,
    /// Voice name; backend-specific, backend default when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
}

/// Synthesized audio.
#[derive(Clone, Debug)]
pub struct SpeechAudio {
    /// Raw audio bytes.
    pub audio: Vec<u8>,
    /// Mime type of `audio` (e.g. `audio/mpeg`, `audio/wav`).
    pub mime_type: String,
}

// ─────────────────────────────────────────────
// Transcription
// ─────────────────────────────────────────────

/// A speech-to-text request.
#[derive(Clone, Debug)]
pub struct TranscriptRequest {
    /// Raw audio bytes.
    pub audio: Vec<u8>,
    /// Mime type of `audio`; must be one of [`ACCEPTED_AUDIO_MIMES`].
    pub mime_type: String,
}

/// Transcribed text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    pub text: String,
}

// ─────────────────────────────────────────────
// Text generation (backend-level primitive)
// ─────────────────────────────────────────────

/// A plain text-generation request, the primitive the feedback flow builds on.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRequest {
    /// System/steering instruction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// User prompt.
    pub prompt: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
}

impl Default for TextRequest {
    fn default() -> Self {
        Self {
            system: None,
            prompt: String::new(),
            max_tokens: 2048,
            temperature: 0.7,
        }
    }
}

/// Generated text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextResponse {
    pub text: String,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
