//! Shared foundation for Manda's AI layer.
//!
//! # Architecture
//!
//! - [`provider`] — the [`ProviderChoice`] identity type
//! - [`config`] — runtime mode + the environment-lookup abstraction
//! - [`error`] — the generation error taxonomy
//! - [`types`] — typed requests/responses for the generation flows

pub mod config;
pub mod error;
pub mod provider;
pub mod types;

// Re-export main types for convenience
pub use config::{ConfigSource, ProcessEnv, RuntimeMode};
pub use error::GenerationError;
pub use provider::{ProviderChoice, UnknownProvider};
pub use types::{
    Feedback, FeedbackRequest, SpeechAudio, SpeechRequest, TextRequest, TextResponse, Transcript,
    TranscriptRequest,
};
