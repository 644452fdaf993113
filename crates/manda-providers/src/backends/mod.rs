//! HTTP backend clients, one module per provider.
//!
//! Each backend implements [`crate::traits::GenerationBackend`] against its
//! provider's real wire format. Capability gaps are surfaced as
//! `GenerationError::Unsupported` rather than emulated.

pub mod anthropic;
pub mod gemini;
pub mod openai;

pub use anthropic::AnthropicBackend;
pub use gemini::GeminiBackend;
pub use openai::OpenAiBackend;
