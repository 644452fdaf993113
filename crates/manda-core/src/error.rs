//! Error taxonomy for the AI layer.
//!
//! Two rules, enforced by the types here:
//!
//! - **Configuration-time** failures (settings store down, missing API key)
//!   never surface as errors — the resolver absorbs them and degrades to a
//!   smaller active set. They appear as structured warnings on the
//!   resolution result, not as `Err` values.
//! - **Invocation-time** failures always surface to the immediate caller as
//!   [`GenerationError`]. Flows never swallow or retry them.

use crate::provider::ProviderChoice;

/// Error raised by generation flows and backends.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// No backend is active — AI features are disabled for this process.
    ///
    /// Every generation call against an empty client fails with this,
    /// immediately, instead of hanging or returning empty output.
    #[error("no AI provider is configured; set an API key (e.g. GEMINI_API_KEY)")]
    NotConfigured,

    /// Flow input failed schema validation. Raised before any backend call.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The active backend cannot perform this operation at all.
    #[error("{provider} does not support {operation}")]
    Unsupported {
        provider: ProviderChoice,
        operation: &'static str,
    },

    /// The backend API returned a failure (non-2xx, quota, malformed body).
    #[error("{provider} API error: {message}")]
    Backend {
        provider: ProviderChoice,
        message: String,
    },

    /// Transport-level failure talking to the backend.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl GenerationError {
    /// Build a backend error from a non-success HTTP response.
    pub fn api(provider: ProviderChoice, status: reqwest::StatusCode, body: &str) -> Self {
        GenerationError::Backend {
            provider,
            message: format!("{status}: {body}"),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
