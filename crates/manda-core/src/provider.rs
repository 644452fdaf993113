//! The provider identity type — which generative backend is in play.
//!
//! The static per-provider metadata (env key names, API bases) lives in
//! `manda-providers::registry`; this is just the enumerated choice, kept in
//! core so the error taxonomy and flow types can name a provider without
//! depending on the providers crate.

use serde::{Deserialize, Serialize};

/// A named generative-AI backend.
///
/// Selected once per process lifetime, not per request. `Gemini` is the
/// ultimate default: whenever selection can't be satisfied the resolver
/// falls back to it (and only to it).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderChoice {
    #[default]
    Gemini,
    Openai,
    Anthropic,
}

impl ProviderChoice {
    /// The lowercase wire/config name.
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderChoice::Gemini => "gemini",
            ProviderChoice::Openai => "openai",
            ProviderChoice::Anthropic => "anthropic",
        }
    }

    /// All supported providers, in display order.
    pub fn all() -> [ProviderChoice; 3] {
        [
            ProviderChoice::Gemini,
            ProviderChoice::Openai,
            ProviderChoice::Anthropic,
        ]
    }
}

impl std::fmt::Display for ProviderChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderChoice {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gemini" => Ok(ProviderChoice::Gemini),
            "openai" => Ok(ProviderChoice::Openai),
            "anthropic" => Ok(ProviderChoice::Anthropic),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

/// A provider name that isn't one of the supported three.
///
/// The resolver treats this as "fall through to the default", never as a
/// hard failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown provider {0:?} (expected gemini, openai, or anthropic)")]
pub struct UnknownProvider(pub String);

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
