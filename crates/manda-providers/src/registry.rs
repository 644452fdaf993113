//! Provider registry — static specs for the three supported backends.
//!
//! Each `ProviderSpec` maps a [`ProviderChoice`] to the environment variable
//! holding its API key and the default API base URL. The credential mapping
//! is fixed: `gemini→GEMINI_API_KEY`, `openai→OPENAI_API_KEY`,
//! `anthropic→ANTHROPIC_API_KEY`.

use manda_core::{ConfigSource, ProviderChoice};

// ─────────────────────────────────────────────
// ProviderSpec — static metadata for one provider
// ─────────────────────────────────────────────

/// Static specification describing one generative backend.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    /// Which provider this spec describes.
    pub choice: ProviderChoice,
    /// Internal name (e.g. `"openai"`), equal to `choice.as_str()`.
    pub name: &'static str,
    /// Human-readable name for logs. E.g. `"OpenAI"`.
    pub display_name: &'static str,
    /// Environment variable for the API key. E.g. `"OPENAI_API_KEY"`.
    pub env_key: &'static str,
    /// Default API base URL.
    pub default_api_base: &'static str,
}

impl ProviderSpec {
    /// Read this provider's API key from a config source.
    ///
    /// `None` when the variable is unset or empty — an empty key never
    /// counts as configured.
    pub fn credential(&self, source: &dyn ConfigSource) -> Option<String> {
        source.get(self.env_key).filter(|key| !key.is_empty())
    }
}

/// All supported provider specifications.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        choice: ProviderChoice::Gemini,
        name: "gemini",
        display_name: "Gemini",
        env_key: "GEMINI_API_KEY",
        default_api_base: "https://generativelanguage.googleapis.com/v1beta",
    },
    ProviderSpec {
        choice: ProviderChoice::Openai,
        name: "openai",
        display_name: "OpenAI",
        env_key: "OPENAI_API_KEY",
        default_api_base: "https://api.openai.com/v1",
    },
    ProviderSpec {
        choice: ProviderChoice::Anthropic,
        name: "anthropic",
        display_name: "Anthropic",
        env_key: "ANTHROPIC_API_KEY",
        default_api_base: "https://api.anthropic.com/v1",
    },
];

/// Get the spec for a provider choice.
pub fn spec_for(choice: ProviderChoice) -> &'static ProviderSpec {
    PROVIDERS
        .iter()
        .find(|spec| spec.choice == choice)
        .unwrap_or(&PROVIDERS[0])
}

/// Find a provider spec by exact name.
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    PROVIDERS.iter().find(|spec| spec.name == name)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
