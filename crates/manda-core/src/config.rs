//! Runtime configuration surface — environment variables only.
//!
//! The AI layer is configured entirely through process environment:
//!
//! | Variable            | Effect                                              |
//! |---------------------|-----------------------------------------------------|
//! | `AI_PROVIDER`       | explicit provider selection (`gemini`/`openai`/`anthropic`) |
//! | `GEMINI_API_KEY`    | required to activate Gemini                         |
//! | `OPENAI_API_KEY`    | required to activate OpenAI                         |
//! | `ANTHROPIC_API_KEY` | required to activate Anthropic                      |
//! | `MANDA_ENV`         | `production` escalates "no provider" to error severity |
//! | `MANDA_SETTINGS_URL`| base URL of the shared settings service             |
//!
//! Everything reads through the [`ConfigSource`] trait so resolution can be
//! tested with a map-backed source instead of mutating the process env.

/// Env var selecting the provider explicitly. Overrides the settings store.
pub const AI_PROVIDER: &str = "AI_PROVIDER";
/// Env var holding the runtime mode (`production` or anything else).
pub const MANDA_ENV: &str = "MANDA_ENV";
/// Env var pointing at the shared settings service.
pub const MANDA_SETTINGS_URL: &str = "MANDA_SETTINGS_URL";

// ─────────────────────────────────────────────
// RuntimeMode
// ─────────────────────────────────────────────

/// Process runtime mode, derived from `MANDA_ENV`.
///
/// Only `"production"` maps to [`RuntimeMode::Production`]; any other value
/// (or an unset variable) is development.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RuntimeMode {
    #[default]
    Development,
    Production,
}

impl RuntimeMode {
    /// Read the runtime mode from a config source.
    pub fn from_source(source: &dyn ConfigSource) -> Self {
        match source.get(MANDA_ENV).as_deref() {
            Some("production") => RuntimeMode::Production,
            _ => RuntimeMode::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == RuntimeMode::Production
    }
}

// ─────────────────────────────────────────────
// ConfigSource
// ─────────────────────────────────────────────

/// Synchronous environment lookup.
///
/// The resolver never touches `std::env` directly — it goes through this
/// trait, so tests can inject a fixed environment.
pub trait ConfigSource: Send + Sync {
    /// Look up a variable. `None` if unset or not valid unicode.
    fn get(&self, name: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl ConfigSource for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
