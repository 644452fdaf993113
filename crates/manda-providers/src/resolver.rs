//! Provider resolution — pick exactly one backend, validate its credential,
//! and produce the shared [`ActiveClient`].
//!
//! # Selection order
//!
//! 1. `AI_PROVIDER` env var, when set, always wins over the settings store.
//! 2. Otherwise the settings store is consulted (bounded by a timeout);
//!    an unset or unreachable store defaults to Gemini.
//! 3. The candidate's API key is checked. Missing key → fall back to Gemini,
//!    and only to Gemini — never to a third provider, even when that third
//!    provider does have a key. If Gemini's key is also missing the active
//!    set stays empty and AI features are disabled.
//!
//! # Guarantees
//!
//! [`ProviderResolver::resolve`] never fails. Every configuration problem is
//! absorbed here and degrades the result to a smaller active set, down to
//! empty; the reasons are carried as structured [`ResolveWarning`]s on the
//! [`Resolution`] so callers and tests can see why a fallback happened
//! instead of scraping logs. The only errors generation ever surfaces come
//! later, from calls against the resolved client.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use manda_core::config::AI_PROVIDER;
use manda_core::{ConfigSource, GenerationError, ProviderChoice, RuntimeMode};

use crate::registry::spec_for;
use crate::settings::SettingsStore;
use crate::traits::{BackendFactory, GenerationBackend};

/// Default bound on the settings-store lookup.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

// ─────────────────────────────────────────────
// ActiveClient
// ─────────────────────────────────────────────

/// The resolved, ready-to-use handle the generation flows call into.
///
/// Wraps zero or more backends; current policy activates at most one. The
/// client is read-only after resolution, so it can be shared freely across
/// concurrent flows without locking.
#[derive(Clone)]
pub struct ActiveClient {
    backends: Vec<Arc<dyn GenerationBackend>>,
}

impl ActiveClient {
    /// A client with no usable backend — AI features disabled.
    pub fn disabled() -> Self {
        Self { backends: Vec::new() }
    }

    fn with_backend(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backends: vec![backend],
        }
    }

    /// The active backend, or `NotConfigured` when the set is empty.
    ///
    /// Flows call this first, so a disabled client fails predictably before
    /// any network work happens.
    pub fn active(&self) -> Result<&Arc<dyn GenerationBackend>, GenerationError> {
        self.backends.first().ok_or(GenerationError::NotConfigured)
    }

    /// Whether any backend is active.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// The active provider, if any.
    pub fn provider(&self) -> Option<ProviderChoice> {
        self.backends.first().map(|backend| backend.provider())
    }
}

impl std::fmt::Debug for ActiveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveClient")
            .field("provider", &self.provider())
            .finish()
    }
}

// ─────────────────────────────────────────────
// Resolution result
// ─────────────────────────────────────────────

/// Why resolution deviated from the requested configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveWarning {
    /// The settings store was unreachable or timed out; defaulted to Gemini.
    SettingsUnavailable { reason: String },
    /// The store held a provider name that isn't one of the supported three.
    StoredProviderInvalid { value: String },
    /// `AI_PROVIDER` held an unrecognized value; fell through to Gemini.
    ConfiguredProviderInvalid { value: String },
    /// The selected provider's API key is missing; fell back to Gemini.
    MissingCredential {
        requested: ProviderChoice,
        env_key: &'static str,
    },
    /// Neither the selected provider nor Gemini had a key; AI is disabled.
    NoProviderUsable,
}

/// The outcome of one resolution cycle.
#[derive(Clone, Debug)]
pub struct Resolution {
    /// The (possibly empty) client generation flows will share.
    pub client: ActiveClient,
    /// The provider that ended up active, if any.
    pub provider: Option<ProviderChoice>,
    /// Every deviation taken on the way to this result.
    pub warnings: Vec<ResolveWarning>,
    /// When resolution completed.
    pub resolved_at: DateTime<Utc>,
}

// ─────────────────────────────────────────────
// ProviderResolver
// ─────────────────────────────────────────────

/// Resolves which generative backend this process uses.
///
/// Explicitly constructed and dependency-injected: the application bootstrap
/// owns one of these, calls [`resolve`](Self::resolve) once, and passes the
/// resulting client down by parameter. Repeated calls re-run the full
/// algorithm; nothing here is cached or global.
pub struct ProviderResolver {
    env: Arc<dyn ConfigSource>,
    store: Arc<dyn SettingsStore>,
    factory: Arc<dyn BackendFactory>,
    store_timeout: Duration,
    mode: RuntimeMode,
}

impl ProviderResolver {
    pub fn new(
        env: Arc<dyn ConfigSource>,
        store: Arc<dyn SettingsStore>,
        factory: Arc<dyn BackendFactory>,
    ) -> Self {
        let mode = RuntimeMode::from_source(env.as_ref());
        Self {
            env,
            store,
            factory,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            mode,
        }
    }

    /// Override the settings-store lookup timeout.
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Run one full resolution cycle. Infallible by design.
    pub async fn resolve(&self) -> Resolution {
        let mut warnings = Vec::new();

        let candidate = self.choose_candidate(&mut warnings).await;
        let client = self.activate(candidate, &mut warnings);

        if client.is_empty() {
            warnings.push(ResolveWarning::NoProviderUsable);
            if self.mode.is_production() {
                error!("no AI provider usable in production — generation calls will fail");
            } else {
                warn!("no AI provider configured; AI features disabled");
            }
        } else if let Some(provider) = client.provider() {
            info!(provider = %provider, "AI provider resolved");
        }

        Resolution {
            provider: client.provider(),
            client,
            warnings,
            resolved_at: Utc::now(),
        }
    }

    /// Step 1: pick the candidate provider.
    ///
    /// Environment overrides stored configuration; an unrecognized env value
    /// falls through to the Gemini default without consulting the store.
    async fn choose_candidate(&self, warnings: &mut Vec<ResolveWarning>) -> ProviderChoice {
        if let Some(value) = self.env.get(AI_PROVIDER) {
            return match value.parse() {
                Ok(choice) => {
                    debug!(provider = %value, "provider selected via AI_PROVIDER");
                    choice
                }
                Err(_) => {
                    warn!(value = %value, "unrecognized AI_PROVIDER value, defaulting to gemini");
                    warnings.push(ResolveWarning::ConfiguredProviderInvalid { value });
                    ProviderChoice::Gemini
                }
            };
        }

        let lookup = tokio::time::timeout(self.store_timeout, self.store.provider_setting()).await;
        match lookup {
            Ok(Ok(Some(value))) => match value.parse() {
                Ok(choice) => {
                    debug!(provider = %value, "provider selected via settings store");
                    choice
                }
                Err(_) => {
                    warn!(value = %value, "stored provider setting is invalid, defaulting to gemini");
                    warnings.push(ResolveWarning::StoredProviderInvalid { value });
                    ProviderChoice::Gemini
                }
            },
            Ok(Ok(None)) => {
                debug!("no stored provider setting, defaulting to gemini");
                ProviderChoice::Gemini
            }
            Ok(Err(err)) => {
                warn!(error = %err, "settings store lookup failed, defaulting to gemini");
                warnings.push(ResolveWarning::SettingsUnavailable {
                    reason: err.to_string(),
                });
                ProviderChoice::Gemini
            }
            Err(_elapsed) => {
                warn!(
                    timeout_ms = self.store_timeout.as_millis() as u64,
                    "settings store lookup timed out, defaulting to gemini"
                );
                warnings.push(ResolveWarning::SettingsUnavailable {
                    reason: "lookup timed out".to_string(),
                });
                ProviderChoice::Gemini
            }
        }
    }

    /// Step 2: validate the candidate's credential and build the client.
    ///
    /// Fallback goes to Gemini only, and only one level deep.
    fn activate(
        &self,
        candidate: ProviderChoice,
        warnings: &mut Vec<ResolveWarning>,
    ) -> ActiveClient {
        let spec = spec_for(candidate);
        if let Some(key) = spec.credential(self.env.as_ref()) {
            return ActiveClient::with_backend(self.factory.create(candidate, &key));
        }

        warn!(
            provider = %candidate,
            missing = spec.env_key,
            "selected provider has no API key, falling back to gemini"
        );
        warnings.push(ResolveWarning::MissingCredential {
            requested: candidate,
            env_key: spec.env_key,
        });

        if candidate != ProviderChoice::Gemini {
            let gemini = spec_for(ProviderChoice::Gemini);
            if let Some(key) = gemini.credential(self.env.as_ref()) {
                return ActiveClient::with_backend(
                    self.factory.create(ProviderChoice::Gemini, &key),
                );
            }
        }

        ActiveClient::disabled()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use manda_core::{
        SpeechAudio, SpeechRequest, TextRequest, TextResponse, Transcript, TranscriptRequest,
    };
    use std::collections::HashMap;
    use std::sync::Mutex;

    // ── Test doubles ──

    struct MapEnv(HashMap<&'static str, &'static str>);

    impl MapEnv {
        fn new(pairs: &[(&'static str, &'static str)]) -> Arc<Self> {
            Arc::new(Self(pairs.iter().copied().collect()))
        }
    }

    impl ConfigSource for MapEnv {
        fn get(&self, name: &str) -> Option<String> {
            self.0.get(name).map(|v| v.to_string())
        }
    }

    /// Store scripted to return a fixed result.
    enum ScriptedStore {
        Value(Option<&'static str>),
        Failing,
        Hanging,
    }

    #[async_trait]
    impl SettingsStore for ScriptedStore {
        async fn provider_setting(&self) -> anyhow::Result<Option<String>> {
            match self {
                ScriptedStore::Value(v) => Ok(v.map(String::from)),
                ScriptedStore::Failing => anyhow::bail!("settings service returned 503"),
                ScriptedStore::Hanging => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(None)
                }
            }
        }
    }

    /// Backend that records nothing and is never invoked in these tests.
    struct StubBackend(ProviderChoice);

    #[async_trait]
    impl GenerationBackend for StubBackend {
        async fn generate_text(
            &self,
            _request: &TextRequest,
        ) -> Result<TextResponse, GenerationError> {
            Ok(TextResponse { text: "stub".into() })
        }

        async fn synthesize_speech(
            &self,
            _request: &SpeechRequest,
        ) -> Result<SpeechAudio, GenerationError> {
            Ok(SpeechAudio {
                audio: Vec::new(),
                mime_type: "audio/wav".into(),
            })
        }

        async fn transcribe(
            &self,
            _request: &TranscriptRequest,
        ) -> Result<Transcript, GenerationError> {
            Ok(Transcript { text: "stub".into() })
        }

        fn provider(&self) -> ProviderChoice {
            self.0
        }

        fn display_name(&self) -> &str {
            self.0.as_str()
        }
    }

    /// Factory that records every (provider, key) it was asked for.
    #[derive(Default)]
    struct RecordingFactory {
        created: Mutex<Vec<(ProviderChoice, String)>>,
    }

    impl BackendFactory for RecordingFactory {
        fn create(&self, choice: ProviderChoice, api_key: &str) -> Arc<dyn GenerationBackend> {
            self.created
                .lock()
                .unwrap()
                .push((choice, api_key.to_string()));
            Arc::new(StubBackend(choice))
        }
    }

    fn resolver(
        env: Arc<MapEnv>,
        store: ScriptedStore,
    ) -> (ProviderResolver, Arc<RecordingFactory>) {
        let factory = Arc::new(RecordingFactory::default());
        let resolver = ProviderResolver::new(env, Arc::new(store), factory.clone())
            .with_store_timeout(Duration::from_millis(100));
        (resolver, factory)
    }

    // ── Explicit selection ──

    #[tokio::test]
    async fn test_env_provider_with_credential_activates_it() {
        for (name, choice, key_var) in [
            ("gemini", ProviderChoice::Gemini, "GEMINI_API_KEY"),
            ("openai", ProviderChoice::Openai, "OPENAI_API_KEY"),
            ("anthropic", ProviderChoice::Anthropic, "ANTHROPIC_API_KEY"),
        ] {
            let env = MapEnv::new(&[(AI_PROVIDER, name), (key_var, "key-123")]);
            let (resolver, factory) = resolver(env, ScriptedStore::Value(None));

            let resolution = resolver.resolve().await;
            assert_eq!(resolution.provider, Some(choice));
            assert!(resolution.warnings.is_empty());
            assert_eq!(
                factory.created.lock().unwrap().as_slice(),
                &[(choice, "key-123".to_string())]
            );
        }
    }

    #[tokio::test]
    async fn test_env_overrides_settings_store() {
        // Store has a different, valid, credentialed provider — env still wins.
        let env = MapEnv::new(&[
            (AI_PROVIDER, "anthropic"),
            ("ANTHROPIC_API_KEY", "sk-ant"),
            ("OPENAI_API_KEY", "sk-oai"),
        ]);
        let (resolver, _) = resolver(env, ScriptedStore::Value(Some("openai")));

        let resolution = resolver.resolve().await;
        assert_eq!(resolution.provider, Some(ProviderChoice::Anthropic));
    }

    #[tokio::test]
    async fn test_unknown_env_provider_falls_through_to_gemini() {
        let env = MapEnv::new(&[(AI_PROVIDER, "mistral"), ("GEMINI_API_KEY", "g-key")]);
        // Store would pick openai, but an unrecognized env value does not
        // re-open the store path.
        let (resolver, _) = resolver(env, ScriptedStore::Value(Some("openai")));

        let resolution = resolver.resolve().await;
        assert_eq!(resolution.provider, Some(ProviderChoice::Gemini));
        assert_eq!(
            resolution.warnings,
            vec![ResolveWarning::ConfiguredProviderInvalid {
                value: "mistral".into()
            }]
        );
    }

    // ── Settings-store selection ──

    #[tokio::test]
    async fn test_stored_provider_used_when_env_unset() {
        let env = MapEnv::new(&[("OPENAI_API_KEY", "sk-oai")]);
        let (resolver, _) = resolver(env, ScriptedStore::Value(Some("openai")));

        let resolution = resolver.resolve().await;
        assert_eq!(resolution.provider, Some(ProviderChoice::Openai));
        assert!(resolution.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_unset_store_value_defaults_to_gemini() {
        let env = MapEnv::new(&[("GEMINI_API_KEY", "g-key")]);
        let (resolver, _) = resolver(env, ScriptedStore::Value(None));

        let resolution = resolver.resolve().await;
        assert_eq!(resolution.provider, Some(ProviderChoice::Gemini));
        assert!(resolution.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_stored_value_defaults_to_gemini() {
        let env = MapEnv::new(&[("GEMINI_API_KEY", "g-key")]);
        let (resolver, _) = resolver(env, ScriptedStore::Value(Some("cohere")));

        let resolution = resolver.resolve().await;
        assert_eq!(resolution.provider, Some(ProviderChoice::Gemini));
        assert_eq!(
            resolution.warnings,
            vec![ResolveWarning::StoredProviderInvalid {
                value: "cohere".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_store_failure_recovers_to_gemini() {
        let env = MapEnv::new(&[("GEMINI_API_KEY", "g-key")]);
        let (resolver, _) = resolver(env, ScriptedStore::Failing);

        let resolution = resolver.resolve().await;
        assert_eq!(resolution.provider, Some(ProviderChoice::Gemini));
        assert!(matches!(
            resolution.warnings.as_slice(),
            [ResolveWarning::SettingsUnavailable { reason }] if reason.contains("503")
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_timeout_recovers_to_gemini() {
        let env = MapEnv::new(&[("GEMINI_API_KEY", "g-key")]);
        let (resolver, _) = resolver(env, ScriptedStore::Hanging);

        let resolution = resolver.resolve().await;
        assert_eq!(resolution.provider, Some(ProviderChoice::Gemini));
        assert_eq!(
            resolution.warnings,
            vec![ResolveWarning::SettingsUnavailable {
                reason: "lookup timed out".into()
            }]
        );
    }

    // ── Credential fallback ──

    #[tokio::test]
    async fn test_missing_credential_falls_back_to_gemini() {
        // env = {AI_PROVIDER: anthropic}, no ANTHROPIC_API_KEY, GEMINI_API_KEY=x
        let env = MapEnv::new(&[(AI_PROVIDER, "anthropic"), ("GEMINI_API_KEY", "x")]);
        let (resolver, factory) = resolver(env, ScriptedStore::Value(None));

        let resolution = resolver.resolve().await;
        assert_eq!(resolution.provider, Some(ProviderChoice::Gemini));
        assert_eq!(
            resolution.warnings,
            vec![ResolveWarning::MissingCredential {
                requested: ProviderChoice::Anthropic,
                env_key: "ANTHROPIC_API_KEY",
            }]
        );
        // Only gemini was instantiated — anthropic construction never happened.
        assert_eq!(
            factory.created.lock().unwrap().as_slice(),
            &[(ProviderChoice::Gemini, "x".to_string())]
        );
    }

    #[tokio::test]
    async fn test_never_falls_back_to_a_third_provider() {
        // anthropic requested without a key; openai HAS a key but must not
        // be tried — fallback is gemini or nothing.
        let env = MapEnv::new(&[(AI_PROVIDER, "anthropic"), ("OPENAI_API_KEY", "sk-oai")]);
        let (resolver, factory) = resolver(env, ScriptedStore::Value(None));

        let resolution = resolver.resolve().await;
        assert_eq!(resolution.provider, None);
        assert!(resolution.client.is_empty());
        assert!(factory.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_gemini_selected_without_key_stays_empty() {
        // Fallback target == candidate; no second check of the same key.
        let env = MapEnv::new(&[(AI_PROVIDER, "gemini")]);
        let (resolver, _) = resolver(env, ScriptedStore::Value(None));

        let resolution = resolver.resolve().await;
        assert!(resolution.client.is_empty());
        assert_eq!(
            resolution.warnings,
            vec![
                ResolveWarning::MissingCredential {
                    requested: ProviderChoice::Gemini,
                    env_key: "GEMINI_API_KEY",
                },
                ResolveWarning::NoProviderUsable,
            ]
        );
    }

    // ── Fully disabled ──

    #[tokio::test]
    async fn test_no_keys_and_unreachable_store_disables_quietly() {
        let env = MapEnv::new(&[]);
        let (resolver, _) = resolver(env, ScriptedStore::Failing);

        // Must complete without panicking or returning an error.
        let resolution = resolver.resolve().await;
        assert!(resolution.client.is_empty());
        assert_eq!(resolution.provider, None);
        assert!(resolution
            .warnings
            .contains(&ResolveWarning::NoProviderUsable));
        assert!(resolution.client.active().is_err());
    }

    #[tokio::test]
    async fn test_production_mode_also_never_throws() {
        let env = MapEnv::new(&[("MANDA_ENV", "production")]);
        let (resolver, _) = resolver(env, ScriptedStore::Failing);

        let resolution = resolver.resolve().await;
        assert!(resolution.client.is_empty());
        assert!(resolution
            .warnings
            .contains(&ResolveWarning::NoProviderUsable));
    }

    // ── Re-resolution ──

    #[tokio::test]
    async fn test_repeated_resolve_reruns_the_full_algorithm() {
        let env = MapEnv::new(&[(AI_PROVIDER, "openai"), ("OPENAI_API_KEY", "sk")]);
        let (resolver, factory) = resolver(env, ScriptedStore::Value(None));

        resolver.resolve().await;
        resolver.resolve().await;
        assert_eq!(factory.created.lock().unwrap().len(), 2);
    }

    // ── ActiveClient ──

    #[tokio::test]
    async fn test_disabled_client_reports_not_configured() {
        let client = ActiveClient::disabled();
        assert!(client.is_empty());
        assert_eq!(client.provider(), None);
        assert!(matches!(
            client.active(),
            Err(GenerationError::NotConfigured)
        ));
    }
}
