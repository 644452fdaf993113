//! Settings store — persisted application-wide configuration, queried
//! asynchronously.
//!
//! The resolver consults the store only when `AI_PROVIDER` is unset, and
//! recovers locally from any failure here (unreachable service, bad payload,
//! timeout) by defaulting to Gemini. Nothing in this module is allowed to
//! take the process down.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

// ─────────────────────────────────────────────
// Trait
// ─────────────────────────────────────────────

/// Async lookup of the application-wide AI provider setting.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Fetch the stored provider name, if one is set.
    ///
    /// `Ok(None)` means the setting exists but no provider is chosen;
    /// `Err` means the store itself was unreachable or returned garbage.
    async fn provider_setting(&self) -> anyhow::Result<Option<String>>;
}

// ─────────────────────────────────────────────
// HTTP implementation
// ─────────────────────────────────────────────

/// Settings store backed by Manda's shared settings service.
///
/// Expects `GET {base}/settings/ai` to return `{"provider": "..."}`
/// (provider key optional).
pub struct HttpSettingsStore {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct AiSettings {
    provider: Option<String>,
}

impl HttpSettingsStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    fn settings_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{base}/settings/ai")
    }
}

#[async_trait]
impl SettingsStore for HttpSettingsStore {
    async fn provider_setting(&self) -> anyhow::Result<Option<String>> {
        let url = self.settings_url();
        debug!(url = %url, "fetching AI provider setting");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("settings service returned {status}");
        }

        let settings: AiSettings = response.json().await?;
        debug!(provider = settings.provider.as_deref().unwrap_or("(unset)"), "AI setting fetched");
        Ok(settings.provider)
    }
}

// ─────────────────────────────────────────────
// Disabled store
// ─────────────────────────────────────────────

/// A store that always reports "no setting" — used when no settings service
/// is configured. Distinct from a failing store: this is `Ok(None)`, so the
/// resolver takes the clean default path without logging a warning.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSettingsStore;

#[async_trait]
impl SettingsStore for NoSettingsStore {
    async fn provider_setting(&self) -> anyhow::Result<Option<String>> {
        Ok(None)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_settings_url_trailing_slash() {
        let store = HttpSettingsStore::new("https://settings.manda.network/");
        assert_eq!(
            store.settings_url(),
            "https://settings.manda.network/settings/ai"
        );
    }

    #[tokio::test]
    async fn test_fetch_provider_setting() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/settings/ai"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"provider": "openai"})),
            )
            .mount(&mock_server)
            .await;

        let store = HttpSettingsStore::new(mock_server.uri());
        let setting = store.provider_setting().await.unwrap();
        assert_eq!(setting.as_deref(), Some("openai"));
    }

    #[tokio::test]
    async fn test_fetch_unset_provider() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/settings/ai"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&mock_server)
            .await;

        let store = HttpSettingsStore::new(mock_server.uri());
        assert_eq!(store.provider_setting().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_service_error_is_err() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/settings/ai"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let store = HttpSettingsStore::new(mock_server.uri());
        let err = store.provider_setting().await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_err() {
        // Port that's not listening
        let store = HttpSettingsStore::new("http://127.0.0.1:1");
        assert!(store.provider_setting().await.is_err());
    }

    #[tokio::test]
    async fn test_no_settings_store() {
        assert_eq!(NoSettingsStore.provider_setting().await.unwrap(), None);
    }
}
