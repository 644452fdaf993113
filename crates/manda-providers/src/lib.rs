//! Provider resolution and backend clients for Manda's AI layer.
//!
//! # Architecture
//!
//! - [`registry`] — static specs for the three supported providers
//! - [`traits`] — the [`GenerationBackend`] and [`BackendFactory`] abstractions
//! - [`settings`] — the async settings-store collaborator
//! - [`resolver`] — picks exactly one provider, validates its credential,
//!   and produces the shared [`ActiveClient`]; every failure degrades to a
//!   smaller active set instead of an error
//! - [`backends`] — HTTP clients for Gemini, OpenAI, and Anthropic

pub mod backends;
pub mod registry;
pub mod resolver;
pub mod settings;
pub mod traits;

// Re-export main types for convenience
pub use registry::{find_by_name, spec_for, ProviderSpec, PROVIDERS};
pub use resolver::{ActiveClient, ProviderResolver, Resolution, ResolveWarning};
pub use settings::{HttpSettingsStore, NoSettingsStore, SettingsStore};
pub use traits::{BackendFactory, GenerationBackend, HttpBackendFactory};

/// Re-export the provider identity from core — single source of truth.
pub use manda_core::provider::ProviderChoice;
