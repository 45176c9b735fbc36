//! Language-model adapters: an OpenAI-compatible [`CompletionClient`], the
//! [`Translator`] built on it, and a file cache for translations.
//!
//! [`CompletionClient`]: itinera_core::CompletionClient
//! [`Translator`]: itinera_core::Translator

mod cache;
mod http;
mod translator;
mod wire;

pub use cache::CachedTranslator;
pub use http::{
    DEFAULT_USER_AGENT, HttpClientBuildError, HttpCompletionClient, HttpCompletionClientConfig,
};
pub use translator::{DEFAULT_MAX_ATTEMPTS, LlmTranslator};
