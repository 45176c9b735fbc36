//! OpenAI-compatible chat completion client.
//!
//! [`HttpCompletionClient`] implements the synchronous [`CompletionClient`]
//! capability by blocking on asynchronous `reqwest` calls. Providers differ
//! only in endpoint, model and stop token, so each is a
//! [`HttpCompletionClientConfig`] preset rather than a separate type.
//!
//! # Example
//!
//! ```no_run
//! use itinera_core::{ChatMessage, CompletionClient, CompletionOptions};
//! use itinera_data::llm::{HttpCompletionClient, HttpCompletionClientConfig};
//!
//! let config = HttpCompletionClientConfig::deepseek().with_api_key("sk-...");
//! let client = HttpCompletionClient::with_config(config)?;
//! let answer = client.issue_completion(
//!     &[ChatMessage::user("Name one garden in Suzhou.")],
//!     CompletionOptions::ONE_LINE,
//! )?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::time::Duration;

use itinera_core::{
    ChatMessage, CompletionClient, CompletionError, CompletionOptions, merge_repeated_roles,
};
use reqwest::Client;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use super::wire::{ChatRequest, ChatResponse, ResponseFormat};

/// Error type for [`HttpCompletionClient`] construction failures.
#[derive(Debug, Error)]
pub enum HttpClientBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Default user agent for completion requests.
pub const DEFAULT_USER_AGENT: &str = "itinera-llm/0.1";

const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_TOKENS: u32 = 4096;
/// Longest error body carried into [`CompletionError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Configuration for [`HttpCompletionClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct HttpCompletionClientConfig {
    /// Provider name reported by [`CompletionClient::name`].
    pub name: String,
    /// Base URL; requests go to `{base_url}/chat/completions`.
    pub base_url: String,
    /// Model identifier sent with each request.
    pub model: String,
    /// Bearer token, if the endpoint needs one.
    pub api_key: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Completion length cap.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
    /// Stop sequence used for single-line answers.
    pub one_line_stop: String,
}

impl HttpCompletionClientConfig {
    /// Configuration for any OpenAI-compatible endpoint, such as a local
    /// vLLM server.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            model: model.into(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: 0.0,
            one_line_stop: "\n".to_owned(),
        }
    }

    /// DeepSeek's hosted chat model.
    #[must_use]
    pub fn deepseek() -> Self {
        Self::new("DeepSeek-V3", "https://api.deepseek.com", "deepseek-chat")
    }

    /// OpenAI's GPT-4o.
    #[must_use]
    pub fn gpt4o() -> Self {
        Self::new("GPT4o", "https://api.openai.com/v1", "chatgpt-4o-latest")
    }

    /// Zhipu's GLM-4-Plus. The endpoint ignores newline stops, so single-line
    /// answers stop on an explicit marker.
    #[must_use]
    pub fn glm4_plus() -> Self {
        Self::new(
            "GLM4Plus",
            "https://open.bigmodel.cn/api/paas/v4",
            "glm-4-plus",
        )
        .with_one_line_stop("<STOP>")
    }

    /// Look up a preset by name, case-insensitively.
    #[must_use]
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "deepseek" | "deepseek-v3" => Some(Self::deepseek()),
            "gpt4o" | "gpt-4o" => Some(Self::gpt4o()),
            "glm4plus" | "glm-4-plus" => Some(Self::glm4_plus()),
            _ => None,
        }
    }

    /// Set the bearer token.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the completion length cap.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the single-line stop sequence.
    #[must_use]
    pub fn with_one_line_stop(mut self, stop: impl Into<String>) -> Self {
        self.one_line_stop = stop.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Chat completion client for OpenAI-compatible endpoints.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime, or inside a `current_thread` runtime, the
/// client blocks on its own runtime. Inside a multi-threaded runtime it
/// blocks on the ambient handle through [`tokio::task::block_in_place`].
pub struct HttpCompletionClient {
    client: Client,
    config: HttpCompletionClientConfig,
    runtime: Runtime,
}

impl std::fmt::Debug for HttpCompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCompletionClient")
            .field("client", &self.client)
            .field("name", &self.config.name)
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl HttpCompletionClient {
    /// Create a client from explicit configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: HttpCompletionClientConfig) -> Result<Self, HttpClientBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(HttpClientBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(HttpClientBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime,
        })
    }

    /// The client's configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpCompletionClientConfig {
        &self.config
    }

    async fn complete_async(
        &self,
        messages: &[ChatMessage],
        options: CompletionOptions,
    ) -> Result<String, CompletionError> {
        let url = self.config.endpoint();
        let request = ChatRequest {
            model: &self.config.model,
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            stop: options.one_line.then_some([self.config.one_line_stop.as_str()]),
            response_format: options.json_mode.then_some(ResponseFormat::JSON_OBJECT),
        };
        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder
            .send()
            .await
            .map_err(|err| transport(format!("POST {url}"), err))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }
        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|err| transport(format!("decode response from {url}"), err))?;
        parsed
            .into_text()
            .map(|text| shape_answer(&text, options))
            .ok_or(CompletionError::EmptyResponse)
    }
}

fn transport(message: String, err: reqwest::Error) -> CompletionError {
    CompletionError::Transport {
        message,
        source: Box::new(err),
    }
}

/// Trim the answer and, in JSON mode, cut it down to the outermost object so
/// that code fences and surrounding prose are dropped.
fn shape_answer(text: &str, options: CompletionOptions) -> String {
    let trimmed = text.trim();
    if !options.json_mode {
        return trimmed.to_owned();
    }
    extract_json_object(trimmed).unwrap_or(trimmed).to_owned()
}

fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    text.get(start..=end)
}

impl CompletionClient for HttpCompletionClient {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn issue_completion(
        &self,
        messages: &[ChatMessage],
        options: CompletionOptions,
    ) -> Result<String, CompletionError> {
        let checked = options.validate()?;
        let merged = merge_repeated_roles(messages.to_vec());
        log::debug!(
            "{}: requesting completion for {} messages",
            self.config.name,
            merged.len()
        );
        let future = self.complete_async(&merged, checked);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}
