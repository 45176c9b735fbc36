//! Language-model capabilities consumed by the planner and translator.
//!
//! Providers differ only in endpoint and sampling settings, so a single
//! [`CompletionClient`] capability covers them all. A [`Translator`] turns a
//! natural-language request into a symbolic [`Query`].

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::{Query, QueryValidationError};

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Role {
    /// Instructions framing the conversation.
    System,
    /// The caller.
    User,
    /// The model.
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        })
    }
}

/// One turn of a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChatMessage {
    /// Speaker.
    pub role: Role,
    /// Text of the turn.
    pub content: String,
}

impl ChatMessage {
    /// A system turn.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// A user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// An assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Merge consecutive turns by the same speaker, joining their text with a
/// newline. Some providers reject repeated roles.
///
/// # Examples
/// ```
/// use itinera_core::{merge_repeated_roles, ChatMessage};
///
/// let merged = merge_repeated_roles(vec![
///     ChatMessage::user("a"),
///     ChatMessage::user("b"),
///     ChatMessage::assistant("c"),
/// ]);
/// assert_eq!(merged, vec![ChatMessage::user("a\nb"), ChatMessage::assistant("c")]);
/// ```
pub fn merge_repeated_roles(messages: Vec<ChatMessage>) -> Vec<ChatMessage> {
    let mut merged: Vec<ChatMessage> = Vec::with_capacity(messages.len());
    for message in messages {
        match merged.last_mut() {
            Some(previous) if previous.role == message.role => {
                previous.content.push('\n');
                previous.content.push_str(&message.content);
            }
            _ => merged.push(message),
        }
    }
    merged
}

/// Output shaping for a completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompletionOptions {
    /// Stop at the first newline.
    pub one_line: bool,
    /// Ask for a JSON object.
    pub json_mode: bool,
}

impl CompletionOptions {
    /// Single-line answers.
    pub const ONE_LINE: Self = Self {
        one_line: true,
        json_mode: false,
    };
    /// JSON object answers.
    pub const JSON: Self = Self {
        one_line: false,
        json_mode: true,
    };

    /// Reject contradictory settings.
    pub const fn validate(self) -> Result<Self, CompletionError> {
        if self.one_line && self.json_mode {
            return Err(CompletionError::ModeConflict);
        }
        Ok(self)
    }
}

/// Errors from [`CompletionClient::issue_completion`].
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Single-line and JSON output were both requested.
    #[error("one_line and json_mode cannot both be set")]
    ModeConflict,
    /// The provider could not be reached.
    #[error("completion request failed: {message}")]
    Transport {
        /// What was being attempted.
        message: String,
        /// Underlying error.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    /// The provider answered with an error status.
    #[error("provider returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },
    /// The provider returned no choices.
    #[error("provider returned no completion")]
    EmptyResponse,
}

/// Issue chat completions against a language model.
///
/// Calls are synchronous; callers time them to charge inference latency
/// against their own budgets.
pub trait CompletionClient {
    /// Short provider name used in cache paths and logs.
    fn name(&self) -> &str;

    /// Return the model's answer to `messages`, trimmed of surrounding
    /// whitespace.
    fn issue_completion(
        &self,
        messages: &[ChatMessage],
        options: CompletionOptions,
    ) -> Result<String, CompletionError>;
}

/// A benchmark request in natural language.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NaturalLanguageQuery {
    /// Benchmark identifier.
    pub uid: String,
    /// The request text.
    #[cfg_attr(feature = "serde", serde(alias = "nature_language"))]
    pub text: String,
}

/// Errors from [`Translator::translate`].
#[derive(Debug, Error)]
pub enum TranslationError {
    /// The language model failed.
    #[error(transparent)]
    Completion(#[from] CompletionError),
    /// The model's answer was not a query.
    #[error("could not parse translated query for {uid}: {message}")]
    Parse {
        /// Query identifier.
        uid: String,
        /// Parser diagnostic.
        message: String,
    },
    /// The translated query failed validation.
    #[error(transparent)]
    Invalid(#[from] QueryValidationError),
    /// The translation cache could not be read or written.
    #[error("translation cache failed for {uid}")]
    Cache {
        /// Query identifier.
        uid: String,
        /// Underlying error.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

/// Translate natural-language requests into symbolic queries.
pub trait Translator {
    /// Produce the symbolic form of `request`.
    fn translate(&self, request: &NaturalLanguageQuery) -> Result<Query, TranslationError>;
}

impl<T: Translator + ?Sized> Translator for Box<T> {
    fn translate(&self, request: &NaturalLanguageQuery) -> Result<Query, TranslationError> {
        (**self).translate(request)
    }
}
