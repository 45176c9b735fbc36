//! Language-model translation of natural-language requests.

use itinera_core::{
    ChatMessage, CompletionClient, CompletionOptions, NaturalLanguageQuery, Query,
    QueryValidationError, TranslationError, Translator,
};
use itinera_verify::{CONCEPT_NAMES, Expression, ExpressionError};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Attempts made before a malformed answer is reported.
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

const PROMPT_HEADER: &str = "\
You translate travel requests into JSON queries for a symbolic planner.
Answer with one JSON object with these fields:
  start_city (string), target_city (string), people_number (integer >= 1),
  days (integer >= 1), budget (integer or null),
  room_type (beds per room, integer or null), room_count (integer or null),
  innercity_preference (list drawn from \"walk\", \"taxi\", \"metro\"),
  logical_constraints (list of boolean expressions),
  preference (null or {\"direction\": \"maximize\" | \"minimize\",
    \"concept\": name, \"code\": expression}).
Expressions use numbers, 'quoted text', {'set', 'literals'}, the operators
+ - * / == != < <= > >= in, not in, and, or, not, and the functions
len, abs, min, max. Sets compare by inclusion.
Only state constraints the request makes explicit.
Available concepts:";

/// Why an answer was sent back to the model.
#[derive(Debug, Error)]
enum Rejection {
    #[error("the answer is not a JSON query: {0}")]
    Malformed(String),
    #[error("constraint {source_text:?} does not parse: {error}")]
    Constraint {
        source_text: String,
        #[source]
        error: ExpressionError,
    },
    #[error(transparent)]
    Invalid(#[from] QueryValidationError),
}

impl Rejection {
    fn into_error(self, uid: &str) -> TranslationError {
        match self {
            Self::Invalid(error) => TranslationError::Invalid(error),
            other => TranslationError::Parse {
                uid: uid.to_owned(),
                message: other.to_string(),
            },
        }
    }
}

/// [`Translator`] asking a [`CompletionClient`] for a JSON query.
///
/// Answers that are not JSON, fail [`Query::validate`], or hold constraints
/// the expression language cannot parse are returned to the model with the
/// diagnostic, up to the attempt limit. Completion failures end the
/// translation immediately.
#[derive(Debug, Clone)]
pub struct LlmTranslator<C> {
    client: C,
    max_attempts: usize,
}

impl<C: CompletionClient> LlmTranslator<C> {
    /// Translate with `client`, allowing [`DEFAULT_MAX_ATTEMPTS`] attempts.
    #[must_use]
    pub const fn new(client: C) -> Self {
        Self {
            client,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Set the attempt limit; zero is treated as one.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = if max_attempts == 0 { 1 } else { max_attempts };
        self
    }

    /// The underlying client.
    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }

    fn conversation(request: &NaturalLanguageQuery) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(format!("{PROMPT_HEADER} {}.", CONCEPT_NAMES.join(", "))),
            ChatMessage::user(request.text.clone()),
        ]
    }
}

/// Decode and check one answer.
fn read_answer(uid: &str, answer: &str) -> Result<Query, Rejection> {
    let mut value: JsonValue =
        serde_json::from_str(answer).map_err(|err| Rejection::Malformed(err.to_string()))?;
    let JsonValue::Object(fields) = &mut value else {
        return Err(Rejection::Malformed("expected an object".to_owned()));
    };
    fields.insert("uid".to_owned(), JsonValue::String(uid.to_owned()));
    let query: Query =
        serde_json::from_value(value).map_err(|err| Rejection::Malformed(err.to_string()))?;
    query.validate()?;
    let preference_code = query.preference.iter().map(|objective| &objective.code);
    for source in query.logical_constraints.iter().chain(preference_code) {
        Expression::parse(source).map_err(|error| Rejection::Constraint {
            source_text: source.clone(),
            error,
        })?;
    }
    Ok(query)
}

impl<C: CompletionClient> Translator for LlmTranslator<C> {
    fn translate(&self, request: &NaturalLanguageQuery) -> Result<Query, TranslationError> {
        let mut messages = Self::conversation(request);
        let mut attempt = 1;
        loop {
            let answer = self
                .client
                .issue_completion(&messages, CompletionOptions::JSON)?;
            let rejection = match read_answer(&request.uid, &answer) {
                Ok(query) => {
                    log::info!(
                        "{}: translated by {} after {attempt} attempt(s)",
                        request.uid,
                        self.client.name()
                    );
                    return Ok(query);
                }
                Err(rejection) => rejection,
            };
            log::debug!("{}: attempt {attempt} rejected: {rejection}", request.uid);
            if attempt >= self.max_attempts {
                return Err(rejection.into_error(&request.uid));
            }
            attempt += 1;
            messages.push(ChatMessage::assistant(answer));
            messages.push(ChatMessage::user(format!(
                "{rejection}. Reply with the corrected JSON object only."
            )));
        }
    }
}
