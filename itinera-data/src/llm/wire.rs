//! Wire types for OpenAI-compatible chat completion endpoints.
//!
//! Only the fields the client reads or writes are modelled; unknown response
//! fields are ignored.

use itinera_core::ChatMessage;
use serde::{Deserialize, Serialize};

/// Body of `POST {base_url}/chat/completions`.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub max_tokens: u32,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<[&'a str; 1]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

/// Requested output format.
#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl ResponseFormat {
    pub const JSON_OBJECT: Self = Self {
        kind: "json_object",
    };
}

/// Successful completion response.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Text of the first choice, if any.
    pub fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn serialises_json_mode_requests() {
        let messages = [ChatMessage::system("plan"), ChatMessage::user("two days")];
        let request = ChatRequest {
            model: "deepseek-chat",
            messages: &messages,
            max_tokens: 4096,
            temperature: 0.0,
            stop: None,
            response_format: Some(ResponseFormat::JSON_OBJECT),
        };
        let value = serde_json::to_value(&request).expect("serialise request");
        assert_eq!(value["model"], "deepseek-chat");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["response_format"]["type"], "json_object");
        assert!(value.get("stop").is_none());
    }

    #[rstest]
    fn reads_first_choice() {
        let json = r#"{
            "id": "cmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "lunch"}},
                {"index": 1, "message": {"role": "assistant", "content": "dinner"}}
            ]
        }"#;
        let response: ChatResponse = serde_json::from_str(json).expect("deserialise");
        assert_eq!(response.into_text().as_deref(), Some("lunch"));
    }

    #[rstest]
    fn tolerates_missing_content() {
        let json = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        let response: ChatResponse = serde_json::from_str(json).expect("deserialise");
        assert_eq!(response.into_text(), None);
    }
}
