use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LlmError;

const ENDPOINT: &str = "chat";

/// Chat-completions client against an OpenAI-style API.
///
/// One prompt in, one answer out. Temperature defaults to 0.0 so
/// extraction and Cypher generation stay deterministic.
#[derive(Clone)]
pub struct ChatClient {
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl ChatClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.0,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a single user message and return the assistant's reply text.
    pub async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        debug!(model = %self.model, prompt_len = prompt.len(), "requesting chat completion");

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|source| LlmError::Request {
                endpoint: ENDPOINT,
                source,
            })?;

        if !response.status().is_success() {
            return Err(crate::api_error(ENDPOINT, response).await);
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| LlmError::Malformed {
            endpoint: ENDPOINT,
            message: e.to_string(),
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| LlmError::Malformed {
                endpoint: ENDPOINT,
                message: "response contained no choices".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_yields_first_choice_content() {
        let body = r#"{
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "MATCH (n) RETURN n"}, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 10, "completion_tokens": 6}
        }"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        let content = parsed.choices.into_iter().next().unwrap().message.content;
        assert_eq!(content, "MATCH (n) RETURN n");
    }

    #[test]
    fn request_serializes_single_user_message() {
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage {
                role: "user",
                content: "hello",
            }],
            temperature: 0.0,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
        assert_eq!(json["temperature"], 0.0);
    }
}
