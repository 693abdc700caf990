pub mod chat;
pub mod embeddings;
pub mod error;

pub use chat::ChatClient;
pub use embeddings::EmbeddingClient;
pub use error::LlmError;

use serde::Deserialize;

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Turn a non-success response into an [`LlmError::Api`], pulling the
/// provider's own message out of the body when it parses.
pub(crate) async fn api_error(endpoint: &'static str, response: reqwest::Response) -> LlmError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or(body);
    LlmError::Api {
        endpoint,
        status,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_parses_provider_message() {
        let body = r#"{"error": {"message": "Rate limit reached", "type": "rate_limit"}}"#;
        let parsed: ApiErrorBody = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.message, "Rate limit reached");
    }
}
