use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LlmError;

const ENDPOINT: &str = "embeddings";

/// Embeddings client against an OpenAI-style API.
///
/// The configured dimension count is what the vector index is created
/// with, so every request pins it via the `dimensions` parameter and
/// the returned widths are checked against it. Both sides of the search
/// stay in agreement even when the count differs from the model's
/// native width.
#[derive(Clone)]
pub struct EmbeddingClient {
    base_url: String,
    api_key: String,
    model: String,
    dimensions: usize,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
    dimensions: usize,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl EmbeddingClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        dimensions: usize,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            dimensions,
            client: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Embed a single text.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        self.embed_batch(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Malformed {
                endpoint: ENDPOINT,
                message: "response contained no embeddings".to_string(),
            })
    }

    /// Embed a batch of texts in one API call, preserving input order.
    pub async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, LlmError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/embeddings", self.base_url.trim_end_matches('/'));
        debug!(model = %self.model, batch = texts.len(), "requesting embeddings");

        let request = EmbeddingRequest {
            model: &self.model,
            input: texts.to_vec(),
            dimensions: self.dimensions,
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

        let parsed: EmbeddingResponse = response.json().await.map_err(|e| LlmError::Malformed {
            endpoint: ENDPOINT,
            message: e.to_string(),
        })?;

        if parsed.data.len() != texts.len() {
            return Err(LlmError::Malformed {
                endpoint: ENDPOINT,
                message: format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    parsed.data.len()
                ),
            });
        }

        // A provider that ignores the dimensions parameter would hand
        // back vectors the index rejects; fail here with the real cause.
        if let Some(data) = parsed.data.iter().find(|d| d.embedding.len() != self.dimensions) {
            return Err(LlmError::Malformed {
                endpoint: ENDPOINT,
                message: format!(
                    "expected {}-dimensional embeddings, got {}",
                    self.dimensions,
                    data.embedding.len()
                ),
            });
        }

        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_preserves_vector_order() {
        let body = r#"{
            "object": "list",
            "data": [
                {"object": "embedding", "index": 0, "embedding": [0.1, 0.2]},
                {"object": "embedding", "index": 1, "embedding": [0.3, 0.4]}
            ],
            "model": "text-embedding-3-small"
        }"#;
        let parsed: EmbeddingResponse = serde_json::from_str(body).unwrap();
        let vectors: Vec<Vec<f32>> = parsed.data.into_iter().map(|d| d.embedding).collect();
        assert_eq!(vectors, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
    }

    #[test]
    fn request_sends_all_inputs() {
        let request = EmbeddingRequest {
            model: "text-embedding-3-small",
            input: vec!["first chunk", "second chunk"],
            dimensions: 1536,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["input"].as_array().unwrap().len(), 2);
        assert_eq!(json["input"][0], "first chunk");
    }

    #[test]
    fn request_pins_the_configured_dimensions() {
        // The vector index is created with this width; the request must
        // ask the provider for the same one.
        let request = EmbeddingRequest {
            model: "text-embedding-3-small",
            input: vec!["chunk"],
            dimensions: 512,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["dimensions"], 512);
    }

    #[tokio::test]
    async fn empty_batch_short_circuits() {
        let client = EmbeddingClient::new("http://localhost:9", "key", "model", 1536);
        let vectors = client.embed_batch(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }
}
