use thiserror::Error;

/// Failures from the chat and embeddings endpoints.
///
/// `endpoint` is `"chat"` or `"embeddings"` so callers can tell which
/// provider surface failed. Provider error messages pass through verbatim;
/// nothing is retried.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Transport-level failure before any response arrived.
    #[error("{endpoint} request failed: {source}")]
    Request {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success status from the provider.
    #[error("{endpoint} api error ({status}): {message}")]
    Api {
        endpoint: &'static str,
        status: u16,
        message: String,
    },

    /// Response body did not match the expected shape.
    #[error("{endpoint} response malformed: {message}")]
    Malformed {
        endpoint: &'static str,
        message: String,
    },
}

impl LlmError {
    /// Which provider surface produced the failure.
    pub fn endpoint(&self) -> &'static str {
        match self {
            LlmError::Request { endpoint, .. }
            | LlmError::Api { endpoint, .. }
            | LlmError::Malformed { endpoint, .. } => endpoint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_is_reported() {
        let err = LlmError::Api {
            endpoint: "embeddings",
            status: 401,
            message: "Incorrect API key provided".to_string(),
        };
        assert_eq!(err.endpoint(), "embeddings");
        assert_eq!(
            err.to_string(),
            "embeddings api error (401): Incorrect API key provided"
        );
    }
}
