use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ingest::IngestError;
use llm::LlmError;
use serde::Serialize;
use store::StoreError;
use thiserror::Error;
use tracing::error;

/// Stable failure discriminator returned to tool callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    Connectivity,
    Auth,
    Query,
    Llm,
    Embedding,
    MissingInput,
    ContextAssembly,
    Ingest,
}

/// A failed tool invocation, rendered as `{ok: false, kind, error}`
/// with an optional `trace` carrying the full error chain.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ToolError {
    kind: ToolErrorKind,
    message: String,
    trace: Option<Vec<String>>,
}

/// Walk the error chain for a typed leaf error and map it to a kind.
/// Middle layers wrap causes in `anyhow` context, so only the chain
/// walk sees the originals.
fn classify(err: &anyhow::Error) -> Option<ToolErrorKind> {
    for cause in err.chain() {
        if let Some(store_err) = cause.downcast_ref::<StoreError>() {
            return Some(match store_err {
                StoreError::Connect(_) => ToolErrorKind::Connectivity,
                StoreError::Query(_) => ToolErrorKind::Query,
                StoreError::RowDecode(_) => ToolErrorKind::ContextAssembly,
            });
        }
        if let Some(llm_err) = cause.downcast_ref::<LlmError>() {
            if let LlmError::Api {
                status: 401 | 403, ..
            } = llm_err
            {
                return Some(ToolErrorKind::Auth);
            }
            return Some(match llm_err.endpoint() {
                "embeddings" => ToolErrorKind::Embedding,
                _ => ToolErrorKind::Llm,
            });
        }
        if let Some(ingest_err) = cause.downcast_ref::<IngestError>() {
            return Some(match ingest_err {
                IngestError::MissingDir(_) | IngestError::NoPdfs(_) => ToolErrorKind::MissingInput,
                IngestError::InvalidSplitter { .. } => ToolErrorKind::Ingest,
            });
        }
    }
    None
}

impl ToolError {
    /// Classify by the typed leaf in the chain, falling back to the
    /// operation's own kind when the chain carries no typed error.
    pub fn from_anyhow(err: anyhow::Error, fallback: ToolErrorKind) -> Self {
        Self {
            kind: classify(&err).unwrap_or(fallback),
            message: format!("{err:#}"),
            trace: None,
        }
    }

    /// Like [`ToolError::from_anyhow`], additionally attaching the full
    /// error chain as a `trace` array.
    pub fn traced(err: anyhow::Error, fallback: ToolErrorKind) -> Self {
        let trace: Vec<String> = err.chain().map(ToString::to_string).collect();
        let mut tool_err = Self::from_anyhow(err, fallback);
        tool_err.trace = Some(trace);
        tool_err
    }

    pub fn kind(&self) -> ToolErrorKind {
        self.kind
    }
}

impl From<StoreError> for ToolError {
    fn from(err: StoreError) -> Self {
        Self::from_anyhow(anyhow::Error::new(err), ToolErrorKind::Query)
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    ok: bool,
    kind: ToolErrorKind,
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<&'a [String]>,
}

impl IntoResponse for ToolError {
    fn into_response(self) -> Response {
        let status = match self.kind {
            ToolErrorKind::MissingInput => StatusCode::BAD_REQUEST,
            ToolErrorKind::Auth => StatusCode::UNAUTHORIZED,
            ToolErrorKind::Query => StatusCode::UNPROCESSABLE_ENTITY,
            ToolErrorKind::Connectivity => StatusCode::SERVICE_UNAVAILABLE,
            ToolErrorKind::Llm
            | ToolErrorKind::Embedding
            | ToolErrorKind::ContextAssembly
            | ToolErrorKind::Ingest => StatusCode::INTERNAL_SERVER_ERROR,
        };

        error!(kind = ?self.kind, error = %self.message, "tool call failed");

        let body = Json(ErrorBody {
            ok: false,
            kind: self.kind,
            error: &self.message,
            trace: self.trace.as_deref(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn store_query_error_classifies_through_context() {
        let err = anyhow::Error::new(StoreError::Query("boom".to_string()))
            .context("generated cypher failed");
        let tool_err = ToolError::from_anyhow(err, ToolErrorKind::Ingest);
        assert_eq!(tool_err.kind(), ToolErrorKind::Query);
    }

    #[test]
    fn missing_pdfs_classify_as_missing_input() {
        let err: anyhow::Error = IngestError::NoPdfs("truncated-pdfs".to_string()).into();
        let tool_err = ToolError::from_anyhow(err, ToolErrorKind::Ingest);
        assert_eq!(tool_err.kind(), ToolErrorKind::MissingInput);
    }

    #[test]
    fn splitter_misconfiguration_classifies_as_ingest() {
        let err: anyhow::Error = IngestError::InvalidSplitter {
            chunk_size: 100,
            overlap: 100,
        }
        .into();
        let tool_err = ToolError::from_anyhow(err, ToolErrorKind::Llm);
        assert_eq!(tool_err.kind(), ToolErrorKind::Ingest);
    }

    #[test]
    fn embedding_endpoint_maps_to_embedding_kind() {
        let err = anyhow::Error::new(LlmError::Api {
            endpoint: "embeddings",
            status: 500,
            message: "overloaded".to_string(),
        });
        let tool_err = ToolError::from_anyhow(err, ToolErrorKind::Llm);
        assert_eq!(tool_err.kind(), ToolErrorKind::Embedding);
    }

    #[test]
    fn unauthorized_llm_call_maps_to_auth() {
        let err = anyhow::Error::new(LlmError::Api {
            endpoint: "chat",
            status: 401,
            message: "bad key".to_string(),
        });
        let tool_err = ToolError::from_anyhow(err, ToolErrorKind::Llm);
        assert_eq!(tool_err.kind(), ToolErrorKind::Auth);
    }

    #[test]
    fn unclassified_errors_use_the_fallback() {
        let err = anyhow::anyhow!("pdf is encrypted");
        let tool_err = ToolError::from_anyhow(err, ToolErrorKind::Ingest);
        assert_eq!(tool_err.kind(), ToolErrorKind::Ingest);
    }

    #[test]
    fn trace_is_omitted_unless_requested() {
        let plain = ToolError::from_anyhow(anyhow::anyhow!("x"), ToolErrorKind::Query);
        assert!(plain.trace.is_none());

        let traced = ToolError::traced(
            anyhow::anyhow!("inner").context("outer"),
            ToolErrorKind::Query,
        );
        assert_eq!(
            traced.trace,
            Some(vec!["outer".to_string(), "inner".to_string()])
        );
    }

    #[test]
    fn kind_serializes_in_snake_case() {
        let json = serde_json::to_value(ToolErrorKind::MissingInput).unwrap();
        assert_eq!(json, "missing_input");
        let json = serde_json::to_value(ToolErrorKind::ContextAssembly).unwrap();
        assert_eq!(json, "context_assembly");
    }
}
