use std::sync::Arc;

use anyhow::{Context, Result};
use llm::ChatClient;
use serde::Serialize;
use tracing::debug;

use crate::retriever::Retriever;
use crate::template::RagTemplate;

/// Answer plus the context block it was grounded on.
#[derive(Debug, Clone, Serialize)]
pub struct RagResult {
    pub answer: String,
    pub context: String,
}

/// Retrieval-augmented generation over one retriever. Holds no state
/// between searches; every call retrieves fresh context.
pub struct GraphRag {
    retriever: Arc<dyn Retriever>,
    chat: ChatClient,
    template: RagTemplate,
}

impl GraphRag {
    pub fn new(retriever: Arc<dyn Retriever>, chat: ChatClient, template: RagTemplate) -> Self {
        Self {
            retriever,
            chat,
            template,
        }
    }

    pub async fn search(&self, question: &str, top_k: usize) -> Result<RagResult> {
        // 1. Retrieve grounding context
        let context = self
            .retriever
            .context_for(question, top_k)
            .await
            .context("context retrieval failed")?;
        debug!(context_len = context.len(), "retrieved context");

        // 2. Fill the template and generate the answer
        let prompt = self.template.fill(question, &context);
        let answer = self
            .chat
            .complete(&prompt)
            .await
            .context("answer generation failed")?;

        Ok(RagResult { answer, context })
    }
}
