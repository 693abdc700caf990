use anyhow::Result;
use async_trait::async_trait;

/// A retrieval strategy that turns a question into grounding context
/// for the generation step.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn context_for(&self, question: &str, top_k: usize) -> Result<String>;
}
