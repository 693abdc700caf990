pub mod prompt;
pub mod schema;

pub use schema::{
    ChunkGraph, ExtractedEntity, ExtractedGraph, ExtractedRelation, NODE_LABELS,
    RELATIONSHIP_TYPES,
};

use anyhow::{Context, Result};
use llm::ChatClient;
use regex::Regex;

pub struct Extractor {
    chat: ChatClient,
}

impl Extractor {
    pub fn new(chat: ChatClient) -> Self {
        Self { chat }
    }

    /// Extract the entity/relationship graph of one chunk of text.
    ///
    /// A response that does not parse as the instructed JSON aborts the
    /// document's ingestion; there is no retry or repair pass.
    pub async fn extract(&self, text: &str) -> Result<ChunkGraph> {
        let prompt = prompt::build_extraction_prompt(text);

        let raw = self
            .chat
            .complete(&prompt)
            .await
            .context("entity extraction request failed")?;

        let cleaned = strip_code_fences(&raw);
        let graph: ExtractedGraph = serde_json::from_str(&cleaned)
            .context("failed to parse extraction output as JSON")?;

        Ok(graph.resolve())
    }
}

/// Pull the content out of a markdown code fence, if the model wrapped
/// its answer in one despite instructions. Without a fence the input is
/// returned trimmed.
pub fn strip_code_fences(raw: &str) -> String {
    let re = Regex::new(r"(?s)```[a-zA-Z]*\s*(.*?)\s*```").unwrap();
    match re.captures(raw) {
        Some(caps) => caps[1].to_string(),
        None => raw.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fence() {
        let raw = "```json\n{\"nodes\": []}\n```";
        assert_eq!(strip_code_fences(raw), "{\"nodes\": []}");
    }

    #[test]
    fn strips_cypher_fence() {
        let raw = "```cypher\nMATCH (n) RETURN n\n```";
        assert_eq!(strip_code_fences(raw), "MATCH (n) RETURN n");
    }

    #[test]
    fn strips_bare_fence() {
        let raw = "```\n{\"nodes\": []}\n```";
        assert_eq!(strip_code_fences(raw), "{\"nodes\": []}");
    }

    #[test]
    fn ignores_surrounding_prose() {
        let raw = "Here is the query:\n```cypher\nRETURN 1\n```\nHope that helps!";
        assert_eq!(strip_code_fences(raw), "RETURN 1");
    }

    #[test]
    fn unfenced_text_is_trimmed() {
        assert_eq!(strip_code_fences("  RETURN 1  \n"), "RETURN 1");
    }
}
