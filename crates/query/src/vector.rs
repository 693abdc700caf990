use anyhow::{Context, Result};
use async_trait::async_trait;
use llm::EmbeddingClient;
use serde::Serialize;
use serde_json::{Map, Value};
use store::{query, AccessMode, GraphStore};
use tracing::debug;

use crate::retriever::Retriever;

const VECTOR_SEARCH: &str = "CALL db.index.vector.queryNodes($index_name, $top_k, $embedding) \
     YIELD node, score \
     RETURN node {.text} AS node, score \
     ORDER BY score DESC";

/// One row from the vector search: similarity score plus the projected
/// chunk properties, keyed the way the query returns them.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkHit {
    pub score: f64,
    pub node: Map<String, Value>,
}

/// Nearest-chunk lookup against the chunk-embedding vector index.
pub struct VectorRetriever {
    store: GraphStore,
    embedder: EmbeddingClient,
}

impl VectorRetriever {
    pub fn new(store: GraphStore, embedder: EmbeddingClient) -> Self {
        Self { store, embedder }
    }

    /// Return at most `top_k` chunks, best score first.
    pub async fn search(&self, question: &str, top_k: usize) -> Result<Vec<ChunkHit>> {
        // 1. Embed the question
        let embedding = self
            .embedder
            .embed(question)
            .await
            .context("failed to embed question")?;
        let embedding: Vec<f64> = embedding.into_iter().map(f64::from).collect();

        // 2. Nearest chunks by cosine similarity
        let q = query(VECTOR_SEARCH)
            .param("index_name", index::VECTOR_INDEX_NAME)
            .param("top_k", top_k as i64)
            .param("embedding", embedding);

        let rows = self
            .store
            .execute(q, AccessMode::Read)
            .await
            .context("vector search failed")?;

        let mut hits = Vec::with_capacity(rows.len());
        for mut row in rows {
            let score = row
                .get("score")
                .and_then(Value::as_f64)
                .context("vector search row missing score")?;
            let node = match row.remove("node") {
                Some(Value::Object(map)) => map,
                _ => Map::new(),
            };
            hits.push(ChunkHit { score, node });
        }

        debug!(hits = hits.len(), top_k, "vector search complete");
        Ok(hits)
    }
}

#[async_trait]
impl Retriever for VectorRetriever {
    /// Matched chunk texts joined by `\n---\n`.
    async fn context_for(&self, question: &str, top_k: usize) -> Result<String> {
        let hits = self.search(question, top_k).await?;
        let texts: Vec<&str> = hits
            .iter()
            .filter_map(|hit| hit.node.get("text").and_then(Value::as_str))
            .collect();
        Ok(texts.join("\n---\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hit_serializes_as_score_and_node() {
        let mut node = Map::new();
        node.insert("text".to_string(), json!("chunk body"));
        let hit = ChunkHit { score: 0.92, node };

        let value = serde_json::to_value(&hit).unwrap();
        assert_eq!(value["score"], 0.92);
        assert_eq!(value["node"]["text"], "chunk body");
    }

    #[test]
    fn search_statement_targets_the_index_by_parameter() {
        assert!(VECTOR_SEARCH.contains("db.index.vector.queryNodes($index_name, $top_k, $embedding)"));
        assert!(VECTOR_SEARCH.contains("ORDER BY score DESC"));
    }
}
