use anyhow::{Context, Result};
use async_trait::async_trait;
use llm::EmbeddingClient;
use serde_json::Value;
use store::{query, AccessMode, GraphStore};
use tracing::debug;

use crate::retriever::Retriever;

// Vector hits, then up to two hops out from each matched chunk's
// entities. The OPTIONAL MATCH plus the [null] unwind keep chunks with
// zero relationships in the result. Both sections come back as
// structured columns rather than one preformatted string.
const TRAVERSAL_SEARCH: &str = "CALL db.index.vector.queryNodes($index_name, $top_k, $embedding) \
     YIELD node \
     WITH node AS chunk \
     OPTIONAL MATCH (chunk)<-[:FROM_CHUNK]-()-[relList:!FROM_CHUNK]-{1,2}() \
     UNWIND (CASE WHEN relList IS NULL THEN [null] ELSE relList END) AS rel \
     WITH collect(DISTINCT chunk) AS chunks, collect(DISTINCT rel) AS rels \
     RETURN [c IN chunks | c.text] AS chunk_texts, \
            [r IN rels WHERE r IS NOT NULL | {subject: startNode(r).name, \
             rel_type: type(r), detail: coalesce(r.details, ''), \
             object: endNode(r).name}] AS relationships";

/// One entity-graph relationship, serialized into the context block as
/// `subject - rel_type(detail) -> object`.
#[derive(Debug, Clone, PartialEq)]
pub struct RelTriple {
    pub subject: String,
    pub rel_type: String,
    pub detail: String,
    pub object: String,
}

impl RelTriple {
    fn render(&self) -> String {
        format!(
            "{} - {}({}) -> {}",
            self.subject, self.rel_type, self.detail, self.object
        )
    }
}

/// Structured retrieval context: matched chunk texts plus the
/// relationships within two hops of them. Kept structured so the two
/// sections can be returned separately without splitting any string.
#[derive(Debug, Clone, Default)]
pub struct GraphContext {
    pub chunk_texts: Vec<String>,
    pub relationships: Vec<RelTriple>,
}

impl GraphContext {
    /// The `=== text ===` section, header included.
    pub fn text_section(&self) -> String {
        format!("=== text ===\n{}", self.chunk_texts.join("\n---\n"))
    }

    /// The `=== kg_rels ===` section, header included. The header is
    /// present even when no relationships were found.
    pub fn kg_section(&self) -> String {
        let rels: Vec<String> = self.relationships.iter().map(RelTriple::render).collect();
        format!("=== kg_rels ===\n{}", rels.join("\n---\n"))
    }

    /// The full context block handed to generation.
    pub fn render(&self) -> String {
        format!("{}\n\n{}", self.text_section(), self.kg_section())
    }
}

/// Vector search widened with a bounded traversal of the entity graph.
pub struct VectorGraphRetriever {
    store: GraphStore,
    embedder: EmbeddingClient,
}

impl VectorGraphRetriever {
    pub fn new(store: GraphStore, embedder: EmbeddingClient) -> Self {
        Self { store, embedder }
    }

    pub async fn search(&self, question: &str, top_k: usize) -> Result<GraphContext> {
        // 1. Embed the question
        let embedding = self
            .embedder
            .embed(question)
            .await
            .context("failed to embed question")?;
        let embedding: Vec<f64> = embedding.into_iter().map(f64::from).collect();

        // 2. Vector hits plus the 2-hop neighborhood in one query
        let q = query(TRAVERSAL_SEARCH)
            .param("index_name", index::VECTOR_INDEX_NAME)
            .param("top_k", top_k as i64)
            .param("embedding", embedding);

        let rows = self
            .store
            .execute(q, AccessMode::Read)
            .await
            .context("vector graph search failed")?;

        // 3. Map the structured columns
        let Some(row) = rows.into_iter().next() else {
            return Ok(GraphContext::default());
        };

        let chunk_texts = row
            .get("chunk_texts")
            .and_then(Value::as_array)
            .map(|texts| {
                texts
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let relationships = row
            .get("relationships")
            .and_then(Value::as_array)
            .map(|rels| rels.iter().filter_map(rel_triple).collect())
            .unwrap_or_default();

        let context = GraphContext {
            chunk_texts,
            relationships,
        };
        debug!(
            chunks = context.chunk_texts.len(),
            relationships = context.relationships.len(),
            "graph context assembled"
        );
        Ok(context)
    }
}

fn rel_triple(value: &Value) -> Option<RelTriple> {
    let map = value.as_object()?;
    let field = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);
    Some(RelTriple {
        subject: field("subject")?,
        rel_type: field("rel_type")?,
        detail: field("detail").unwrap_or_default(),
        object: field("object")?,
    })
}

#[async_trait]
impl Retriever for VectorGraphRetriever {
    async fn context_for(&self, question: &str, top_k: usize) -> Result<String> {
        Ok(self.search(question, top_k).await?.render())
    }
}
