use anyhow::{bail, Context, Result};
use extract::{ExtractedEntity, ExtractedRelation, NODE_LABELS, RELATIONSHIP_TYPES};
use ingest::Chunk;
use store::{query, GraphStore};

/// MERGE-based writes into the lexical + entity graph. Every statement
/// merges on a stable key, so re-ingesting a document updates nodes in
/// place instead of duplicating them.
pub struct GraphWriter {
    store: GraphStore,
}

// Labels and relationship types cannot be query parameters, so they are
// spliced into the statement text. Validation against the fixed allowed
// sets keeps arbitrary Cypher out of those positions.

fn entity_merge_statement(label: &str) -> Result<String> {
    if !NODE_LABELS.contains(&label) {
        bail!("node label `{label}` is not in the allowed set");
    }
    Ok(format!(
        "MERGE (e:Entity {{name: $name}}) \
         SET e:`{label}` \
         WITH e \
         MATCH (c:Chunk {{chunk_id: $chunk_id}}) \
         MERGE (e)-[:FROM_CHUNK]->(c)"
    ))
}

fn relation_merge_statement(rel_type: &str) -> Result<String> {
    if !RELATIONSHIP_TYPES.contains(&rel_type) {
        bail!("relationship type `{rel_type}` is not in the allowed set");
    }
    Ok(format!(
        "MATCH (a:Entity {{name: $source}}) \
         MATCH (b:Entity {{name: $target}}) \
         MERGE (a)-[r:`{rel_type}`]->(b) \
         SET r.details = $details"
    ))
}

impl GraphWriter {
    pub fn new(store: GraphStore) -> Self {
        Self { store }
    }

    pub async fn write_document(&self, doc_id: &str, path: &str) -> Result<()> {
        let q = query("MERGE (d:Document {doc_id: $doc_id}) SET d.path = $path")
            .param("doc_id", doc_id)
            .param("path", path);

        self.store
            .run(q)
            .await
            .context("failed to write document node")?;
        Ok(())
    }

    /// Write one chunk with its embedding and attach it to its document.
    pub async fn write_chunk(&self, chunk: &Chunk, embedding: Vec<f32>) -> Result<()> {
        let embedding: Vec<f64> = embedding.into_iter().map(f64::from).collect();

        let q = query(
            "MERGE (c:Chunk {chunk_id: $chunk_id}) \
             SET c.text = $text, c.index = $index, c.embedding = $embedding \
             WITH c \
             MATCH (d:Document {doc_id: $doc_id}) \
             MERGE (c)-[:FROM_DOCUMENT]->(d)",
        )
        .param("chunk_id", chunk.chunk_id.as_str())
        .param("text", chunk.text.as_str())
        .param("index", chunk.index as i64)
        .param("embedding", embedding)
        .param("doc_id", chunk.doc_id.as_str());

        self.store
            .run(q)
            .await
            .with_context(|| format!("failed to write chunk {}", chunk.chunk_id))?;
        Ok(())
    }

    /// Chain two chunks in document order.
    pub async fn link_next(&self, prev_id: &str, next_id: &str) -> Result<()> {
        let q = query(
            "MATCH (a:Chunk {chunk_id: $prev}) \
             MATCH (b:Chunk {chunk_id: $next}) \
             MERGE (a)-[:NEXT_CHUNK]->(b)",
        )
        .param("prev", prev_id)
        .param("next", next_id);

        self.store
            .run(q)
            .await
            .context("failed to link chunk order")?;
        Ok(())
    }

    /// Merge an entity by name, add its extracted label, and link it to
    /// the chunk it was found in.
    pub async fn write_entity(&self, entity: &ExtractedEntity, chunk_id: &str) -> Result<()> {
        let statement = entity_merge_statement(&entity.label)?;
        let q = query(&statement)
            .param("name", entity.name.as_str())
            .param("chunk_id", chunk_id);

        self.store
            .run(q)
            .await
            .with_context(|| format!("failed to write entity {}", entity.name))?;
        Ok(())
    }

    /// Merge a relationship between two entities written earlier.
    pub async fn write_relation(&self, relation: &ExtractedRelation) -> Result<()> {
        let statement = relation_merge_statement(&relation.rel_type)?;
        let q = query(&statement)
            .param("source", relation.source.as_str())
            .param("target", relation.target.as_str())
            .param("details", relation.details.as_str());

        self.store
            .run(q)
            .await
            .with_context(|| {
                format!(
                    "failed to write relation {} -{}-> {}",
                    relation.source, relation.rel_type, relation.target
                )
            })?;
        Ok(())
    }
}
