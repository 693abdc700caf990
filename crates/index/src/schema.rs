use anyhow::{Context, Result};
use store::{query, GraphStore};
use tracing::info;

/// Name of the vector index over chunk embeddings. Retrieval queries it
/// by name, so creation and search must agree.
pub const VECTOR_INDEX_NAME: &str = "text_embeddings";

/// Constraints and indexes the graph relies on. Every statement is
/// conditional, so applying the list repeatedly is a no-op.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    "CREATE CONSTRAINT doc_id IF NOT EXISTS FOR (d:Document) REQUIRE d.doc_id IS UNIQUE",
    "CREATE CONSTRAINT entity_name IF NOT EXISTS FOR (e:Entity) REQUIRE e.name IS UNIQUE",
    "CREATE INDEX chunk_embed IF NOT EXISTS FOR (c:Chunk) ON (c.embedding)",
];

pub async fn apply_schema(store: &GraphStore) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        store
            .run(query(statement))
            .await
            .with_context(|| format!("failed to apply schema statement: {statement}"))?;
    }

    info!(statements = SCHEMA_STATEMENTS.len(), "graph schema applied");
    Ok(())
}

fn vector_index_statement(dimensions: usize) -> String {
    format!(
        "CREATE VECTOR INDEX {VECTOR_INDEX_NAME} IF NOT EXISTS \
         FOR (c:Chunk) ON c.embedding \
         OPTIONS {{indexConfig: {{`vector.dimensions`: {dimensions}, \
         `vector.similarity_function`: 'cosine'}}}}"
    )
}

/// Create the chunk-embedding vector index if it is not there yet.
/// Runs once at startup so every retrieval finds the index in place.
pub async fn ensure_vector_index(store: &GraphStore, dimensions: usize) -> Result<()> {
    let statement = vector_index_statement(dimensions);
    store
        .run(query(&statement))
        .await
        .context("failed to create vector index")?;

    info!(index = VECTOR_INDEX_NAME, dimensions, "vector index ready");
    Ok(())
}
