use anyhow::{Context, Result};
use extract::{strip_code_fences, NODE_LABELS, RELATIONSHIP_TYPES};
use llm::ChatClient;
use serde_json::{Map, Value};
use store::{query, AccessMode, GraphStore};
use tracing::debug;

/// Generated Cypher plus the rows it produced when executed.
#[derive(Debug, Clone)]
pub struct CypherResult {
    pub cypher: String,
    pub rows: Vec<Map<String, Value>>,
}

/// Turns a natural-language question into Cypher and runs it.
pub struct Text2Cypher {
    store: GraphStore,
    chat: ChatClient,
}

fn build_cypher_prompt(question: &str) -> String {
    format!(
        r#"Translate the question into a single Cypher query for a Neo4j database.

GRAPH SCHEMA:
- Node labels: {labels}
- Relationship types between entities: {rel_types}
- Document nodes have doc_id and path properties
- Chunk nodes hold document text in a text property and link to their Document via FROM_DOCUMENT; consecutive chunks are linked via NEXT_CHUNK
- Entity nodes are identified by a name property and link to the Chunk they were found in via FROM_CHUNK
- Relationships between entities may carry a details property

RULES:
- Use only the labels, relationship types and properties above
- Do not use any write clause (CREATE, MERGE, DELETE, SET, REMOVE, DROP)
- Output ONLY the Cypher query, no markdown, no explanations

QUESTION:
{question}

CYPHER QUERY:"#,
        labels = NODE_LABELS.join(", "),
        rel_types = RELATIONSHIP_TYPES.join(", "),
        question = question,
    )
}

impl Text2Cypher {
    pub fn new(store: GraphStore, chat: ChatClient) -> Self {
        Self { store, chat }
    }

    /// Generate Cypher for the question and execute it verbatim.
    ///
    /// An invalid generated query surfaces the driver's error as-is;
    /// there is no retry or repair pass.
    pub async fn search(&self, question: &str) -> Result<CypherResult> {
        // 1. Generate the query from the schema context
        let prompt = build_cypher_prompt(question);
        let raw = self
            .chat
            .complete(&prompt)
            .await
            .context("cypher generation request failed")?;
        let cypher = strip_code_fences(&raw);
        debug!(%cypher, "generated cypher");

        // 2. Execute it
        let rows = self
            .store
            .execute(query(&cypher), AccessMode::Read)
            .await
            .with_context(|| format!("generated cypher failed: {cypher}"))?;

        Ok(CypherResult { cypher, rows })
    }
}
