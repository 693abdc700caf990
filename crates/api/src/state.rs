use anyhow::{bail, Context, Result};
use llm::{ChatClient, EmbeddingClient};
use query::{GraphRag, RagTemplate, Text2Cypher, VectorGraphRetriever, VectorRetriever};
use std::sync::Arc;
use store::{GraphStore, StoreConfig};
use tracing::info;

use crate::config::Config;

/// Process-wide collaborators, built once at startup and handed to
/// every handler through axum state. Nothing here is reconstructed per
/// request.
#[derive(Clone)]
pub struct AppState {
    pub store: GraphStore,
    pub pipeline: Arc<index::KgPipeline>,
    pub vector: Arc<VectorRetriever>,
    pub vector_graph: Arc<VectorGraphRetriever>,
    pub text2cypher: Arc<Text2Cypher>,
    pub vector_rag: Arc<GraphRag>,
    pub hybrid_rag: Arc<GraphRag>,
    pub pdf_dir: String,
}

impl AppState {
    pub async fn initialize(config: &Config) -> Result<Self> {
        // Connect to Neo4j once for the process lifetime
        let store = GraphStore::connect(&StoreConfig {
            uri: config.neo4j.url.clone(),
            user: config.neo4j.user.clone(),
            password: config.neo4j.password.clone(),
            database: config.neo4j.database.clone(),
        })
        .await
        .context("failed to connect to Neo4j")?;

        if !store
            .verify_connectivity()
            .await
            .context("Neo4j connectivity check failed")?
        {
            bail!("Neo4j connectivity probe returned an unexpected result");
        }
        info!(db = %config.neo4j.database, "connected to Neo4j");

        let chat = ChatClient::new(
            config.openai.base_url.clone(),
            config.openai.api_key.clone(),
            config.openai.chat_model.clone(),
        );
        let embedder = EmbeddingClient::new(
            config.openai.base_url.clone(),
            config.openai.api_key.clone(),
            config.openai.embedding_model.clone(),
            config.openai.embedding_dimensions,
        );

        // The vector index must exist before any retrieval runs
        index::ensure_vector_index(&store, embedder.dimensions()).await?;

        let vector = Arc::new(VectorRetriever::new(store.clone(), embedder.clone()));
        let vector_graph = Arc::new(VectorGraphRetriever::new(store.clone(), embedder.clone()));

        let template = RagTemplate::default();
        let vector_rag = Arc::new(GraphRag::new(
            vector.clone(),
            chat.clone(),
            template.clone(),
        ));
        let hybrid_rag = Arc::new(GraphRag::new(vector_graph.clone(), chat.clone(), template));

        let text2cypher = Arc::new(Text2Cypher::new(store.clone(), chat.clone()));
        let pipeline = Arc::new(index::KgPipeline::new(store.clone(), chat, embedder));

        Ok(Self {
            store,
            pipeline,
            vector,
            vector_graph,
            text2cypher,
            vector_rag,
            hybrid_rag,
            pdf_dir: config.pdf_dir.clone(),
        })
    }
}
