use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{ToolError, ToolErrorKind};
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/tools/build_graph_schema", post(build_graph_schema))
        .route("/tools/build_kg_from_pdfs", post(build_kg_from_pdfs))
        .route("/tools/run_vector_query", post(run_vector_query))
        .route("/tools/run_hybrid_query", post(run_hybrid_query))
        .route("/tools/run_graphrag_search_both", post(run_graphrag_search_both))
        .route(
            "/tools/run_graphrag_search_vector_withcontext",
            post(run_graphrag_search_vector_withcontext),
        )
        .route(
            "/tools/run_graphrag_search_hybrid_withcontext",
            post(run_graphrag_search_hybrid_withcontext),
        )
        .route("/tools/text2cypher", post(text2cypher))
        .route("/tools/read_neo4j_cypher", post(read_neo4j_cypher))
        .route("/tools/health", post(health))
        .route("/tools/health", get(health))
        .with_state(state)
}

fn default_top_k() -> usize {
    5
}

fn default_hybrid_top_k() -> usize {
    3
}

#[derive(Deserialize)]
struct QuestionRequest {
    question: String,
    #[serde(default = "default_top_k")]
    top_k: usize,
}

#[derive(Deserialize)]
struct HybridRequest {
    question: String,
    #[serde(default = "default_hybrid_top_k")]
    top_k: usize,
}

#[derive(Deserialize, Default)]
struct BuildKgRequest {
    #[serde(default)]
    paths: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct CypherRequest {
    query: String,
}

#[derive(Serialize)]
struct MessageResponse {
    ok: bool,
    message: String,
}

#[derive(Serialize)]
struct BuildKgResponse {
    ok: bool,
    message: String,
    processed: usize,
}

#[derive(Serialize)]
struct VectorQueryResponse {
    ok: bool,
    query: String,
    result: Vec<query::ChunkHit>,
}

#[derive(Serialize)]
struct HybridQueryResponse {
    ok: bool,
    text_chunk_context: String,
    kg_context: String,
}

#[derive(Serialize)]
struct BothSearchResponse {
    ok: bool,
    vector_response: String,
    vector_cypher_response: String,
}

#[derive(Serialize)]
struct VectorSearchResponse {
    ok: bool,
    vector_response: String,
}

#[derive(Serialize)]
struct HybridSearchResponse {
    ok: bool,
    vector_cypher_response: String,
}

#[derive(Serialize)]
struct CypherResponse {
    ok: bool,
    cypher: String,
    data: Vec<Map<String, Value>>,
}

#[derive(Serialize)]
struct RowsResponse {
    ok: bool,
    rows: Vec<Map<String, Value>>,
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
}

/// Apply the constraints and indexes the graph relies on.
async fn build_graph_schema(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MessageResponse>, ToolError> {
    info!("applying graph schema");
    index::apply_schema(&state.store)
        .await
        .map_err(|e| ToolError::from_anyhow(e, ToolErrorKind::Query))?;

    Ok(Json(MessageResponse {
        ok: true,
        message: "Schema created successfully".to_string(),
    }))
}

/// Build the knowledge graph from the given PDFs, or from every PDF in
/// the configured directory when no paths are passed.
async fn build_kg_from_pdfs(
    State(state): State<Arc<AppState>>,
    req: Option<Json<BuildKgRequest>>,
) -> Result<Json<BuildKgResponse>, ToolError> {
    let paths: Vec<PathBuf> = match req.and_then(|Json(r)| r.paths) {
        Some(paths) if !paths.is_empty() => paths.into_iter().map(PathBuf::from).collect(),
        _ => ingest::list_pdfs(Path::new(&state.pdf_dir))
            .await
            .map_err(|e| ToolError::traced(e, ToolErrorKind::MissingInput))?,
    };

    info!(count = paths.len(), "building knowledge graph from pdfs");
    let processed = state
        .pipeline
        .run_files(&paths)
        .await
        .map_err(|e| ToolError::traced(e, ToolErrorKind::Ingest))?;

    Ok(Json(BuildKgResponse {
        ok: true,
        message: format!("Processed {processed} PDFs"),
        processed,
    }))
}

/// Semantic search over chunk embeddings; returns the raw scored rows.
async fn run_vector_query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QuestionRequest>,
) -> Result<Json<VectorQueryResponse>, ToolError> {
    info!(top_k = req.top_k, "running vector query");
    let hits = state
        .vector
        .search(&req.question, req.top_k)
        .await
        .map_err(|e| ToolError::from_anyhow(e, ToolErrorKind::ContextAssembly))?;

    Ok(Json(VectorQueryResponse {
        ok: true,
        query: req.question,
        result: hits,
    }))
}

/// Vector search plus graph traversal; returns the two context sections
/// separately, each with its header.
async fn run_hybrid_query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<HybridRequest>,
) -> Result<Json<HybridQueryResponse>, ToolError> {
    info!(top_k = req.top_k, "running hybrid query");
    let context = state
        .vector_graph
        .search(&req.question, req.top_k)
        .await
        .map_err(|e| ToolError::from_anyhow(e, ToolErrorKind::ContextAssembly))?;

    Ok(Json(HybridQueryResponse {
        ok: true,
        text_chunk_context: context.text_section(),
        kg_context: context.kg_section(),
    }))
}

/// Answer the question with both RAG variants.
async fn run_graphrag_search_both(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QuestionRequest>,
) -> Result<Json<BothSearchResponse>, ToolError> {
    info!(top_k = req.top_k, "running graphrag search with both retrievers");
    let vector = state
        .vector_rag
        .search(&req.question, req.top_k)
        .await
        .map_err(|e| ToolError::from_anyhow(e, ToolErrorKind::Llm))?;
    let hybrid = state
        .hybrid_rag
        .search(&req.question, req.top_k)
        .await
        .map_err(|e| ToolError::from_anyhow(e, ToolErrorKind::Llm))?;

    Ok(Json(BothSearchResponse {
        ok: true,
        vector_response: vector.answer,
        vector_cypher_response: hybrid.answer,
    }))
}

async fn run_graphrag_search_vector_withcontext(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QuestionRequest>,
) -> Result<Json<VectorSearchResponse>, ToolError> {
    info!(top_k = req.top_k, "running graphrag vector search");
    let result = state
        .vector_rag
        .search(&req.question, req.top_k)
        .await
        .map_err(|e| ToolError::from_anyhow(e, ToolErrorKind::Llm))?;
    debug!(context = %result.context, "vector retrieval context");

    Ok(Json(VectorSearchResponse {
        ok: true,
        vector_response: result.answer,
    }))
}

async fn run_graphrag_search_hybrid_withcontext(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QuestionRequest>,
) -> Result<Json<HybridSearchResponse>, ToolError> {
    info!(top_k = req.top_k, "running graphrag hybrid search");
    let result = state
        .hybrid_rag
        .search(&req.question, req.top_k)
        .await
        .map_err(|e| ToolError::from_anyhow(e, ToolErrorKind::Llm))?;
    debug!(context = %result.context, "hybrid retrieval context");

    Ok(Json(HybridSearchResponse {
        ok: true,
        vector_cypher_response: result.answer,
    }))
}

/// Generate Cypher from the question and return it with the rows it
/// produced.
async fn text2cypher(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CypherRequest>,
) -> Result<Json<CypherResponse>, ToolError> {
    info!("running text2cypher");
    let result = state
        .text2cypher
        .search(&req.query)
        .await
        .map_err(|e| ToolError::traced(e, ToolErrorKind::Query))?;

    Ok(Json(CypherResponse {
        ok: true,
        cypher: result.cypher,
        data: result.rows,
    }))
}

/// Execute caller-provided Cypher in a read session.
async fn read_neo4j_cypher(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CypherRequest>,
) -> Result<Json<RowsResponse>, ToolError> {
    debug!(query = %req.query, "executing raw cypher");
    let rows = state
        .store
        .execute(store::query(&req.query), store::AccessMode::Read)
        .await?;

    Ok(Json(RowsResponse { ok: true, rows }))
}

async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, ToolError> {
    let ok = state
        .store
        .verify_connectivity()
        .await
        .map_err(|e| ToolError::from_anyhow(anyhow::Error::new(e), ToolErrorKind::Connectivity))?;

    Ok(Json(HealthResponse { ok }))
}
