use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use extract::Extractor;
use ingest::TextSplitter;
use llm::{ChatClient, EmbeddingClient};
use store::GraphStore;
use tracing::{info, warn};

use crate::writer::GraphWriter;

/// End-to-end knowledge-graph construction for PDF documents.
///
/// Documents are processed strictly one after another: a failure aborts
/// the current run but leaves everything already written in the graph.
pub struct KgPipeline {
    splitter: TextSplitter,
    extractor: Extractor,
    embedder: EmbeddingClient,
    writer: GraphWriter,
}

impl KgPipeline {
    pub fn new(store: GraphStore, chat: ChatClient, embedder: EmbeddingClient) -> Self {
        Self {
            splitter: TextSplitter::default(),
            extractor: Extractor::new(chat),
            embedder,
            writer: GraphWriter::new(store),
        }
    }

    /// Build the lexical and entity graph for one document.
    pub async fn run_file(&self, path: &Path) -> Result<()> {
        let path_str = path.display().to_string();
        let doc_id = ingest::doc_id(&path_str);
        info!(path = %path_str, doc_id = %doc_id, "ingesting document");

        // 1. Read and split
        let text = ingest::read_pdf_text(path).await?;
        let chunks = self.splitter.split(&doc_id, &text);
        if chunks.is_empty() {
            warn!(path = %path_str, "document produced no text chunks");
            return Ok(());
        }

        // 2. Extract a per-chunk entity graph
        let mut graphs = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let graph = self
                .extractor
                .extract(&chunk.text)
                .await
                .with_context(|| format!("extraction failed for chunk {}", chunk.index))?;
            graphs.push(graph);
        }

        // 3. Embed every chunk text in one batch
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self
            .embedder
            .embed_batch(&texts)
            .await
            .context("chunk embedding failed")?;

        // 4. Write document, chunks and the NEXT_CHUNK chain
        self.writer.write_document(&doc_id, &path_str).await?;
        let mut prev: Option<&str> = None;
        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            self.writer.write_chunk(chunk, embedding).await?;
            if let Some(prev_id) = prev {
                self.writer.link_next(prev_id, &chunk.chunk_id).await?;
            }
            prev = Some(&chunk.chunk_id);
        }

        // 5. Write entities and their relationships
        for (chunk, graph) in chunks.iter().zip(&graphs) {
            for entity in &graph.entities {
                self.writer.write_entity(entity, &chunk.chunk_id).await?;
            }
            for relation in &graph.relations {
                self.writer.write_relation(relation).await?;
            }
        }

        info!(doc_id = %doc_id, chunks = chunks.len(), "document ingested");
        Ok(())
    }

    /// Ingest files one by one, returning how many completed. The first
    /// failure aborts the run; earlier documents stay in the graph.
    pub async fn run_files(&self, paths: &[PathBuf]) -> Result<usize> {
        let mut processed = 0;
        for path in paths {
            self.run_file(path)
                .await
                .with_context(|| format!("failed to ingest {}", path.display()))?;
            processed += 1;
        }
        Ok(processed)
    }
}
