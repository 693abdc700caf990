use thiserror::Error;

/// Ingestion conditions the tool layer reports as caller mistakes
/// rather than internal faults.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("pdf directory not found: {0}")]
    MissingDir(String),

    #[error("no pdf files in {0}")]
    NoPdfs(String),

    #[error("splitter overlap {overlap} must be smaller than chunk size {chunk_size}")]
    InvalidSplitter { chunk_size: usize, overlap: usize },
}
