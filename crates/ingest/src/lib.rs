pub mod chunk;
pub mod error;
pub mod splitter;

pub use chunk::Chunk;
pub use error::IngestError;
pub use splitter::TextSplitter;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Generate a stable document ID from the source path
pub fn doc_id(path: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..16])
}

/// Extract the plain text of a PDF.
///
/// Extraction is CPU-bound and runs on the blocking pool. Any failure
/// aborts ingestion of this document.
pub async fn read_pdf_text(path: &Path) -> Result<String> {
    let owned = path.to_path_buf();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&owned))
        .await
        .context("pdf extraction task failed")?
        .with_context(|| format!("failed to extract text from {}", path.display()))?;

    debug!(path = %path.display(), chars = text.len(), "extracted pdf text");
    Ok(text)
}

/// List the `*.pdf` files directly under `dir`, sorted by path so
/// ingestion order is deterministic. Missing or empty directories are
/// reported as [`IngestError`] values.
pub async fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::MissingDir(dir.display().to_string()).into());
    }

    let mut entries = fs::read_dir(dir)
        .await
        .with_context(|| format!("failed to list {}", dir.display()))?;

    let mut pdfs = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        {
            pdfs.push(path);
        }
    }

    if pdfs.is_empty() {
        return Err(IngestError::NoPdfs(dir.display().to_string()).into());
    }

    pdfs.sort();
    Ok(pdfs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_id_is_stable_hex() {
        let a = doc_id("truncated-pdfs/report.pdf");
        let b = doc_id("truncated-pdfs/report.pdf");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn doc_id_differs_per_path() {
        assert_ne!(doc_id("a.pdf"), doc_id("b.pdf"));
    }

    #[tokio::test]
    async fn missing_dir_is_a_typed_error() {
        let err = list_pdfs(Path::new("/no/such/directory")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<IngestError>(),
            Some(IngestError::MissingDir(_))
        ));
    }

    #[tokio::test]
    async fn empty_dir_is_a_typed_error() {
        let dir = std::env::temp_dir().join(format!("ingest-empty-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let err = list_pdfs(&dir).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<IngestError>(),
            Some(IngestError::NoPdfs(_))
        ));

        std::fs::remove_dir_all(&dir).ok();
    }
}
