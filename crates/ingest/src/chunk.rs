use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One piece of a split document, in document order.
///
/// `index` is the position within the source document and drives the
/// NEXT_CHUNK chain when the chunk is written to the graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub doc_id: String,
    pub chunk_id: String,
    pub index: usize,
    pub text: String,
}

impl Chunk {
    pub fn new(doc_id: &str, index: usize, text: String) -> Self {
        // Stable chunk_id from content, so re-ingesting merges instead
        // of duplicating
        let chunk_id = Self::generate_chunk_id(doc_id, index, &text);

        Self {
            doc_id: doc_id.to_string(),
            chunk_id,
            index,
            text,
        }
    }

    fn generate_chunk_id(doc_id: &str, index: usize, text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(doc_id.as_bytes());
        hasher.update(index.to_le_bytes());
        hasher.update(text.as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..16]) // Use first 16 bytes (32 hex chars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_id_is_stable() {
        let a = Chunk::new("doc", 0, "same text".to_string());
        let b = Chunk::new("doc", 0, "same text".to_string());
        assert_eq!(a.chunk_id, b.chunk_id);
        assert_eq!(a.chunk_id.len(), 32);
    }

    #[test]
    fn chunk_id_varies_with_index() {
        let a = Chunk::new("doc", 0, "same text".to_string());
        let b = Chunk::new("doc", 1, "same text".to_string());
        assert_ne!(a.chunk_id, b.chunk_id);
    }
}
