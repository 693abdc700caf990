use unicode_segmentation::UnicodeSegmentation;

use crate::chunk::Chunk;
use crate::error::IngestError;

/// Fixed-size splitter over grapheme clusters with overlapping windows.
pub struct TextSplitter {
    chunk_size: usize,
    overlap: usize,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            overlap: 100,
        }
    }
}

impl TextSplitter {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, IngestError> {
        if chunk_size == 0 || overlap >= chunk_size {
            return Err(IngestError::InvalidSplitter {
                chunk_size,
                overlap,
            });
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Split text into chunks of `chunk_size` graphemes, each window
    /// starting `chunk_size - overlap` graphemes after the previous one.
    /// Whitespace-only windows are dropped; indices stay consecutive.
    pub fn split(&self, doc_id: &str, text: &str) -> Vec<Chunk> {
        let graphemes: Vec<&str> = text.graphemes(true).collect();
        let step = self.chunk_size - self.overlap;

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < graphemes.len() {
            let end = (start + self.chunk_size).min(graphemes.len());
            let piece: String = graphemes[start..end].concat();

            if !piece.trim().is_empty() {
                chunks.push(Chunk::new(doc_id, chunks.len(), piece));
            }

            if end == graphemes.len() {
                break;
            }
            start += step;
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        let splitter = TextSplitter::default();
        let chunks = splitter.split("doc", "a short document");

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "a short document");
        assert_eq!(chunks[0].index, 0);
    }

    #[test]
    fn windows_overlap() {
        let splitter = TextSplitter::new(10, 4).unwrap();
        let chunks = splitter.split("doc", "abcdefghijklmnopqrst");

        // step is 6: windows [0..10], [6..16], [12..20]
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "abcdefghij");
        assert_eq!(chunks[1].text, "ghijklmnop");
        assert_eq!(chunks[2].text, "mnopqrst");
    }

    #[test]
    fn indices_are_consecutive() {
        let splitter = TextSplitter::new(5, 1).unwrap();
        let chunks = splitter.split("doc", "0123456789abcdef");

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
        }
    }

    #[test]
    fn whitespace_only_window_is_dropped() {
        let splitter = TextSplitter::new(4, 0).unwrap();
        let chunks = splitter.split("doc", "abcd    wxyz");

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["abcd", "wxyz"]);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        let splitter = TextSplitter::default();
        assert!(splitter.split("doc", "").is_empty());
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk_size() {
        assert!(TextSplitter::new(100, 100).is_err());
        assert!(TextSplitter::new(0, 0).is_err());
        assert!(TextSplitter::new(500, 100).is_ok());
    }

    #[test]
    fn splits_on_grapheme_boundaries() {
        let splitter = TextSplitter::new(3, 0).unwrap();
        // Family emoji is a single grapheme built from several codepoints
        let text = "ab\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F466}cd";
        let chunks = splitter.split("doc", text);

        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].text.ends_with('\u{1F466}'));
        assert_eq!(chunks[1].text, "cd");
    }
}
