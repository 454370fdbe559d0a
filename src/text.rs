//! Text normalization and word-window chunking.

/// Normalize raw extracted text.
///
/// Collapses runs of whitespace within each line to single spaces, drops
/// blank lines, and normalizes line endings. The operation is idempotent:
/// `clean(clean(t)) == clean(t)`.
///
/// Original inter-token whitespace is not preserved. This is a lossy
/// normalization step, applied once before chunking.
pub fn clean(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// A strategy for splitting cleaned text into chunks.
///
/// Implementations return chunk texts in document order; the pipeline
/// assigns dense `0..N-1` indices and attaches embeddings afterwards.
pub trait Chunker: Send + Sync {
    /// Split text into chunks.
    ///
    /// Returns an empty `Vec` for empty or all-whitespace input.
    fn chunk(&self, text: &str) -> Vec<String>;
}

/// Splits text into overlapping windows of whitespace-separated tokens.
///
/// Each window holds up to `size` tokens and the window start advances by
/// `size - overlap` tokens per step. Iteration stops once a window's last
/// token is the text's last token; that window is included as-is, never
/// truncated or repeated. Tokens within a chunk are joined with single
/// spaces.
///
/// `overlap >= size` is a configuration error; [`crate::RagConfig`] rejects
/// it at startup, so this type assumes validated parameters.
#[derive(Debug, Clone)]
pub struct WordWindowChunker {
    size: usize,
    overlap: usize,
}

impl WordWindowChunker {
    /// Create a new `WordWindowChunker`.
    ///
    /// # Arguments
    ///
    /// * `size` — maximum number of tokens per chunk
    /// * `overlap` — number of tokens shared between consecutive chunks
    pub fn new(size: usize, overlap: usize) -> Self {
        Self { size, overlap }
    }
}

impl Chunker for WordWindowChunker {
    fn chunk(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return Vec::new();
        }

        let step = self.size.saturating_sub(self.overlap);
        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            let end = (start + self.size).min(words.len());
            chunks.push(words[start..end].join(" "));
            if end == words.len() || step == 0 {
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

    fn numbered_words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn clean_collapses_whitespace_and_drops_blank_lines() {
        let raw = "hello   world\r\n\r\n  foo\tbar  \n\nbaz";
        assert_eq!(clean(raw), "hello world\nfoo bar\nbaz");
    }

    #[test]
    fn clean_is_idempotent() {
        let raw = "  a \t b \r\n\r\n c\n\n\n d  e ";
        let once = clean(raw);
        assert_eq!(clean(&once), once);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        let chunker = WordWindowChunker::new(500, 50);
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk("   \n\t  ").is_empty());
    }

    #[test]
    fn short_text_yields_single_chunk() {
        let chunker = WordWindowChunker::new(500, 50);
        let chunks = chunker.chunk("alpha beta gamma");
        assert_eq!(chunks, vec!["alpha beta gamma".to_string()]);
    }

    #[test]
    fn twelve_hundred_words_yield_three_chunks() {
        let chunker = WordWindowChunker::new(500, 50);
        let chunks = chunker.chunk(&numbered_words(1200));

        assert_eq!(chunks.len(), 3);
        let word_counts: Vec<usize> =
            chunks.iter().map(|c| c.split_whitespace().count()).collect();
        assert_eq!(word_counts, vec![500, 500, 300]);

        // Each window starts 450 words after the previous one.
        assert!(chunks[1].starts_with("w450 "));
        assert!(chunks[2].starts_with("w900 "));
        // The final window ends exactly at the last token.
        assert!(chunks[2].ends_with(" w1199"));
    }

    #[test]
    fn consecutive_windows_share_exactly_overlap_tokens() {
        let chunker = WordWindowChunker::new(50, 10);
        let chunks = chunker.chunk(&numbered_words(120));

        for pair in chunks.windows(2) {
            let prev: Vec<&str> = pair[0].split_whitespace().collect();
            let next: Vec<&str> = pair[1].split_whitespace().collect();
            assert_eq!(&prev[prev.len() - 10..], &next[..10]);
        }
    }

    #[test]
    fn final_window_is_not_duplicated_on_exact_boundary() {
        // 100 words, size 50, overlap 10: windows at 0, 40, 80. The window
        // at 80 reaches the final token, so iteration stops there.
        let chunker = WordWindowChunker::new(50, 10);
        let chunks = chunker.chunk(&numbered_words(100));
        assert_eq!(chunks.len(), 3);
        assert!(chunks[2].ends_with(" w99"));
    }
}
