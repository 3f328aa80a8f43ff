//! Chunking utilities.
//!
//! The strategy here is intentionally simple: document text is split into
//! fixed-size character chunks, one speech request per chunk. Character
//! counts (not bytes) are the addressing unit throughout, because the speech
//! engine reports boundary positions as character indices into the text it
//! was handed. The logic is isolated so the policy can be swapped later.

/// Default target chunk length in characters. Long enough that inter-chunk
/// restarts are rare, short enough that engines with utterance-length limits
/// accept the request.
pub const DEFAULT_CHUNK_SIZE: usize = 3000;

/// One contiguous slice of the document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Global character offset of the first character.
    pub start: usize,
    pub text: String,
}

impl Chunk {
    /// Length in characters (the addressing unit, not bytes).
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// The chunk's text from `in_chunk_offset` (characters) to its end.
    pub fn slice_from(&self, in_chunk_offset: usize) -> String {
        self.text.chars().skip(in_chunk_offset).collect()
    }
}

/// Split `text` into chunks of `chunk_size` characters; the final chunk may
/// be shorter. Deterministic and side-effect free: chunk `i` always starts
/// at character offset `i * chunk_size`, and concatenating all chunks
/// reproduces `text` exactly. Empty text yields no chunks.
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<Chunk> {
    let chunk_size = chunk_size.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;
    let mut start = 0usize;

    for ch in text.chars() {
        current.push(ch);
        current_chars += 1;
        if current_chars == chunk_size {
            chunks.push(Chunk {
                start,
                text: std::mem::take(&mut current),
            });
            start += chunk_size;
            current_chars = 0;
        }
    }

    if !current.is_empty() {
        chunks.push(Chunk {
            start,
            text: current,
        });
    }

    chunks
}
