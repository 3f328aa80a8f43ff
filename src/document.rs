//! The document model: an immutable text snapshot plus its decomposition
//! into speech chunks and, for paginated sources, the span map back to
//! renderable regions.
//!
//! Documents are replaced wholesale on every load or edit, never patched;
//! global character offsets are always relative to the current snapshot.

use crate::chunking::{Chunk, chunk_text};
use crate::layout::{PAGE_SEPARATOR, PageInput, SpanMap};
use tracing::debug;

pub struct Document {
    text: String,
    char_len: usize,
    chunk_size: usize,
    chunks: Vec<Chunk>,
    spans: Option<SpanMap>,
}

impl Document {
    /// Snapshot a plain-text document. Any previous span map is discarded.
    pub fn from_text(text: String, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        let char_len = text.chars().count();
        let chunks = chunk_text(&text, chunk_size);
        debug!(chars = char_len, chunks = chunks.len(), "Loaded plain text");
        Self {
            text,
            char_len,
            chunk_size,
            chunks,
            spans: None,
        }
    }

    /// Snapshot a structured document: page texts joined with a blank line,
    /// plus a span map built from the positioned runs.
    pub fn from_pages(pages: &[PageInput], chunk_size: usize) -> Self {
        let text = pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(PAGE_SEPARATOR);
        let spans = SpanMap::build(pages);
        debug!(
            pages = pages.len(),
            spans = spans.spans().len(),
            "Loaded structured document"
        );
        let mut doc = Self::from_text(text, chunk_size);
        doc.spans = Some(spans);
        doc
    }

    pub fn empty(chunk_size: usize) -> Self {
        Self::from_text(String::new(), chunk_size)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    pub fn is_empty(&self) -> bool {
        self.char_len == 0
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunk(&self, index: usize) -> Option<&Chunk> {
        self.chunks.get(index)
    }

    pub fn spans(&self) -> Option<&SpanMap> {
        self.spans.as_ref()
    }

    /// Resolve a global offset to its (chunk index, in-chunk offset) pair.
    /// Offsets past the end clamp to the end of the last chunk; `None` only
    /// when the document has no chunks.
    pub fn locate(&self, global_offset: usize) -> Option<(usize, usize)> {
        if self.chunks.is_empty() {
            return None;
        }
        let last = self.chunks.len() - 1;
        let index = (global_offset / self.chunk_size).min(last);
        let in_chunk =
            (global_offset - index * self.chunk_size).min(self.chunks[index].char_len());
        Some((index, in_chunk))
    }

    /// Global offset addressed by a (chunk index, in-chunk offset) pair.
    pub fn global_offset(&self, chunk_index: usize, in_chunk_offset: usize) -> usize {
        chunk_index * self.chunk_size + in_chunk_offset
    }

    /// Zero-based line of the character at `offset`, counting hard line
    /// breaks only. Used by the raw-view scroll heuristic.
    pub fn line_of(&self, offset: usize) -> usize {
        self.text
            .chars()
            .take(offset)
            .filter(|&c| c == '\n')
            .count()
    }
}
