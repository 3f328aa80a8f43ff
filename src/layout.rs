//! Mapping between global text offsets and renderable regions of a
//! structured (paginated) document.
//!
//! The extractor hands us each page's text plus the ordered run strings it
//! positioned on that page. We locate each run inside the page text and
//! record the covered global character range, so a boundary event (a global
//! offset) can be projected back onto the region that renders those
//! characters. Runs the extractor mangled and we cannot locate are skipped;
//! the mapping degrades rather than fails.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Characters inserted between consecutive page texts when assembling the
/// full document text.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// One page as produced by the document extractor: the page's plain text and
/// its positioned text runs in reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInput {
    pub text: String,
    pub runs: Vec<String>,
}

/// Opaque handle to a renderable region; the host maps it back to whatever
/// node renders run `run` of page `page`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionHandle {
    pub page: usize,
    pub run: usize,
}

/// A global character range covered by one renderable region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualSpan {
    /// Global character offset of the first covered character.
    pub start: usize,
    /// Exclusive global end offset.
    pub end: usize,
    pub region: RegionHandle,
}

/// Ordered, non-overlapping spans for one structured document load.
#[derive(Debug, Default, Clone)]
pub struct SpanMap {
    spans: Vec<VisualSpan>,
}

impl SpanMap {
    /// Build the span map for `pages`, assuming the document text is the
    /// page texts joined with [`PAGE_SEPARATOR`]. Runs are matched in order
    /// within their page; a run that cannot be located from the current
    /// match position onward yields no span.
    pub fn build(pages: &[PageInput]) -> Self {
        let mut spans = Vec::new();
        let mut page_base = 0usize;

        for (page_idx, page) in pages.iter().enumerate() {
            let page_chars: Vec<char> = page.text.chars().collect();
            let mut cursor = 0usize;

            for (run_idx, run) in page.runs.iter().enumerate() {
                let run_chars: Vec<char> = run.chars().collect();
                if run_chars.is_empty() || run.chars().all(char::is_whitespace) {
                    continue;
                }
                match find_chars(&page_chars, &run_chars, cursor) {
                    Some(pos) => {
                        spans.push(VisualSpan {
                            start: page_base + pos,
                            end: page_base + pos + run_chars.len(),
                            region: RegionHandle {
                                page: page_idx,
                                run: run_idx,
                            },
                        });
                        cursor = pos + run_chars.len();
                    }
                    None => {
                        debug!(
                            page = page_idx,
                            run = run_idx,
                            "Run not found in page text; span skipped"
                        );
                    }
                }
            }

            page_base += page_chars.len() + PAGE_SEPARATOR.chars().count();
        }

        Self { spans }
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn spans(&self) -> &[VisualSpan] {
        &self.spans
    }

    /// Binary search for the span containing `offset`. Offsets that fall
    /// between spans (separator text, trailing whitespace) yield `None`.
    pub fn span_at(&self, offset: usize) -> Option<&VisualSpan> {
        let idx = self.spans.partition_point(|s| s.start <= offset);
        let candidate = self.spans.get(idx.checked_sub(1)?)?;
        (candidate.end > offset).then_some(candidate)
    }

    /// Index of the span containing `offset`, for cheap same-span checks.
    pub fn index_at(&self, offset: usize) -> Option<usize> {
        let idx = self.spans.partition_point(|s| s.start <= offset);
        let i = idx.checked_sub(1)?;
        (self.spans.get(i)?.end > offset).then_some(i)
    }

    /// Resolve a region handle back to its span, if one was built for it.
    pub fn span_for_region(&self, region: RegionHandle) -> Option<&VisualSpan> {
        self.spans.iter().find(|s| s.region == region)
    }
}

fn find_chars(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() || from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|pos| from + pos)
}
