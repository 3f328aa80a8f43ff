//! The position tracker: turns chunk-relative boundary events into the
//! global resume offset. This is the only write path for the cursor while
//! playback is active, and it runs on every event, not just at chunk
//! boundaries, so an interruption resumes at the last word.

use super::Effect;
use crate::narrator::Narrator;
use tracing::{debug, trace};

impl Narrator {
    pub(crate) fn on_boundary(
        &mut self,
        request_id: u64,
        char_index: usize,
        char_length: Option<usize>,
        effects: &mut Vec<Effect>,
    ) {
        let Some(active) = self.active.as_mut() else {
            debug!(request_id, "Boundary with no active utterance; ignoring");
            return;
        };
        if !active.tag.accepts(request_id) {
            debug!(request_id, "Ignoring stale boundary event");
            return;
        }
        active.saw_boundary = true;
        let chunk_index = active.chunk_index;
        let global_start = active.base_offset + char_index;

        let doc_len = self.document.char_len();
        let global_start = global_start.min(doc_len);
        // Engines that report no span length get a single-character span.
        let global_end = (global_start + char_length.unwrap_or(1)).min(doc_len);

        self.cursor.chunk_index = chunk_index;
        self.cursor.offset = global_start;
        trace!(global_start, global_end, "Boundary confirmed");

        self.project(global_start, global_end, effects);
    }
}
