//! The highlight projector: one global-offset stream drives two
//! independent visual cursors. The raw view gets a selection range and an
//! anti-jitter scroll; the structured view gets a styled region found by
//! binary search over the span map. Neither view's coordinate system leaks
//! into the other.

use super::Effect;
use crate::narrator::Narrator;
use tracing::trace;

impl Narrator {
    /// Project the spoken span onto both views.
    pub(crate) fn project(
        &mut self,
        global_start: usize,
        global_end: usize,
        effects: &mut Vec<Effect>,
    ) {
        effects.push(Effect::SetSelection {
            start: global_start,
            end: global_end,
        });

        // Raw view: approximate the spoken line's pixel position and only
        // rescroll when the target moved enough to matter.
        let line = self.document.line_of(global_start);
        let desired =
            (line as f32 * self.config.line_height_px - self.config.scroll_margin_px).max(0.0);
        let should_scroll = match self.highlight.last_scroll_px {
            Some(prev) => (desired - prev).abs() > self.config.rescroll_threshold_px,
            None => true,
        };
        if should_scroll {
            self.highlight.last_scroll_px = Some(desired);
            effects.push(Effect::ScrollTextTo { top_px: desired });
        }

        // Structured view, when one is loaded. An offset outside all spans
        // (separator or trailing text) leaves the previous highlight alone.
        let Some(map) = self.document.spans() else {
            return;
        };
        let Some(span_index) = map.index_at(global_start) else {
            trace!(global_start, "Offset outside all spans");
            return;
        };
        if self.highlight.current_span == Some(span_index) {
            return;
        }
        if let Some(previous) = self.highlight.current_span {
            effects.push(Effect::ClearRegionHighlight(map.spans()[previous].region));
        }
        let region = map.spans()[span_index].region;
        self.highlight.current_span = Some(span_index);
        effects.push(Effect::HighlightRegion(region));
        effects.push(Effect::ScrollRegionIntoView(region));
    }

    /// Remove every visual artifact: highlight styling gone, selection
    /// collapsed to a caret.
    pub(crate) fn clear_visuals(&mut self, caret: usize, effects: &mut Vec<Effect>) {
        if let Some(previous) = self.highlight.current_span.take() {
            if let Some(map) = self.document.spans() {
                if let Some(span) = map.spans().get(previous) {
                    effects.push(Effect::ClearRegionHighlight(span.region));
                }
            }
        }
        self.highlight.last_scroll_px = None;
        effects.push(Effect::CollapseSelection { caret });
    }
}
