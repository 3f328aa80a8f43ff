//! Event handling for the narrator.
//!
//! Handlers mutate [`Narrator`](super::Narrator) state and append
//! [`Effect`]s describing work that must happen outside the core.

use crate::engine::EngineEvent;
use crate::layout::RegionHandle;
use crate::narrator::Narrator;
use std::time::Duration;

mod coordinator;
mod highlight;
mod playback;
mod tracker;

/// Work the host must perform after a handler returns.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Call [`Narrator::on_advance_due`] with this id after `delay`.
    ScheduleAdvance { request_id: u64, delay: Duration },
    /// Call [`Narrator::on_restart_due`] with this id after `delay`.
    ScheduleRestart { request_id: u64, delay: Duration },
    /// Set the raw text view's selection to `[start, end)` (global offsets).
    SetSelection { start: usize, end: usize },
    /// Collapse the raw text view's selection to a caret.
    CollapseSelection { caret: usize },
    /// Scroll the raw text view so `top_px` is at the top of the viewport.
    ScrollTextTo { top_px: f32 },
    /// Apply the highlight style to a structured-view region.
    HighlightRegion(RegionHandle),
    /// Remove the highlight style from a structured-view region.
    ClearRegionHighlight(RegionHandle),
    /// Bring a structured-view region into the viewport.
    ScrollRegionIntoView(RegionHandle),
    /// A playback request found no speakable content. Not an error.
    NothingToPlay,
    /// Playback reached the end of the document.
    Finished,
    /// The engine reported a failure; playback has stopped. Not retried.
    EngineFault { reason: String },
}

impl Narrator {
    /// Entry point for engine callbacks the host forwards in. Events whose
    /// request id does not match the live utterance are ignored.
    pub fn on_engine_event(&mut self, event: EngineEvent) -> Vec<Effect> {
        let mut effects = Vec::new();
        match event {
            EngineEvent::Boundary {
                request_id,
                char_index,
                char_length,
            } => self.on_boundary(request_id, char_index, char_length, &mut effects),
            EngineEvent::Ended { request_id } => self.on_ended(request_id, &mut effects),
            EngineEvent::Error { request_id, reason } => {
                self.on_engine_error(request_id, reason, &mut effects)
            }
        }
        effects
    }

    /// Resolve a structured-view region to a jump target. A handle the span
    /// map cannot resolve (malformed structural metadata) falls back to a
    /// proportional estimate from the viewport position instead of failing.
    pub fn jump_to_region(&mut self, region: RegionHandle, viewport_fraction: f32) -> Vec<Effect> {
        let target = self
            .document
            .spans()
            .and_then(|m| m.span_for_region(region))
            .map(|span| span.start);
        match target {
            Some(target) => self.jump_to(target),
            None => {
                let estimate = (viewport_fraction.clamp(0.0, 1.0)
                    * self.document.char_len() as f32)
                    .round() as usize;
                tracing::warn!(
                    page = region.page,
                    run = region.run,
                    estimate,
                    "Region has no span; jumping to proportional estimate"
                );
                self.jump_to(estimate)
            }
        }
    }
}
