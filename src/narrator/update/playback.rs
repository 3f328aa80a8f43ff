//! The segment player: one speech request per chunk, chained so the end of
//! one triggers the next after a short stabilization delay.

use super::Effect;
use crate::cancellation::UtteranceTag;
use crate::engine::SpeechRequest;
use crate::narrator::Narrator;
use crate::narrator::state::{ActiveUtterance, PendingAdvance, Phase, PlaybackCursor};
use tracing::{debug, info, warn};

impl Narrator {
    /// Start playback from the tracked cursor, or resume a paused
    /// utterance in place.
    pub fn play(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        match self.phase {
            Phase::Playing => {
                debug!("Play requested while already playing");
            }
            Phase::Restarting { .. } => {
                debug!("Play requested while a restart is in flight");
            }
            Phase::Paused => {
                if self.active.is_some() {
                    info!("Resuming paused playback");
                    self.engine.resume();
                    self.phase = Phase::Playing;
                } else {
                    // The utterance ended while paused; start fresh from
                    // the confirmed offset.
                    self.start_from_cursor(&mut effects);
                }
            }
            Phase::Idle => {
                self.start_from_cursor(&mut effects);
            }
        }
        effects
    }

    /// Pause without losing position. Takes effect from `Playing` and from
    /// the settle window of a restart (the restart is then abandoned by the
    /// phase check when its timer fires).
    pub fn pause(&mut self) -> Vec<Effect> {
        match self.phase {
            Phase::Playing | Phase::Restarting { .. } => {
                info!(offset = self.cursor.offset, "Pausing playback");
                self.engine.pause();
                self.phase = Phase::Paused;
            }
            _ => debug!("Pause requested while not playing"),
        }
        Vec::new()
    }

    /// Stop playback, reset the cursor to the origin, and clear every
    /// visual artifact.
    pub fn stop(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        let caret = self.cursor.offset;
        info!(offset = caret, "Stopping playback");
        self.invalidate_active();
        self.phase = Phase::Idle;
        self.cursor = PlaybackCursor::default();
        self.clear_visuals(caret, &mut effects);
        effects
    }

    pub(crate) fn start_from_cursor(&mut self, effects: &mut Vec<Effect>) {
        match self.document.locate(self.cursor.offset) {
            Some((chunk_index, in_chunk_offset)) => {
                info!(
                    chunk = chunk_index,
                    in_chunk_offset, "Starting playback from cursor"
                );
                self.start_chunk(chunk_index, in_chunk_offset, effects);
            }
            None => {
                info!("Nothing to play");
                effects.push(Effect::NothingToPlay);
            }
        }
    }

    /// Issue one speech request for `chunk[in_chunk_offset..]`. Addressing
    /// stays based on the original chunk boundaries: only the request's
    /// *content* is sliced, and the base offset records what was skipped.
    pub(crate) fn start_chunk(
        &mut self,
        chunk_index: usize,
        in_chunk_offset: usize,
        effects: &mut Vec<Effect>,
    ) {
        let Some(chunk) = self.document.chunk(chunk_index) else {
            warn!(chunk = chunk_index, "Chunk index out of range; stopping");
            self.invalidate_active();
            self.phase = Phase::Idle;
            return;
        };
        let in_chunk_offset = in_chunk_offset.min(chunk.char_len());
        let text = chunk.slice_from(in_chunk_offset);

        self.invalidate_active();

        if text.is_empty() {
            // Cursor sat exactly at the chunk's end; move on.
            if chunk_index + 1 < self.document.chunk_count() {
                self.start_chunk(chunk_index + 1, 0, effects);
            } else {
                self.finish_playback(effects);
            }
            return;
        }

        let request_id = self.next_request_id();
        let base_offset = self.document.global_offset(chunk_index, in_chunk_offset);
        self.active = Some(ActiveUtterance {
            tag: UtteranceTag::new(request_id),
            chunk_index,
            base_offset,
            saw_boundary: false,
        });
        // Chunk-granularity fallback: if the engine never reports a
        // boundary, interruption resumes here.
        self.cursor.chunk_index = chunk_index;
        self.cursor.offset = base_offset;

        let request = SpeechRequest {
            request_id,
            text,
            voice: self.settings.voice.clone(),
            rate: self.settings.rate,
            volume: self.settings.volume,
        };
        debug!(
            request_id,
            chunk = chunk_index,
            base_offset,
            chars = request.text.chars().count(),
            "Issuing speech request"
        );
        match self.engine.speak(request) {
            Ok(()) => {
                self.phase = Phase::Playing;
            }
            Err(err) => {
                warn!(chunk = chunk_index, "Speech request failed: {err}");
                self.active = None;
                self.phase = Phase::Idle;
                effects.push(Effect::EngineFault {
                    reason: err.to_string(),
                });
            }
        }
    }

    /// Natural completion of a chunk's speech.
    pub(crate) fn on_ended(&mut self, request_id: u64, effects: &mut Vec<Effect>) {
        let Some(active) = &self.active else {
            debug!(request_id, "Completion with no active utterance; ignoring");
            return;
        };
        if !active.tag.accepts(request_id) {
            debug!(
                request_id,
                current = active.tag.request_id,
                "Ignoring stale completion"
            );
            return;
        }
        if !active.saw_boundary {
            debug!(
                chunk = active.chunk_index,
                "Engine emitted no boundary events; resume granularity is chunk-level"
            );
        }
        let ended_chunk = active.chunk_index;
        self.active = None;

        if self.phase != Phase::Playing {
            debug!(
                chunk = ended_chunk,
                "Chunk ended while not playing; no auto-advance"
            );
            return;
        }

        let next_chunk = ended_chunk + 1;
        if next_chunk >= self.document.chunk_count() {
            self.finish_playback(effects);
            return;
        }

        // The delay keeps engines that misbehave on rapid back-to-back
        // restarts stable; the id guards against the advance outliving a
        // newer play request.
        let request_id = self.current_request_id();
        self.pending_advance = Some(PendingAdvance {
            request_id,
            next_chunk,
        });
        debug!(next_chunk, request_id, "Scheduling auto-advance");
        effects.push(Effect::ScheduleAdvance {
            request_id,
            delay: self.config.advance_delay(),
        });
    }

    /// Inter-chunk delay elapsed; start the next chunk if nothing
    /// superseded the advance in the meantime.
    pub fn on_advance_due(&mut self, request_id: u64) -> Vec<Effect> {
        let mut effects = Vec::new();
        match self.pending_advance {
            Some(pending) if pending.request_id == request_id => {
                self.pending_advance = None;
                if self.phase != Phase::Playing {
                    debug!(request_id, "Advance due while not playing; dropped");
                    return effects;
                }
                self.start_chunk(pending.next_chunk, 0, &mut effects);
            }
            _ => {
                debug!(request_id, "Ignoring stale auto-advance");
            }
        }
        effects
    }

    pub(crate) fn on_engine_error(
        &mut self,
        request_id: u64,
        reason: String,
        effects: &mut Vec<Effect>,
    ) {
        let stale = !self
            .active
            .as_ref()
            .is_some_and(|active| active.tag.accepts(request_id));
        if stale {
            debug!(request_id, "Ignoring stale engine error");
            return;
        }
        warn!(request_id, reason, "Engine error; stopping playback");
        self.invalidate_active();
        self.phase = Phase::Idle;
        effects.push(Effect::EngineFault { reason });
    }

    fn finish_playback(&mut self, effects: &mut Vec<Effect>) {
        info!(offset = self.cursor.offset, "Playback finished");
        let caret = self.cursor.offset;
        self.phase = Phase::Idle;
        self.cursor = PlaybackCursor::default();
        self.clear_visuals(caret, effects);
        effects.push(Effect::Finished);
    }
}
