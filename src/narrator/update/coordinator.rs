//! The settings-change coordinator. Engines cannot change voice, rate or
//! volume on a started utterance, so a committed change cancels and
//! restarts at the tracked offset. The tricky parts live here: the restart
//! must not race an in-flight auto-advance, must not resume a session the
//! user explicitly paused, and must not double-start when changes arrive
//! faster than the settle delay.

use super::Effect;
use crate::narrator::Narrator;
use crate::narrator::state::{MAX_RATE, MAX_VOLUME, MIN_RATE, MIN_VOLUME, Phase};
use tracing::{debug, info};

impl Narrator {
    /// Commit a voice change. Applies to the next request immediately if
    /// idle or paused; restarts in place if playing.
    pub fn set_voice(&mut self, voice_id: impl Into<String>) -> Vec<Effect> {
        let voice_id = voice_id.into();
        info!(voice = %voice_id, "Voice changed");
        self.settings.voice = Some(voice_id);
        self.commit_settings_change("voice")
    }

    /// Commit a rate change.
    pub fn set_rate(&mut self, rate: f32) -> Vec<Effect> {
        self.settings.rate = rate.clamp(MIN_RATE, MAX_RATE);
        info!(rate = self.settings.rate, "Rate changed");
        self.commit_settings_change("rate")
    }

    /// Live-drag rate update: stores the value for the next request but
    /// never restarts. Avoids a restart storm while a slider moves; the
    /// drag's end should call [`Narrator::set_rate`].
    pub fn set_rate_live(&mut self, rate: f32) -> Vec<Effect> {
        self.settings.rate = rate.clamp(MIN_RATE, MAX_RATE);
        debug!(rate = self.settings.rate, "Rate preview");
        Vec::new()
    }

    /// Commit a volume change.
    pub fn set_volume(&mut self, volume: f32) -> Vec<Effect> {
        self.settings.volume = volume.clamp(MIN_VOLUME, MAX_VOLUME);
        info!(volume = self.settings.volume, "Volume changed");
        self.commit_settings_change("volume")
    }

    /// Live-drag volume update; see [`Narrator::set_rate_live`].
    pub fn set_volume_live(&mut self, volume: f32) -> Vec<Effect> {
        self.settings.volume = volume.clamp(MIN_VOLUME, MAX_VOLUME);
        debug!(volume = self.settings.volume, "Volume preview");
        Vec::new()
    }

    /// Jump playback to a global offset. Allowed from any phase — stopped,
    /// paused, even mid-restart (the newer request id supersedes the
    /// pending one) — and always lands in `Playing`.
    pub fn jump_to(&mut self, global_offset: usize) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.document.chunk_count() == 0 {
            info!("Jump requested on empty document");
            effects.push(Effect::NothingToPlay);
            return effects;
        }
        let offset = global_offset.min(self.document.char_len());
        if let Some((chunk_index, _)) = self.document.locate(offset) {
            self.cursor.chunk_index = chunk_index;
        }
        self.cursor.offset = offset;
        info!(offset, "Jumping");
        self.begin_restart(&mut effects);
        effects
    }

    fn commit_settings_change(&mut self, what: &'static str) -> Vec<Effect> {
        let mut effects = Vec::new();
        match self.phase {
            Phase::Restarting { .. } => {
                // Re-entrancy guard: the restart already in flight will pick
                // up the stored value when it lands.
                debug!(what, "Restart in flight; suppressing overlapping restart");
            }
            Phase::Playing => {
                self.begin_restart(&mut effects);
            }
            _ => {
                // An explicit pause (or stop) is respected; the stored value
                // applies when the user resumes.
                debug!(what, "Not playing; stored for next playback");
            }
        }
        effects
    }

    /// Cancel-and-restart: invalidate the utterance (token first, engine
    /// cancel second), then let the engine settle before speaking again.
    fn begin_restart(&mut self, effects: &mut Vec<Effect>) {
        self.invalidate_active();
        let request_id = self.next_request_id();
        self.phase = Phase::Restarting { request_id };
        info!(
            request_id,
            resume_offset = self.cursor.offset,
            "Cancelled speech; restart scheduled"
        );
        effects.push(Effect::ScheduleRestart {
            request_id,
            delay: self.config.settle_delay(),
        });
    }

    /// Settle delay elapsed; resolve the tracked offset back to a chunk
    /// address and restart there with the latest settings.
    pub fn on_restart_due(&mut self, request_id: u64) -> Vec<Effect> {
        let mut effects = Vec::new();
        match self.phase {
            Phase::Restarting { request_id: current } if current == request_id => {}
            _ => {
                debug!(request_id, "Ignoring stale restart timer");
                return effects;
            }
        }
        match self.document.locate(self.cursor.offset) {
            Some((chunk_index, in_chunk_offset)) => {
                debug!(
                    chunk = chunk_index,
                    in_chunk_offset, "Restarting at tracked offset"
                );
                self.start_chunk(chunk_index, in_chunk_offset, &mut effects);
            }
            None => {
                self.phase = Phase::Idle;
                effects.push(Effect::NothingToPlay);
            }
        }
        effects
    }
}
