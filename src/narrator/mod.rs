//! The playback/synchronization core.
//!
//! `Narrator` owns all mutable playback state and is driven entirely by
//! discrete calls on one logical thread: host commands (play, pause, jump,
//! settings changes), engine events forwarded via
//! [`Narrator::on_engine_event`], and the two timer callbacks
//! ([`Narrator::on_advance_due`], [`Narrator::on_restart_due`]). Handlers
//! mutate state and return [`Effect`]s describing the work the host must
//! perform — scheduling those timers and moving the visual cursors.

mod state;
mod update;

#[cfg(test)]
mod tests;

pub use state::{Narrator, Phase, PlaybackCursor, PlaybackSettings, PlaybackStatus};
pub use update::Effect;
