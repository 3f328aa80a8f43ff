//! Speech engine abstraction.
//!
//! The engine converts one chunk of text into audio and reports progress
//! through callbacks the host forwards into the core as [`EngineEvent`]s.
//! Every request carries the caller's request id; the engine must echo that
//! id on every event it emits for the request, which is how the core
//! discards events from utterances it has already abandoned.

use crate::error::SpeechResult;
use serde::{Deserialize, Serialize};

/// One utterance request: the text of a chunk (possibly sliced mid-chunk)
/// plus the settings in force when it was issued.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub request_id: u64,
    pub text: String,
    /// Engine voice identifier; `None` lets the engine pick its default.
    pub voice: Option<String>,
    /// Rate multiplier, 1.0 = normal.
    pub rate: f32,
    /// Volume, 0.0..=1.0.
    pub volume: f32,
}

/// Progress and completion events, delivered by the host from the engine's
/// callbacks via [`crate::Narrator::on_engine_event`].
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The engine is about to speak the characters at `char_index`
    /// (relative to the request's text). Engines that do not report a span
    /// length omit `char_length`.
    Boundary {
        request_id: u64,
        char_index: usize,
        char_length: Option<usize>,
    },
    /// The request finished naturally.
    Ended { request_id: u64 },
    /// The request failed.
    Error { request_id: u64, reason: String },
}

impl EngineEvent {
    pub fn request_id(&self) -> u64 {
        match self {
            EngineEvent::Boundary { request_id, .. }
            | EngineEvent::Ended { request_id }
            | EngineEvent::Error { request_id, .. } => *request_id,
        }
    }
}

/// One entry of the engine's voice directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceInfo {
    pub id: String,
    /// BCP 47 language tag, e.g. "en-US".
    pub language: String,
    pub default: bool,
}

/// The single speech channel. Exactly one utterance may be in flight at a
/// time; the core enforces this by cancelling before every new `speak`.
/// All methods are synchronous command submissions; completion and progress
/// arrive later as [`EngineEvent`]s on the same logical thread.
pub trait SpeechEngine {
    /// Start speaking. Replaces nothing: the core has already cancelled any
    /// prior utterance when this is called.
    fn speak(&mut self, request: SpeechRequest) -> SpeechResult<()>;

    /// Abort the current utterance, if any. Engines are allowed to fire a
    /// late completion event after this; the core ignores it.
    fn cancel(&mut self);

    fn pause(&mut self);

    fn resume(&mut self);

    fn is_speaking(&self) -> bool;

    fn is_paused(&self) -> bool;

    /// Enumerate available voices. Selection policy is the host's concern.
    fn voices(&self) -> Vec<VoiceInfo>;
}
