//! Error types for the speech-engine boundary.

use thiserror::Error;

/// Failures a speech engine can report when asked to speak.
///
/// All of these are local and recoverable: playback stops, the failure is
/// surfaced to the host, and nothing is retried (retrying a failed utterance
/// risks repeating the failure loop).
#[derive(Error, Debug)]
pub enum SpeechError {
    /// No engine is available on this system.
    #[error("speech engine not available: {0}")]
    EngineNotAvailable(String),

    /// The engine rejected the utterance.
    #[error("synthesis failed: {0}")]
    Synthesis(String),

    /// The requested voice could not be resolved.
    #[error("voice not found: {0}")]
    VoiceNotFound(String),

    /// The engine is in a state where it cannot accept a request.
    #[error("engine busy")]
    Busy,
}

pub type SpeechResult<T> = Result<T, SpeechError>;
