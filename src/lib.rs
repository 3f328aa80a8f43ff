//! Playback/synchronization core for a client-side document narrator.
//!
//! The crate ingests a text or paginated document, segments it into
//! fixed-size chunks, drives a speech engine over the chunks, and keeps two
//! visual cursors (a raw-text selection and a structured-view region
//! highlight) synchronized with the spoken word. Everything runs on one
//! logical thread: host commands and engine callbacks enter through
//! [`Narrator`] methods, and the returned [`Effect`]s tell the host what to
//! do next (schedule the settle/advance timers, move the cursors).
//!
//! Document extraction, the speech engine itself, and the two views are
//! collaborators: the engine sits behind [`SpeechEngine`], and the views
//! consume effects addressed by global character offsets and
//! [`RegionHandle`]s.

pub mod cancellation;
pub mod chunking;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod layout;
pub mod logging;
mod narrator;

pub use config::{NarratorConfig, load_config};
pub use document::Document;
pub use engine::{EngineEvent, SpeechEngine, SpeechRequest, VoiceInfo};
pub use error::{SpeechError, SpeechResult};
pub use layout::{PageInput, RegionHandle, SpanMap, VisualSpan};
pub use narrator::{Effect, Narrator, Phase, PlaybackCursor, PlaybackSettings, PlaybackStatus};
