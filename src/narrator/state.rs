//! Narrator state: one owned object, well-defined transitions, no
//! scattered flags. The phase machine and the cursor are the two pieces
//! every other component reads; only the position tracker writes the
//! cursor while playback is active.

use crate::cancellation::UtteranceTag;
use crate::config::NarratorConfig;
use crate::document::Document;
use crate::engine::{SpeechEngine, VoiceInfo};
use crate::layout::PageInput;
use crate::narrator::update::Effect;
use tracing::{debug, info};

pub(crate) const MIN_RATE: f32 = 0.1;
pub(crate) const MAX_RATE: f32 = 3.0;
pub(crate) const MIN_VOLUME: f32 = 0.0;
pub(crate) const MAX_VOLUME: f32 = 1.0;

/// Playback phase. `Restarting` remembers which scheduled settle timer is
/// allowed to complete the restart; any other timer firing is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Playing,
    Paused,
    Restarting { request_id: u64 },
}

/// Where playback is, as a global character offset plus the chunk that
/// contains it. Reset to the origin when the document changes or on an
/// explicit stop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackCursor {
    pub chunk_index: usize,
    /// Last confirmed global offset; the resume position.
    pub offset: usize,
}

/// Voice, rate and volume applied to the next speech request. Not
/// versioned: whatever is stored when a request is issued is what plays.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSettings {
    pub voice: Option<String>,
    pub rate: f32,
    pub volume: f32,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            voice: None,
            rate: 1.0,
            volume: 1.0,
        }
    }
}

/// Read-only status snapshot for the host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackStatus {
    pub is_playing: bool,
    pub is_paused: bool,
    pub current_offset: usize,
    pub chunk_index: usize,
}

/// The speech request currently owned by the engine channel.
#[derive(Debug)]
pub(crate) struct ActiveUtterance {
    pub(crate) tag: UtteranceTag,
    pub(crate) chunk_index: usize,
    /// Global offset of the first character of the request's text.
    pub(crate) base_offset: usize,
    pub(crate) saw_boundary: bool,
}

/// An auto-advance scheduled but not yet fired.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PendingAdvance {
    pub(crate) request_id: u64,
    pub(crate) next_chunk: usize,
}

/// Visual cursor bookkeeping for the highlight projector.
#[derive(Debug, Default)]
pub(crate) struct HighlightState {
    /// Index into the span map of the currently highlighted span.
    pub(crate) current_span: Option<usize>,
    /// Last scroll position commanded for the raw text view.
    pub(crate) last_scroll_px: Option<f32>,
}

pub struct Narrator {
    pub(crate) config: NarratorConfig,
    pub(crate) engine: Box<dyn SpeechEngine>,
    pub(crate) document: Document,
    pub(crate) phase: Phase,
    pub(crate) cursor: PlaybackCursor,
    pub(crate) settings: PlaybackSettings,
    pub(crate) active: Option<ActiveUtterance>,
    pub(crate) pending_advance: Option<PendingAdvance>,
    pub(crate) highlight: HighlightState,
    request_counter: u64,
}

impl Narrator {
    pub fn new(engine: Box<dyn SpeechEngine>, config: NarratorConfig) -> Self {
        let document = Document::empty(config.chunk_size);
        Self {
            config,
            engine,
            document,
            phase: Phase::Idle,
            cursor: PlaybackCursor::default(),
            settings: PlaybackSettings::default(),
            active: None,
            pending_advance: None,
            highlight: HighlightState::default(),
            request_counter: 0,
        }
    }

    /// Replace the document with plain text.
    pub fn load_text(&mut self, text: String) -> Vec<Effect> {
        let document = Document::from_text(text, self.config.chunk_size);
        self.replace_document(document)
    }

    /// Replace the document with extractor output from a paginated source.
    pub fn load_pages(&mut self, pages: &[PageInput]) -> Vec<Effect> {
        let document = Document::from_pages(pages, self.config.chunk_size);
        self.replace_document(document)
    }

    fn replace_document(&mut self, document: Document) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.invalidate_active();
        self.phase = Phase::Idle;
        self.cursor = PlaybackCursor::default();
        // Clear against the outgoing document; its span map still owns the
        // currently highlighted region.
        self.clear_visuals(0, &mut effects);
        self.document = document;
        info!(
            chars = self.document.char_len(),
            chunks = self.document.chunk_count(),
            structured = self.document.spans().is_some(),
            "Document replaced"
        );
        effects
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn status(&self) -> PlaybackStatus {
        PlaybackStatus {
            is_playing: matches!(self.phase, Phase::Playing | Phase::Restarting { .. }),
            is_paused: matches!(self.phase, Phase::Paused),
            current_offset: self.cursor.offset,
            chunk_index: self.cursor.chunk_index,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    /// The engine's voice directory, verbatim. Picking one is UI policy.
    pub fn voices(&self) -> Vec<VoiceInfo> {
        self.engine.voices()
    }

    pub(crate) fn next_request_id(&mut self) -> u64 {
        self.request_counter = self.request_counter.wrapping_add(1);
        self.request_counter
    }

    pub(crate) fn current_request_id(&self) -> u64 {
        self.request_counter
    }

    /// Abandon the in-flight utterance, if any: its token dies first, then
    /// the engine-level cancel goes out, so a completion the engine fires
    /// anyway is rejected by the tag check. Also forgets any scheduled
    /// auto-advance.
    pub(crate) fn invalidate_active(&mut self) {
        if let Some(active) = self.active.take() {
            active.tag.cancel();
            self.engine.cancel();
            debug!(
                request_id = active.tag.request_id,
                "Invalidated in-flight utterance"
            );
        }
        self.pending_advance = None;
    }
}
