//! Cooperative cancellation for in-flight speech requests.
//!
//! Every utterance the core issues is tagged with a request id and a token.
//! Cancellation flips the token *before* the engine-level cancel is sent,
//! so an engine that fires its completion callback anyway (a known quirk of
//! some engines) is observably ignored: the late event still carries a
//! matching id, but its token is already dead.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Identity of one issued speech request.
#[derive(Clone, Debug)]
pub struct UtteranceTag {
    pub request_id: u64,
    token: CancellationToken,
}

impl UtteranceTag {
    pub fn new(request_id: u64) -> Self {
        Self {
            request_id,
            token: CancellationToken::new(),
        }
    }

    /// Invalidate the tag; events carrying its id are rejected from now on.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether an event carrying `request_id` should still be acted on.
    pub fn accepts(&self, request_id: u64) -> bool {
        self.request_id == request_id && !self.token.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::UtteranceTag;

    #[test]
    fn accepts_only_live_matching_id() {
        let tag = UtteranceTag::new(7);
        assert!(tag.accepts(7));
        assert!(!tag.accepts(8));
        tag.cancel();
        assert!(!tag.accepts(7));
    }
}
