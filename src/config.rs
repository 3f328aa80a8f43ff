//! Configuration for the narrator core.
//!
//! All tunable policy constants are centralized here and loadable from a
//! TOML file if the host has one. Any missing or invalid entries fall back
//! to sensible defaults so the narrator can always start.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Narrator policy knobs; deserializable from TOML.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NarratorConfig {
    /// Target chunk length in characters.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Pause after cancelling speech before issuing the replacement
    /// request. Some engines corrupt voice state when re-commanded
    /// back-to-back.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Pause between a chunk finishing and the next chunk starting.
    #[serde(default = "default_advance_delay_ms")]
    pub advance_delay_ms: u64,
    /// Approximate rendered line height of the raw text view, in pixels.
    #[serde(default = "default_line_height_px")]
    pub line_height_px: f32,
    /// How far above the spoken line the raw view is kept scrolled.
    #[serde(default = "default_scroll_margin_px")]
    pub scroll_margin_px: f32,
    /// Minimum scroll delta worth re-issuing; smaller moves are jitter.
    #[serde(default = "default_rescroll_threshold_px")]
    pub rescroll_threshold_px: f32,
}

impl Default for NarratorConfig {
    fn default() -> Self {
        NarratorConfig {
            chunk_size: default_chunk_size(),
            settle_delay_ms: default_settle_delay_ms(),
            advance_delay_ms: default_advance_delay_ms(),
            line_height_px: default_line_height_px(),
            scroll_margin_px: default_scroll_margin_px(),
            rescroll_threshold_px: default_rescroll_threshold_px(),
        }
    }
}

impl NarratorConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }
}

fn default_chunk_size() -> usize {
    crate::chunking::DEFAULT_CHUNK_SIZE
}

fn default_settle_delay_ms() -> u64 {
    200
}

fn default_advance_delay_ms() -> u64 {
    150
}

fn default_line_height_px() -> f32 {
    24.0
}

fn default_scroll_margin_px() -> f32 {
    120.0
}

fn default_rescroll_threshold_px() -> f32 {
    48.0
}

/// Load configuration from the given path, falling back to defaults on error.
pub fn load_config(path: &Path) -> NarratorConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded narrator config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default config: {err}"
            );
            return NarratorConfig::default();
        }
    };

    match toml::from_str::<NarratorConfig>(&contents) {
        Ok(cfg) => {
            debug!("Parsed configuration from disk");
            cfg
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid config TOML: {err}");
            NarratorConfig::default()
        }
    }
}
