//! Configuration for the recast playback engine
//!
//! A single TOML-loadable struct with built-in defaults. The heuristics the
//! engine runs on (preload threshold, head-fallback policy, tick cadence)
//! are deliberately configuration rather than constants; the defaults match
//! the behavior of the original broadcast player.

use crate::error::{Error, Result};
use serde::Deserialize;

/// Playback engine configuration
///
/// All fields have built-in defaults, so an empty TOML document (or
/// `PlayerConfig::default()`) yields a working configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerConfig {
    /// Prefix joined to schedule `file` segments to form source locators.
    ///
    /// Empty means file segments are already complete locators.
    #[serde(default)]
    pub base_url: String,

    /// Remaining playtime (seconds) below which the next item is preloaded.
    #[serde(default = "default_preload_threshold_secs")]
    pub preload_threshold_secs: f64,

    /// Cadence of the progress tick, for hosts using the built-in ticker.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Event bus channel capacity.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// When no item covers the current time, start the first non-failed
    /// item from the top instead of reporting no coverage.
    #[serde(default = "default_fallback_to_schedule_head")]
    pub fallback_to_schedule_head: bool,
}

fn default_preload_threshold_secs() -> f64 {
    30.0
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_event_capacity() -> usize {
    1000
}

fn default_fallback_to_schedule_head() -> bool {
    true
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            preload_threshold_secs: default_preload_threshold_secs(),
            tick_interval_ms: default_tick_interval_ms(),
            event_capacity: default_event_capacity(),
            fallback_to_schedule_head: default_fallback_to_schedule_head(),
        }
    }
}

impl PlayerConfig {
    /// Load configuration from a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(e.to_string()))
    }

    /// Join a schedule file segment onto the configured base.
    pub fn source_for(&self, file: &str) -> String {
        if self.base_url.is_empty() {
            file.to_string()
        } else {
            format!("{}/{}", self.base_url.trim_end_matches('/'), file)
        }
    }
}
