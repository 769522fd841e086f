//! # Recast Player Library (recast-player)
//!
//! Core virtual-radio playback engine: maps wall-clock time onto a
//! broadcast schedule of variable-length tracks and keeps playback
//! continuous across track boundaries.
//!
//! **Purpose:** given a schedule of `(start timestamp, source)` rows,
//! lazily resolve track durations, locate the item covering "now", seek
//! into it, and from there drive next-track advance, predictive preloading
//! and error skip-forward.
//!
//! **Architecture:** async engine over abstract environment ports
//! ([`playback::ports::PlayerPort`], [`playback::ports::DurationProbe`],
//! [`playback::ports::PayloadFetcher`]); default bindings (symphonia
//! metadata prober, reqwest payload fetcher) live in [`media`].

pub mod config;
pub mod error;
pub mod events;
pub mod media;
pub mod playback;
pub mod schedule;

pub use config::PlayerConfig;
pub use error::{Error, Result};
pub use playback::engine::{PlaybackEngine, SyncOutcome};
