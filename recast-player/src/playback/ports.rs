//! Environment ports
//!
//! The engine never touches a concrete playback runtime, media decoder, or
//! network stack. It drives these three ports; the host binds them to its
//! environment (a real audio player, symphonia, reqwest) or to scripted
//! doubles in tests.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from a duration probe.
///
/// All variants mean the same thing to the resolver: the item's duration
/// cannot be determined and the item is permanently unplayable.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to open media source: {0}")]
    Open(String),

    #[error("unsupported media: {0}")]
    Unsupported(String),

    #[error("probe timed out")]
    Timeout,
}

/// Errors from a payload fetch. Preloading is best-effort; these are only
/// ever logged.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("fetch failed: {0}")]
    Failed(String),
}

/// Error classes reported by the host playback runtime.
///
/// Format and network failures mean the loaded source is unusable and the
/// engine should skip forward; anything else is surfaced to the user
/// without auto-advancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerErrorKind {
    UnsupportedFormat,
    Network,
    Other,
}

impl PlayerErrorKind {
    pub fn is_skip_worthy(self) -> bool {
        matches!(
            self,
            PlayerErrorKind::UnsupportedFormat | PlayerErrorKind::Network
        )
    }
}

/// Errors from starting playback.
#[derive(Debug, Error)]
pub enum PlaybackStartError {
    /// The host environment refused an unattended start. Not a media
    /// failure: the loaded source and position remain valid and a manual
    /// start resumes correctly.
    #[error("autoplay blocked by host environment")]
    AutoplayBlocked,

    #[error("playback start failed: {0}")]
    Failed(String),
}

/// One-shot media duration probe.
#[async_trait]
pub trait DurationProbe: Send + Sync {
    /// Determine the playable duration of `source`, in seconds.
    ///
    /// Called at most once per item; the resolver caches the outcome.
    async fn probe(&self, source: &str) -> Result<f64, ProbeError>;
}

/// Opportunistic payload fetch, used to warm caches ahead of playback.
#[async_trait]
pub trait PayloadFetcher: Send + Sync {
    async fn fetch(&self, source: &str) -> Result<(), FetchError>;
}

/// Abstract playback runtime.
///
/// `load`/`seek`/`pause`/`stop` are assumed to always be accepted by the
/// runtime; only `play` can be refused (autoplay policy) or fail outright.
/// Runtime errors during playback arrive asynchronously through the host
/// calling [`PlaybackEngine::on_player_error`].
///
/// [`PlaybackEngine::on_player_error`]: crate::playback::engine::PlaybackEngine::on_player_error
#[async_trait]
pub trait PlayerPort: Send + Sync {
    /// Point the runtime at a new source. Implicitly resets position to 0.
    async fn load(&self, source: &str);

    /// Seek to an absolute position within the loaded source.
    async fn seek(&self, position_secs: f64);

    /// Begin or resume playback.
    async fn play(&self) -> Result<(), PlaybackStartError>;

    /// Pause playback, keeping source and position.
    async fn pause(&self);

    /// Stop playback and release the source.
    async fn stop(&self);

    /// Current position within the loaded source, in seconds.
    async fn position_secs(&self) -> f64;
}
