//! Shared playback state

use recast_common::events::PlaybackState;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared playback state: the state machine phase and the cursor.
///
/// The cursor is the single authoritative pointer to "what should be
/// playing" (`None` = nothing active). It is written only by the
/// synchronization path (initial sync / resync) and the continuity path
/// (advance / manual jump).
#[derive(Debug, Clone)]
pub struct SharedPlaybackState {
    inner: Arc<RwLock<PlaybackStateInner>>,
}

#[derive(Debug)]
struct PlaybackStateInner {
    state: PlaybackState,
    cursor: Option<usize>,
}

impl SharedPlaybackState {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(PlaybackStateInner {
                state: PlaybackState::Idle,
                cursor: None,
            })),
        }
    }

    pub async fn get_state(&self) -> PlaybackState {
        self.inner.read().await.state
    }

    /// Set the state, returning the previous value.
    pub async fn set_state(&self, state: PlaybackState) -> PlaybackState {
        let mut inner = self.inner.write().await;
        std::mem::replace(&mut inner.state, state)
    }

    pub async fn get_cursor(&self) -> Option<usize> {
        self.inner.read().await.cursor
    }

    pub async fn set_cursor(&self, cursor: Option<usize>) {
        self.inner.write().await.cursor = cursor;
    }
}

impl Default for SharedPlaybackState {
    fn default() -> Self {
        Self::new()
    }
}
