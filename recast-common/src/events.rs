//! Event types for the recast event system
//!
//! Provides the shared event definitions and `EventBus` used across the
//! recast workspace.
//!
//! # Architecture
//!
//! Recast uses hybrid communication:
//! - **EventBus** (`tokio::broadcast`): one-to-many event broadcasting to
//!   UI collaborators and observers
//! - **Shared state** (`Arc<RwLock<T>>`): read-heavy access to cursor and
//!   playback state
//!
//! Events are serializable so a host can forward them verbatim to whatever
//! transport its UI uses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Playback state of the continuity engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
    Finished,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "idle"),
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
            PlaybackState::Finished => write!(f, "finished"),
        }
    }
}

/// Resolution status of a schedule item's duration
///
/// Transitions are one-way: `Pending → Resolving → Resolved → Failed`.
/// A settled item never returns to an earlier status; `Resolved → Failed`
/// is legal (playback later proves the source unusable), the reverse is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Pending,
    Resolving,
    Resolved,
    Failed,
}

impl ItemStatus {
    fn rank(self) -> u8 {
        match self {
            ItemStatus::Pending => 0,
            ItemStatus::Resolving => 1,
            ItemStatus::Resolved => 2,
            ItemStatus::Failed => 3,
        }
    }

    /// Whether the duration question has been answered, one way or the other.
    pub fn is_settled(self) -> bool {
        matches!(self, ItemStatus::Resolved | ItemStatus::Failed)
    }

    /// Whether moving to `next` is a forward transition.
    pub fn can_advance_to(self, next: ItemStatus) -> bool {
        next.rank() > self.rank()
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemStatus::Pending => write!(f, "pending"),
            ItemStatus::Resolving => write!(f, "resolving"),
            ItemStatus::Resolved => write!(f, "resolved"),
            ItemStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Recast event types
///
/// Every externally observable transition of the playback core is emitted
/// as one of these. Events are broadcast via [`EventBus`] and can be
/// serialized for transmission to UI collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerEvent {
    /// Wall-clock synchronization picked a covering item
    ///
    /// Triggers:
    /// - UI: highlight the active schedule row
    /// - UI: show "joined in progress" position
    Synchronized {
        /// Index of the covering item
        index: usize,
        /// Item identity
        item_id: Uuid,
        /// Seek offset into the item (seconds)
        offset_secs: f64,
        /// When synchronization completed
        timestamp: DateTime<Utc>,
    },

    /// No item covered the current time; playback fell back to the
    /// schedule head
    FallbackStarted {
        /// Index of the item started from offset 0
        index: usize,
        item_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// A track began playing
    ///
    /// Triggers:
    /// - UI: update now-playing display
    TrackStarted {
        index: usize,
        item_id: Uuid,
        /// Offset playback started from (0 except after synchronization)
        offset_secs: f64,
        timestamp: DateTime<Utc>,
    },

    /// A track played through to its natural end
    TrackFinished {
        index: usize,
        item_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// A track failed during playback
    ///
    /// Triggers:
    /// - UI: surface the failure message
    /// - Continuity engine: auto-advance when `skipped` is true
    TrackFailed {
        index: usize,
        item_id: Uuid,
        /// Human-readable failure description
        error: String,
        /// Whether the engine skipped forward automatically
        skipped: bool,
        timestamp: DateTime<Utc>,
    },

    /// Playback state changed
    ///
    /// Triggers:
    /// - UI: update transport controls
    StateChanged {
        old_state: PlaybackState,
        new_state: PlaybackState,
        timestamp: DateTime<Utc>,
    },

    /// A schedule item's resolution status changed
    ///
    /// Emitted on `Pending → Resolving` and on settling. Duration carries
    /// the resolved value (0.0 while unresolved or failed).
    ItemStatusChanged {
        item_id: Uuid,
        old_status: ItemStatus,
        new_status: ItemStatus,
        duration_secs: f64,
        timestamp: DateTime<Utc>,
    },

    /// Opportunistic preload of an upcoming item began
    PreloadStarted {
        item_id: Uuid,
        source: String,
        timestamp: DateTime<Utc>,
    },

    /// The host environment refused unattended playback start
    ///
    /// Cursor and source are already primed; a manual start resumes at the
    /// right place.
    AutoplayBlocked {
        index: usize,
        item_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// The last schedule item finished; nothing left to play
    ScheduleExhausted { timestamp: DateTime<Utc> },

    /// Synchronization found nothing playable in the entire schedule
    NothingPlayable { timestamp: DateTime<Utc> },
}

/// Event bus for broadcasting recast events
///
/// Wraps `tokio::sync::broadcast` with the emit semantics the engine
/// needs: critical emissions can observe subscriber absence, routine ones
/// are lossy.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PlayerEvent>,
    capacity: usize,
}

impl EventBus {
    /// Create a new EventBus with the specified channel capacity.
    ///
    /// Capacity bounds how many events a slow subscriber may lag before
    /// old events are dropped.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events.
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers.
    ///
    /// Returns `Ok(subscriber_count)`, or `Err` when nobody is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: PlayerEvent,
    ) -> Result<usize, broadcast::error::SendError<PlayerEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring the no-subscriber case.
    ///
    /// Routine events (status changes, preload notices) use this; the
    /// engine works identically whether or not anyone observes it.
    pub fn emit_lossy(&self, event: PlayerEvent) {
        let _ = self.tx.send(event);
    }

    /// Configured channel capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
