//! Core playback engine - construction, lifecycle and shared helpers
//!
//! **Responsibilities:**
//! - PlaybackEngine struct definition and initialization
//! - Transport control (play, pause) and the built-in progress ticker
//! - The shared "start item at offset" path used by synchronization and
//!   continuity transitions

use crate::config::PlayerConfig;
use crate::error::{Error, Result};
use crate::playback::ports::{DurationProbe, PayloadFetcher, PlaybackStartError, PlayerPort};
use crate::playback::preload::Preloader;
use crate::playback::resolver::DurationResolver;
use crate::playback::state::SharedPlaybackState;
use crate::schedule::{ItemSnapshot, Schedule};
use chrono::{NaiveDateTime, Utc};
use recast_common::events::{EventBus, PlaybackState, PlayerEvent};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

/// Result of an attempt to start an item.
pub(super) enum StartResult {
    Playing,
    Blocked,
    Failed,
}

/// Playback engine - the virtual radio core.
///
/// Owns the schedule, the cursor and the playback state machine; drives
/// the player port. All mutation funnels through engine methods, so the
/// single-writer semantics of the cursor and per-item fields hold without
/// further locking discipline on the host's side.
pub struct PlaybackEngine {
    /// Engine configuration (thresholds, policies)
    pub(super) config: PlayerConfig,

    /// The broadcast schedule; items mutate in place as they resolve
    pub(super) schedule: RwLock<Schedule>,

    /// State machine phase + cursor
    pub(super) state: SharedPlaybackState,

    /// Lazy duration resolution
    pub(super) resolver: DurationResolver,

    /// Fire-and-forget payload warm-up
    pub(super) preloader: Preloader,

    /// Abstract playback runtime
    pub(super) player: Arc<dyn PlayerPort>,

    /// Event broadcast to UI collaborators
    pub(super) bus: Arc<EventBus>,
}

impl PlaybackEngine {
    /// Create a new playback engine over the given schedule and ports.
    pub fn new(
        config: PlayerConfig,
        schedule: Schedule,
        player: Arc<dyn PlayerPort>,
        probe: Arc<dyn DurationProbe>,
        fetcher: Arc<dyn PayloadFetcher>,
    ) -> Self {
        info!(
            "creating playback engine: {} scheduled items, preload threshold {:.0}s",
            schedule.len(),
            config.preload_threshold_secs
        );
        let bus = Arc::new(EventBus::new(config.event_capacity));
        Self {
            resolver: DurationResolver::new(probe, Arc::clone(&bus)),
            preloader: Preloader::new(fetcher, Arc::clone(&bus)),
            schedule: RwLock::new(schedule),
            state: SharedPlaybackState::new(),
            player,
            bus,
            config,
        }
    }

    /// Subscribe to engine events.
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.bus.subscribe()
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.bus)
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Current cursor (`None` = nothing active).
    pub async fn cursor(&self) -> Option<usize> {
        self.state.get_cursor().await
    }

    pub async fn playback_state(&self) -> PlaybackState {
        self.state.get_state().await
    }

    /// Broadcast origin: the first item's start.
    pub async fn origin(&self) -> Option<NaiveDateTime> {
        self.schedule.read().await.origin()
    }

    /// Read-only schedule snapshot for display.
    pub async fn snapshot(&self) -> Vec<ItemSnapshot> {
        self.schedule.read().await.snapshot()
    }

    /// Resume (or begin) playback of the item under the cursor.
    ///
    /// The manual-start path after an autoplay rejection lands here.
    pub async fn play(&self) -> Result<()> {
        let Some(index) = self.state.get_cursor().await else {
            return Err(Error::InvalidState("no active item to play".to_string()));
        };
        debug!("play command for index {}", index);
        let item_id = {
            let schedule = self.schedule.read().await;
            match schedule.item(index) {
                Some(item) => item.guid,
                None => return Err(Error::InvalidIndex(index)),
            }
        };

        match self.player.play().await {
            Ok(()) => {
                self.transition_state(PlaybackState::Playing).await;
                Ok(())
            }
            Err(PlaybackStartError::AutoplayBlocked) => {
                // Still blocked; state stays primed for another attempt
                self.emit_blocked(index, item_id);
                Ok(())
            }
            Err(PlaybackStartError::Failed(message)) => {
                warn!("playback start failed: {}", message);
                self.emit_start_failure(index, item_id, message);
                Ok(())
            }
        }
    }

    /// Pause playback, keeping cursor and position.
    pub async fn pause(&self) {
        self.player.pause().await;
        if self.state.get_state().await == PlaybackState::Playing {
            self.transition_state(PlaybackState::Paused).await;
        }
    }

    /// Spawn the built-in progress ticker.
    ///
    /// Runs [`tick`](Self::tick) at the configured cadence until the
    /// engine reaches `Finished`. Hosts with their own timing source can
    /// skip this and call `tick` directly.
    pub fn start_ticker(self: Arc<Self>) -> JoinHandle<()> {
        let engine = self;
        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_millis(engine.config.tick_interval_ms));
            loop {
                ticker.tick().await;
                if engine.state.get_state().await == PlaybackState::Finished {
                    break;
                }
                engine.tick().await;
            }
            debug!("progress ticker stopped");
        })
    }

    /// Start the item at `index`, seeking to `offset_secs`.
    ///
    /// Shared by synchronization, advance and manual jump: sets the
    /// cursor, clears preload bookkeeping for the new position, loads and
    /// seeks the player, then attempts to start it.
    pub(super) async fn start_at(
        &self,
        schedule: &mut Schedule,
        index: usize,
        offset_secs: f64,
    ) -> StartResult {
        let Some(item) = schedule.item(index) else {
            warn!("start_at: index {} out of range", index);
            return StartResult::Failed;
        };
        let (item_id, source) = (item.guid, item.source.clone());

        self.state.set_cursor(Some(index)).await;
        schedule.reset_preload_guard();

        self.player.load(&source).await;
        self.player.seek(offset_secs).await;

        match self.player.play().await {
            Ok(()) => {
                info!("playing {} from {:.1}s", source, offset_secs);
                self.transition_state(PlaybackState::Playing).await;
                self.bus.emit_lossy(PlayerEvent::TrackStarted {
                    index,
                    item_id,
                    offset_secs,
                    timestamp: Utc::now(),
                });
                StartResult::Playing
            }
            Err(PlaybackStartError::AutoplayBlocked) => {
                info!(
                    "autoplay blocked; {} primed at {:.1}s awaiting manual start",
                    source, offset_secs
                );
                self.transition_state(PlaybackState::Paused).await;
                self.emit_blocked(index, item_id);
                StartResult::Blocked
            }
            Err(PlaybackStartError::Failed(message)) => {
                warn!("playback start failed for {}: {}", source, message);
                self.transition_state(PlaybackState::Paused).await;
                self.emit_start_failure(index, item_id, message);
                StartResult::Failed
            }
        }
    }

    /// Change the state machine phase, emitting the transition.
    pub(super) async fn transition_state(&self, new_state: PlaybackState) {
        let old_state = self.state.set_state(new_state).await;
        if old_state != new_state {
            debug!("playback state {} -> {}", old_state, new_state);
            self.bus.emit_lossy(PlayerEvent::StateChanged {
                old_state,
                new_state,
                timestamp: Utc::now(),
            });
        }
    }

    fn emit_blocked(&self, index: usize, item_id: uuid::Uuid) {
        self.bus.emit_lossy(PlayerEvent::AutoplayBlocked {
            index,
            item_id,
            timestamp: Utc::now(),
        });
    }

    fn emit_start_failure(&self, index: usize, item_id: uuid::Uuid, message: String) {
        self.bus.emit_lossy(PlayerEvent::TrackFailed {
            index,
            item_id,
            error: message,
            skipped: false,
            timestamp: Utc::now(),
        });
    }
}
