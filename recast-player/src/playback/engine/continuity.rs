//! Playback continuity state machine
//!
//! **Responsibilities:**
//! - Natural end-of-track advance (and the terminal `Finished` transition)
//! - Error-driven skip-forward for unusable sources
//! - The progress tick that arms predictive preloading
//! - Manual jumps, which bypass wall-clock synchronization entirely
//!
//! The host adapter wires its player runtime's events to these methods;
//! the engine itself never registers with a concrete runtime.

use super::PlaybackEngine;
use crate::error::{Error, Result};
use crate::playback::ports::PlayerErrorKind;
use crate::schedule::Schedule;
use chrono::Utc;
use recast_common::events::{ItemStatus, PlaybackState, PlayerEvent};
use tracing::{debug, error, info, warn};

impl PlaybackEngine {
    /// Natural end of the current track: advance to the next item.
    pub async fn on_track_ended(&self) {
        let mut schedule = self.schedule.write().await;
        let Some(index) = self.state.get_cursor().await else {
            debug!("track ended with nothing active; ignoring");
            return;
        };
        if let Some(item) = schedule.item(index) {
            debug!("track {} played to completion", item.source);
            self.bus.emit_lossy(PlayerEvent::TrackFinished {
                index,
                item_id: item.guid,
                timestamp: Utc::now(),
            });
        }
        self.advance(&mut schedule).await;
    }

    /// Runtime error on the currently playing item.
    ///
    /// Skip-worthy classes (unsupported format, network failure) mark the
    /// item failed and advance exactly as a natural end would. Anything
    /// else is surfaced to the user without touching the cursor.
    pub async fn on_player_error(&self, kind: PlayerErrorKind, message: &str) {
        let mut schedule = self.schedule.write().await;
        let Some(index) = self.state.get_cursor().await else {
            warn!("player error with nothing active: {}", message);
            return;
        };
        let Some(item) = schedule.item_mut(index) else {
            return;
        };
        let item_id = item.guid;

        if kind.is_skip_worthy() {
            warn!(
                "unusable source {} ({}); skipping forward",
                item.source, message
            );
            item.record_duration(0.0);
            item.set_status(ItemStatus::Failed);
            self.bus.emit_lossy(PlayerEvent::TrackFailed {
                index,
                item_id,
                error: message.to_string(),
                skipped: true,
                timestamp: Utc::now(),
            });
            self.advance(&mut schedule).await;
        } else {
            error!("playback error on {}: {}", item.source, message);
            self.bus.emit_lossy(PlayerEvent::TrackFailed {
                index,
                item_id,
                error: message.to_string(),
                skipped: false,
                timestamp: Utc::now(),
            });
        }
    }

    /// Progress tick: arm preloading of the next item near end-of-track.
    ///
    /// While playing, once the current item's remaining time drops to the
    /// configured threshold, the next item's payload fetch is triggered —
    /// at most once per track transition (per-item guard, plus locator
    /// dedup inside the preloader).
    pub async fn tick(&self) {
        if self.state.get_state().await != PlaybackState::Playing {
            return;
        }
        let Some(index) = self.state.get_cursor().await else {
            return;
        };

        let mut schedule = self.schedule.write().await;
        let Some(current) = schedule.item(index) else {
            return;
        };
        let duration = current.duration_secs();
        if duration <= 0.0 {
            return;
        }

        let remaining = duration - self.player.position_secs().await;
        if remaining > self.config.preload_threshold_secs {
            return;
        }

        if let Some(next_item) = schedule.item_mut(index + 1) {
            self.preloader.trigger(next_item);
        }
    }

    /// User selected an arbitrary schedule item.
    ///
    /// Resolves its duration if unknown, then starts it from offset 0.
    /// Explicit override: wall-clock synchronization plays no part here.
    pub async fn manual_jump(&self, index: usize) -> Result<()> {
        let mut schedule = self.schedule.write().await;
        if index >= schedule.len() {
            return Err(Error::InvalidIndex(index));
        }
        info!("manual jump to schedule index {}", index);

        if let Some(item) = schedule.item_mut(index) {
            if !item.status().is_settled() {
                self.resolver.resolve(item).await;
            }
        }
        let _ = self.start_at(&mut schedule, index, 0.0).await;
        Ok(())
    }

    /// Advance past the cursor to the next startable item.
    ///
    /// Items already known unusable are skipped with a warning; running
    /// off the end of the schedule is the terminal transition.
    pub(super) async fn advance(&self, schedule: &mut Schedule) {
        let Some(current) = self.state.get_cursor().await else {
            return;
        };
        let mut next = current + 1;

        loop {
            if next >= schedule.len() {
                info!("schedule exhausted");
                self.state.set_cursor(None).await;
                self.player.stop().await;
                self.transition_state(PlaybackState::Finished).await;
                self.bus.emit_lossy(PlayerEvent::ScheduleExhausted {
                    timestamp: Utc::now(),
                });
                return;
            }

            if let Some(item) = schedule.item_mut(next) {
                if !item.status().is_settled() {
                    self.resolver.resolve(item).await;
                }
            }
            if schedule.items()[next].status() == ItemStatus::Failed {
                warn!("skipping unplayable item at index {}", next);
                next += 1;
                continue;
            }

            let _ = self.start_at(schedule, next, 0.0).await;
            return;
        }
    }
}
