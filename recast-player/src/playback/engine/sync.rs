//! Wall-clock synchronization
//!
//! **Responsibilities:**
//! - The locate scan: which schedule item covers "now", and at what offset
//! - The synchronize operation (cold start / explicit resync)
//! - The head-fallback policy when nothing covers the current time
//!
//! Durations are resolved on demand, strictly in schedule order, awaiting
//! each probe before moving on. This is deliberate: the scan never probes
//! out of order or speculatively ahead of its position. With many
//! unresolved items the scan can take observable wall-clock time, during
//! which the captured "now" goes stale; that staleness is not corrected.

use super::core::StartResult;
use super::PlaybackEngine;
use crate::schedule::Schedule;
use chrono::{Local, NaiveDateTime, Utc};
use recast_common::events::{ItemStatus, PlayerEvent};
use tracing::{debug, info};

/// Typed outcome of a synchronization run.
///
/// One case per observable result; UI collaborators render text from
/// these, tests match on them.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// A covering item was found and started at the computed offset.
    Started { index: usize, offset_secs: f64 },

    /// Cursor and source are primed but the host refused unattended
    /// start; a manual start resumes at the right place.
    AutoplayBlocked { index: usize, offset_secs: f64 },

    /// Playback start failed outright (not autoplay policy).
    PlaybackFailed { index: usize },

    /// No item covers the current time; playback fell back to the first
    /// playable item, from offset 0.
    FallbackStarted { index: usize },

    /// No item covers the current time and head fallback is disabled.
    NoCoverage,

    /// Every schedule item is unplayable.
    NothingPlayable,

    /// Schedule is empty; there is no broadcast origin to sync against.
    NotReady,
}

impl PlaybackEngine {
    /// Synchronize playback to the current wall-clock time.
    pub async fn synchronize(&self) -> SyncOutcome {
        self.synchronize_at(Local::now().naive_local()).await
    }

    /// Synchronize playback against an explicit wall-clock instant.
    ///
    /// The instant is captured once; probes awaited during the scan do not
    /// refresh it.
    pub async fn synchronize_at(&self, now: NaiveDateTime) -> SyncOutcome {
        let mut schedule = self.schedule.write().await;
        let Some(origin) = schedule.origin() else {
            info!("synchronize: schedule empty, not ready");
            return SyncOutcome::NotReady;
        };

        let relative_elapsed = (now - origin).num_milliseconds() as f64 / 1000.0;
        info!(
            "synchronizing: {:.1}s elapsed since broadcast origin",
            relative_elapsed
        );

        if let Some((index, offset_secs)) =
            self.locate(&mut schedule, origin, relative_elapsed).await
        {
            info!(
                "current time covered by index {} at offset {:.1}s",
                index, offset_secs
            );
            let item_id = schedule.items()[index].guid;
            return match self.start_at(&mut schedule, index, offset_secs).await {
                StartResult::Playing => {
                    self.bus.emit_lossy(PlayerEvent::Synchronized {
                        index,
                        item_id,
                        offset_secs,
                        timestamp: Utc::now(),
                    });
                    SyncOutcome::Started { index, offset_secs }
                }
                StartResult::Blocked => SyncOutcome::AutoplayBlocked { index, offset_secs },
                StartResult::Failed => SyncOutcome::PlaybackFailed { index },
            };
        }

        debug!("no schedule item covers the current time");
        if !self.config.fallback_to_schedule_head {
            return SyncOutcome::NoCoverage;
        }
        self.fallback_start(&mut schedule).await
    }

    /// Locate the item covering `relative_elapsed` seconds past the origin.
    ///
    /// Sequential scan in schedule order; each unsettled item is resolved
    /// before it is considered. First covering item wins (which also
    /// settles malformed overlapping input in favor of the earlier row).
    async fn locate(
        &self,
        schedule: &mut Schedule,
        origin: NaiveDateTime,
        relative_elapsed: f64,
    ) -> Option<(usize, f64)> {
        for index in 0..schedule.len() {
            if let Some(item) = schedule.item_mut(index) {
                if !item.status().is_settled() {
                    self.resolver.resolve(item).await;
                }
            }

            let item = &schedule.items()[index];
            if item.duration_secs() <= 0.0 {
                continue;
            }
            if item.covers_elapsed(origin, relative_elapsed) {
                let offset_secs = relative_elapsed - item.relative_start_secs(origin);
                return Some((index, offset_secs));
            }
        }
        None
    }

    /// Start the first non-failed item from the top of the schedule.
    async fn fallback_start(&self, schedule: &mut Schedule) -> SyncOutcome {
        for index in 0..schedule.len() {
            if let Some(item) = schedule.item_mut(index) {
                if !item.status().is_settled() {
                    self.resolver.resolve(item).await;
                }
            }

            let item = &schedule.items()[index];
            if item.status() == ItemStatus::Failed {
                continue;
            }
            let item_id = item.guid;
            info!("no coverage; falling back to schedule index {}", index);
            return match self.start_at(schedule, index, 0.0).await {
                StartResult::Playing => {
                    self.bus.emit_lossy(PlayerEvent::FallbackStarted {
                        index,
                        item_id,
                        timestamp: Utc::now(),
                    });
                    SyncOutcome::FallbackStarted { index }
                }
                StartResult::Blocked => SyncOutcome::AutoplayBlocked {
                    index,
                    offset_secs: 0.0,
                },
                StartResult::Failed => SyncOutcome::PlaybackFailed { index },
            };
        }

        info!("nothing playable in schedule");
        self.bus.emit_lossy(PlayerEvent::NothingPlayable {
            timestamp: Utc::now(),
        });
        SyncOutcome::NothingPlayable
    }
}
