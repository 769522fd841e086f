//! Lazy duration resolution
//!
//! Track durations are not known up front; they are determined by probing
//! the media exactly once, on demand, in schedule order. The resolver
//! caches the outcome on the item itself and never surfaces a probe
//! failure to callers — a failed probe degrades the item to permanently
//! unplayable (`Failed`, duration 0) and resolution completes normally.

use crate::playback::ports::DurationProbe;
use crate::schedule::ScheduleItem;
use chrono::Utc;
use recast_common::events::{EventBus, ItemStatus, PlayerEvent};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct DurationResolver {
    probe: Arc<dyn DurationProbe>,
    bus: Arc<EventBus>,
}

impl DurationResolver {
    pub fn new(probe: Arc<dyn DurationProbe>, bus: Arc<EventBus>) -> Self {
        Self { probe, bus }
    }

    /// Resolve an item's playable duration, probing at most once.
    ///
    /// Settled items (`Resolved` or `Failed`) return their cached duration
    /// immediately with no side effect. Otherwise the item transitions to
    /// `Resolving`, the probe runs, and the item settles to `Resolved`
    /// (probe's duration) or `Failed` (duration 0). Always completes; the
    /// item is mutated in place.
    pub async fn resolve(&self, item: &mut ScheduleItem) -> f64 {
        if item.status().is_settled() {
            return item.duration_secs();
        }

        let old_status = item.status();
        item.set_status(ItemStatus::Resolving);
        self.emit_status(item, old_status);

        debug!("probing duration for {}", item.source);
        match self.probe.probe(&item.source).await {
            Ok(secs) => {
                item.record_duration(secs);
                item.set_status(ItemStatus::Resolved);
                info!("resolved {} to {:.1}s", item.source, secs);
            }
            Err(e) => {
                warn!("duration probe failed for {}: {}", item.source, e);
                item.record_duration(0.0);
                item.set_status(ItemStatus::Failed);
            }
        }
        self.emit_status(item, ItemStatus::Resolving);

        item.duration_secs()
    }

    fn emit_status(&self, item: &ScheduleItem, old_status: ItemStatus) {
        self.bus.emit_lossy(PlayerEvent::ItemStatusChanged {
            item_id: item.guid,
            old_status,
            new_status: item.status(),
            duration_secs: item.duration_secs(),
            timestamp: Utc::now(),
        });
    }
}
