//! Broadcast schedule model
//!
//! A schedule is an ordered sequence of items, each with an absolute local
//! start timestamp and a lazily-resolved duration. The first item's start
//! is the broadcast origin: time zero for all relative-offset math.
//!
//! Membership is fixed after load; items mutate in place as durations are
//! resolved and playback proves sources good or bad.

use chrono::NaiveDateTime;
use recast_common::compact_time;
use recast_common::events::ItemStatus;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// Raw schedule record as delivered by the CSV collaborator.
///
/// `time` is a 14-digit `YYYYMMDDHHmmss` local timestamp; `file` is the
/// locator segment joined to the configured base.
#[derive(Debug, Clone, Deserialize)]
pub struct RawScheduleEntry {
    pub time: String,
    pub file: String,
}

/// One row of the broadcast plan.
#[derive(Debug, Clone)]
pub struct ScheduleItem {
    /// Stable identity, assigned at construction
    pub guid: Uuid,

    /// Absolute local timestamp this item is supposed to begin
    pub scheduled_start: NaiveDateTime,

    /// Resolvable locator for the audio payload
    pub source: String,

    /// Playable duration in seconds; 0.0 until resolved
    duration_secs: f64,

    /// Resolution status; transitions are one-way
    status: ItemStatus,

    /// Whether preloading has been requested for this item as a "next" item
    pub(crate) preload_triggered: bool,
}

impl ScheduleItem {
    pub fn new(scheduled_start: NaiveDateTime, source: String) -> Self {
        Self {
            guid: Uuid::new_v4(),
            scheduled_start,
            source,
            duration_secs: 0.0,
            status: ItemStatus::Pending,
            preload_triggered: false,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    pub fn preload_triggered(&self) -> bool {
        self.preload_triggered
    }

    /// Apply a status transition, enforcing forward-only movement.
    ///
    /// Returns whether the transition was applied. Regressions are logged
    /// and ignored rather than propagated; a settled answer stays settled.
    pub(crate) fn set_status(&mut self, next: ItemStatus) -> bool {
        if !self.status.can_advance_to(next) {
            warn!(
                "rejected status transition {} -> {} for {}",
                self.status, next, self.source
            );
            return false;
        }
        self.status = next;
        true
    }

    pub(crate) fn record_duration(&mut self, secs: f64) {
        self.duration_secs = secs;
    }

    /// Start of this item relative to the broadcast origin, in seconds.
    pub fn relative_start_secs(&self, origin: NaiveDateTime) -> f64 {
        (self.scheduled_start - origin).num_milliseconds() as f64 / 1000.0
    }

    /// Closed-open coverage test against an elapsed offset from the origin.
    ///
    /// An item covers `relative_elapsed` iff it falls in
    /// `[relative_start, relative_start + duration)`. An item exactly at its
    /// end boundary does not match; a contiguous successor would. Items
    /// with no playable duration (unresolved or failed) never cover.
    pub fn covers_elapsed(&self, origin: NaiveDateTime, relative_elapsed: f64) -> bool {
        if self.duration_secs <= 0.0 {
            return false;
        }
        let relative_start = self.relative_start_secs(origin);
        relative_elapsed >= relative_start
            && relative_elapsed < relative_start + self.duration_secs
    }
}

/// Read-only item view for UI collaborators.
#[derive(Debug, Clone, Serialize)]
pub struct ItemSnapshot {
    pub guid: Uuid,
    pub scheduled_start: NaiveDateTime,
    pub source: String,
    pub duration_secs: f64,
    pub status: ItemStatus,
}

/// Ordered broadcast schedule.
#[derive(Debug, Default)]
pub struct Schedule {
    items: Vec<ScheduleItem>,
}

impl Schedule {
    /// Build a schedule from raw records.
    ///
    /// Records with an unparseable timestamp are logged and skipped
    /// (upstream is supposed to have filtered malformed rows already).
    /// Items are sorted ascending by start; the sort is stable, so rows
    /// sharing a timestamp keep their input order.
    pub fn from_records<F>(records: Vec<RawScheduleEntry>, source_for: F) -> Self
    where
        F: Fn(&str) -> String,
    {
        let mut items: Vec<ScheduleItem> = records
            .into_iter()
            .filter_map(|record| match compact_time::parse_compact(&record.time) {
                Ok(start) => Some(ScheduleItem::new(start, source_for(&record.file))),
                Err(e) => {
                    warn!("skipping schedule row {:?}: {}", record.file, e);
                    None
                }
            })
            .collect();

        items.sort_by_key(|item| item.scheduled_start);
        Self { items }
    }

    /// Build directly from items (tests, hosts with their own parsing).
    pub fn from_items(mut items: Vec<ScheduleItem>) -> Self {
        items.sort_by_key(|item| item.scheduled_start);
        Self { items }
    }

    /// Broadcast origin: the first item's start. `None` when empty.
    pub fn origin(&self) -> Option<NaiveDateTime> {
        self.items.first().map(|item| item.scheduled_start)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[ScheduleItem] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&ScheduleItem> {
        self.items.get(index)
    }

    pub(crate) fn item_mut(&mut self, index: usize) -> Option<&mut ScheduleItem> {
        self.items.get_mut(index)
    }

    /// Clear preload bookkeeping after a playback position change.
    ///
    /// A fresh position means nothing has been preloaded relative to it;
    /// the preloader's per-locator dedup still prevents duplicate fetches.
    pub(crate) fn reset_preload_guard(&mut self) {
        for item in &mut self.items {
            item.preload_triggered = false;
        }
    }

    /// Read-only snapshot of all items for display.
    pub fn snapshot(&self) -> Vec<ItemSnapshot> {
        self.items
            .iter()
            .map(|item| ItemSnapshot {
                guid: item.guid,
                scheduled_start: item.scheduled_start,
                source: item.source.clone(),
                duration_secs: item.duration_secs,
                status: item.status,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(secs_past_eight: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
            + chrono::Duration::seconds(secs_past_eight)
    }

    fn raw(time: &str, file: &str) -> RawScheduleEntry {
        RawScheduleEntry {
            time: time.to_string(),
            file: file.to_string(),
        }
    }

    #[test]
    fn test_from_records_sorted_by_start() {
        let schedule = Schedule::from_records(
            vec![
                raw("20240315090000", "b.mp3"),
                raw("20240315080000", "a.mp3"),
                raw("20240315083000", "c.mp3"),
            ],
            |f| f.to_string(),
        );

        let sources: Vec<&str> = schedule.items().iter().map(|i| i.source.as_str()).collect();
        assert_eq!(sources, vec!["a.mp3", "c.mp3", "b.mp3"]);
        assert_eq!(schedule.origin(), Some(ts(0)));
    }

    #[test]
    fn test_duplicate_starts_keep_input_order() {
        let schedule = Schedule::from_records(
            vec![
                raw("20240315080000", "first.mp3"),
                raw("20240315080000", "second.mp3"),
                raw("20240315080000", "third.mp3"),
            ],
            |f| f.to_string(),
        );

        let sources: Vec<&str> = schedule.items().iter().map(|i| i.source.as_str()).collect();
        assert_eq!(sources, vec!["first.mp3", "second.mp3", "third.mp3"]);
    }

    #[test]
    fn test_malformed_rows_skipped() {
        let schedule = Schedule::from_records(
            vec![
                raw("not-a-time", "bad.mp3"),
                raw("20240315080000", "good.mp3"),
            ],
            |f| f.to_string(),
        );

        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule.items()[0].source, "good.mp3");
    }

    #[test]
    fn test_empty_schedule_has_no_origin() {
        let schedule = Schedule::from_records(vec![], |f| f.to_string());
        assert!(schedule.is_empty());
        assert_eq!(schedule.origin(), None);
    }

    #[test]
    fn test_coverage_interval_is_closed_open() {
        let mut item = ScheduleItem::new(ts(60), "a.mp3".to_string());
        item.record_duration(90.0);
        item.set_status(ItemStatus::Resolved);

        let origin = ts(0);
        assert!(!item.covers_elapsed(origin, 59.9));
        assert!(item.covers_elapsed(origin, 60.0)); // closed start
        assert!(item.covers_elapsed(origin, 149.9));
        assert!(!item.covers_elapsed(origin, 150.0)); // open end
    }

    #[test]
    fn test_unresolved_item_never_covers() {
        let item = ScheduleItem::new(ts(0), "a.mp3".to_string());
        assert!(!item.covers_elapsed(ts(0), 0.0));
    }

    #[test]
    fn test_status_transitions_forward_only() {
        let mut item = ScheduleItem::new(ts(0), "a.mp3".to_string());
        assert_eq!(item.status(), ItemStatus::Pending);

        assert!(item.set_status(ItemStatus::Resolving));
        assert!(item.set_status(ItemStatus::Resolved));

        // Regressions rejected
        assert!(!item.set_status(ItemStatus::Pending));
        assert!(!item.set_status(ItemStatus::Resolving));
        assert_eq!(item.status(), ItemStatus::Resolved);

        // Playback may still prove the source unusable
        assert!(item.set_status(ItemStatus::Failed));
        assert!(!item.set_status(ItemStatus::Resolved));
        assert_eq!(item.status(), ItemStatus::Failed);
    }

    #[test]
    fn test_reset_preload_guard() {
        let mut schedule = Schedule::from_items(vec![
            ScheduleItem::new(ts(0), "a.mp3".to_string()),
            ScheduleItem::new(ts(60), "b.mp3".to_string()),
        ]);
        schedule.item_mut(1).unwrap().preload_triggered = true;

        schedule.reset_preload_guard();
        assert!(!schedule.items()[1].preload_triggered());
    }

    #[test]
    fn test_snapshot_serializes_for_display() {
        let mut schedule = Schedule::from_items(vec![ScheduleItem::new(
            ts(0),
            "a.mp3".to_string(),
        )]);
        {
            let item = schedule.item_mut(0).unwrap();
            item.set_status(ItemStatus::Resolving);
            item.record_duration(61.5);
            item.set_status(ItemStatus::Resolved);
        }

        let json = serde_json::to_string(&schedule.snapshot()).unwrap();
        assert!(json.contains("\"status\":\"resolved\""));
        assert!(json.contains("\"duration_secs\":61.5"));
        assert!(json.contains("a.mp3"));
    }

    #[test]
    fn test_relative_start() {
        let item = ScheduleItem::new(ts(90), "a.mp3".to_string());
        assert_eq!(item.relative_start_secs(ts(0)), 90.0);
        assert_eq!(item.relative_start_secs(ts(120)), -30.0);
    }
}
