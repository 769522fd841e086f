//! Predictive preloading
//!
//! As a track nears its end, the next item's payload is fetched in the
//! background so the upcoming playback start is low-latency. Fetches are
//! fire-and-forget: the engine never awaits them, never learns their
//! outcome, and never blocks on them.

use crate::playback::ports::PayloadFetcher;
use crate::schedule::ScheduleItem;
use chrono::Utc;
use recast_common::events::{EventBus, ItemStatus, PlayerEvent};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::debug;

pub struct Preloader {
    fetcher: Arc<dyn PayloadFetcher>,
    bus: Arc<EventBus>,
    /// One retained fetch handle per distinct locator for the session.
    handles: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl Preloader {
    pub fn new(fetcher: Arc<dyn PayloadFetcher>, bus: Arc<EventBus>) -> Self {
        Self {
            fetcher,
            bus,
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Request a background fetch of `item`'s payload.
    ///
    /// No-op when the item was already triggered at this position, is
    /// known-unplayable, or has no locator. Otherwise marks the item
    /// triggered and spawns the fetch — unless a fetch for the same
    /// locator already ran this session (locator-level dedup).
    pub fn trigger(&self, item: &mut ScheduleItem) {
        if item.preload_triggered
            || item.status() == ItemStatus::Failed
            || item.source.is_empty()
        {
            return;
        }
        item.preload_triggered = true;

        let mut handles = self.handles.lock().unwrap();
        if handles.contains_key(&item.source) {
            debug!("preload already requested for {}", item.source);
            return;
        }

        debug!("preloading {}", item.source);
        self.bus.emit_lossy(PlayerEvent::PreloadStarted {
            item_id: item.guid,
            source: item.source.clone(),
            timestamp: Utc::now(),
        });

        let fetcher = Arc::clone(&self.fetcher);
        let source = item.source.clone();
        let task_source = source.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = fetcher.fetch(&task_source).await {
                debug!("preload fetch failed for {}: {}", task_source, e);
            }
        });
        handles.insert(source, handle);
    }

    /// Number of distinct locators fetched so far this session.
    pub fn fetch_count(&self) -> usize {
        self.handles.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::ports::FetchError;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFetcher {
        calls: AtomicUsize,
    }

    impl CountingFetcher {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PayloadFetcher for CountingFetcher {
        async fn fetch(&self, _source: &str) -> Result<(), FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn item(source: &str) -> ScheduleItem {
        let start = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        ScheduleItem::new(start, source.to_string())
    }

    fn preloader(fetcher: Arc<CountingFetcher>) -> Preloader {
        Preloader::new(fetcher, Arc::new(EventBus::new(16)))
    }

    #[tokio::test]
    async fn test_trigger_spawns_single_fetch() {
        let fetcher = Arc::new(CountingFetcher::new());
        let preloader = preloader(fetcher.clone());
        let mut item = item("a.mp3");

        preloader.trigger(&mut item);
        assert!(item.preload_triggered());
        assert_eq!(preloader.fetch_count(), 1);

        // Second trigger before any position change: no second fetch
        preloader.trigger(&mut item);
        assert_eq!(preloader.fetch_count(), 1);

        tokio::task::yield_now().await;
        assert!(fetcher.calls.load(Ordering::SeqCst) <= 1);
    }

    #[tokio::test]
    async fn test_locator_dedup_across_guard_reset() {
        let fetcher = Arc::new(CountingFetcher::new());
        let preloader = preloader(fetcher);
        let mut item = item("a.mp3");

        preloader.trigger(&mut item);

        // Position change clears the guard, but the locator was already
        // fetched this session
        item.preload_triggered = false;
        preloader.trigger(&mut item);

        assert!(item.preload_triggered());
        assert_eq!(preloader.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_item_not_preloaded() {
        let fetcher = Arc::new(CountingFetcher::new());
        let preloader = preloader(fetcher);
        let mut item = item("a.mp3");
        item.set_status(ItemStatus::Resolving);
        item.set_status(ItemStatus::Failed);

        preloader.trigger(&mut item);
        assert!(!item.preload_triggered());
        assert_eq!(preloader.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_locator_ignored() {
        let fetcher = Arc::new(CountingFetcher::new());
        let preloader = preloader(fetcher);
        let mut item = item("");

        preloader.trigger(&mut item);
        assert!(!item.preload_triggered());
        assert_eq!(preloader.fetch_count(), 0);
    }
}
