//! Sync orchestration.
//!
//! One [`FeedSync::sync_category`] call is one pass for one feed/category
//! pair: fetch, parse, list what the store holds, reconcile, apply. Calls for
//! different categories are independent; calls for the same category must be
//! serialized by the caller.

use chrono::NaiveDateTime;

use crate::error::{CalFeedError, CalFeedResult};
use crate::feed::{ParsedFeed, parse_feed_report};
use crate::fetch::{FeedFetcher, validate_feed_url};
use crate::reconcile::{DiffKind, ReconcilePlan, UpdatePolicy, reconcile};
use crate::record::{EventRecord, StoredEvent};
use crate::store::EventStore;

/// Knobs for a sync pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Log every planned change at info level instead of debug
    pub verbose: bool,
    pub update_policy: UpdatePolicy,
}

/// Outcome of one category pass.
#[derive(Debug, Default)]
pub struct SyncResult {
    pub category: String,
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    /// Feed events dropped because they couldn't be parsed
    pub dropped: usize,
    pub errors: Vec<CalFeedError>,
}

impl SyncResult {
    fn new(category: &str) -> Self {
        SyncResult {
            category: category.to_string(),
            ..Default::default()
        }
    }

    /// Whether the pass was aborted before touching the store.
    pub fn failed(&self) -> bool {
        self.errors.iter().any(CalFeedError::is_fatal)
    }

    pub fn has_changes(&self) -> bool {
        self.created > 0 || self.updated > 0 || self.deleted > 0
    }
}

/// Drives sync passes against a fetcher and a store.
pub struct FeedSync<F, S> {
    fetcher: F,
    store: S,
    options: SyncOptions,
}

impl<F: FeedFetcher, S: EventStore> FeedSync<F, S> {
    pub fn new(fetcher: F, store: S, options: SyncOptions) -> Self {
        FeedSync {
            fetcher,
            store,
            options,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one full pass for a category.
    ///
    /// Config, fetch and store-listing failures abort the pass with the store
    /// untouched. Unparseable feed events and failed store writes are logged,
    /// recorded in the result and skipped.
    pub async fn sync_category(&self, feed_url: &str, category: &str) -> SyncResult {
        let mut result = SyncResult::new(category);

        let (parsed, stored) = match self.load(feed_url, category).await {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::error!(category, "{e}");
                result.errors.push(e);
                return result;
            }
        };

        result.dropped = parsed.rejected.len();
        result.errors.extend(parsed.rejected);

        let plan = reconcile(&parsed.records, &stored, self.options.update_policy);
        let (creates, updates, deletes) = plan.counts();
        tracing::debug!(
            category,
            feed_events = parsed.records.len(),
            stored_events = stored.len(),
            creates,
            updates,
            deletes,
            "reconciled"
        );

        self.apply(&plan, &mut result).await;

        tracing::info!(
            category,
            created = result.created,
            updated = result.updated,
            deleted = result.deleted,
            dropped = result.dropped,
            "sync finished"
        );

        result
    }

    /// Compute what a pass would do without writing anything.
    pub async fn plan_category(&self, feed_url: &str, category: &str) -> CalFeedResult<ReconcilePlan> {
        let (parsed, stored) = self.load(feed_url, category).await?;
        Ok(reconcile(&parsed.records, &stored, self.options.update_policy))
    }

    async fn load(
        &self,
        feed_url: &str,
        category: &str,
    ) -> CalFeedResult<(ParsedFeed, Vec<StoredEvent>)> {
        validate_category(category)?;
        validate_feed_url(feed_url)?;

        let raw = self.fetcher.fetch_text(feed_url).await?;
        let parsed = parse_feed_report(&String::from_utf8_lossy(&raw), category);
        let stored = self.store.list_events(category).await?;

        Ok((parsed, stored))
    }

    async fn apply(&self, plan: &ReconcilePlan, result: &mut SyncResult) {
        for record in &plan.to_create {
            self.log_change(DiffKind::Create, record);
            match self.store.create_event(record).await {
                Ok(_) => result.created += 1,
                Err(e) => self.record_write_error(result, record, e),
            }
        }

        for (existing, record) in &plan.to_update {
            self.log_change(DiffKind::Update, record);
            match self.store.update_event(&existing.id, record).await {
                Ok(()) => result.updated += 1,
                Err(e) => self.record_write_error(result, record, e),
            }
        }

        for existing in &plan.to_delete {
            self.log_change(DiffKind::Delete, &existing.record);
            match self.store.delete_event(&existing.id).await {
                Ok(()) => result.deleted += 1,
                Err(e) => self.record_write_error(result, &existing.record, e),
            }
        }
    }

    fn log_change(&self, kind: DiffKind, record: &EventRecord) {
        if self.options.verbose {
            tracing::info!(category = %record.category, "{kind} {record}");
        } else {
            tracing::debug!(category = %record.category, "{kind} {record}");
        }
    }

    fn record_write_error(&self, result: &mut SyncResult, record: &EventRecord, e: CalFeedError) {
        tracing::warn!(category = %record.category, event = %record, "{e}");
        let e = match e {
            CalFeedError::StoreWrite(_) => e,
            other => CalFeedError::StoreWrite(other.to_string()),
        };
        result.errors.push(e);
    }
}

fn validate_category(category: &str) -> CalFeedResult<()> {
    if category.trim().is_empty() {
        return Err(CalFeedError::Config("category label must not be empty".into()));
    }
    Ok(())
}

/// Which stored events a purge removes.
#[derive(Debug, Clone, Copy)]
pub enum PurgeScope {
    All,
    /// Only events starting at or after this time
    StartingFrom(NaiveDateTime),
}

#[derive(Debug, Default)]
pub struct PurgeResult {
    pub deleted: usize,
    pub errors: Vec<CalFeedError>,
}

/// Delete stored events of the given categories, continuing past failures.
pub async fn purge<S: EventStore>(store: &S, categories: &[String], scope: PurgeScope) -> PurgeResult {
    let mut result = PurgeResult::default();

    for category in categories {
        let events = match store.list_events(category).await {
            Ok(events) => events,
            Err(e) => {
                tracing::error!(category = %category, "{e}");
                result.errors.push(e);
                continue;
            }
        };

        let doomed = events.iter().filter(|e| match scope {
            PurgeScope::All => true,
            PurgeScope::StartingFrom(cutoff) => e.record.start >= cutoff,
        });

        for event in doomed {
            match store.delete_event(&event.id).await {
                Ok(()) => result.deleted += 1,
                Err(e) => {
                    tracing::warn!(category = %category, event = %event, "{e}");
                    result.errors.push(e);
                }
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::StoredEventId;
    use crate::record::tests::record;
    use crate::store::{FileStore, MemoryStore};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SWIM_URL: &str = "https://example.edu/feed/dropinSwim.ics";
    const CLIMB_URL: &str = "https://example.edu/feed/climbingWall.ics";

    /// Serves feed text from a map; unknown URLs fail like a 404.
    #[derive(Default)]
    struct StaticFetcher {
        feeds: Mutex<HashMap<String, String>>,
        calls: AtomicUsize,
    }

    impl StaticFetcher {
        fn serve(&self, url: &str, text: String) {
            self.feeds.lock().unwrap().insert(url.to_string(), text);
        }
    }

    impl FeedFetcher for StaticFetcher {
        async fn fetch_text(&self, url: &str) -> CalFeedResult<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let text = self.feeds.lock().unwrap().get(url).cloned();
            text.map(String::into_bytes).ok_or_else(|| CalFeedError::Fetch {
                url: url.to_string(),
                reason: "404 Not Found".into(),
            })
        }
    }

    /// Memory store that refuses to create events with a given title.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        reject_title: String,
    }

    impl EventStore for FlakyStore {
        async fn list_events(&self, category: &str) -> CalFeedResult<Vec<StoredEvent>> {
            self.inner.list_events(category).await
        }

        async fn create_event(&self, record: &EventRecord) -> CalFeedResult<StoredEventId> {
            if record.title == self.reject_title {
                return Err(CalFeedError::StoreWrite("disk full".into()));
            }
            self.inner.create_event(record).await
        }

        async fn update_event(&self, id: &StoredEventId, record: &EventRecord) -> CalFeedResult<()> {
            self.inner.update_event(id, record).await
        }

        async fn delete_event(&self, id: &StoredEventId) -> CalFeedResult<()> {
            self.inner.delete_event(id).await
        }
    }

    /// (summary, dtstart, dtend, description)
    fn feed(events: &[(&str, &str, &str, &str)]) -> String {
        let mut ics = String::from("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:TEST\r\n");
        for (i, (summary, start, end, description)) in events.iter().enumerate() {
            ics.push_str(&format!(
                "BEGIN:VEVENT\r\nUID:{}-{}\r\nSUMMARY:{summary}\r\nDTSTART:{start}\r\nDTEND:{end}\r\nDESCRIPTION:{description}\r\nEND:VEVENT\r\n",
                uuid::Uuid::new_v4(),
                i
            ));
        }
        ics.push_str("END:VCALENDAR\r\n");
        ics
    }

    fn swim_feed() -> String {
        feed(&[
            ("Open Swim", "20240101T090000", "20240101T100000", "Come swim"),
            ("Lap Swim", "20240101T060000", "20240101T080000", "Lanes 1-6"),
        ])
    }

    #[tokio::test]
    async fn test_second_pass_on_unchanged_feed_is_a_no_op() {
        let fetcher = StaticFetcher::default();
        fetcher.serve(SWIM_URL, swim_feed());
        let sync = FeedSync::new(fetcher, MemoryStore::new(), SyncOptions::default());

        let first = sync.sync_category(SWIM_URL, "Drop-in Swim").await;
        assert_eq!(first.category, "Drop-in Swim");
        assert_eq!((first.created, first.deleted), (2, 0));
        assert!(!first.failed());

        // Same feed, freshly generated UIDs
        sync.fetcher.serve(SWIM_URL, swim_feed());
        let second = sync.sync_category(SWIM_URL, "Drop-in Swim").await;
        assert_eq!((second.created, second.deleted), (0, 0));
        assert!(!second.has_changes());
        assert_eq!(sync.store().len(), 2);
    }

    #[tokio::test]
    async fn test_stale_events_deleted_only_within_category() {
        let fetcher = StaticFetcher::default();
        fetcher.serve(SWIM_URL, swim_feed());
        fetcher.serve(
            CLIMB_URL,
            feed(&[("Bouldering", "20240105T180000", "20240105T200000", "Chalk up")]),
        );
        let sync = FeedSync::new(fetcher, MemoryStore::new(), SyncOptions::default());
        sync.sync_category(SWIM_URL, "Drop-in Swim").await;
        sync.sync_category(CLIMB_URL, "Climbing Wall").await;

        // Lap Swim disappears from the swim feed
        sync.fetcher.serve(
            SWIM_URL,
            feed(&[("Open Swim", "20240101T090000", "20240101T100000", "Come swim")]),
        );
        let result = sync.sync_category(SWIM_URL, "Drop-in Swim").await;

        assert_eq!((result.created, result.deleted), (0, 1));
        let swim = sync.store().list_events("Drop-in Swim").await.unwrap();
        assert_eq!(swim.len(), 1);
        assert_eq!(swim[0].record.title, "Open Swim");
        assert_eq!(sync.store().list_events("Climbing Wall").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_store_untouched() {
        let sync = FeedSync::new(StaticFetcher::default(), MemoryStore::new(), SyncOptions::default());
        sync.store()
            .create_event(&record("Open Swim", "Drop-in Swim", 1, 9))
            .await
            .unwrap();

        let result = sync.sync_category(SWIM_URL, "Drop-in Swim").await;

        assert!(result.failed());
        assert!(matches!(result.errors[0], CalFeedError::Fetch { .. }));
        assert_eq!(result.deleted, 0);
        assert_eq!(sync.store().len(), 1);
    }

    #[tokio::test]
    async fn test_config_errors_stop_before_fetching() {
        let sync = FeedSync::new(StaticFetcher::default(), MemoryStore::new(), SyncOptions::default());

        let bad_url = sync.sync_category("not a url", "Drop-in Swim").await;
        assert!(bad_url.failed());
        assert!(matches!(bad_url.errors[0], CalFeedError::InvalidUrl { .. }));

        let no_category = sync.sync_category(SWIM_URL, "  ").await;
        assert!(no_category.failed());
        assert!(matches!(no_category.errors[0], CalFeedError::Config(_)));

        assert_eq!(sync.fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_create_does_not_stop_the_batch() {
        let fetcher = StaticFetcher::default();
        fetcher.serve(
            SWIM_URL,
            feed(&[
                ("Broken", "20240101T070000", "20240101T080000", "x"),
                ("Open Swim", "20240101T090000", "20240101T100000", "Come swim"),
            ]),
        );
        let store = FlakyStore {
            reject_title: "Broken".into(),
            ..Default::default()
        };
        store
            .inner
            .create_event(&record("Old Swim", "Drop-in Swim", 1, 12))
            .await
            .unwrap();
        let sync = FeedSync::new(fetcher, store, SyncOptions::default());

        let result = sync.sync_category(SWIM_URL, "Drop-in Swim").await;

        assert!(!result.failed());
        assert_eq!((result.created, result.deleted), (1, 1));
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(result.errors[0], CalFeedError::StoreWrite(_)));
    }

    #[tokio::test]
    async fn test_unparseable_events_are_counted_and_skipped() {
        let fetcher = StaticFetcher::default();
        fetcher.serve(
            SWIM_URL,
            feed(&[
                ("Open Swim", "20240101T090000", "20240101T100000", "Come swim"),
                ("Mystery Swim", "", "20240101T100000", "No start"),
            ]),
        );
        let sync = FeedSync::new(fetcher, MemoryStore::new(), SyncOptions::default());

        let result = sync.sync_category(SWIM_URL, "Drop-in Swim").await;

        assert!(!result.failed());
        assert_eq!(result.created, 1);
        assert_eq!(result.dropped, 1);
        assert!(matches!(result.errors[0], CalFeedError::Parse(_)));
    }

    #[tokio::test]
    async fn test_update_in_place_policy_rewrites_details() {
        let fetcher = StaticFetcher::default();
        fetcher.serve(SWIM_URL, swim_feed());
        let options = SyncOptions {
            update_policy: UpdatePolicy::UpdateInPlace,
            ..Default::default()
        };
        let sync = FeedSync::new(fetcher, MemoryStore::new(), options);
        sync.sync_category(SWIM_URL, "Drop-in Swim").await;

        sync.fetcher.serve(
            SWIM_URL,
            feed(&[
                ("Open Swim", "20240101T090000", "20240101T100000", "Outdoor pool today"),
                ("Lap Swim", "20240101T060000", "20240101T080000", "Lanes 1-6"),
            ]),
        );
        let result = sync.sync_category(SWIM_URL, "Drop-in Swim").await;

        assert_eq!((result.created, result.updated, result.deleted), (0, 1, 0));
        let open_swim = sync
            .store()
            .snapshot()
            .into_iter()
            .find(|e| e.record.title == "Open Swim")
            .unwrap();
        assert_eq!(open_swim.record.description.as_deref(), Some("Outdoor pool today"));
    }

    #[tokio::test]
    async fn test_plan_category_does_not_write() {
        let fetcher = StaticFetcher::default();
        fetcher.serve(SWIM_URL, swim_feed());
        let sync = FeedSync::new(fetcher, MemoryStore::new(), SyncOptions::default());

        let plan = sync.plan_category(SWIM_URL, "Drop-in Swim").await.unwrap();

        assert_eq!(plan.counts(), (2, 0, 0));
        assert!(sync.store().is_empty());
    }

    #[tokio::test]
    async fn test_file_store_sync_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = StaticFetcher::default();
        fetcher.serve(SWIM_URL, swim_feed());
        let sync = FeedSync::new(fetcher, FileStore::new(dir.path()), SyncOptions::default());

        let first = sync.sync_category(SWIM_URL, "Drop-in Swim").await;
        sync.fetcher.serve(SWIM_URL, swim_feed());
        let second = sync.sync_category(SWIM_URL, "Drop-in Swim").await;

        assert_eq!(first.created, 2);
        assert!(!second.has_changes());
        assert!(second.errors.is_empty());
    }

    #[tokio::test]
    async fn test_date_only_natural_language_feed_is_stable() {
        let fetcher = StaticFetcher::default();
        fetcher.serve(
            SWIM_URL,
            feed(&[("Pool Closed", "1/2/2024", "1/3/2024", "Holiday")]),
        );
        let sync = FeedSync::new(fetcher, MemoryStore::new(), SyncOptions::default());

        let first = sync.sync_category(SWIM_URL, "Drop-in Swim").await;
        let second = sync.sync_category(SWIM_URL, "Drop-in Swim").await;

        assert_eq!(first.created, 1);
        assert_eq!((second.created, second.deleted), (0, 0));
        let stored = sync.store().snapshot();
        assert_eq!(stored[0].record.start.to_string(), "2024-01-02 00:00:00");
        assert_eq!(stored[0].record.end.to_string(), "2024-01-03 00:00:00");
    }

    #[tokio::test]
    async fn test_escaped_text_is_stable_in_file_store_under_update_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = StaticFetcher::default();
        fetcher.serve(
            SWIM_URL,
            "BEGIN:VCALENDAR\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:Yoga\\, Level 1\r\n\
DTSTART:20240108T120000\r\n\
DTEND:20240108T130000\r\n\
DESCRIPTION:Bring a mat\\nBlocks provided\r\n\
LOCATION:Rec Center\\, 951 Meridian\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n"
                .to_string(),
        );
        let options = SyncOptions {
            update_policy: UpdatePolicy::UpdateInPlace,
            ..Default::default()
        };
        let sync = FeedSync::new(fetcher, FileStore::new(dir.path()), options);

        let first = sync.sync_category(SWIM_URL, "Group Fitness").await;
        let second = sync.sync_category(SWIM_URL, "Group Fitness").await;

        assert_eq!(first.created, 1);
        assert_eq!((second.created, second.updated, second.deleted), (0, 0, 0));

        let stored = sync.store().list_events("Group Fitness").await.unwrap();
        assert_eq!(stored[0].record.title, "Yoga, Level 1");
        assert_eq!(stored[0].record.location.as_deref(), Some("Rec Center, 951 Meridian"));
        assert_eq!(stored[0].record.description.as_deref(), Some("Bring a mat\nBlocks provided"));
    }

    #[tokio::test]
    async fn test_purge_scopes() {
        let store = MemoryStore::new();
        store.create_event(&record("Past Swim", "Drop-in Swim", 1, 9)).await.unwrap();
        store.create_event(&record("Future Swim", "Drop-in Swim", 20, 9)).await.unwrap();
        store.create_event(&record("Bouldering", "Climbing Wall", 20, 18)).await.unwrap();

        let cutoff = record("", "", 10, 0).start;
        let result = purge(&store, &["Drop-in Swim".to_string()], PurgeScope::StartingFrom(cutoff)).await;
        assert_eq!(result.deleted, 1);
        assert_eq!(store.len(), 2);

        let result = purge(
            &store,
            &["Drop-in Swim".to_string(), "Climbing Wall".to_string()],
            PurgeScope::All,
        )
        .await;
        assert_eq!(result.deleted, 2);
        assert!(result.errors.is_empty());
        assert!(store.is_empty());
    }
}
