//! In-memory event store.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::{CalFeedError, CalFeedResult};
use crate::record::{EventRecord, StoredEvent, StoredEventId};
use crate::store::EventStore;

/// Event store backed by a map, keyed by generated UUIDs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    events: Mutex<BTreeMap<StoredEventId, EventRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored event across all categories.
    pub fn snapshot(&self) -> Vec<StoredEvent> {
        match self.events.lock() {
            Ok(events) => events
                .iter()
                .map(|(id, record)| StoredEvent {
                    id: id.clone(),
                    record: record.clone(),
                })
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> CalFeedResult<MutexGuard<'_, BTreeMap<StoredEventId, EventRecord>>> {
        self.events
            .lock()
            .map_err(|_| CalFeedError::StoreWrite("memory store lock poisoned".into()))
    }
}

impl EventStore for MemoryStore {
    async fn list_events(&self, category: &str) -> CalFeedResult<Vec<StoredEvent>> {
        let events = self.lock().map_err(|e| CalFeedError::StoreRead {
            category: category.to_string(),
            reason: e.to_string(),
        })?;

        Ok(events
            .iter()
            .filter(|(_, record)| record.category == category)
            .map(|(id, record)| StoredEvent {
                id: id.clone(),
                record: record.clone(),
            })
            .collect())
    }

    async fn create_event(&self, record: &EventRecord) -> CalFeedResult<StoredEventId> {
        let id = StoredEventId(uuid::Uuid::new_v4().to_string());
        self.lock()?.insert(id.clone(), record.clone());
        Ok(id)
    }

    async fn update_event(&self, id: &StoredEventId, record: &EventRecord) -> CalFeedResult<()> {
        let mut events = self.lock()?;
        let existing = events
            .get_mut(id)
            .ok_or_else(|| CalFeedError::StoreWrite(format!("no stored event with id {id}")))?;
        *existing = record.clone();
        Ok(())
    }

    async fn delete_event(&self, id: &StoredEventId) -> CalFeedResult<()> {
        self.lock()?
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| CalFeedError::StoreWrite(format!("no stored event with id {id}")))
    }
}
