//! Event store collaborator.
//!
//! The reconciler never touches storage directly; it goes through an
//! [`EventStore`]. Two implementations ship with the crate:
//! - [`MemoryStore`] keeps everything in a map (tests, embedding)
//! - [`FileStore`] keeps one `.ics` file per event under a directory per category

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::future::Future;

use crate::error::CalFeedResult;
use crate::record::{EventRecord, StoredEvent, StoredEventId};

/// Persistence for reconciled events, scoped by category.
///
/// Methods return `Send` futures so a scheduler can drive each category on
/// its own task. Implementations must persist a record's derived day-seconds,
/// category and location tag in the same write as the record itself.
pub trait EventStore: Send + Sync {
    /// All stored events for a category.
    ///
    /// Entries that can't be read back as complete records (e.g. missing
    /// start/end) are skipped, which keeps them out of reconciliation.
    fn list_events(
        &self,
        category: &str,
    ) -> impl Future<Output = CalFeedResult<Vec<StoredEvent>>> + Send;

    /// Persist a new event, returning its store-assigned id.
    fn create_event(
        &self,
        record: &EventRecord,
    ) -> impl Future<Output = CalFeedResult<StoredEventId>> + Send;

    /// Replace the stored record behind `id`.
    fn update_event(
        &self,
        id: &StoredEventId,
        record: &EventRecord,
    ) -> impl Future<Output = CalFeedResult<()>> + Send;

    fn delete_event(&self, id: &StoredEventId) -> impl Future<Output = CalFeedResult<()>> + Send;
}
