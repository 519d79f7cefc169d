//! File-backed event store.
//!
//! Layout: `<root>/<category-slug>/<YYYY-MM-DDTHHMM>__<title-slug>.ics`, one
//! VEVENT per file. The stored event id is the path relative to `root`.

mod create;
mod delete;
mod ics;
mod list;
mod update;

use std::path::{Component, Path, PathBuf};

use crate::error::{CalFeedError, CalFeedResult};
use crate::record::{EventRecord, StoredEvent, StoredEventId};
use crate::store::EventStore;

/// Directory name used when a category label has no sluggable characters.
const FALLBACK_CATEGORY_DIR: &str = "uncategorized";

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileStore { root: root.into() }
    }

    /// Directory holding a category's event files.
    pub fn category_dir(&self, category: &str) -> PathBuf {
        self.root.join(category_slug(category))
    }

    /// Resolve an id to a path, refusing anything that would escape the store root.
    fn path_for(&self, id: &StoredEventId) -> CalFeedResult<PathBuf> {
        let relative = Path::new(id.as_str());
        let is_contained = relative.components().count() == 2
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));

        if !is_contained {
            return Err(CalFeedError::StoreWrite(format!("invalid stored event id '{id}'")));
        }

        Ok(self.root.join(relative))
    }

    fn id_for(&self, path: &Path) -> StoredEventId {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let parts: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        StoredEventId(parts.join("/"))
    }
}

fn category_slug(category: &str) -> String {
    let slug = slug::slugify(category);
    if slug.is_empty() {
        FALLBACK_CATEGORY_DIR.to_string()
    } else {
        slug
    }
}

impl EventStore for FileStore {
    async fn list_events(&self, category: &str) -> CalFeedResult<Vec<StoredEvent>> {
        let dir = self.category_dir(category);
        let events = list::list(&dir, category).map_err(|e| CalFeedError::StoreRead {
            category: category.to_string(),
            reason: e.to_string(),
        })?;

        Ok(events
            .into_iter()
            .map(|(path, record)| StoredEvent {
                id: self.id_for(&path),
                record,
            })
            .collect())
    }

    async fn create_event(&self, record: &EventRecord) -> CalFeedResult<StoredEventId> {
        let dir = self.category_dir(&record.category);
        let path = create::create(&dir, record)
            .map_err(|e| CalFeedError::StoreWrite(format!("create '{}': {e}", record.title)))?;
        Ok(self.id_for(&path))
    }

    async fn update_event(&self, id: &StoredEventId, record: &EventRecord) -> CalFeedResult<()> {
        let path = self.path_for(id)?;
        update::update(&path, record)
            .map_err(|e| CalFeedError::StoreWrite(format!("update {id}: {e}")))
    }

    async fn delete_event(&self, id: &StoredEventId) -> CalFeedResult<()> {
        let path = self.path_for(id)?;
        delete::delete(&path).map_err(|e| CalFeedError::StoreWrite(format!("delete {id}: {e}")))
    }
}
