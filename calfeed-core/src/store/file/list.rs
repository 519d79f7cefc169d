//! List events from a category directory.

use std::path::{Path, PathBuf};

use super::ics;
use crate::error::CalFeedResult;
use crate::record::EventRecord;

/// List the readable event files in `dir` that belong to `category`.
///
/// Files that can't be read as UTF-8 text, or don't parse into a complete
/// record, are skipped with a warning.
/// Results are sorted by path so listings are stable between runs.
pub fn list(dir: &Path, category: &str) -> CalFeedResult<Vec<(PathBuf, EventRecord)>> {
    let mut events = Vec::new();

    if !dir.exists() {
        return Ok(events);
    }

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().map(|e| e != "ics").unwrap_or(true) {
            continue;
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %path.display(), "skipping unreadable stored event: {e}");
                continue;
            }
        };
        let Some(stored) = ics::read_ics(&content) else {
            tracing::warn!(path = %path.display(), "skipping unreadable stored event");
            continue;
        };

        // Distinct labels can share a directory slug
        if stored.record.category == category {
            events.push((path, stored.record));
        }
    }

    events.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(events)
}
