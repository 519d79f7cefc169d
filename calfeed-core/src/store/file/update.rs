//! Update event files in place.

use std::path::Path;

use super::create::write_atomic;
use super::ics;
use crate::error::{CalFeedError, CalFeedResult};
use crate::record::EventRecord;

/// Rewrite an existing event file with `record`, keeping its path and UID.
pub fn update(path: &Path, record: &EventRecord) -> CalFeedResult<()> {
    let content = std::fs::read_to_string(path)?;
    let existing = ics::read_ics(&content).ok_or_else(|| {
        CalFeedError::StoreWrite(format!("{} is not a readable event", path.display()))
    })?;

    write_atomic(path, &ics::generate_ics(&existing.uid, record))
}
