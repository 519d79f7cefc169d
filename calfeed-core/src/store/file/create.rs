//! Create event files in a category directory.

use std::path::{Path, PathBuf};

use super::ics;
use crate::error::{CalFeedError, CalFeedResult};
use crate::record::EventRecord;

/// Longest title slug used in a filename.
const MAX_SLUG_LEN: usize = 50;

/// Write a new event file for `record` and return its path.
///
/// The filename is built from the start time and title, with -2, -3, ...
/// suffixes when another event already occupies it.
pub fn create(dir: &Path, record: &EventRecord) -> CalFeedResult<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let uid = uuid::Uuid::new_v4().to_string();
    let content = ics::generate_ics(&uid, record);
    let path = dir.join(unique_filename(&base_filename(record), dir)?);

    write_atomic(&path, &content)?;

    Ok(path)
}

/// Write via a temp file and rename so a reader never sees half an event.
pub fn write_atomic(path: &Path, content: &str) -> CalFeedResult<()> {
    let temp_path = path.with_extension("ics.tmp");
    std::fs::write(&temp_path, content)?;
    std::fs::rename(&temp_path, path)?;
    Ok(())
}

/// Base filename for a record (without collision suffix).
fn base_filename(record: &EventRecord) -> String {
    let mut slug: String = slug::slugify(&record.title)
        .chars()
        .take(MAX_SLUG_LEN)
        .collect();
    if slug.is_empty() {
        slug.push_str("event");
    }

    format!("{}__{}.ics", record.start.format("%Y-%m-%dT%H%M"), slug.trim_end_matches('-'))
}

/// Find an unused filename, adding -2, -3, etc. on collision.
fn unique_filename(base_filename: &str, dir: &Path) -> CalFeedResult<String> {
    if !dir.join(base_filename).exists() {
        return Ok(base_filename.to_string());
    }

    let base = base_filename.trim_end_matches(".ics");
    for n in 2..=100 {
        let suffixed = format!("{}-{}.ics", base, n);
        if !dir.join(&suffixed).exists() {
            return Ok(suffixed);
        }
    }

    Err(CalFeedError::StoreWrite(format!(
        "too many filename collisions for {}",
        base_filename
    )))
}
