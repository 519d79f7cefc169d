//! Delete event files.

use std::path::Path;

use crate::error::CalFeedResult;

pub fn delete(path: &Path) -> CalFeedResult<()> {
    std::fs::remove_file(path)?;
    Ok(())
}
