pub mod config;
pub mod purge;
pub mod status;
pub mod sync;
pub mod watch;

use anyhow::Result;
use calfeed_core::{CalfeedConfig, FeedSync, FileStore, HttpFetcher, SyncOptions};

/// The sync engine every command runs: HTTP feeds into the file store.
pub type Syncer = FeedSync<HttpFetcher, FileStore>;

pub fn build_sync(config: &CalfeedConfig, verbose: bool) -> Result<Syncer> {
    let fetcher = HttpFetcher::new(config.request_timeout())?;
    let store = FileStore::new(config.store_path());
    let options = SyncOptions {
        verbose,
        update_policy: config.update_policy,
    };

    Ok(FeedSync::new(fetcher, store, options))
}
