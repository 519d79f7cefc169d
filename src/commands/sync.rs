use anyhow::Result;
use calfeed_core::FeedConfig;

use super::Syncer;
use crate::render::Render;
use crate::utils::tui;

pub async fn run(sync: &Syncer, feeds: Vec<&FeedConfig>) -> Result<()> {
    let (mut created, mut updated, mut deleted) = (0, 0, 0);
    let mut failed = Vec::new();

    for (i, feed) in feeds.iter().enumerate() {
        let spinner = tui::create_spinner(feed.render());
        let result = sync.sync_category(&feed.url, &feed.category).await;
        spinner.finish_and_clear();

        println!("{}", feed.render());
        println!("{}", result.render());

        created += result.created;
        updated += result.updated;
        deleted += result.deleted;
        if result.failed() {
            failed.push(result.category);
        }

        if i < feeds.len() - 1 {
            println!();
        }
    }

    if created > 0 || updated > 0 || deleted > 0 {
        println!(
            "\nSynced: {} created, {} updated, {} deleted",
            created, updated, deleted
        );
    }

    if !failed.is_empty() {
        anyhow::bail!("Sync failed for: {}", failed.join(", "));
    }

    Ok(())
}
