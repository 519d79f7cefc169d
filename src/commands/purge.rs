use anyhow::Result;
use calfeed_core::{CalfeedConfig, EventStore, FeedConfig, FileStore, PurgeScope, purge};
use owo_colors::OwoColorize;

pub async fn run(config: &CalfeedConfig, feeds: Vec<&FeedConfig>, future_only: bool) -> Result<()> {
    let store = FileStore::new(config.store_path());
    let categories: Vec<String> = feeds.iter().map(|f| f.category.clone()).collect();

    let scope = if future_only {
        PurgeScope::StartingFrom(chrono::Utc::now().naive_utc())
    } else {
        PurgeScope::All
    };

    let result = purge(&store, &categories, scope).await;

    for e in &result.errors {
        println!("   {}", e.to_string().red());
    }
    println!("Purged {} events from {}", result.deleted, categories.join(", "));

    // Anything left behind is reported, not retried
    for category in &categories {
        let remaining = store.list_events(category).await?.len();
        if remaining > 0 {
            println!("   {}", format!("{category}: {remaining} events kept").dimmed());
        }
    }

    if !result.errors.is_empty() {
        anyhow::bail!("{} events could not be purged", result.errors.len());
    }

    Ok(())
}
