use std::sync::Arc;

use anyhow::Result;
use calfeed_core::FeedConfig;
use owo_colors::OwoColorize;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;

use super::Syncer;
use crate::render::{Render, SummaryRender};

/// Sync each feed on its own cadence until Ctrl-C.
///
/// Every category gets one task, so passes for the same category never
/// overlap while different categories run independently.
pub async fn run(sync: Syncer, feeds: Vec<FeedConfig>) -> Result<()> {
    let sync = Arc::new(sync);
    let mut tasks: JoinSet<()> = JoinSet::new();

    for feed in feeds {
        let cadence = feed.cadence()?;
        let sync = Arc::clone(&sync);

        println!("{} {}", feed.render(), cadence.to_string().dimmed());

        tasks.spawn(async move {
            let mut ticker = tokio::time::interval(cadence.interval());
            // A slow pass pushes the next one back instead of bunching them up
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let result = sync.sync_category(&feed.url, &feed.category).await;
                println!("{} {}", feed.render(), result.render_summary());
            }
        });
    }

    println!("\n{}", "Watching feeds. Press Ctrl-C to stop.".dimmed());

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    tasks.shutdown().await;

    Ok(())
}
