use anyhow::Result;
use calfeed_core::FeedConfig;
use owo_colors::OwoColorize;

use super::Syncer;
use crate::render::{PlanRender, Render};
use crate::utils::tui;

pub async fn run(sync: &Syncer, feeds: Vec<&FeedConfig>, verbose: bool) -> Result<()> {
    for (i, feed) in feeds.iter().enumerate() {
        let spinner = tui::create_spinner(feed.render());
        let result = sync.plan_category(&feed.url, &feed.category).await;
        spinner.finish_and_clear();

        println!("{}", feed.render());

        match result {
            Ok(plan) => println!("{}", plan.render(verbose)),
            Err(e) => println!("   {}", e.to_string().red()),
        }

        if i < feeds.len() - 1 {
            println!();
        }
    }

    Ok(())
}
