use std::path::Path;

use anyhow::Result;
use calfeed_core::CalfeedConfig;
use owo_colors::OwoColorize;

use crate::render::Render;

pub fn run(config_path: &Path, config: &CalfeedConfig) -> Result<()> {
    println!("{}", "Paths".bold());
    println!("  Config:  {}", config_path.display());
    println!("  Store:   {}", config.store_path().display());

    println!("\n{}", "Feeds".bold());
    if config.feeds.is_empty() {
        println!("  {}", "None configured".dimmed());
    }
    for feed in &config.feeds {
        let cadence = feed
            .cadence()
            .map(|c| c.to_string())
            .unwrap_or_else(|_| feed.cadence.clone());
        println!("  {} {}", feed.render(), cadence.dimmed());
        println!("     {}", feed.url.dimmed());
    }

    println!("\n{}", "Effective config".bold());
    print!("{}", config.to_toml()?);

    Ok(())
}
