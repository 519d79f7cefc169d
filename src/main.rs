mod commands;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use calfeed_core::CalfeedConfig;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "calfeed")]
#[command(about = "Mirror iCalendar feeds into a local event store, one category per feed")]
struct Cli {
    /// Config file (defaults to ~/.config/calfeed/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show every change as it is applied
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one sync pass over the configured feeds
    Sync {
        /// Only sync this category (repeatable)
        #[arg(short, long)]
        category: Vec<String>,
    },
    /// Show what a sync would change, without writing anything
    Status {
        /// Only check this category (repeatable)
        #[arg(short, long)]
        category: Vec<String>,
    },
    /// Keep syncing every feed on its cadence until Ctrl-C
    Watch {
        /// Only watch this category (repeatable)
        #[arg(short, long)]
        category: Vec<String>,
    },
    /// Delete stored events
    Purge {
        /// Only purge this category (repeatable)
        #[arg(short, long)]
        category: Vec<String>,

        /// Keep events that started before now
        #[arg(long)]
        future_only: bool,
    },
    /// Show config and store paths and the configured feeds
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => CalfeedConfig::config_path()?,
    };
    let config = CalfeedConfig::load(&config_path)?;
    let verbose = cli.verbose || config.verbose;

    init_tracing(verbose);

    match cli.command {
        Commands::Sync { category } => {
            let feeds = require_feeds(&config, &category)?;
            let sync = commands::build_sync(&config, verbose)?;
            commands::sync::run(&sync, feeds).await
        }
        Commands::Status { category } => {
            let feeds = require_feeds(&config, &category)?;
            let sync = commands::build_sync(&config, verbose)?;
            commands::status::run(&sync, feeds, verbose).await
        }
        Commands::Watch { category } => {
            let feeds = require_feeds(&config, &category)?
                .into_iter()
                .cloned()
                .collect();
            let sync = commands::build_sync(&config, verbose)?;
            commands::watch::run(sync, feeds).await
        }
        Commands::Purge {
            category,
            future_only,
        } => {
            let feeds = require_feeds(&config, &category)?;
            commands::purge::run(&config, feeds, future_only).await
        }
        Commands::Config => commands::config::run(&config_path, &config),
    }
}

/// Logs go to stderr so they don't interleave with command output.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "info" } else { "warn" };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn require_feeds<'a>(
    config: &'a CalfeedConfig,
    categories: &[String],
) -> Result<Vec<&'a calfeed_core::FeedConfig>> {
    if config.feeds.is_empty() {
        anyhow::bail!(
            "No feeds configured.\n\n\
            Add one to your config file:\n  \
            [[feeds]]\n  \
            category = \"Drop-in Swim\"\n  \
            url = \"https://example.edu/feed/dropinSwim.ics\"\n\n\
            Run `calfeed config` to see where the config file lives."
        );
    }

    match config.select_feeds(categories) {
        Ok(feeds) => Ok(feeds),
        Err(e) => {
            let available: Vec<_> = config.feeds.iter().map(|f| f.category.as_str()).collect();
            anyhow::bail!("{e}. Available: {}", available.join(", "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "calfeed",
            "sync",
            "-c",
            "Drop-in Swim",
            "-c",
            "Climbing Wall",
            "--verbose",
            "--config",
            "/tmp/calfeed.toml",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/calfeed.toml")));
        match cli.command {
            Commands::Sync { category } => assert_eq!(category, ["Drop-in Swim", "Climbing Wall"]),
            _ => panic!("expected sync"),
        }
    }

    #[test]
    fn test_purge_future_only_flag() {
        let cli = Cli::try_parse_from(["calfeed", "purge", "--future-only"]).unwrap();

        assert!(matches!(
            cli.command,
            Commands::Purge { future_only: true, ref category } if category.is_empty()
        ));
    }

    #[test]
    fn test_unknown_category_lists_available() {
        let config = CalfeedConfig::from_toml(
            "[[feeds]]\ncategory = \"Drop-in Swim\"\nurl = \"https://example.edu/a.ics\"\n",
        )
        .unwrap();

        let err = require_feeds(&config, &["Facility Hours".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Available: Drop-in Swim"));

        let empty = CalfeedConfig::default();
        assert!(require_feeds(&empty, &[]).is_err());
    }
}
