//! Configuration at ~/.config/calfeed/config.toml

mod cadence;

pub use cadence::Cadence;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::error::{CalFeedError, CalFeedResult};
use crate::fetch::validate_feed_url;
use crate::reconcile::UpdatePolicy;

static DEFAULT_STORE_DIR: &str = "~/calfeed";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

fn default_store_dir() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_DIR)
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_cadence() -> String {
    "daily".into()
}

/// One feed to mirror into a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    pub category: String,
    pub url: String,
    #[serde(default = "default_cadence")]
    pub cadence: String,
}

impl FeedConfig {
    pub fn cadence(&self) -> CalFeedResult<Cadence> {
        self.cadence.parse()
    }
}

/// Global configuration.
///
/// Every setting can be overridden from the environment with a `CALFEED_`
/// prefix, e.g. `CALFEED_VERBOSE=true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalfeedConfig {
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,

    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub update_policy: UpdatePolicy,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub feeds: Vec<FeedConfig>,
}

impl Default for CalfeedConfig {
    fn default() -> Self {
        CalfeedConfig {
            store_dir: default_store_dir(),
            verbose: false,
            update_policy: UpdatePolicy::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            feeds: Vec::new(),
        }
    }
}

impl CalfeedConfig {
    pub fn config_path() -> CalFeedResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalFeedError::Config("Could not determine config directory".into()))?
            .join("calfeed");

        Ok(config_dir.join("config.toml"))
    }

    /// Load and validate the config at `path`, writing a commented default
    /// file first if none exists.
    pub fn load(path: &Path) -> CalFeedResult<Self> {
        if !path.exists() {
            Self::create_default_config(path)?;
        }

        let config: CalfeedConfig = config::Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("CALFEED").try_parsing(true))
            .build()
            .map_err(|e| CalFeedError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalFeedError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Parse and validate config from TOML text, without environment overrides.
    pub fn from_toml(content: &str) -> CalFeedResult<Self> {
        let config: CalfeedConfig = config::Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()
            .map_err(|e| CalFeedError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalFeedError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject empty or duplicate categories, bad URLs and bad cadences.
    pub fn validate(&self) -> CalFeedResult<()> {
        let mut categories = HashSet::new();

        for feed in &self.feeds {
            let category = feed.category.trim();
            if category.is_empty() {
                return Err(CalFeedError::Config(format!(
                    "Feed {} has an empty category",
                    feed.url
                )));
            }
            if !categories.insert(category.to_lowercase()) {
                return Err(CalFeedError::Config(format!(
                    "Category '{category}' is configured more than once"
                )));
            }
            validate_feed_url(&feed.url)?;
            feed.cadence()?;
        }

        if self.request_timeout_secs == 0 {
            return Err(CalFeedError::Config("request_timeout_secs must be positive".into()));
        }

        Ok(())
    }

    /// Look up a configured feed by category label.
    pub fn feed(&self, category: &str) -> CalFeedResult<&FeedConfig> {
        self.feeds
            .iter()
            .find(|f| f.category.eq_ignore_ascii_case(category.trim()))
            .ok_or_else(|| CalFeedError::UnknownCategory(category.to_string()))
    }

    /// Feeds to act on: the named ones, or every feed when none are named.
    pub fn select_feeds(&self, categories: &[String]) -> CalFeedResult<Vec<&FeedConfig>> {
        if categories.is_empty() {
            return Ok(self.feeds.iter().collect());
        }
        categories.iter().map(|c| self.feed(c)).collect()
    }

    pub fn store_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.store_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The effective config as TOML, defaults and overrides included.
    pub fn to_toml(&self) -> CalFeedResult<String> {
        toml::to_string_pretty(self).map_err(|e| CalFeedError::Config(e.to_string()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CalFeedResult<()> {
        let contents = format!(
            "\
# calfeed configuration

# Where stored events live:
# store_dir = \"{DEFAULT_STORE_DIR}\"

# Log every create/update/delete:
# verbose = false

# What to do when a matched event's details change:
# \"create-delete\" leaves it alone, \"update-in-place\" rewrites it
# update_policy = \"create-delete\"

# Seconds before a feed request gives up:
# request_timeout_secs = {DEFAULT_REQUEST_TIMEOUT_SECS}

# One block per feed. Cadence is hourly, twice-daily, daily or a duration like \"30m\".
# [[feeds]]
# category = \"Drop-in Swim\"
# url = \"https://example.edu/feed/dropinSwim.ics\"
# cadence = \"daily\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalFeedError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CalFeedError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
