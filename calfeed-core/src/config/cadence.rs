//! How often a feed is re-synced.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::CalFeedError;

const HOUR: Duration = Duration::from_secs(60 * 60);

/// Interval between sync passes for one feed.
///
/// Accepts `hourly`, `twice-daily`, `daily`, or any humantime duration
/// such as `30m` or `6h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence(Duration);

impl Cadence {
    pub const HOURLY: Cadence = Cadence(HOUR);
    pub const TWICE_DAILY: Cadence = Cadence(Duration::from_secs(12 * 60 * 60));
    pub const DAILY: Cadence = Cadence(Duration::from_secs(24 * 60 * 60));

    pub fn interval(self) -> Duration {
        self.0
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Cadence::DAILY
    }
}

impl FromStr for Cadence {
    type Err = CalFeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cadence = match s.trim().to_lowercase().as_str() {
            "hourly" => Cadence::HOURLY,
            "twice-daily" | "twice daily" => Cadence::TWICE_DAILY,
            "daily" => Cadence::DAILY,
            other => {
                let interval = humantime::parse_duration(other).map_err(|e| {
                    CalFeedError::Config(format!("Invalid cadence '{s}': {e}"))
                })?;
                Cadence(interval)
            }
        };

        if cadence.0.is_zero() {
            return Err(CalFeedError::Config(format!("Invalid cadence '{s}': must be longer than zero")));
        }

        Ok(cadence)
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Cadence::HOURLY => f.write_str("hourly"),
            Cadence::TWICE_DAILY => f.write_str("twice-daily"),
            Cadence::DAILY => f.write_str("daily"),
            Cadence(interval) => write!(f, "every {}", humantime::format_duration(interval)),
        }
    }
}
