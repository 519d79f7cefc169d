//! Feed parsing.
//!
//! Feeds are treated as loosely structured text rather than strict RFC 5545:
//! only the handful of properties reconciliation needs are read, and a broken
//! event never takes the rest of the feed down with it.

mod datetime;
mod parse;
mod text;

pub use datetime::parse_datetime;
pub use parse::{ParsedFeed, parse_feed, parse_feed_report};
pub use text::{escape_text, unescape_text};
