//! Line-oriented VEVENT parsing.

use chrono::NaiveDateTime;
use icalendar::parser::unfold;

use crate::error::{CalFeedError, CalFeedResult};
use crate::feed::{parse_datetime, unescape_text};
use crate::record::EventRecord;

const EVENT_BEGIN: &str = "BEGIN:VEVENT";

/// Result of parsing a feed: the events that survived plus why the rest were dropped.
#[derive(Debug, Default)]
pub struct ParsedFeed {
    pub records: Vec<EventRecord>,
    pub rejected: Vec<CalFeedError>,
}

/// Parse feed text into event records for `category`.
///
/// Events that can't be parsed are logged and left out; see
/// [`parse_feed_report`] to get the reasons back.
pub fn parse_feed(raw: &str, category: &str) -> Vec<EventRecord> {
    parse_feed_report(raw, category).records
}

/// Parse feed text, keeping the per-event errors alongside the records.
///
/// Records come back in feed order and are not deduplicated.
pub fn parse_feed_report(raw: &str, category: &str) -> ParsedFeed {
    let unfolded = unfold(raw.trim_start_matches('\u{feff}'));
    let mut parsed = ParsedFeed::default();

    // Everything before the first BEGIN:VEVENT is calendar preamble
    for (index, block) in unfolded.split(EVENT_BEGIN).skip(1).enumerate() {
        match parse_block(block, category) {
            Ok(record) => parsed.records.push(record),
            Err(e) => {
                tracing::warn!(category, event = index + 1, "{e}");
                parsed.rejected.push(e);
            }
        }
    }

    parsed
}

/// Property values collected from one VEVENT block.
#[derive(Default)]
struct RawEvent<'a> {
    summary: Option<&'a str>,
    description: Option<&'a str>,
    location: Option<&'a str>,
    uid: Option<&'a str>,
    dtstart: Option<&'a str>,
    dtend: Option<&'a str>,
}

fn parse_block(block: &str, category: &str) -> CalFeedResult<EventRecord> {
    let mut raw = RawEvent::default();
    // Nesting depth of sub-components (VALARM etc.) inside the event
    let mut depth = 0usize;

    for line in block.lines() {
        let Some((name, value)) = line.split_once(':') else {
            if !line.trim().is_empty() {
                tracing::debug!(category, line, "ignoring feed line without a property separator");
            }
            continue;
        };

        // Drop parameters: DTSTART;TZID=America/Denver -> DTSTART
        let name = name.split(';').next().unwrap_or(name);

        match name {
            "BEGIN" => depth += 1,
            "END" if depth == 0 => break,
            "END" => depth -= 1,
            _ if depth > 0 => {}
            "SUMMARY" => raw.summary = Some(value),
            // Some generators repeat DESCRIPTION (e.g. a localized copy); the first one wins
            "DESCRIPTION" => {
                if raw.description.is_none() {
                    raw.description = Some(value);
                }
            }
            "LOCATION" => raw.location = Some(value),
            "UID" => raw.uid = Some(value),
            "DTSTART" => raw.dtstart = Some(value),
            "DTEND" => raw.dtend = Some(value),
            _ => {}
        }
    }

    raw.into_record(category)
}

impl RawEvent<'_> {
    fn into_record(self, category: &str) -> CalFeedResult<EventRecord> {
        let title = self
            .summary
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| CalFeedError::Parse(format!("{} has no SUMMARY", self.label())))?;
        let start = self.datetime("DTSTART", self.dtstart)?;
        let end = self.datetime("DTEND", self.dtend)?;

        Ok(EventRecord {
            title: unescape_text(title),
            description: non_empty(self.description).map(|v| unescape_text(&v)),
            location: non_empty(self.location).map(|v| unescape_text(&v)),
            start,
            end,
            uid: non_empty(self.uid),
            category: category.to_string(),
        })
    }

    fn datetime(&self, property: &str, value: Option<&str>) -> CalFeedResult<NaiveDateTime> {
        let value = value
            .ok_or_else(|| CalFeedError::Parse(format!("{} has no {property}", self.label())))?;

        parse_datetime(value).ok_or_else(|| {
            CalFeedError::Parse(format!(
                "{} has an unreadable {property} '{}'",
                self.label(),
                value.trim()
            ))
        })
    }

    /// Human-readable name for log messages.
    fn label(&self) -> String {
        match (self.summary, self.uid) {
            (Some(summary), _) if !summary.trim().is_empty() => format!("event '{}'", summary),
            (_, Some(uid)) => format!("event with UID {}", uid),
            _ => "event".to_string(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.to_string())
}
