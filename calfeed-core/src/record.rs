//! Normalized event records.
//!
//! An [`EventRecord`] is what both sides of a reconciliation look like: the
//! feed parser produces them and stores hand them back (wrapped in a
//! [`StoredEvent`]) so the two can be compared by signature.

use std::fmt;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Canonical UTC-naive timestamp format used for display and signatures.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A calendar event normalized from a feed or read back from a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Feed-native UID. Regenerated by some feed exporters on every export,
    /// so it is kept for debugging only and never used for identity.
    pub uid: Option<String>,
    /// Category label the record belongs to (supplied by the caller, not the feed)
    pub category: String,
}

impl EventRecord {
    /// Seconds since midnight of `start`.
    pub fn start_seconds(&self) -> u32 {
        self.start.num_seconds_from_midnight()
    }

    /// Seconds since midnight of `end`.
    pub fn end_seconds(&self) -> u32 {
        self.end.num_seconds_from_midnight()
    }

    /// Location name used as a tag: the part of `location` before the first
    /// comma, sanitized and title-cased ("student rec center, 951 Meridian"
    /// becomes "Student Rec Center").
    pub fn location_tag(&self) -> Option<String> {
        let location = self.location.as_deref()?;
        let name = location.split(',').next().unwrap_or_default().trim();
        let sanitized = slug::slugify(name);
        if sanitized.is_empty() {
            return None;
        }

        let words: Vec<String> = sanitized
            .split('-')
            .filter(|w| !w.is_empty())
            .map(capitalize)
            .collect();
        Some(words.join(" "))
    }

    /// Whether the fields an update can change differ from `other`.
    ///
    /// Start and end are part of the signature, so two records that share a
    /// signature can only differ in title text, description or location.
    pub fn details_differ(&self, other: &EventRecord) -> bool {
        self.title != other.title
            || self.description != other.description
            || self.location != other.location
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} - {})",
            self.title,
            self.start.format(DATETIME_FORMAT),
            self.end.format(DATETIME_FORMAT)
        )
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Store-assigned identifier of a persisted event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoredEventId(pub String);

impl StoredEventId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoredEventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An event record as persisted by an [`EventStore`](crate::EventStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub id: StoredEventId,
    pub record: EventRecord,
}

impl fmt::Display for StoredEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.record.fmt(f)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;

    /// Build a record at `day`/`hour` lasting one hour.
    pub(crate) fn record(title: &str, category: &str, day: u32, hour: u32) -> EventRecord {
        let start = NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        EventRecord {
            title: title.to_string(),
            description: None,
            location: None,
            start,
            end: start + chrono::Duration::hours(1),
            uid: None,
            category: category.to_string(),
        }
    }

    #[test]
    fn day_seconds_are_offsets_from_midnight() {
        let mut event = record("Open Swim", "Drop-in Swim", 1, 9);
        event.end = event.start + chrono::Duration::minutes(90);

        assert_eq!(event.start_seconds(), 9 * 3600);
        assert_eq!(event.end_seconds(), 10 * 3600 + 30 * 60);
    }

    #[test]
    fn location_tag_uses_name_before_first_comma() {
        let mut event = record("Open Swim", "Drop-in Swim", 1, 9);
        event.location = Some("student rec center, 951 Meridian Ave, Fort Collins".into());

        assert_eq!(event.location_tag().as_deref(), Some("Student Rec Center"));
    }

    #[test]
    fn location_tag_is_none_without_a_name() {
        let mut event = record("Open Swim", "Drop-in Swim", 1, 9);
        assert_eq!(event.location_tag(), None);

        event.location = Some(" , 951 Meridian Ave".into());
        assert_eq!(event.location_tag(), None);
    }

    #[test]
    fn details_differ_ignores_uid_and_category() {
        let a = record("Open Swim", "Drop-in Swim", 1, 9);
        let mut b = a.clone();
        b.uid = Some("fresh-uid-every-export".into());
        assert!(!a.details_differ(&b));

        b.description = Some("Bring a towel".into());
        assert!(a.details_differ(&b));
    }
}
