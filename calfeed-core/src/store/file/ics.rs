//! Stored event file format.
//!
//! A stored file is a minimal VCALENDAR with one VEVENT. SUMMARY, DESCRIPTION
//! and LOCATION are TEXT-escaped on write and unescaped by the parser on read,
//! so a record read back is identical to the one written. Derived fields
//! travel as X- properties in the same file, written verbatim.

use chrono::NaiveDateTime;
use icalendar::parser::{read_calendar, unfold};

use crate::feed::escape_text;
use crate::record::EventRecord;

const ICS_DATETIME_FORMAT: &str = "%Y%m%dT%H%M%S";

const X_CATEGORY: &str = "X-CALFEED-CATEGORY";
const X_SOURCE_UID: &str = "X-CALFEED-SOURCE-UID";
const X_START_SECONDS: &str = "X-CALFEED-START-SECONDS";
const X_END_SECONDS: &str = "X-CALFEED-END-SECONDS";
const X_LOCATION_TAG: &str = "X-CALFEED-LOCATION-TAG";

/// A stored event file's content: the store's own UID plus the record.
#[derive(Debug)]
pub struct StoredIcs {
    pub uid: String,
    pub record: EventRecord,
}

/// Render a record as .ics content under the store-assigned `uid`.
pub fn generate_ics(uid: &str, record: &EventRecord) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//calfeed//calfeed-core//EN".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}", single_line(uid)),
        format!(
            "DTSTAMP:{}",
            chrono::Utc::now().format("%Y%m%dT%H%M%SZ")
        ),
        format!("SUMMARY:{}", escape_text(&record.title)),
        format!("DTSTART:{}", record.start.format(ICS_DATETIME_FORMAT)),
        format!("DTEND:{}", record.end.format(ICS_DATETIME_FORMAT)),
    ];

    if let Some(ref description) = record.description {
        lines.push(format!("DESCRIPTION:{}", escape_text(description)));
    }
    if let Some(ref location) = record.location {
        lines.push(format!("LOCATION:{}", escape_text(location)));
    }

    lines.push(format!("{X_CATEGORY}:{}", single_line(&record.category)));
    if let Some(ref source_uid) = record.uid {
        lines.push(format!("{X_SOURCE_UID}:{}", single_line(source_uid)));
    }
    lines.push(format!("{X_START_SECONDS}:{}", record.start_seconds()));
    lines.push(format!("{X_END_SECONDS}:{}", record.end_seconds()));
    if let Some(tag) = record.location_tag() {
        lines.push(format!("{X_LOCATION_TAG}:{tag}"));
    }

    lines.push("END:VEVENT".to_string());
    lines.push("END:VCALENDAR".to_string());

    let mut content = lines.join("\r\n");
    content.push_str("\r\n");
    content
}

/// Read a stored file back. Returns `None` when it isn't a complete record.
pub fn read_ics(content: &str) -> Option<StoredIcs> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).ok()?;
    let vevent = calendar.components.iter().find(|c| c.name == "VEVENT")?;

    let uid = vevent.find_prop("UID")?.val.to_string();
    let title = vevent.find_prop("SUMMARY")?.val.to_string();
    let start = parse_stored_datetime(vevent.find_prop("DTSTART")?.val.as_ref())?;
    let end = parse_stored_datetime(vevent.find_prop("DTEND")?.val.as_ref())?;
    let category = vevent.find_prop(X_CATEGORY)?.val.to_string();

    let description = vevent.find_prop("DESCRIPTION").map(|p| p.val.to_string());
    let location = vevent.find_prop("LOCATION").map(|p| p.val.to_string());
    let source_uid = vevent.find_prop(X_SOURCE_UID).map(|p| p.val.to_string());

    Some(StoredIcs {
        uid,
        record: EventRecord {
            title,
            description,
            location,
            start,
            end,
            uid: source_uid,
            category,
        },
    })
}

fn parse_stored_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), ICS_DATETIME_FORMAT).ok()
}

/// Verbatim property values must stay on one line.
fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}
