//! Best-effort timestamp parsing for feed values.
//!
//! Feeds are not consistent about how they write times, so several formats are
//! tried from strictest to loosest. Everything comes out UTC-naive: a `Z`
//! suffix or explicit offset is converted to UTC, anything else is taken as-is.
//!
//! The same text must always give the same timestamp, otherwise an unchanged
//! feed would look different on every pass. Natural-language values therefore
//! have to name their year, may not be relative to today, and resolve to
//! midnight when they carry no time of day.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};

/// Textual layouts tried after the iCalendar and RFC forms.
const TEXT_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Words whose meaning depends on when the value is read.
const RELATIVE_WORDS: &[&str] = &[
    "now", "today", "tonight", "tomorrow", "yesterday", "next", "last", "this", "ago", "in",
    "hour", "hours", "minute", "minutes", "day", "days", "week", "weeks", "month", "months",
    "year", "years",
];

/// Parse a feed date/time value into a UTC-naive timestamp.
///
/// Tries, in order:
/// - iCalendar basic form: `20240101T090000`, `20240101T090000Z`, `20240101T0900`, `20240101`
/// - RFC 3339 and RFC 2822
/// - `2024-01-01 09:00:00` style text
/// - natural language (`January 2, 2024 at 9am`) via fuzzydate
///
/// Date-only values resolve to midnight. Relative values (`tomorrow`), values
/// without a year and impossible clock times (`25pm`) are rejected.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    parse_ical_basic(value)
        .or_else(|| parse_rfc(value))
        .or_else(|| parse_text(value))
        .or_else(|| parse_natural(value))
}

fn parse_ical_basic(value: &str) -> Option<NaiveDateTime> {
    let value = value
        .strip_suffix('Z')
        .or_else(|| value.strip_suffix('z'))
        .unwrap_or(value);

    NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y%m%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_rfc(value: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_rfc2822(value))
        .ok()
        .map(|dt| dt.naive_utc())
}

fn parse_text(value: &str) -> Option<NaiveDateTime> {
    TEXT_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_natural(value: &str) -> Option<NaiveDateTime> {
    let lower = value.to_lowercase();
    if !has_explicit_year(&lower) || is_relative(&lower) || has_invalid_clock(&lower) {
        return None;
    }

    let parsed = fuzzydate::parse(lower.as_str()).ok()?;

    // fuzzydate fills anything unspecified from the current time
    if !has_time_component(&lower) {
        return parsed.date().and_hms_opt(0, 0, 0);
    }
    let parsed = parsed.with_nanosecond(0)?;
    if has_seconds(&lower) {
        Some(parsed)
    } else {
        parsed.with_second(0)
    }
}

/// A run of exactly four digits, e.g. `2024` in `1/2/2024`.
fn has_explicit_year(lower: &str) -> bool {
    lower
        .split(|c: char| !c.is_ascii_digit())
        .any(|run| run.len() == 4)
}

fn is_relative(lower: &str) -> bool {
    lower
        .split(|c: char| !c.is_ascii_alphabetic())
        .any(|word| RELATIVE_WORDS.contains(&word))
}

/// Check if the value contains time-of-day tokens (am/pm, HH:MM, noon,
/// midnight, "at <digit>").
fn has_time_component(lower: &str) -> bool {
    if lower.contains("noon") || lower.contains("midnight") {
        return true;
    }

    let bytes = lower.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        // am/pm after a digit, optionally with a space: "6pm", "6 pm"
        if (b == b'a' || b == b'p') && bytes.get(i + 1) == Some(&b'm') {
            if i > 0 && bytes[i - 1].is_ascii_digit() {
                return true;
            }
            if i > 1 && bytes[i - 1] == b' ' && bytes[i - 2].is_ascii_digit() {
                return true;
            }
        }

        // HH:MM
        if b == b':'
            && i > 0
            && bytes[i - 1].is_ascii_digit()
            && bytes.get(i + 1).is_some_and(u8::is_ascii_digit)
        {
            return true;
        }
    }

    let after_at = lower
        .find(" at ")
        .map(|pos| &lower[pos + 4..])
        .or_else(|| lower.strip_prefix("at "));
    after_at.is_some_and(|after| after.starts_with(|c: char| c.is_ascii_digit()))
}

/// HH:MM:SS somewhere in the value.
fn has_seconds(lower: &str) -> bool {
    lower
        .split_whitespace()
        .any(|word| word.matches(':').count() == 2)
}

/// Clock readings no real time has: `25pm`, `0am`, `9:75`, `24:00`.
fn has_invalid_clock(lower: &str) -> bool {
    let words: Vec<&str> = lower
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != ':'))
        .collect();

    for (i, word) in words.iter().enumerate() {
        let (clock, meridiem) = match word.strip_suffix("am").or_else(|| word.strip_suffix("pm")) {
            Some(clock) => (clock, true),
            None => (*word, matches!(words.get(i + 1), Some(&"am") | Some(&"pm"))),
        };

        if !clock.starts_with(|c: char| c.is_ascii_digit()) {
            continue;
        }

        let mut fields = clock.split(':');
        let hour = fields.next().unwrap_or_default();
        let rest: Vec<&str> = fields.collect();
        // A bare number that isn't followed by am/pm is a date part, not a clock
        if rest.is_empty() && !meridiem {
            continue;
        }

        let Ok(hour) = hour.parse::<u32>() else {
            continue;
        };
        let hour_ok = if meridiem { (1..=12).contains(&hour) } else { hour <= 23 };
        let rest_ok = rest
            .iter()
            .all(|field| field.parse::<u32>().is_ok_and(|n| n <= 59));

        if !hour_ok || !rest_ok || rest.len() > 2 {
            return true;
        }
    }

    false
}
