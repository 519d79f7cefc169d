//! Event identity signatures.
//!
//! Feed exporters are free to hand out a new UID for the same event on every
//! export, so identity is derived from what a reader would recognize instead:
//! the normalized title plus start and end.

use std::fmt;

use crate::record::{DATETIME_FORMAT, EventRecord};

/// Deterministic identity key of an event record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature(String);

impl Signature {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the signature of a record.
///
/// Works the same for feed-parsed and store-read records, which is what makes
/// comparing the two sides meaningful.
pub fn signature(record: &EventRecord) -> Signature {
    Signature(format!(
        "{}{}{}",
        normalize_title(&record.title),
        record.start.format(DATETIME_FORMAT),
        record.end.format(DATETIME_FORMAT)
    ))
}

/// Lowercase the title and keep only ASCII letters, digits and `-.,:_`.
pub fn normalize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | ',' | ':' | '_'))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::record;

    #[test]
    fn test_normalize_title_strips_and_lowercases() {
        assert_eq!(normalize_title("Open Swim!"), "openswim");
        assert_eq!(normalize_title("Yoga: Level 1, 6-7 p.m._"), "yoga:level1,6-7p.m._");
        assert_eq!(normalize_title("Café (Lap) Swim"), "caflapswim");
    }

    #[test]
    fn test_signature_concatenates_title_start_end() {
        let event = record("Open Swim", "Drop-in Swim", 1, 9);
        assert_eq!(
            signature(&event).as_str(),
            "openswim2024-01-01 09:00:002024-01-01 10:00:00"
        );
    }

    #[test]
    fn test_signature_ignores_uid_and_details() {
        let a = record("Open Swim", "Drop-in Swim", 1, 9);
        let mut b = a.clone();
        b.uid = Some("abc@feed".into());
        b.description = Some("Come swim".into());
        b.location = Some("Pool".into());

        assert_eq!(signature(&a), signature(&b));
    }

    #[test]
    fn test_signature_tolerates_title_punctuation_and_case() {
        let a = record("Open Swim", "Drop-in Swim", 1, 9);
        let b = record("OPEN  swim!", "Drop-in Swim", 1, 9);
        assert_eq!(signature(&a), signature(&b));
    }

    #[test]
    fn test_signature_changes_with_time() {
        let a = record("Open Swim", "Drop-in Swim", 1, 9);
        let b = record("Open Swim", "Drop-in Swim", 1, 10);
        assert_ne!(signature(&a), signature(&b));
    }
}
