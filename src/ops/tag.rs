//! Board compatibility tagging.

use crate::core::library::{LibraryRecord, WILDCARD_ARCH};

/// Whether a library declaring `architectures` can be used on `target_arch`.
///
/// A declared entry matches when it contains the target architecture or the
/// wildcard token; entries may be compound like `"avr,sam"`. An empty
/// declaration is the wildcard.
pub fn is_supported(architectures: &[String], target_arch: &str) -> bool {
    if architectures.is_empty() {
        return true;
    }

    architectures
        .iter()
        .any(|arch| arch.contains(target_arch) || arch.contains(WILDCARD_ARCH))
}

/// Tag every record with its compatibility with `target_arch`.
///
/// With no target the records are left untouched. Safe to rerun whenever
/// the selected board changes.
pub fn tag_supported(records: &mut [LibraryRecord], target_arch: Option<&str>) {
    let Some(target_arch) = target_arch else {
        tracing::debug!("no board selected, skipping compatibility tagging");
        return;
    };

    for record in records.iter_mut() {
        record.supported = Some(is_supported(&record.architectures, target_arch));
    }

    let supported = records
        .iter()
        .filter(|r| r.supported == Some(true))
        .count();
    tracing::debug!(
        "{} of {} libraries support {}",
        supported,
        records.len(),
        target_arch
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, archs: &[&str]) -> LibraryRecord {
        let mut record = LibraryRecord::new(name);
        record.architectures = archs.iter().map(|a| a.to_string()).collect();
        record
    }

    #[test]
    fn test_support_tagging() {
        let mut records = vec![
            record("Servo", &["avr", "sam"]),
            record("Any", &["*"]),
            record("EspOnly", &["esp32"]),
            record("Undeclared", &[]),
        ];

        tag_supported(&mut records, Some("avr"));

        assert_eq!(records[0].supported, Some(true));
        assert_eq!(records[1].supported, Some(true));
        assert_eq!(records[2].supported, Some(false));
        assert_eq!(records[3].supported, Some(true));
    }

    #[test]
    fn test_wildcard_supports_any_arch() {
        for arch in ["avr", "esp32", "rp2040", "samd"] {
            assert!(is_supported(&["*".to_string()], arch));
        }
    }

    #[test]
    fn test_compound_and_substring_entries() {
        assert!(is_supported(&["avr,sam".to_string()], "sam"));
        assert!(is_supported(&["megaavr".to_string()], "avr"));
        assert!(!is_supported(&["avr".to_string()], "megaavr"));
    }

    #[test]
    fn test_no_board_leaves_records_untouched() {
        let mut records = vec![record("Servo", &["avr"]), record("EspOnly", &["esp32"])];
        records[1].supported = Some(true);

        tag_supported(&mut records, None);

        assert_eq!(records[0].supported, None);
        assert_eq!(records[1].supported, Some(true));
    }

    #[test]
    fn test_retagging_follows_board_changes() {
        let mut records = vec![record("EspOnly", &["esp32"])];

        tag_supported(&mut records, Some("avr"));
        assert_eq!(records[0].supported, Some(false));

        tag_supported(&mut records, Some("esp32"));
        assert_eq!(records[0].supported, Some(true));

        tag_supported(&mut records, Some("esp32"));
        assert_eq!(records[0].supported, Some(true));
    }
}
