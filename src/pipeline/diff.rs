//! Diff calculation against the known-identifier set.
//!
//! Presence is decided by identifier only. Titles or dates that change
//! for an already-known identifier do not produce a new alert.

use std::collections::HashSet;

use crate::models::{Announcement, KnownIds};

/// Result of comparing parsed announcements with the known set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffResult {
    /// Announcements not seen before, in parser order
    pub new_items: Vec<Announcement>,
    /// Known set plus every identifier observed this run
    pub updated_known: KnownIds,
}

impl DiffResult {
    /// Check if there is anything to alert.
    pub fn has_changes(&self) -> bool {
        !self.new_items.is_empty()
    }
}

/// Compute new items and the updated known set.
pub fn calculate_diff(parsed: &[Announcement], known: &KnownIds) -> DiffResult {
    let mut seen: HashSet<&str> = HashSet::new();
    let new_items: Vec<Announcement> = parsed
        .iter()
        .filter(|item| !known.contains(&item.id))
        .filter(|item| seen.insert(item.id.as_str()))
        .cloned()
        .collect();

    let mut updated_known = known.clone();
    updated_known.extend(parsed.iter().map(|item| item.id.clone()));

    DiffResult {
        new_items,
        updated_known,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn make(id: &str, day: u32) -> Announcement {
        Announcement::new(
            id,
            format!("Binance Will List {id}"),
            format!("https://example.com/{id}"),
            Utc.with_ymd_and_hms(2025, 3, day, 0, 0, 0).unwrap(),
        )
    }

    fn known(ids: &[&str]) -> KnownIds {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_and_known_mixed() {
        let parsed = vec![make("BAR", 1), make("FOO", 2)];
        let result = calculate_diff(&parsed, &known(&["FOO"]));

        assert_eq!(result.new_items, vec![make("BAR", 1)]);
        assert_eq!(result.updated_known, known(&["FOO", "BAR"]));
        assert!(result.has_changes());
    }

    #[test]
    fn test_empty_to_empty() {
        let result = calculate_diff(&[], &KnownIds::new());
        assert!(result.new_items.is_empty());
        assert!(result.updated_known.is_empty());
        assert!(!result.has_changes());
    }

    #[test]
    fn test_first_run_everything_is_new() {
        let parsed = vec![make("C", 3), make("A", 1), make("B", 2)];
        let result = calculate_diff(&parsed, &KnownIds::new());

        let ids: Vec<&str> = result.new_items.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_known_set_never_shrinks() {
        let before = known(&["OLD1", "OLD2", "FOO"]);
        let result = calculate_diff(&[make("FOO", 1), make("NEW", 2)], &before);

        assert!(result.updated_known.is_superset(&before));
        assert_eq!(result.updated_known.len(), 4);
    }

    #[test]
    fn test_membership_is_by_id_only() {
        let mut renamed = make("FOO", 1);
        renamed.title = "Binance Will List Foo (FOO) (Updated)".into();

        let result = calculate_diff(&[renamed], &known(&["FOO"]));
        assert!(result.new_items.is_empty());
    }

    #[test]
    fn test_repeated_id_alerts_once() {
        let parsed = vec![make("FOO", 1), make("FOO", 2)];
        let result = calculate_diff(&parsed, &KnownIds::new());

        assert_eq!(result.new_items.len(), 1);
        assert_eq!(result.new_items[0], make("FOO", 1));
    }
}
