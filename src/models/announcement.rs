//! Announcement data structure.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Set of announcement identifiers that have already been alerted.
///
/// Kept ordered so the persisted array is stable between writes.
pub type KnownIds = BTreeSet<String>;

/// Ticker symbols are written in parentheses in listing titles, e.g. "(FOO)".
static SYMBOL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([A-Z0-9]{2,12})\)").expect("valid symbol pattern"));

/// A single new-listing announcement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Announcement {
    /// Stable identifier (URL slug, catalog id or title hash)
    pub id: String,

    /// Announcement title
    pub title: String,

    /// Full URL to the announcement
    pub link: String,

    /// Release time reported by the exchange
    pub published_at: DateTime<Utc>,
}

impl Announcement {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        link: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            link: link.into(),
            published_at,
        }
    }

    /// Identifier derived from the title when the source gives no slug or id.
    pub fn title_id(title: &str) -> String {
        let digest = Sha256::digest(title.trim().as_bytes());
        format!("title-{}", &hex::encode(digest)[..16])
    }

    /// Ticker symbols mentioned in the title, in order of appearance.
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = Vec::new();
        for caps in SYMBOL_PATTERN.captures_iter(&self.title) {
            let symbol = caps[1].to_string();
            if !symbols.contains(&symbol) {
                symbols.push(symbol);
            }
        }
        symbols
    }

    /// Release time in the alert display format.
    pub fn published_display(&self) -> String {
        self.published_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }

    /// Format announcement for display using a template.
    ///
    /// Supported placeholders:
    /// - `{id}`, `{title}`, `{link}`, `{published_at}`, `{symbols}`
    pub fn format(&self, template: &str) -> String {
        template
            .replace("{id}", &self.id)
            .replace("{title}", &self.title)
            .replace("{link}", &self.link)
            .replace("{published_at}", &self.published_display())
            .replace("{symbols}", &self.symbols().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Announcement {
        Announcement::new(
            "binance-will-list-foo-foo",
            "Binance Will List Foo (FOO) and Bar Token (BAR)",
            "https://www.binance.com/en/support/announcement/binance-will-list-foo-foo",
            Utc.with_ymd_and_hms(2025, 3, 14, 8, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_format() {
        let result = sample().format("{title} | {published_at}");
        assert_eq!(
            result,
            "Binance Will List Foo (FOO) and Bar Token (BAR) | 2025-03-14 08:00:00 UTC"
        );
    }

    #[test]
    fn test_symbols() {
        assert_eq!(sample().symbols(), vec!["FOO", "BAR"]);

        let plain = Announcement::new("x", "Notice on Delisting", "l", Utc::now());
        assert!(plain.symbols().is_empty());
    }

    #[test]
    fn test_title_id_is_stable() {
        let a = Announcement::title_id("Binance Will List Foo (FOO)");
        let b = Announcement::title_id("  Binance Will List Foo (FOO) ");
        assert_eq!(a, b);
        assert!(a.starts_with("title-"));
        assert_eq!(a.len(), "title-".len() + 16);
    }
}
