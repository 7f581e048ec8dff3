//! Storage for the known-identifier set.
//!
//! The set lives in a single object holding a JSON array of identifiers:
//!
//! ```text
//! {bucket}/
//! └── known_announcement_ids.json   # ["binance-will-list-foo-foo", ...]
//! ```
//!
//! Every save replaces the whole object. There is no locking, so two
//! overlapping invocations can lose each other's update.

pub mod local;
#[cfg(feature = "s3")]
pub mod s3;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::KnownIds;

// Re-export for convenience
pub use local::LocalStore;
#[cfg(feature = "s3")]
pub use s3::S3Store;

/// Backend holding the known-identifier object.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read the set. A missing object is an empty set.
    async fn load(&self) -> Result<KnownIds>;

    /// Overwrite the object with the full set.
    async fn save(&self, ids: &KnownIds) -> Result<()>;

    /// Human-readable object location.
    fn location(&self) -> String;
}

/// Decode an object body read from `location`.
///
/// A JSON array of strings is the normal format. A body that starts like an
/// array but does not parse as one is a store error, so a damaged object is
/// never rewritten with partial contents. Anything else is read as one
/// identifier per line, which also covers a plain single-ID object.
pub fn decode_ids(body: &str, location: &str) -> Result<KnownIds> {
    if body.trim_start().starts_with('[') {
        let ids: Vec<String> = serde_json::from_str(body)
            .map_err(|e| AppError::store(location, format!("known-id array is corrupt: {e}")))?;
        return Ok(ids.into_iter().filter(|id| !id.is_empty()).collect());
    }

    Ok(body
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Encode the set as a pretty JSON array.
pub fn encode_ids(ids: &KnownIds) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(ids)?;
    bytes.push(b'\n');
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_json_array() {
        let ids = decode_ids(r#"["BAR", "FOO", "BAR"]"#, "mem://ids.json").unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("FOO"));
    }

    #[test]
    fn test_decode_line_delimited() {
        let ids = decode_ids("231001\n\n  230998  \n", "mem://ids.json").unwrap();
        assert_eq!(
            ids.into_iter().collect::<Vec<_>>(),
            vec!["230998".to_string(), "231001".to_string()]
        );
    }

    #[test]
    fn test_truncated_array_is_store_error() {
        let body = "[\n  \"binance-will-list-bar-bar\",\n  \"binance-will-list-foo-foo\"";
        let err = decode_ids(body, "mem://ids.json").unwrap_err();

        assert!(matches!(err, AppError::Store { .. }));
        assert!(err.to_string().contains("mem://ids.json"));
    }

    #[test]
    fn test_non_string_array_is_store_error() {
        let err = decode_ids("[1,2]", "mem://ids.json").unwrap_err();
        assert!(matches!(err, AppError::Store { .. }));
    }

    #[test]
    fn test_empty_array_is_empty_set() {
        let ids = decode_ids("  []\n", "mem://ids.json").unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn test_encode_is_sorted_array() {
        let ids: KnownIds = ["FOO", "BAR"].iter().map(|s| s.to_string()).collect();
        let bytes = encode_ids(&ids).unwrap();
        let back: Vec<String> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, vec!["BAR", "FOO"]);
    }
}
