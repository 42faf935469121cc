//! Protocol-channel reader.
//!
//! The game mod smuggles metadata through the custom scoreboard protocol by
//! emitting cache actions whose key is `custom itt_<identifier> <value>`.
//! This reader scans the action stream into a per-call [`CustomDataMap`]
//! and hands chunk reassembly to [`crate::chunks`].

use crate::chunks::{self, ChunkedPayload, CustomDataMap, MARKER_NAMESPACE};
use crate::source::CustomAction;

/// Literal prefix the game client prepends to every custom cache key.
const CUSTOM_PREFIX: &str = "custom ";

/// Outcome of scanning the protocol channel. A missing payload is a valid
/// outcome (`metadata: None`), distinct from corruption.
#[derive(Debug, Clone)]
pub struct MmdReadResult {
    /// Total custom actions inspected, for diagnostics
    pub total_entries: usize,
    /// All marker-prefixed identifier/value pairs found
    pub custom_data: CustomDataMap,
    pub metadata: Option<MmdMetadata>,
}

/// Reconstructed metadata transmission from the protocol channel.
#[derive(Debug, Clone)]
pub struct MmdMetadata {
    /// Embedded mod version string (`itt_version`), when present
    pub version: Option<String>,
    /// Embedded schema version (`itt_schema`), when present and numeric
    pub schema_version: Option<i64>,
    pub chunked: ChunkedPayload,
    pub payload: String,
}

/// Scan the custom-action stream for embedded metadata.
pub fn read_mmd_metadata(actions: &[CustomAction]) -> MmdReadResult {
    let marker = format!("{MARKER_NAMESPACE}_");
    let mut custom_data = CustomDataMap::new();

    for action in actions {
        let Some(content) = action.key.strip_prefix(CUSTOM_PREFIX) else {
            continue;
        };
        if !content.starts_with(&marker) {
            continue;
        }
        let Some((identifier, value)) = content.split_once(' ') else {
            continue;
        };
        chunks::insert_entry(&mut custom_data, identifier, value);
    }

    let metadata = chunks::collect_chunks(&custom_data, MARKER_NAMESPACE).map(|chunked| {
        let payload = chunked.reconstruct();
        let version = custom_data
            .get(&format!("{MARKER_NAMESPACE}_version"))
            .cloned();
        let schema_version = custom_data
            .get(&format!("{MARKER_NAMESPACE}_schema"))
            .and_then(|raw| raw.trim().parse::<i64>().ok());

        tracing::debug!(
            chunks = chunked.present_chunks(),
            expected = chunked.expected_chunks,
            payload_len = payload.len(),
            "reconstructed protocol-channel payload"
        );

        MmdMetadata {
            version,
            schema_version,
            chunked,
            payload,
        }
    });

    MmdReadResult {
        total_entries: actions.len(),
        custom_data,
        metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(key: &str) -> CustomAction {
        CustomAction {
            key: key.to_string(),
            value: String::new(),
        }
    }

    #[test]
    fn extracts_chunked_payload_with_auxiliaries() {
        let actions = vec![
            action("custom itt_version 3.28a"),
            action("custom itt_schema 3"),
            action("custom itt_chunks 2"),
            action("custom itt_data_0 player:0\\|Foo"),
            action("custom itt_data_1 \\|10\\|5"),
            action("custom mmd_other ignored"),
            action("not custom at all"),
        ];

        let result = read_mmd_metadata(&actions);
        assert_eq!(result.total_entries, 7);
        assert_eq!(result.custom_data.len(), 5);

        let meta = result.metadata.unwrap();
        assert_eq!(meta.version.as_deref(), Some("3.28a"));
        assert_eq!(meta.schema_version, Some(3));
        assert!(meta.chunked.is_complete());
        assert_eq!(meta.payload, "player:0|Foo|10|5");
    }

    #[test]
    fn value_after_first_space_is_kept_whole() {
        let actions = vec![
            action("custom itt_chunks 1"),
            action("custom itt_data_0 a b c"),
        ];

        let meta = read_mmd_metadata(&actions).metadata.unwrap();
        assert_eq!(meta.payload, "a b c");
    }

    #[test]
    fn no_marker_entries_is_not_found_not_error() {
        let actions = vec![action("custom mmd_init 1"), action("plain")];
        let result = read_mmd_metadata(&actions);
        assert!(result.metadata.is_none());
        assert!(result.custom_data.is_empty());
    }

    #[test]
    fn non_numeric_or_zero_chunk_count_means_not_found() {
        for count in ["abc", "0", "-1"] {
            let actions = vec![action(&format!("custom itt_chunks {count}"))];
            assert!(read_mmd_metadata(&actions).metadata.is_none());
        }
    }

    #[test]
    fn later_duplicate_entries_overwrite_earlier_ones() {
        let actions = vec![
            action("custom itt_chunks 1"),
            action("custom itt_data_0 stale"),
            action("custom itt_data_0 fresh"),
        ];

        let meta = read_mmd_metadata(&actions).metadata.unwrap();
        assert_eq!(meta.payload, "fresh");
    }

    #[test]
    fn missing_schema_is_none_without_failing() {
        let actions = vec![
            action("custom itt_chunks 1"),
            action("custom itt_data_0 x"),
            action("custom itt_schema not-a-number"),
        ];

        let meta = read_mmd_metadata(&actions).metadata.unwrap();
        assert_eq!(meta.schema_version, None);
        assert_eq!(meta.payload, "x");
    }
}
