//! Adapter seam over the external replay-container decoder.
//!
//! The binary `.w3g` container format is parsed by a separate library that
//! emits a JSON dump of discrete actions. Everything unstable about that
//! library's output (optional `cache` wrappers, missing keys, arrays that
//! appear under different names depending on parse success) is normalized
//! here into one explicit [`ReplayStreams`] shape; nothing downstream ever
//! touches the raw dump.

use std::path::Path;

use serde::Deserialize;

use crate::error::{ReplayMetaError, Result};

/// One chat event from the recording.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub player_id: i64,
    pub message: String,
}

/// One custom-protocol action record. The metadata protocol smuggles both
/// identifier and data through the cache `key`; `value` is carried for
/// completeness but unused by the readers.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomAction {
    pub key: String,
    pub value: String,
}

/// One unit-order action, used only by the order-based decoding strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderAction {
    pub order_id: u32,
}

/// The decoded action streams of one recording.
#[derive(Debug, Clone, Default)]
pub struct ReplayStreams {
    pub chat_messages: Vec<ChatMessage>,
    pub custom_actions: Vec<CustomAction>,
    pub orders: Vec<OrderAction>,
}

/// A source of decoded replay action streams.
///
/// Implementations own all I/O; decode calls construct their own per-call
/// state from the returned streams, so concurrent decodes are independent.
pub trait ReplaySource {
    fn load(&self, path: &Path) -> impl Future<Output = Result<ReplayStreams>> + Send;
}

// Raw dump shapes. The container decoder wraps custom actions in a `cache`
// object and omits fields for actions it could not fully decode.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDump {
    #[serde(default)]
    chat_messages: Vec<RawChatMessage>,
    #[serde(default)]
    custom_actions: Vec<RawCustomAction>,
    #[serde(default)]
    orders: Vec<RawOrder>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawChatMessage {
    #[serde(default)]
    player_id: i64,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCustomAction {
    cache: Option<RawCache>,
}

#[derive(Debug, Deserialize)]
struct RawCache {
    key: Option<String>,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOrder {
    order_id: u32,
}

/// Reads the JSON action dump emitted by the container decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct DumpFileSource;

impl ReplaySource for DumpFileSource {
    async fn load(&self, path: &Path) -> Result<ReplayStreams> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ReplayMetaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        parse_dump(&bytes)
    }
}

/// Normalize a raw dump into [`ReplayStreams`], dropping records the
/// container decoder could not fully decode.
pub fn parse_dump(bytes: &[u8]) -> Result<ReplayStreams> {
    let raw: RawDump = serde_json::from_slice(bytes).map_err(|e| {
        ReplayMetaError::payload_invalid(format!("malformed replay action dump: {e}"))
    })?;

    let chat_messages = raw
        .chat_messages
        .into_iter()
        .filter_map(|m| {
            m.message.map(|message| ChatMessage {
                player_id: m.player_id,
                message,
            })
        })
        .collect();

    let custom_actions = raw
        .custom_actions
        .into_iter()
        .filter_map(|a| a.cache)
        .filter_map(|c| {
            c.key.map(|key| CustomAction {
                key,
                value: c.value,
            })
        })
        .collect();

    let orders = raw
        .orders
        .into_iter()
        .map(|o| OrderAction { order_id: o.order_id })
        .collect();

    Ok(ReplayStreams {
        chat_messages,
        custom_actions,
        orders,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn parses_cache_wrapped_custom_actions() {
        let dump = br#"{
            "chatMessages": [{"playerId": 2, "message": "hello"}],
            "customActions": [
                {"cache": {"key": "custom itt_chunks 2", "value": "0"}},
                {"cache": {"value": "no key, dropped"}},
                {}
            ],
            "orders": [{"orderId": 851968}]
        }"#;

        let streams = parse_dump(dump).unwrap();
        assert_eq!(streams.chat_messages.len(), 1);
        assert_eq!(streams.chat_messages[0].player_id, 2);
        assert_eq!(streams.custom_actions.len(), 1);
        assert_eq!(streams.custom_actions[0].key, "custom itt_chunks 2");
        assert_eq!(streams.orders, vec![OrderAction { order_id: 851968 }]);
    }

    #[test]
    fn empty_dump_yields_empty_streams() {
        let streams = parse_dump(b"{}").unwrap();
        assert!(streams.chat_messages.is_empty());
        assert!(streams.custom_actions.is_empty());
        assert!(streams.orders.is_empty());
    }

    #[test]
    fn malformed_dump_is_payload_invalid() {
        let err = parse_dump(b"not json").unwrap_err();
        assert_eq!(err.code(), ErrorCode::PayloadInvalid);
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let err = DumpFileSource
            .load(Path::new("/nonexistent/replay.json"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::IoError);
    }
}
