//! Chat-channel reader.
//!
//! Older mod builds broadcast the same chunked transmission as in-game chat
//! lines of the form `itt_<identifier> <value>`. The scan differs from the
//! protocol channel only in where the text comes from; chunk ordering and
//! escape decoding are delegated to [`crate::chunks`] so the two channels
//! are interchangeable inputs to the payload parser.

use crate::chunks::{self, ChunkedPayload, CustomDataMap, MARKER_NAMESPACE};
use crate::source::ChatMessage;

/// Outcome of scanning the chat channel.
#[derive(Debug, Clone)]
pub struct ChatReadResult {
    /// Total chat messages inspected
    pub total_messages: usize,
    /// Messages carrying the metadata marker
    pub metadata_messages: usize,
    pub metadata: Option<ChatMetadata>,
}

/// Reconstructed metadata transmission from the chat channel.
#[derive(Debug, Clone)]
pub struct ChatMetadata {
    pub chunked: ChunkedPayload,
    pub payload: String,
}

/// Scan chat messages for embedded metadata.
pub fn read_chat_metadata(messages: &[ChatMessage]) -> ChatReadResult {
    let marker = format!("{MARKER_NAMESPACE}_");
    let mut custom_data = CustomDataMap::new();
    let mut metadata_messages = 0;

    for message in messages {
        if !message.message.starts_with(&marker) {
            continue;
        }
        let Some((identifier, value)) = message.message.split_once(' ') else {
            continue;
        };
        metadata_messages += 1;
        chunks::insert_entry(&mut custom_data, identifier, value);
    }

    let metadata = chunks::collect_chunks(&custom_data, MARKER_NAMESPACE).map(|chunked| {
        let payload = chunked.reconstruct();
        tracing::debug!(
            chunks = chunked.present_chunks(),
            expected = chunked.expected_chunks,
            payload_len = payload.len(),
            "reconstructed chat-channel payload"
        );
        ChatMetadata { chunked, payload }
    });

    ChatReadResult {
        total_messages: messages.len(),
        metadata_messages,
        metadata,
    }
}
