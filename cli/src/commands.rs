//! Subcommand handlers: load the dump, run one decoding strategy, parse,
//! and hand the result to the output formatter.

use ittmeta_core::{
    DumpFileSource, ParseOptions, ReplayMetaError, ReplaySource, Result, chat, load_spec, mmd,
    orders, parse_payload,
};
use serde_json::json;

use crate::DecodeArgs;
use crate::output::{self, SourceInfo};

/// `mmd` — scoreboard protocol channel. Checksum validation is skipped:
/// the permissive escape pass of the protocol channel can legitimately
/// alter byte-for-byte content without indicating corruption.
pub async fn mmd(args: DecodeArgs) -> Result<()> {
    let path = args.input_path()?;
    tracing::info!(path = %path.display(), "reading scoreboard protocol data from replay dump");

    let streams = DumpFileSource.load(&path).await?;
    let result = mmd::read_mmd_metadata(&streams.custom_actions);
    tracing::info!(
        total_entries = result.total_entries,
        custom_entries = result.custom_data.len(),
        "scanned custom actions"
    );

    if args.raw {
        let mut entries: Vec<_> = result.custom_data.iter().collect();
        entries.sort();
        for (key, value) in entries {
            eprintln!("  {key}: {value}");
        }
    }

    let Some(meta) = result.metadata else {
        let mut keys: Vec<&String> = result.custom_data.keys().collect();
        keys.sort();
        return Err(ReplayMetaError::StreamNotFound {
            message: "no metadata found in scoreboard protocol data".into(),
            details: Some(json!({
                "totalEntries": result.total_entries,
                "customDataKeys": keys,
            })),
        });
    };

    tracing::info!(
        version = meta.version.as_deref().unwrap_or("unknown"),
        schema = meta.schema_version.unwrap_or(-1),
        chunks = meta.chunked.present_chunks(),
        expected_chunks = meta.chunked.expected_chunks,
        payload_len = meta.payload.len(),
        "reconstructed metadata payload"
    );

    let spec = load_spec(args.spec.as_deref()).await?;
    let metadata = parse_payload(
        &meta.payload,
        &spec,
        &ParseOptions {
            skip_checksum_validation: true,
        },
    )?;

    output::emit(
        &args,
        &metadata,
        SourceInfo::Mmd {
            itt_version: meta.version.clone(),
            chunk_count: meta.chunked.present_chunks(),
        },
        &meta.payload,
    );
    Ok(())
}

/// `chat` — chat-based encoding, with checksum validation enabled.
pub async fn chat(args: DecodeArgs) -> Result<()> {
    let path = args.input_path()?;
    tracing::info!(path = %path.display(), "reading chat messages from replay dump");

    let streams = DumpFileSource.load(&path).await?;
    let result = chat::read_chat_metadata(&streams.chat_messages);
    tracing::info!(
        total_messages = result.total_messages,
        metadata_messages = result.metadata_messages,
        "scanned chat messages"
    );

    let Some(meta) = result.metadata else {
        return Err(ReplayMetaError::StreamNotFound {
            message: "no metadata found in chat messages".into(),
            details: Some(json!({ "totalMessages": result.total_messages })),
        });
    };

    tracing::info!(payload_len = meta.payload.len(), "reconstructed metadata payload");

    let spec = load_spec(args.spec.as_deref()).await?;
    let metadata = parse_payload(&meta.payload, &spec, &ParseOptions::default())?;

    output::emit(
        &args,
        &metadata,
        SourceInfo::Chat {
            message_count: result.metadata_messages,
        },
        &meta.payload,
    );
    Ok(())
}

/// `decode` — order-based encoding, with checksum validation enabled.
pub async fn decode(args: DecodeArgs) -> Result<()> {
    let path = args.input_path()?;
    tracing::info!(path = %path.display(), "reading order actions from replay dump");

    let streams = DumpFileSource.load(&path).await?;
    let spec = load_spec(args.spec.as_deref()).await?;

    let payload = orders::decode_order_payload(&streams.orders, &spec)?;
    tracing::info!(
        orders = streams.orders.len(),
        payload_len = payload.len(),
        "decoded order stream"
    );

    let metadata = parse_payload(&payload, &spec, &ParseOptions::default())?;

    output::emit(
        &args,
        &metadata,
        SourceInfo::Decode {
            order_count: streams.orders.len(),
            spec_version: spec.version,
        },
        &payload,
    );
    Ok(())
}
