//! Result formatting for the command surface.
//!
//! Human-readable summaries by default; `--json`/`--pretty` emit one
//! structured object on stdout with the source channel and its auxiliary
//! fields.

use ittmeta_types::MatchMetadata;
use serde_json::{Map, Value, json};

use crate::DecodeArgs;

/// Which strategy produced the result, plus its auxiliary output fields.
pub enum SourceInfo {
    Chat {
        message_count: usize,
    },
    Mmd {
        itt_version: Option<String>,
        chunk_count: usize,
    },
    Decode {
        order_count: usize,
        spec_version: i64,
    },
}

impl SourceInfo {
    fn name(&self) -> &'static str {
        match self {
            Self::Chat { .. } => "chat",
            Self::Mmd { .. } => "mmd",
            Self::Decode { .. } => "decode",
        }
    }
}

pub fn emit(args: &DecodeArgs, metadata: &MatchMetadata, source: SourceInfo, payload: &str) {
    if args.json || args.pretty {
        let value = json_output(args, metadata, &source, payload);
        let rendered = if args.pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };
        match rendered {
            Ok(text) => println!("{text}"),
            Err(e) => tracing::error!(error = %e, "failed to render JSON output"),
        }
        return;
    }

    print_human(args, metadata, &source, payload);
}

fn json_output(
    args: &DecodeArgs,
    metadata: &MatchMetadata,
    source: &SourceInfo,
    payload: &str,
) -> Value {
    let mut object = Map::new();
    object.insert("metadata".into(), json!(metadata));
    object.insert("source".into(), json!(source.name()));

    match source {
        SourceInfo::Chat { message_count } => {
            object.insert("messageCount".into(), json!(message_count));
        }
        SourceInfo::Mmd {
            itt_version,
            chunk_count,
        } => {
            object.insert("ittVersion".into(), json!(itt_version));
            object.insert("chunkCount".into(), json!(chunk_count));
        }
        SourceInfo::Decode {
            order_count,
            spec_version,
        } => {
            object.insert("orderCount".into(), json!(order_count));
            object.insert("specVersion".into(), json!(spec_version));
        }
    }

    if args.raw {
        object.insert("payload".into(), json!(payload));
    }

    Value::Object(object)
}

fn print_human(args: &DecodeArgs, metadata: &MatchMetadata, source: &SourceInfo, payload: &str) {
    let mut lines = vec![
        match source {
            SourceInfo::Chat { .. } => "Replay decoded successfully (via chat)".to_string(),
            SourceInfo::Mmd { .. } => "Replay decoded successfully (via mmd)".to_string(),
            SourceInfo::Decode { .. } => "Replay decoded successfully".to_string(),
        },
        format!("Match ID: {}", metadata.match_id),
        format!("Map: {} v{}", metadata.map_name, metadata.map_version),
        format!("Duration: {}s", metadata.duration_seconds),
        format!("Players: {}", metadata.player_count),
    ];

    match source {
        SourceInfo::Mmd { itt_version, .. } => {
            lines.push(format!(
                "ITT Version: {}",
                itt_version.as_deref().unwrap_or("unknown")
            ));
        }
        SourceInfo::Decode { spec_version, .. } => {
            lines.push(format!("Spec version: {spec_version}"));
        }
        SourceInfo::Chat { .. } => {}
    }

    if args.raw {
        lines.push(String::new());
        lines.push("Payload:".to_string());
        lines.push(payload.to_string());
    }

    println!("{}", lines.join("\n"));
}
