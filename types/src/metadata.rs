//! Parsed match metadata as extracted from a replay side channel.
//!
//! Field names serialize in camelCase to match the JSON the stats platform
//! already stores for uploaded replays.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Structured match-result metadata reconstructed from one replay.
///
/// Read-only once returned by the payload parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchMetadata {
    /// Schema version embedded in the payload header (`v<N>` record)
    pub schema_version: i64,
    pub match_id: String,
    pub map_name: String,
    pub map_version: String,
    pub duration_seconds: i64,
    /// Game-clock start time in seconds
    pub start_time_game: i64,
    /// Game-clock end time in seconds
    pub end_time_game: i64,
    pub player_count: usize,
    pub players: Vec<PlayerRecord>,
    /// Checksum value embedded in the payload (verified or not per channel policy)
    pub checksum: i64,
    /// Match-level key/value records not claimed by a known field
    #[serde(default)]
    pub extras: BTreeMap<String, String>,
}

/// One player row from the embedded payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub slot_index: i64,
    pub name: String,
    /// Present only in the extended (schema v3+) row layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub troll_class: Option<String>,
    pub stats: PlayerStats,
}

/// Per-player match statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub damage: i64,
    pub self_healing: i64,
    pub ally_healing: i64,
    pub gold_acquired: i64,
    pub meat_eaten: i64,
    pub kills: KillCounts,
}

/// Animal kill counters, in payload field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillCounts {
    pub elk: i64,
    pub hawk: i64,
    pub snake: i64,
    pub wolf: i64,
    pub bear: i64,
    pub panther: i64,
}

/// An in-match player as reported by the replay container decoder.
///
/// Owned by the platform; the core only exposes a matching contract
/// against this list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalPlayer {
    pub id: i64,
    pub name: String,
}
