//! Spec-driven parsing of a reconstructed payload.
//!
//! A payload is a newline-delimited record stream:
//!
//! ```text
//! v3
//! mapName:Island Troll Tribes
//! mapVersion:3.28
//! matchId:abc123
//! duration:1412
//! startTime:3
//! endTime:1415
//! playerCount:2
//! player:0|Foo|Hunter|120|30|12|200|9|4|1|0|2|0|1|0|0|0
//! player:1|Bar|Mage|80|55|40|170|6|2|0|1|0|1|0|0|0|0
//! checksum:183738271
//! END
//! ```
//!
//! Record grammar and field layout come from the loaded spec; the only
//! hardcoded knowledge is the positional tagged-union player-row layouts
//! the embedded format evolved through.

use std::collections::BTreeMap;

use hashbrown::HashMap;
use ittmeta_types::{KillCounts, MatchMetadata, PayloadSpec, PlayerRecord, PlayerStats, ReplayMetadataSpec};
use serde_json::json;

use crate::checksum;
use crate::error::{ReplayMetaError, Result};

/// Parser options. Checksum validation is a per-channel policy: the chat
/// channel validates, the protocol channel skips because its permissive
/// escape pass can legitimately alter byte-for-byte content.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    pub skip_checksum_validation: bool,
}

/// Positional row layout, selected once per row from field count and
/// embedded schema version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayerRowLayout {
    /// `slot|name|<stats...>`
    Legacy,
    /// `slot|name|trollClass|<stats...>` — stats shifted right by one
    Extended,
}

/// Parse a reconstructed payload against a loaded spec.
pub fn parse_payload(
    payload: &str,
    spec: &ReplayMetadataSpec,
    options: &ParseOptions,
) -> Result<MatchMetadata> {
    let grammar = &spec.payload;
    let normalized = payload.replace("\r\n", "\n");
    let mut records = normalized.split('\n');

    let header = records
        .next()
        .filter(|line| !line.is_empty())
        .ok_or_else(|| ReplayMetaError::payload_invalid("empty payload"))?;
    let schema_version = parse_schema_header(header, &grammar.header_prefix)?;

    let checksum_prefix = format!("{}:", grammar.checksum_key);
    let mut canonical_records = vec![header];
    let mut players: Vec<PlayerRecord> = Vec::new();
    let mut key_values: HashMap<&str, &str> = HashMap::new();
    let mut checksum_value: Option<i64> = None;
    let mut end_seen = false;

    for record in records {
        if let Some(raw) = record.strip_prefix(checksum_prefix.as_str()) {
            checksum_value = Some(raw.trim().parse().map_err(|_| {
                ReplayMetaError::payload_invalid(format!("invalid checksum value {raw:?}"))
            })?);
            continue;
        }

        // Everything before the checksum record is covered by it.
        if checksum_value.is_none() {
            canonical_records.push(record);
        }

        if record.is_empty() {
            continue;
        }

        if record == grammar.end_marker {
            end_seen = true;
            continue;
        }

        if let Some(row) = record.strip_prefix(grammar.player_marker.as_str()) {
            if let Some(player) = parse_player_row(row, Some(schema_version), grammar) {
                players.push(player);
            }
            continue;
        }

        let Some((key, value)) = record.split_once(':') else {
            return Err(ReplayMetaError::payload_invalid(format!(
                "invalid key/value record: {record}"
            )));
        };
        key_values.insert(key, value);
    }

    let Some(embedded_checksum) = checksum_value else {
        return Err(ReplayMetaError::payload_invalid("payload missing checksum record"));
    };
    if !end_seen {
        return Err(ReplayMetaError::payload_invalid(format!(
            "payload missing {} terminator",
            grammar.end_marker
        )));
    }

    if !options.skip_checksum_validation {
        let canonical = canonical_records.join("\n");
        checksum::assert_checksum(&canonical, embedded_checksum, &spec.checksum)?;
    }

    let require = |key: &str| -> Result<&str> {
        key_values.get(key).copied().ok_or_else(|| {
            ReplayMetaError::payload_invalid(format!("missing required field {key}"))
        })
    };
    for field in &grammar.match_fields {
        require(field)?;
    }

    let optional = |key: &str| key_values.get(key).copied().unwrap_or_default();
    let numeric = |key: &str| -> Result<i64> {
        match key_values.get(key) {
            None => Ok(0),
            Some(raw) => raw.trim().parse().map_err(|_| {
                ReplayMetaError::payload_invalid(format!("invalid numeric value {raw:?} for {key}"))
            }),
        }
    };

    let player_count = numeric("playerCount")?;
    if player_count != players.len() as i64 {
        return Err(ReplayMetaError::PayloadInvalid {
            message: "player count mismatch".into(),
            details: Some(json!({
                "expected": player_count,
                "actual": players.len(),
            })),
        });
    }

    let mut extras = BTreeMap::new();
    for (key, value) in &key_values {
        if !grammar.match_fields.iter().any(|f| f == key) {
            extras.insert((*key).to_string(), (*value).to_string());
        }
    }

    Ok(MatchMetadata {
        schema_version,
        match_id: optional("matchId").to_string(),
        map_name: optional("mapName").to_string(),
        map_version: optional("mapVersion").to_string(),
        duration_seconds: numeric("duration")?,
        start_time_game: numeric("startTime")?,
        end_time_game: numeric("endTime")?,
        player_count: players.len(),
        players,
        checksum: embedded_checksum,
        extras,
    })
}

/// Parse the `v<N>` schema-version header.
fn parse_schema_header(header: &str, prefix: &str) -> Result<i64> {
    let raw = header.strip_prefix(prefix).ok_or_else(|| {
        ReplayMetaError::payload_invalid(format!("missing schema version header, got {header:?}"))
    })?;
    raw.trim().parse().map_err(|_| {
        ReplayMetaError::payload_invalid(format!("invalid schema version header {header:?}"))
    })
}

/// Parse one player row (the text after the player marker).
///
/// Returns `None` for rows with too few fields; a short row is skipped, not
/// a failure for the whole payload. Numeric fields fall back to `0` on
/// parse failure so partial rows still yield a result.
pub fn parse_player_row(
    row: &str,
    schema_version: Option<i64>,
    grammar: &PayloadSpec,
) -> Option<PlayerRecord> {
    let parts: Vec<&str> = row.split(grammar.field_delimiter.as_str()).collect();
    let rows = &grammar.player_rows;

    let extended_applies = parts.len() >= rows.extended.min_fields
        && match (schema_version, rows.extended.min_schema) {
            (Some(schema), Some(min)) => schema >= min,
            _ => false,
        };

    let layout = if extended_applies {
        PlayerRowLayout::Extended
    } else if parts.len() >= rows.legacy.min_fields {
        PlayerRowLayout::Legacy
    } else {
        tracing::warn!(fields = parts.len(), "player row too short, skipping");
        return None;
    };

    let num = |index: usize| -> i64 {
        parts
            .get(index)
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0)
    };

    let (troll_class, stats_offset) = match layout {
        PlayerRowLayout::Legacy => (None, 2),
        PlayerRowLayout::Extended => {
            let class = parts.get(2).filter(|s| !s.is_empty()).map(|s| s.to_string());
            (class, 3)
        }
    };

    Some(PlayerRecord {
        slot_index: num(0),
        name: parts.get(1).copied().unwrap_or_default().to_string(),
        troll_class,
        stats: PlayerStats {
            damage: num(stats_offset),
            self_healing: num(stats_offset + 1),
            ally_healing: num(stats_offset + 2),
            gold_acquired: num(stats_offset + 3),
            meat_eaten: num(stats_offset + 4),
            kills: KillCounts {
                elk: num(stats_offset + 5),
                hawk: num(stats_offset + 6),
                snake: num(stats_offset + 7),
                wolf: num(stats_offset + 8),
                bear: num(stats_offset + 9),
                panther: num(stats_offset + 10),
            },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn spec() -> ReplayMetadataSpec {
        // Bundled default exercises the production grammar.
        crate::spec::default_spec().unwrap()
    }

    /// Build a payload with a correct embedded checksum.
    fn sealed_payload(records: &[&str]) -> String {
        let spec = spec();
        let canonical = records.join("\n");
        let value = checksum::compute_checksum(&canonical, &spec.checksum);
        format!("{canonical}\nchecksum:{value}\nEND")
    }

    const MATCH_RECORDS: [&str; 8] = [
        "v2",
        "mapName:Island Troll Tribes",
        "mapVersion:3.28",
        "matchId:m-42",
        "duration:900",
        "startTime:3",
        "endTime:903",
        "playerCount:0",
    ];

    #[test]
    fn parses_match_level_fields() {
        let payload = sealed_payload(&MATCH_RECORDS);
        let meta = parse_payload(&payload, &spec(), &ParseOptions::default()).unwrap();

        assert_eq!(meta.schema_version, 2);
        assert_eq!(meta.map_name, "Island Troll Tribes");
        assert_eq!(meta.map_version, "3.28");
        assert_eq!(meta.match_id, "m-42");
        assert_eq!(meta.duration_seconds, 900);
        assert_eq!(meta.start_time_game, 3);
        assert_eq!(meta.end_time_game, 903);
        assert_eq!(meta.player_count, 0);
        assert!(meta.extras.is_empty());
    }

    #[test]
    fn unknown_keys_land_in_extras() {
        let mut records = MATCH_RECORDS.to_vec();
        records.push("winner:team:1");
        let payload = sealed_payload(&records);

        let meta = parse_payload(&payload, &spec(), &ParseOptions::default()).unwrap();
        // value keeps embedded colons
        assert_eq!(meta.extras.get("winner").map(String::as_str), Some("team:1"));
    }

    #[test]
    fn legacy_row_parses_stats_after_name() {
        let mut records = MATCH_RECORDS.to_vec();
        records[7] = "playerCount:1";
        records.push("player:0|Foo|10|5|0|0|0|0|0|0|0|0|0|0|0|0");
        let payload = sealed_payload(&records);

        let meta = parse_payload(&payload, &spec(), &ParseOptions::default()).unwrap();
        let player = &meta.players[0];
        assert_eq!(player.slot_index, 0);
        assert_eq!(player.name, "Foo");
        assert_eq!(player.troll_class, None);
        assert_eq!(player.stats.damage, 10);
        assert_eq!(player.stats.self_healing, 5);
        assert_eq!(player.stats.kills, KillCounts::default());
    }

    #[test]
    fn extended_row_shifts_stats_by_one() {
        let spec = spec();
        let legacy = parse_player_row(
            "0|Foo|10|5|7|200|9|4|1|0|2|0|1|0|0|0",
            Some(2),
            &spec.payload,
        )
        .unwrap();
        let extended = parse_player_row(
            "0|Foo|Hunter|10|5|7|200|9|4|1|0|2|0|1|0|0|0",
            Some(3),
            &spec.payload,
        )
        .unwrap();

        assert_eq!(legacy.troll_class, None);
        assert_eq!(extended.troll_class.as_deref(), Some("Hunter"));
        assert_eq!(legacy.stats, extended.stats);
        assert_eq!(extended.stats.damage, 10);
        assert_eq!(extended.stats.kills.elk, 4);
        assert_eq!(extended.stats.kills.snake, 0);
        assert_eq!(extended.stats.kills.wolf, 2);
    }

    #[test]
    fn seventeen_fields_without_schema_three_stays_legacy() {
        let spec = spec();
        let row = "0|Foo|999|10|5|7|200|9|4|1|0|2|0|1|0|0|0";
        let parsed = parse_player_row(row, Some(2), &spec.payload).unwrap();
        // "999" is read as damage, not a troll class
        assert_eq!(parsed.troll_class, None);
        assert_eq!(parsed.stats.damage, 999);

        let no_schema = parse_player_row(row, None, &spec.payload).unwrap();
        assert_eq!(no_schema.troll_class, None);
    }

    /// Documented example: legacy 16-field row reconstructed from two
    /// chunks.
    #[test]
    fn spec_example_scenario() {
        let row = "0|Foo|10|5|0|0|0|0|0|0|0|0|0|0";
        let parsed = parse_player_row(row, None, &spec().payload);
        // 14 fields is below the legacy threshold
        assert!(parsed.is_none());

        let full = "0|Foo|10|5|0|0|0|0|0|0|0|0|0|0|0|0";
        let player = parse_player_row(full, None, &spec().payload).unwrap();
        assert_eq!(player.slot_index, 0);
        assert_eq!(player.name, "Foo");
        assert_eq!(player.stats.damage, 10);
        assert_eq!(player.stats.self_healing, 5);
    }

    #[test]
    fn short_rows_are_skipped_not_fatal() {
        let mut records = MATCH_RECORDS.to_vec();
        records.push("player:0|Tiny|1|2");
        let payload = sealed_payload(&records);

        let meta = parse_payload(&payload, &spec(), &ParseOptions::default()).unwrap();
        assert!(meta.players.is_empty());
    }

    #[test]
    fn non_numeric_stats_fall_back_to_zero() {
        let row = "0|Foo|lots|5|x|0|0|0|0|0|0|0|0|0|0|0";
        let player = parse_player_row(row, None, &spec().payload).unwrap();
        assert_eq!(player.stats.damage, 0);
        assert_eq!(player.stats.self_healing, 5);
        assert_eq!(player.stats.ally_healing, 0);
    }

    #[test]
    fn player_count_mismatch_is_surfaced_with_details() {
        let mut records = MATCH_RECORDS.to_vec();
        records[7] = "playerCount:2";
        records.push("player:0|Foo|10|5|0|0|0|0|0|0|0|0|0|0|0|0");
        let payload = sealed_payload(&records);

        let err = parse_payload(&payload, &spec(), &ParseOptions::default()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::PayloadInvalid);
        let details = err.details().unwrap();
        assert_eq!(details["expected"], 2);
        assert_eq!(details["actual"], 1);
    }

    #[test]
    fn corrupted_checksum_fails_unless_skipped() {
        let payload = sealed_payload(&MATCH_RECORDS).replace("checksum:", "checksum:9");

        let err = parse_payload(&payload, &spec(), &ParseOptions::default()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ChecksumMismatch);

        let meta = parse_payload(
            &payload,
            &spec(),
            &ParseOptions {
                skip_checksum_validation: true,
            },
        )
        .unwrap();
        assert_eq!(meta.match_id, "m-42");
    }

    #[test]
    fn structural_failures_are_payload_invalid() {
        let spec = spec();
        let options = ParseOptions {
            skip_checksum_validation: true,
        };

        for (payload, what) in [
            ("", "empty"),
            ("mapName:x\nchecksum:0\nEND", "missing header"),
            ("vX\nchecksum:0\nEND", "bad header version"),
            ("v2\nEND", "missing checksum"),
            ("v2\nchecksum:0", "missing END"),
            ("v2\nno-colon-record\nchecksum:0\nEND", "bad record"),
            ("v2\nchecksum:abc\nEND", "bad checksum value"),
        ] {
            let err = parse_payload(payload, &spec, &options).unwrap_err();
            assert_eq!(err.code(), ErrorCode::PayloadInvalid, "case: {what}");
        }
    }

    #[test]
    fn crlf_payloads_normalize() {
        let payload = sealed_payload(&MATCH_RECORDS).replace('\n', "\r\n");
        let meta = parse_payload(&payload, &spec(), &ParseOptions::default()).unwrap();
        assert_eq!(meta.match_id, "m-42");
    }

    #[test]
    fn records_after_checksum_are_outside_canonical_text() {
        // END after the checksum record must not affect verification.
        let records = MATCH_RECORDS;
        let canonical = records.join("\n");
        let value = checksum::compute_checksum(&canonical, &spec().checksum);
        let payload = format!("{canonical}\nchecksum:{value}\ntrailer:ignored\nEND");

        let meta = parse_payload(&payload, &spec(), &ParseOptions::default()).unwrap();
        assert_eq!(meta.extras.get("trailer").map(String::as_str), Some("ignored"));
    }

    #[test]
    fn missing_required_field_is_reported_by_name() {
        let records: Vec<&str> = MATCH_RECORDS
            .iter()
            .copied()
            .filter(|r| !r.starts_with("matchId:"))
            .collect();
        let payload = sealed_payload(&records);

        let err = parse_payload(&payload, &spec(), &ParseOptions::default()).unwrap_err();
        assert!(err.to_string().contains("matchId"));
    }
}
