//! The versioned field-layout spec document.
//!
//! A spec describes how to interpret a reconstructed payload: the record
//! grammar, which match-level fields are required, the positional player-row
//! layouts per schema version, checksum parameters, and the order-symbol
//! table used by the order-based decoding strategy.
//!
//! The document shape is an internal contract between the spec loader and
//! the payload parser; it is versioned, not stable across major versions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A loaded field-layout specification. Immutable for the remainder of a
/// decode call once returned by the loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayMetadataSpec {
    /// Spec document version
    pub version: i64,
    pub payload: PayloadSpec,
    pub checksum: ChecksumSpec,
    /// Order id (decimal string key) to payload character, for the
    /// order-based decoding strategy. May be empty for chat/protocol-only
    /// specs.
    #[serde(default)]
    pub symbols: BTreeMap<String, char>,
}

/// Payload record grammar and field layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadSpec {
    /// Prefix of the schema-version header record, e.g. `v` in `v3`
    pub header_prefix: String,
    /// Prefix marking player rows, e.g. `player:`
    pub player_marker: String,
    /// Delimiter between positional fields in a player row, e.g. `|`
    pub field_delimiter: String,
    /// Terminator record, e.g. `END`
    pub end_marker: String,
    /// Key of the embedded checksum record, e.g. `checksum`
    pub checksum_key: String,
    /// Match-level key/value records that must be present
    pub match_fields: Vec<String>,
    pub player_rows: PlayerRowsSpec,
}

/// The two positional player-row layouts the embedded format evolved
/// through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRowsSpec {
    pub legacy: PlayerRowSpec,
    pub extended: PlayerRowSpec,
}

/// One positional player-row layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRowSpec {
    /// Rows with fewer fields than this are skipped (insufficient data)
    pub min_fields: usize,
    /// Minimum embedded schema version required to select this layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_schema: Option<i64>,
    /// Positional field names, in row order
    pub fields: Vec<String>,
}

/// Parameters of the rolling checksum computed over the canonical
/// pre-checksum payload text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumSpec {
    pub multiplier: u64,
    pub modulus: u64,
}
