//! Spec loading and structural validation.
//!
//! A decode call loads its spec once — from the bundled default or an
//! external JSON file — and the loaded document is immutable thereafter.
//! The bundled default is embedded text parsed fresh per call; there is no
//! process-wide mutable cache, so concurrent decodes stay independent.

use std::path::Path;

use ittmeta_types::{PlayerRowSpec, ReplayMetadataSpec};

use crate::error::{ReplayMetaError, Result};

/// Bundled default spec, matching the current map release.
const DEFAULT_SPEC_JSON: &str = include_str!("../resources/default_spec.json");

/// Load and validate a spec. With no path, the bundled default is used.
pub async fn load_spec(path: Option<&Path>) -> Result<ReplayMetadataSpec> {
    match path {
        Some(path) => {
            let text =
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| ReplayMetaError::Io {
                        path: path.to_path_buf(),
                        source,
                    })?;
            tracing::debug!(path = %path.display(), "loaded external metadata spec");
            parse_spec(&text)
        }
        None => default_spec(),
    }
}

/// Parse the bundled default spec.
pub fn default_spec() -> Result<ReplayMetadataSpec> {
    parse_spec(DEFAULT_SPEC_JSON)
}

/// Parse spec text and run structural validation.
pub fn parse_spec(text: &str) -> Result<ReplayMetadataSpec> {
    let spec: ReplayMetadataSpec = serde_json::from_str(text)
        .map_err(|e| ReplayMetaError::spec_invalid(format!("not a valid spec document: {e}")))?;
    validate_spec(&spec)?;
    Ok(spec)
}

fn validate_spec(spec: &ReplayMetadataSpec) -> Result<()> {
    if spec.version < 1 {
        return Err(ReplayMetaError::spec_invalid(format!(
            "spec version must be positive, got {}",
            spec.version
        )));
    }

    let payload = &spec.payload;
    for (name, value) in [
        ("headerPrefix", &payload.header_prefix),
        ("playerMarker", &payload.player_marker),
        ("fieldDelimiter", &payload.field_delimiter),
        ("endMarker", &payload.end_marker),
        ("checksumKey", &payload.checksum_key),
    ] {
        if value.is_empty() {
            return Err(ReplayMetaError::spec_invalid(format!("{name} must be non-empty")));
        }
    }

    validate_field_list("matchFields", &payload.match_fields)?;
    validate_row("legacy", &payload.player_rows.legacy)?;
    validate_row("extended", &payload.player_rows.extended)?;

    if payload.player_rows.extended.min_schema.is_none() {
        return Err(ReplayMetaError::spec_invalid(
            "extended player row must declare minSchema",
        ));
    }

    if spec.checksum.multiplier == 0 || spec.checksum.modulus < 2 {
        return Err(ReplayMetaError::spec_invalid(
            "checksum multiplier must be non-zero and modulus at least 2",
        ));
    }

    for key in spec.symbols.keys() {
        if key.parse::<u32>().is_err() {
            return Err(ReplayMetaError::spec_invalid(format!(
                "symbol key {key:?} is not a numeric order id"
            )));
        }
    }

    Ok(())
}

fn validate_row(name: &str, row: &PlayerRowSpec) -> Result<()> {
    if row.min_fields == 0 {
        return Err(ReplayMetaError::spec_invalid(format!(
            "{name} player row minFields must be positive"
        )));
    }
    validate_field_list(name, &row.fields)?;
    if row.fields.len() > row.min_fields {
        return Err(ReplayMetaError::spec_invalid(format!(
            "{name} player row declares {} fields but only guarantees {}",
            row.fields.len(),
            row.min_fields
        )));
    }
    Ok(())
}

fn validate_field_list(name: &str, fields: &[String]) -> Result<()> {
    if fields.is_empty() {
        return Err(ReplayMetaError::spec_invalid(format!("{name} must not be empty")));
    }
    for (i, field) in fields.iter().enumerate() {
        if fields[..i].contains(field) {
            return Err(ReplayMetaError::spec_invalid(format!(
                "duplicate field name {field:?} in {name}"
            )));
        }
    }
    Ok(())
}
