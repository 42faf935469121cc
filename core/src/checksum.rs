//! Checksum verification for reconstructed payloads.
//!
//! The in-game encoder appends a `checksum:<n>` record computed over the
//! canonical payload text (header through the last record before the
//! checksum line). The scheme is a rolling hash parameterized by the spec
//! so a map release can rotate parameters without a decoder change.

use ittmeta_types::ChecksumSpec;

use crate::error::{ReplayMetaError, Result};

/// Rolling checksum over the canonical pre-checksum text:
/// `acc = acc * multiplier + byte (mod modulus)`.
pub fn compute_checksum(text: &str, spec: &ChecksumSpec) -> i64 {
    let multiplier = u128::from(spec.multiplier);
    let modulus = u128::from(spec.modulus.max(1));
    let mut acc: u128 = 0;
    for byte in text.bytes() {
        acc = (acc * multiplier + u128::from(byte)) % modulus;
    }
    acc as i64
}

/// Verify an embedded checksum against the canonical text.
pub fn assert_checksum(text: &str, embedded: i64, spec: &ChecksumSpec) -> Result<()> {
    let computed = compute_checksum(text, spec);
    if computed != embedded {
        return Err(ReplayMetaError::ChecksumMismatch { embedded, computed });
    }
    Ok(())
}
