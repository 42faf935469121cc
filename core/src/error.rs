//! Typed failures for the decode pipeline.
//!
//! Every failure the pipeline can surface carries a stable [`ErrorCode`]
//! that the CLI (and the platform's HTTP boundary) maps 1:1 to an exit or
//! status code, plus optional structured details to aid diagnosis without
//! re-parsing the replay.

use std::path::PathBuf;

use serde_json::{Value, json};
use thiserror::Error;

/// Stable error codes consumed at the command boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    StreamNotFound,
    ChecksumMismatch,
    UnknownSymbol,
    SpecInvalid,
    IoError,
    PayloadInvalid,
}

impl ErrorCode {
    /// Wire name of the code, as stored by the stats platform.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StreamNotFound => "STREAM_NOT_FOUND",
            Self::ChecksumMismatch => "CHECKSUM_MISMATCH",
            Self::UnknownSymbol => "UNKNOWN_SYMBOL",
            Self::SpecInvalid => "SPEC_INVALID",
            Self::IoError => "IO_ERROR",
            Self::PayloadInvalid => "PAYLOAD_INVALID",
        }
    }

    /// Process exit code for the CLI. Untyped failures exit with 1.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::StreamNotFound => 2,
            Self::ChecksumMismatch => 3,
            Self::UnknownSymbol => 4,
            Self::SpecInvalid => 5,
            Self::IoError => 6,
            Self::PayloadInvalid => 7,
        }
    }
}

/// Errors surfaced by the metadata extraction pipeline.
#[derive(Debug, Error)]
pub enum ReplayMetaError {
    /// No metadata marker located in the chosen channel. Recoverable by
    /// trying another channel; never retried internally.
    #[error("{message}")]
    StreamNotFound {
        message: String,
        details: Option<Value>,
    },

    /// Reconstructed payload failed checksum verification.
    #[error("checksum mismatch: embedded {embedded}, computed {computed}")]
    ChecksumMismatch { embedded: i64, computed: i64 },

    /// An order id could not be mapped through the spec's symbol table,
    /// indicating spec/payload version skew.
    #[error("unknown order symbol {order_id} at position {position}")]
    UnknownSymbol { order_id: u32, position: usize },

    /// The loaded specification failed structural validation. Fatal for the
    /// whole decode call.
    #[error("invalid metadata spec: {reason}")]
    SpecInvalid { reason: String },

    /// Failure reading the replay dump or spec file. Caller-retryable.
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed chunk structure, missing required records, or parser-level
    /// structural failure.
    #[error("{message}")]
    PayloadInvalid {
        message: String,
        details: Option<Value>,
    },
}

impl ReplayMetaError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::StreamNotFound { .. } => ErrorCode::StreamNotFound,
            Self::ChecksumMismatch { .. } => ErrorCode::ChecksumMismatch,
            Self::UnknownSymbol { .. } => ErrorCode::UnknownSymbol,
            Self::SpecInvalid { .. } => ErrorCode::SpecInvalid,
            Self::Io { .. } => ErrorCode::IoError,
            Self::PayloadInvalid { .. } => ErrorCode::PayloadInvalid,
        }
    }

    /// Structured diagnostic payload, when the variant carries one.
    pub fn details(&self) -> Option<Value> {
        match self {
            Self::StreamNotFound { details, .. } | Self::PayloadInvalid { details, .. } => {
                details.clone()
            }
            Self::ChecksumMismatch { embedded, computed } => {
                Some(json!({ "embedded": embedded, "computed": computed }))
            }
            Self::UnknownSymbol { order_id, position } => {
                Some(json!({ "orderId": order_id, "position": position }))
            }
            Self::Io { path, .. } => Some(json!({ "path": path.display().to_string() })),
            Self::SpecInvalid { .. } => None,
        }
    }

    /// Shorthand for a detail-free [`ReplayMetaError::PayloadInvalid`].
    pub fn payload_invalid(message: impl Into<String>) -> Self {
        Self::PayloadInvalid {
            message: message.into(),
            details: None,
        }
    }

    pub fn spec_invalid(reason: impl Into<String>) -> Self {
        Self::SpecInvalid {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReplayMetaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_stable() {
        assert_eq!(ErrorCode::StreamNotFound.exit_code(), 2);
        assert_eq!(ErrorCode::ChecksumMismatch.exit_code(), 3);
        assert_eq!(ErrorCode::UnknownSymbol.exit_code(), 4);
        assert_eq!(ErrorCode::SpecInvalid.exit_code(), 5);
        assert_eq!(ErrorCode::IoError.exit_code(), 6);
        assert_eq!(ErrorCode::PayloadInvalid.exit_code(), 7);
    }

    #[test]
    fn details_carry_structured_context() {
        let err = ReplayMetaError::ChecksumMismatch {
            embedded: 10,
            computed: 11,
        };
        assert_eq!(err.code(), ErrorCode::ChecksumMismatch);
        let details = err.details().unwrap();
        assert_eq!(details["embedded"], 10);
        assert_eq!(details["computed"], 11);
    }

    #[test]
    fn wire_names_match_platform_contract() {
        assert_eq!(ErrorCode::StreamNotFound.as_str(), "STREAM_NOT_FOUND");
        assert_eq!(ErrorCode::PayloadInvalid.as_str(), "PAYLOAD_INVALID");
    }
}
