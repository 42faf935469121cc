//! Metadata extraction pipeline for game-session recordings.
//!
//! The pipeline reconstructs a chunked, escaped payload from one of the
//! side channels a replay exposes (chat text, custom scoreboard protocol,
//! or order actions) and parses it against a versioned field spec:
//!
//! Reader ([`chat`] / [`mmd`] / [`orders`]) → [`chunks`] reconstructor →
//! [`payload`] parser, gated by the [`spec`] loader. Failures short-circuit
//! with a typed [`error::ReplayMetaError`] the command boundary maps to an
//! exit code.

pub mod chat;
pub mod checksum;
pub mod chunks;
pub mod error;
pub mod matcher;
pub mod mmd;
pub mod orders;
pub mod payload;
pub mod source;
pub mod spec;

// Re-exports for convenience
pub use error::{ErrorCode, ReplayMetaError, Result};
pub use payload::{ParseOptions, parse_payload};
pub use source::{DumpFileSource, ReplaySource, ReplayStreams};
pub use spec::load_spec;
