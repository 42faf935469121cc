//! Shared data types for the ittmeta pipeline.
//!
//! This crate holds the plain-data shapes that cross crate boundaries:
//! parsed match metadata, per-player records, and the versioned field-layout
//! spec document. It deliberately has no logic beyond serde derives and a
//! few accessors so that both the core pipeline and the web platform can
//! depend on it without pulling in the decoder.

pub mod metadata;
pub mod spec;

pub use metadata::{ExternalPlayer, KillCounts, MatchMetadata, PlayerRecord, PlayerStats};
pub use spec::{ChecksumSpec, PayloadSpec, PlayerRowSpec, PlayerRowsSpec, ReplayMetadataSpec};
