//! Chunked payload reconstruction shared by both channel readers.
//!
//! A payload too long for a single message/action is transmitted as indexed
//! fragments under `<ns>_data_<i>` identifiers, with the fragment count
//! under `<ns>_chunks`. Both side channels reduce to the same identifier →
//! value map, so the ordering, concatenation, and escape-decoding rules
//! live here exactly once; any divergence between the channels is a
//! correctness bug by definition.

use hashbrown::HashMap;

/// Marker namespace of the metadata protocol.
pub const MARKER_NAMESPACE: &str = "itt";

/// Identifier → value map built by scanning one channel. Built once per
/// decode call and discarded after reconstruction.
pub type CustomDataMap = HashMap<String, String>;

/// Insert one identifier/value pair, keeping the latest value on duplicate
/// identifiers. Replay streams can re-emit a key when the game resends
/// scoreboard state, so last-write-wins is deliberate, not incidental.
pub fn insert_entry(data: &mut CustomDataMap, identifier: &str, value: &str) {
    if data.insert(identifier.to_string(), value.to_string()).is_some() {
        tracing::debug!(identifier, "duplicate custom-data identifier, keeping latest value");
    }
}

/// An ordered chunk transmission collected from a [`CustomDataMap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedPayload {
    /// Chunk count announced by the `<ns>_chunks` entry
    pub expected_chunks: usize,
    /// Fragments present, in index order. May be shorter than
    /// `expected_chunks`; callers observe the divergence through
    /// [`ChunkedPayload::is_complete`] rather than a hard failure.
    pub fragments: Vec<String>,
}

impl ChunkedPayload {
    pub fn present_chunks(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_complete(&self) -> bool {
        self.fragments.len() == self.expected_chunks
    }

    /// Concatenate fragments in index order and apply the single global
    /// escape-decode pass.
    pub fn reconstruct(&self) -> String {
        unescape(&self.fragments.concat())
    }
}

/// Collect the chunk transmission for `namespace` out of a scanned channel.
///
/// Returns `None` when the chunk-count entry is absent, non-numeric, or not
/// positive — absence of metadata is a valid outcome distinct from
/// corruption. Missing fragment indices are tolerated (the remaining
/// fragments still concatenate in order) but logged and observable via the
/// returned counts.
pub fn collect_chunks(data: &CustomDataMap, namespace: &str) -> Option<ChunkedPayload> {
    let raw_count = data.get(&format!("{namespace}_chunks"))?;
    let expected_chunks = match raw_count.trim().parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => return None,
    };

    let mut fragments = Vec::with_capacity(expected_chunks);
    for index in 0..expected_chunks {
        match data.get(&format!("{namespace}_data_{index}")) {
            Some(fragment) => fragments.push(fragment.clone()),
            None => {
                tracing::warn!(index, expected_chunks, "missing chunk index, continuing with partial payload");
            }
        }
    }

    Some(ChunkedPayload {
        expected_chunks,
        fragments,
    })
}

/// Decode `\X` to the literal `X` for any character `X`, in one pass.
///
/// Intentionally permissive: the in-game encoder escapes whatever the
/// transport requires, so the decoder is not limited to a fixed escape set.
/// A trailing lone backslash is kept as-is.
pub fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(escaped) => out.push(escaped),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}
