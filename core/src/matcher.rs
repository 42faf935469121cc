//! Matching platform players against parsed metadata players.
//!
//! The container decoder and the embedded payload disagree about player
//! identity often enough (renames, battle-tag suffixes, observer slots)
//! that the platform needs an explicit contract: slot index first, then
//! normalized display name. An external player that matches nothing gets an
//! explicit unmatched outcome; ties are surfaced as errors, never resolved
//! by first-match.

use hashbrown::HashSet;
use ittmeta_types::{ExternalPlayer, PlayerRecord};
use serde_json::json;

use crate::error::{ReplayMetaError, Result};

/// Which rule produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    /// `slot_index == id` — takes precedence
    SlotIndex,
    /// Normalized display names are equal
    NormalizedName,
}

/// Outcome for one external player.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome<'a> {
    Matched {
        external: &'a ExternalPlayer,
        record: &'a PlayerRecord,
        rule: MatchRule,
    },
    /// No metadata player for this external player; they have no stats.
    Unmatched { external: &'a ExternalPlayer },
}

/// Match each external player to at most one metadata player.
///
/// Each metadata player is claimed at most once. Two metadata players
/// matching the same external player is an ambiguity error.
pub fn match_players<'a>(
    external: &'a [ExternalPlayer],
    records: &'a [PlayerRecord],
) -> Result<Vec<MatchOutcome<'a>>> {
    let mut claimed: HashSet<usize> = HashSet::new();
    let mut outcomes = Vec::with_capacity(external.len());

    for player in external {
        let by_slot: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(index, record)| !claimed.contains(index) && record.slot_index == player.id)
            .map(|(index, _)| index)
            .collect();

        let (index, rule) = match by_slot.as_slice() {
            [index] => (Some(*index), MatchRule::SlotIndex),
            [] => {
                let wanted = normalize_name(&player.name);
                let by_name: Vec<usize> = records
                    .iter()
                    .enumerate()
                    .filter(|(index, record)| {
                        !claimed.contains(index) && normalize_name(&record.name) == wanted
                    })
                    .map(|(index, _)| index)
                    .collect();
                match by_name.as_slice() {
                    [index] => (Some(*index), MatchRule::NormalizedName),
                    [] => (None, MatchRule::NormalizedName),
                    candidates => return Err(ambiguity(player, candidates, records)),
                }
            }
            candidates => return Err(ambiguity(player, candidates, records)),
        };

        match index {
            Some(index) => {
                claimed.insert(index);
                outcomes.push(MatchOutcome::Matched {
                    external: player,
                    record: &records[index],
                    rule,
                });
            }
            None => {
                tracing::warn!(id = player.id, name = %player.name, "no metadata player matched");
                outcomes.push(MatchOutcome::Unmatched { external: player });
            }
        }
    }

    Ok(outcomes)
}

/// Lowercase and strip everything non-alphanumeric, so `Foo#1234` and
/// `foo_1234` compare equal.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

fn ambiguity(
    player: &ExternalPlayer,
    candidates: &[usize],
    records: &[PlayerRecord],
) -> ReplayMetaError {
    let slots: Vec<i64> = candidates.iter().map(|&i| records[i].slot_index).collect();
    ReplayMetaError::PayloadInvalid {
        message: format!("ambiguous metadata match for player {:?}", player.name),
        details: Some(json!({
            "externalId": player.id,
            "candidateSlots": slots,
        })),
    }
}
