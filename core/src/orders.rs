//! Order-based decoding strategy.
//!
//! The oldest encoding smuggles the payload through unit-order actions: the
//! map binds one dummy order id per payload character, and the mod issues
//! them in payload order during the end-of-game sequence. The spec's symbol
//! table maps order ids back to characters; the resulting text feeds the
//! same payload parser as the other channels.

use hashbrown::HashMap;
use ittmeta_types::ReplayMetadataSpec;
use serde_json::json;

use crate::error::{ReplayMetaError, Result};
use crate::source::OrderAction;

/// Decode the order stream into a payload string.
///
/// An order id absent from the symbol table is `UNKNOWN_SYMBOL` — the spec
/// and the replay disagree about the encoding version, and guessing would
/// corrupt every downstream field.
pub fn decode_order_payload(orders: &[OrderAction], spec: &ReplayMetadataSpec) -> Result<String> {
    if orders.is_empty() {
        return Err(ReplayMetaError::StreamNotFound {
            message: "no order actions found in replay".into(),
            details: Some(json!({ "orderCount": 0 })),
        });
    }

    let table: HashMap<u32, char> = spec
        .symbols
        .iter()
        .filter_map(|(key, &symbol)| key.parse::<u32>().ok().map(|id| (id, symbol)))
        .collect();

    let mut payload = String::with_capacity(orders.len());
    for (position, order) in orders.iter().enumerate() {
        match table.get(&order.order_id) {
            Some(&symbol) => payload.push(symbol),
            None => {
                return Err(ReplayMetaError::UnknownSymbol {
                    order_id: order.order_id,
                    position,
                });
            }
        }
    }

    tracing::debug!(orders = orders.len(), payload_len = payload.len(), "decoded order stream");
    Ok(payload)
}
