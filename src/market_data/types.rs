use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// Latest exchange quote for one symbol.
/// Prices stay as the exchange's own decimal text — no parsing, no rounding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TickerSnapshot {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub ask: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub bid: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub last: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub open: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub low: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub high: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub volume: String,
}

/// Symbol (exchange spelling, e.g. "BTCUSD") -> ticker.
pub type MarketSnapshot = HashMap<String, TickerSnapshot>;

// Thin books report `null` for ask/bid; treat that as "no quote" rather than a bad payload.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
