use serde::Serialize;
use thiserror::Error;

use crate::market_data::types::{MarketSnapshot, TickerSnapshot};

/// Reported for every symbol, whatever the pair actually settles fees in.
pub const FEE_CURRENCY: &str = "BTC";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("No symbol specified")]
    MissingSymbol,

    #[error("Invalid symbol specified")]
    UnknownSymbol,
}

/// Public shape of one currency.
/// `volume`, `quote_volume`, `change` and `percent_change` are part of the
/// shape but are never filled from the upstream ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyRecord {
    pub id: String,
    pub full_name: String,
    pub ask: String,
    pub bid: String,
    pub last: String,
    pub open: String,
    pub low: String,
    pub high: String,
    pub fee_currency: String,
    pub volume: String,
    pub quote_volume: String,
    pub change: String,
    pub percent_change: String,
}

impl CurrencyRecord {
    pub fn project(symbol: &str, ticker: &TickerSnapshot) -> Self {
        Self {
            id: symbol.to_string(),
            full_name: symbol.to_string(),
            ask: ticker.ask.clone(),
            bid: ticker.bid.clone(),
            last: ticker.last.clone(),
            open: ticker.open.clone(),
            low: ticker.low.clone(),
            high: ticker.high.clone(),
            fee_currency: FEE_CURRENCY.to_string(),
            volume: String::new(),
            quote_volume: String::new(),
            change: String::new(),
            percent_change: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrencyList {
    pub currencies: Vec<CurrencyRecord>,
}

pub fn get_one(snapshot: &MarketSnapshot, symbol: &str) -> Result<CurrencyRecord, QueryError> {
    if symbol.is_empty() {
        return Err(QueryError::MissingSymbol);
    }

    snapshot
        .get(symbol)
        .map(|ticker| CurrencyRecord::project(symbol, ticker))
        .ok_or(QueryError::UnknownSymbol)
}

/// Order follows the map and is unspecified.
pub fn get_all(snapshot: &MarketSnapshot) -> CurrencyList {
    CurrencyList {
        currencies: snapshot
            .iter()
            .map(|(symbol, ticker)| CurrencyRecord::project(symbol, ticker))
            .collect(),
    }
}
