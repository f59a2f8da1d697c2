//! Near-the-money options chain, calls and puts side by side per strike.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::entities::market::{MarketData, OptionQuote};
use crate::domain::values::indicators::option_rationale;
use crate::domain::values::option_type::OptionType;

/// Strikes within this fraction of the price are shown.
pub const DEFAULT_BAND: f64 = 0.03;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainSide {
    pub last: f64,
    pub bid: f64,
    pub ask: f64,
    pub volume: Option<u64>,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainRow {
    pub strike: f64,
    pub call: Option<ChainSide>,
    pub put: Option<ChainSide>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpirationView {
    pub expiration: NaiveDate,
    /// Empty when nothing trades near the money.
    pub rows: Vec<ChainRow>,
}

fn side(q: &OptionQuote, price: f64, rsi: f64, option_type: OptionType) -> ChainSide {
    ChainSide {
        last: q.last_price,
        bid: q.bid,
        ask: q.ask,
        volume: q.volume,
        rationale: option_rationale(q.strike, price, rsi, option_type),
    }
}

/// Strikes are keyed in thousandths so equal prices from both sides meet.
fn row_for(rows: &mut BTreeMap<i64, ChainRow>, strike: f64) -> &mut ChainRow {
    rows.entry((strike * 1000.0).round() as i64).or_insert(ChainRow {
        strike,
        call: None,
        put: None,
    })
}

/// Build one view per expiration. Rows are outer-joined on strike and
/// sorted ascending.
pub fn near_money_chains(data: &MarketData, price: f64, rsi: f64, band: f64) -> Vec<ExpirationView> {
    let lo = price * (1.0 - band);
    let hi = price * (1.0 + band);
    let in_band = |q: &&OptionQuote| q.strike >= lo && q.strike <= hi;

    data.chains
        .iter()
        .map(|(expiration, chain)| {
            let mut rows: BTreeMap<i64, ChainRow> = BTreeMap::new();
            for q in chain.calls.iter().filter(in_band) {
                row_for(&mut rows, q.strike).call = Some(side(q, price, rsi, OptionType::Call));
            }
            for q in chain.puts.iter().filter(in_band) {
                row_for(&mut rows, q.strike).put = Some(side(q, price, rsi, OptionType::Put));
            }

            ExpirationView {
                expiration: *expiration,
                rows: rows.into_values().collect(),
            }
        })
        .collect()
}
