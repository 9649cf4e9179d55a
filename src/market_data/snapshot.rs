// =============================================================================
// Market Snapshot — index & basket open/close deltas
// =============================================================================
//
// Assembles the home-screen summary: for each configured index and basket
// ticker, the latest day's open and its change versus the previous day's
// close. All quote fetches run concurrently and are joined.
//
// Two domain conditions are distinguished from transport failure:
// - any symbol with zero recent rows  => the market is closed
// - any symbol with one row           => not enough history for a delta
// The closed-market condition wins when both occur.
// =============================================================================

use std::collections::HashMap;

use futures_util::future::join_all;
use serde::Serialize;
use thiserror::Error;

use crate::market_data::quotes::{DailyQuote, QuoteClient};
use crate::runtime_config::IndexSymbol;

/// Domain and transport failures while assembling a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Market is currently closed, and no data is available.")]
    MarketClosed,

    #[error("Not enough data for the last 2 days")]
    InsufficientHistory,

    #[error(transparent)]
    Fetch(#[from] anyhow::Error),
}

/// Latest value and day-over-day change for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickerDelta {
    /// Latest day's opening price.
    pub value: f64,
    /// Latest open minus the previous day's close.
    pub change: f64,
}

/// The full snapshot payload: named indices plus the fixed ticker basket.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MarketSnapshot {
    pub indices: HashMap<String, TickerDelta>,
    pub tickers: HashMap<String, TickerDelta>,
}

/// Delta for one symbol's recent quotes (ascending).
pub fn delta_from_quotes(quotes: &[DailyQuote]) -> Result<TickerDelta, SnapshotError> {
    match quotes {
        [] => Err(SnapshotError::MarketClosed),
        [_single] => Err(SnapshotError::InsufficientHistory),
        [.., previous, latest] => Ok(TickerDelta {
            value: latest.open,
            change: latest.open - previous.close,
        }),
    }
}

/// Fetch quotes for every configured symbol concurrently and assemble the
/// snapshot. Transport errors surface as [`SnapshotError::Fetch`].
pub async fn build_snapshot(
    quotes: &QuoteClient,
    indices: &[IndexSymbol],
    basket: &[String],
) -> Result<MarketSnapshot, SnapshotError> {
    // (display key, api symbol, is_index) for the whole request set.
    let requests: Vec<(String, String, bool)> = indices
        .iter()
        .map(|ix| (ix.name.clone(), ix.symbol.clone(), true))
        .chain(basket.iter().map(|t| (t.clone(), t.clone(), false)))
        .collect();

    let fetches = requests.iter().map(|(_, symbol, _)| quotes.fetch_recent(symbol));
    let results = join_all(fetches).await;

    let mut fetched = Vec::with_capacity(requests.len());
    for ((key, _, is_index), result) in requests.into_iter().zip(results) {
        fetched.push((key, is_index, result?));
    }

    assemble(fetched)
}

/// Classify the fetched set and build the snapshot. Closed-market detection
/// runs across every symbol before any delta is taken, so a single empty
/// series short-circuits the whole snapshot.
fn assemble(fetched: Vec<(String, bool, Vec<DailyQuote>)>) -> Result<MarketSnapshot, SnapshotError> {
    if fetched.iter().any(|(_, _, q)| q.is_empty()) {
        return Err(SnapshotError::MarketClosed);
    }
    if fetched.iter().any(|(_, _, q)| q.len() < 2) {
        return Err(SnapshotError::InsufficientHistory);
    }

    let mut snapshot = MarketSnapshot::default();
    for (key, is_index, quotes) in fetched {
        let delta = delta_from_quotes(&quotes)?;
        if is_index {
            snapshot.indices.insert(key, delta);
        } else {
            snapshot.tickers.insert(key, delta);
        }
    }
    Ok(snapshot)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn quote(day: u32, open: f64, close: f64) -> DailyQuote {
        DailyQuote {
            date: NaiveDate::from_ymd_opt(2024, 12, day).unwrap(),
            open,
            close,
        }
    }

    #[test]
    fn delta_no_rows_is_market_closed() {
        assert!(matches!(
            delta_from_quotes(&[]),
            Err(SnapshotError::MarketClosed)
        ));
    }

    #[test]
    fn delta_one_row_is_insufficient_history() {
        assert!(matches!(
            delta_from_quotes(&[quote(30, 100.0, 101.0)]),
            Err(SnapshotError::InsufficientHistory)
        ));
    }

    #[test]
    fn delta_uses_latest_open_minus_previous_close() {
        let quotes = vec![
            quote(26, 98.0, 99.0),
            quote(27, 99.5, 100.5),
            quote(30, 102.0, 103.0),
        ];
        let delta = delta_from_quotes(&quotes).unwrap();
        assert!((delta.value - 102.0).abs() < 1e-12);
        assert!((delta.change - 1.5).abs() < 1e-12);
    }

    #[test]
    fn assemble_splits_indices_from_tickers() {
        let two_days = vec![quote(27, 99.5, 100.5), quote(30, 102.0, 103.0)];
        let snapshot = assemble(vec![
            ("sensex".into(), true, two_days.clone()),
            ("AAPL".into(), false, two_days),
        ])
        .unwrap();
        assert!(snapshot.indices.contains_key("sensex"));
        assert!(snapshot.tickers.contains_key("AAPL"));
        assert_eq!(snapshot.indices.len(), 1);
        assert_eq!(snapshot.tickers.len(), 1);
    }

    #[test]
    fn assemble_market_closed_wins_over_insufficient_history() {
        let result = assemble(vec![
            ("sensex".into(), true, vec![quote(30, 100.0, 101.0)]),
            ("AAPL".into(), false, vec![]),
        ]);
        assert!(matches!(result, Err(SnapshotError::MarketClosed)));
    }

    #[test]
    fn assemble_single_short_series_fails_the_whole_snapshot() {
        let two_days = vec![quote(27, 99.5, 100.5), quote(30, 102.0, 103.0)];
        let result = assemble(vec![
            ("sensex".into(), true, two_days),
            ("AAPL".into(), false, vec![quote(30, 100.0, 101.0)]),
        ]);
        assert!(matches!(result, Err(SnapshotError::InsufficientHistory)));
    }
}
