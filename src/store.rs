// =============================================================================
// Historical Bar Store — CSV-backed, validated at ingest
// =============================================================================
//
// In-memory store of daily price bars keyed by ticker, loaded once at startup
// from a directory of CSV files (one file per ticker, columns
// `date,open,high,low,close`). The chart pipeline trusts the ordering and
// uniqueness of what it receives, so both are enforced here at the boundary:
// a series whose dates are not strictly ascending is rejected and the file is
// skipped with a warning, leaving the other tickers usable.
//
// The store is immutable after load and shared behind an `Arc`.
// =============================================================================

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, warn};

use crate::types::PriceBar;

/// Errors raised while ingesting bar data.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{ticker}: duplicate date {date}")]
    DuplicateDate { ticker: String, date: NaiveDate },

    #[error("{ticker}: dates not ascending at {date}")]
    OutOfOrder { ticker: String, date: NaiveDate },
}

/// Parse daily bars from CSV (`date,open,high,low,close` with a header row).
pub fn read_csv_bars<R: std::io::Read>(reader: R) -> Result<Vec<PriceBar>, StoreError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut bars = Vec::new();
    for record in csv_reader.deserialize() {
        let bar: PriceBar = record?;
        bars.push(bar);
    }
    Ok(bars)
}

/// Ticker-keyed store of validated, ascending daily bar series.
#[derive(Debug, Default)]
pub struct BarStore {
    series: HashMap<String, Vec<PriceBar>>,
}

impl BarStore {
    /// Load every `*.csv` file under `dir`; the upper-cased file stem is the
    /// ticker. Files that fail to parse or validate are skipped with a
    /// warning so one bad file cannot take down the rest of the data set.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        let mut store = Self::default();

        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let ticker = stem.to_uppercase();

            let loaded = std::fs::File::open(&path)
                .map_err(StoreError::from)
                .and_then(read_csv_bars)
                .and_then(|bars| store.insert_series(ticker.clone(), bars));

            match loaded {
                Ok(count) => info!(ticker = %ticker, bars = count, "bar series loaded"),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping bar file")
                }
            }
        }

        info!(tickers = store.series.len(), dir = %dir.display(), "bar store ready");
        Ok(store)
    }

    /// Insert a series after validating that its dates are strictly
    /// ascending and unique. Returns the number of bars stored.
    pub fn insert_series(
        &mut self,
        ticker: String,
        bars: Vec<PriceBar>,
    ) -> Result<usize, StoreError> {
        for pair in bars.windows(2) {
            if pair[1].date == pair[0].date {
                return Err(StoreError::DuplicateDate {
                    ticker,
                    date: pair[1].date,
                });
            }
            if pair[1].date < pair[0].date {
                return Err(StoreError::OutOfOrder {
                    ticker,
                    date: pair[1].date,
                });
            }
        }
        let count = bars.len();
        self.series.insert(ticker, bars);
        Ok(count)
    }

    /// Bars for `ticker` with `start <= date <= end`, ascending.
    ///
    /// `None` means the ticker is unknown to the store; a known ticker with
    /// no bars in range yields `Some` of an empty vec. Callers use the
    /// distinction to answer 404 versus an empty chart.
    pub fn query(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Option<Vec<PriceBar>> {
        let bars = self.series.get(&ticker.to_uppercase())?;
        Some(
            bars.iter()
                .filter(|b| b.date >= start && b.date <= end)
                .copied()
                .collect(),
        )
    }

    /// Sorted list of tickers the store knows about.
    pub fn tickers(&self) -> Vec<String> {
        let mut tickers: Vec<String> = self.series.keys().cloned().collect();
        tickers.sort();
        tickers
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn bar(d: &str, close: f64) -> PriceBar {
        PriceBar {
            date: date(d),
            open: close - 0.5,
            high: close + 1.0,
            low: close - 1.0,
            close,
        }
    }

    #[test]
    fn csv_parsing_roundtrip() {
        let csv = "date,open,high,low,close\n\
                   2024-08-30,100.0,102.0,99.0,101.0\n\
                   2024-09-02,101.5,103.0,100.5,102.5\n";
        let bars = read_csv_bars(csv.as_bytes()).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, date("2024-08-30"));
        assert!((bars[1].close - 102.5).abs() < f64::EPSILON);
    }

    #[test]
    fn csv_malformed_row_is_an_error() {
        let csv = "date,open,high,low,close\n2024-08-30,not-a-number,1,1,1\n";
        assert!(read_csv_bars(csv.as_bytes()).is_err());
    }

    #[test]
    fn insert_rejects_duplicate_dates() {
        let mut store = BarStore::default();
        let err = store
            .insert_series(
                "AAPL".into(),
                vec![bar("2024-08-30", 100.0), bar("2024-08-30", 101.0)],
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateDate { .. }));
    }

    #[test]
    fn insert_rejects_out_of_order_dates() {
        let mut store = BarStore::default();
        let err = store
            .insert_series(
                "AAPL".into(),
                vec![bar("2024-09-02", 100.0), bar("2024-08-30", 101.0)],
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::OutOfOrder { .. }));
    }

    #[test]
    fn query_is_inclusive_on_both_ends() {
        let mut store = BarStore::default();
        store
            .insert_series(
                "AAPL".into(),
                vec![
                    bar("2024-08-29", 99.0),
                    bar("2024-08-30", 100.0),
                    bar("2024-09-02", 101.0),
                    bar("2024-09-03", 102.0),
                ],
            )
            .unwrap();

        let bars = store
            .query("AAPL", date("2024-08-30"), date("2024-09-02"))
            .unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, date("2024-08-30"));
        assert_eq!(bars[1].date, date("2024-09-02"));
    }

    #[test]
    fn query_unknown_ticker_is_none() {
        let store = BarStore::default();
        assert!(store
            .query("MSFT", date("2024-08-30"), date("2024-12-30"))
            .is_none());
    }

    #[test]
    fn query_known_ticker_empty_range_is_some_empty() {
        let mut store = BarStore::default();
        store
            .insert_series("AAPL".into(), vec![bar("2024-08-30", 100.0)])
            .unwrap();
        let bars = store
            .query("AAPL", date("2025-01-01"), date("2025-02-01"))
            .unwrap();
        assert!(bars.is_empty());
    }

    #[test]
    fn query_is_case_insensitive_on_ticker() {
        let mut store = BarStore::default();
        store
            .insert_series("AAPL".into(), vec![bar("2024-08-30", 100.0)])
            .unwrap();
        assert!(store
            .query("aapl", date("2024-08-01"), date("2024-09-01"))
            .is_some());
    }

    #[test]
    fn tickers_sorted() {
        let mut store = BarStore::default();
        store.insert_series("MSFT".into(), vec![]).unwrap();
        store.insert_series("AAPL".into(), vec![]).unwrap();
        assert_eq!(store.tickers(), vec!["AAPL".to_string(), "MSFT".to_string()]);
    }
}
