// =============================================================================
// Chart Series Assembly
// =============================================================================
//
// Turns a ticker's ordered daily bars into the overlay series the front end
// plots: RSI-14, SMA-20, and 20-period Bollinger Bands (±2σ, sample std dev).
//
// The pipeline is a pure transformation. Rows that lack enough trailing
// history for any series, or whose RSI is undefined because the window saw no
// losses, are dropped; every emitted row has all four derived values defined.
// The surviving rows keep their original ascending date order, then get
// flattened into the columnar shape the chart API serializes.
// =============================================================================

use chrono::NaiveDate;
use serde::Serialize;

use crate::indicators::bollinger::rolling_bands;
use crate::indicators::rsi::rolling_rsi;
use crate::indicators::sma::rolling_sma;
use crate::types::PriceBar;

/// Trailing window for the RSI gain/loss averages.
pub const RSI_PERIOD: usize = 14;
/// Trailing window shared by the SMA and the Bollinger std dev.
pub const BOLLINGER_PERIOD: usize = 20;
/// Band half-width in standard deviations.
pub const BOLLINGER_NUM_STD: f64 = 2.0;

/// One fully-defined output point: the input bar plus every derived series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub rsi: f64,
    pub sma: f64,
    pub bollinger_upper: f64,
    pub bollinger_lower: f64,
}

/// Compute the indicator rows for `bars` (ordered ascending by date).
///
/// Emits one row per input bar for which RSI, SMA, and both Bollinger bands
/// are all defined; everything else is silently excluded. Empty or short
/// input yields an empty result — never an error.
pub fn compute_indicators(bars: &[PriceBar]) -> Vec<IndicatorRow> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let rsi = rolling_rsi(&closes, RSI_PERIOD);
    let sma = rolling_sma(&closes, BOLLINGER_PERIOD);
    let bands = rolling_bands(&closes, BOLLINGER_PERIOD, BOLLINGER_NUM_STD);

    let mut rows = Vec::new();
    for (i, bar) in bars.iter().enumerate() {
        if let (Some(rsi), Some(sma), Some(band)) = (rsi[i], sma[i], bands[i]) {
            rows.push(IndicatorRow {
                date: bar.date,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                rsi,
                sma,
                bollinger_upper: band.upper,
                bollinger_lower: band.lower,
            });
        }
    }
    rows
}

// =============================================================================
// Columnar output
// =============================================================================

/// Index-aligned columnar form of the indicator rows, serialized as the chart
/// endpoint's `data` payload. All nine columns always have equal length.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartColumns {
    /// ISO `YYYY-MM-DD` date strings.
    pub x: Vec<String>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub rsi: Vec<f64>,
    pub sma: Vec<f64>,
    pub bb_upper: Vec<f64>,
    pub bb_lower: Vec<f64>,
}

impl ChartColumns {
    /// Flatten trimmed rows into columns, preserving order.
    pub fn from_rows(rows: &[IndicatorRow]) -> Self {
        let mut cols = Self::default();
        for row in rows {
            cols.x.push(row.date.format("%Y-%m-%d").to_string());
            cols.open.push(row.open);
            cols.high.push(row.high);
            cols.low.push(row.low);
            cols.close.push(row.close);
            cols.rsi.push(row.rsi);
            cols.sma.push(row.sma);
            cols.bb_upper.push(row.bollinger_upper);
            cols.bb_lower.push(row.bollinger_lower);
        }
        cols
    }
}
