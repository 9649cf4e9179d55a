// =============================================================================
// Live Quote Provider — Yahoo-style chart API client
// =============================================================================
//
// Fetches the last few daily bars for a symbol from the public chart API
// (`…/v8/finance/chart/{symbol}?range=5d&interval=1d`). The response is an
// array-of-arrays affair with nullable entries for half-traded days; null
// rows are skipped during parsing. Only the open and close are kept — the
// snapshot endpoint needs nothing else.
//
// The base URL is injectable so tests (and a future paid provider) can point
// the client elsewhere.
// =============================================================================

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, instrument};

/// Public chart API host used when none is injected.
const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";

/// One trading day's open/close for a symbol, as reported by the quote API.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyQuote {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<QuoteArrays>,
}

#[derive(Debug, Deserialize)]
struct QuoteArrays {
    open: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Async quote API client. Cheap to clone; the inner reqwest client pools
/// connections across concurrent snapshot fetches.
#[derive(Clone)]
pub struct QuoteClient {
    client: reqwest::Client,
    base_url: String,
    range: String,
}

impl QuoteClient {
    /// Create a client against the public endpoint. `range` is the chart API
    /// range parameter, e.g. `"5d"`.
    pub fn new(range: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, range)
    }

    /// Create a client against a specific host (tests, alternate providers).
    pub fn with_base_url(base_url: impl Into<String>, range: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36")
            .build()
            .expect("failed to build reqwest client");

        Self {
            client,
            base_url: base_url.into(),
            range: range.into(),
        }
    }

    /// Fetch the most recent daily quotes for `symbol`, ascending by date.
    #[instrument(skip(self), name = "quotes::fetch_recent")]
    pub async fn fetch_recent(&self, symbol: &str) -> Result<Vec<DailyQuote>> {
        let url = format!(
            "{}/v8/finance/chart/{}?range={}&interval=1d",
            self.base_url, symbol, self.range
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("quote request for {symbol} failed"))?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("quote API returned {status} for {symbol}");
        }

        let body: ChartResponse = resp
            .json()
            .await
            .with_context(|| format!("failed to parse quote response for {symbol}"))?;

        let quotes = parse_chart(symbol, body)?;
        if let Some(last) = quotes.last() {
            debug!(symbol, count = quotes.len(), latest = %last.date, "daily quotes fetched");
        } else {
            debug!(symbol, "no recent daily quotes");
        }
        Ok(quotes)
    }
}

impl std::fmt::Debug for QuoteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuoteClient")
            .field("base_url", &self.base_url)
            .field("range", &self.range)
            .finish()
    }
}

/// Turn a chart response into ascending daily quotes, skipping null entries.
fn parse_chart(symbol: &str, resp: ChartResponse) -> Result<Vec<DailyQuote>> {
    let result = match resp.chart.result {
        Some(result) => result,
        None => {
            let detail = resp
                .chart
                .error
                .map(|e| format!("{}: {}", e.code, e.description))
                .unwrap_or_else(|| "empty result with no error".to_string());
            anyhow::bail!("quote API error for {symbol}: {detail}");
        }
    };

    let data = result
        .into_iter()
        .next()
        .with_context(|| format!("quote result array empty for {symbol}"))?;

    // A symbol with no recent trading days comes back with no timestamps at
    // all; treat that as zero quotes rather than a parse failure.
    let timestamps = data.timestamp.unwrap_or_default();

    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .with_context(|| format!("quote arrays missing for {symbol}"))?;

    let mut quotes = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = chrono::DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.naive_utc().date())
            .with_context(|| format!("invalid timestamp {ts} for {symbol}"))?;

        let open = quote.open.get(i).copied().flatten();
        let close = quote.close.get(i).copied().flatten();
        if let (Some(open), Some(close)) = (open, close) {
            quotes.push(DailyQuote { date, open, close });
        }
    }

    Ok(quotes)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> ChartResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parse_two_days() {
        // 2024-12-27 and 2024-12-30, midnight UTC.
        let resp = response(
            r#"{"chart":{"result":[{"timestamp":[1735257600,1735516800],
                "indicators":{"quote":[{"open":[230.5,231.0],"close":[231.9,233.4]}]}}],
                "error":null}}"#,
        );
        let quotes = parse_chart("AAPL", resp).unwrap();
        assert_eq!(quotes.len(), 2);
        assert!(quotes[0].date < quotes[1].date);
        assert!((quotes[1].open - 231.0).abs() < 1e-12);
        assert!((quotes[0].close - 231.9).abs() < 1e-12);
    }

    #[test]
    fn parse_skips_null_entries() {
        let resp = response(
            r#"{"chart":{"result":[{"timestamp":[1735257600,1735344000,1735516800],
                "indicators":{"quote":[{"open":[230.5,null,231.0],"close":[231.9,232.0,233.4]}]}}],
                "error":null}}"#,
        );
        let quotes = parse_chart("AAPL", resp).unwrap();
        assert_eq!(quotes.len(), 2);
    }

    #[test]
    fn parse_missing_timestamps_is_empty() {
        let resp = response(
            r#"{"chart":{"result":[{"timestamp":null,
                "indicators":{"quote":[{"open":[],"close":[]}]}}],"error":null}}"#,
        );
        assert!(parse_chart("AAPL", resp).unwrap().is_empty());
    }

    #[test]
    fn parse_api_error_surfaces_detail() {
        let resp = response(
            r#"{"chart":{"result":null,
                "error":{"code":"Not Found","description":"No data found"}}}"#,
        );
        let err = parse_chart("NOPE", resp).unwrap_err();
        assert!(err.to_string().contains("Not Found"));
    }
}
