// =============================================================================
// Runtime Configuration — desk settings with atomic save
// =============================================================================
//
// Central configuration hub for the Meridian market desk. Persistence uses an
// atomic tmp + rename pattern to prevent corruption on crash. All fields
// carry `#[serde(default)]` so that adding new fields never breaks loading an
// older config file.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_data_dir() -> String {
    "data/bars".to_string()
}

fn default_chart_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 8, 30).expect("valid default chart start")
}

fn default_chart_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 30).expect("valid default chart end")
}

fn default_indices() -> Vec<IndexSymbol> {
    vec![
        IndexSymbol {
            name: "sensex".to_string(),
            symbol: "^BSESN".to_string(),
        },
        IndexSymbol {
            name: "nifty".to_string(),
            symbol: "^NSEI".to_string(),
        },
    ]
}

fn default_basket() -> Vec<String> {
    [
        "AAPL", "AMZN", "NFLX", "BRK-B", "NVDA", "JPM", "TSLA", "META", "MSFT", "GOOG",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_quote_range() -> String {
    "5d".to_string()
}

// =============================================================================
// Config types
// =============================================================================

/// A market index shown on the snapshot, with its display name and the
/// symbol the quote API knows it by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSymbol {
    pub name: String,
    pub symbol: String,
}

/// Top-level runtime configuration for the desk.
///
/// Every field has a serde default so that older JSON files missing new
/// fields will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Address the API server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Directory of per-ticker CSV bar files loaded at startup.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Inclusive chart range used when the caller supplies no dates. A fixed
    /// historical window, not "last N days".
    #[serde(default = "default_chart_start")]
    pub chart_default_start: NaiveDate,

    #[serde(default = "default_chart_end")]
    pub chart_default_end: NaiveDate,

    /// Indices shown on the snapshot.
    #[serde(default = "default_indices")]
    pub indices: Vec<IndexSymbol>,

    /// Fixed ticker basket shown on the snapshot.
    #[serde(default = "default_basket")]
    pub basket: Vec<String>,

    /// Completion model used by the chat proxy.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Quote API range parameter for snapshot fetches.
    #[serde(default = "default_quote_range")]
    pub quote_range: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            data_dir: default_data_dir(),
            chart_default_start: default_chart_start(),
            chart_default_end: default_chart_end(),
            indices: default_indices(),
            basket: default_basket(),
            chat_model: default_chat_model(),
            quote_range: default_quote_range(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            tickers = config.basket.len(),
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.bind_addr, "0.0.0.0:3001");
        assert_eq!(cfg.data_dir, "data/bars");
        assert_eq!(cfg.chart_default_start.to_string(), "2024-08-30");
        assert_eq!(cfg.chart_default_end.to_string(), "2024-12-30");
        assert_eq!(cfg.indices.len(), 2);
        assert_eq!(cfg.indices[0].name, "sensex");
        assert_eq!(cfg.indices[1].symbol, "^NSEI");
        assert_eq!(cfg.basket.len(), 10);
        assert_eq!(cfg.basket[0], "AAPL");
        assert_eq!(cfg.basket[3], "BRK-B");
        assert_eq!(cfg.chat_model, "gpt-4o-mini");
        assert_eq!(cfg.quote_range, "5d");
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.bind_addr, "0.0.0.0:3001");
        assert_eq!(cfg.basket.len(), 10);
        assert_eq!(cfg.chat_model, "gpt-4o-mini");
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "basket": ["NVDA"], "chat_model": "gpt-4o" }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.basket, vec!["NVDA"]);
        assert_eq!(cfg.chat_model, "gpt-4o");
        assert_eq!(cfg.bind_addr, "0.0.0.0:3001");
        assert_eq!(cfg.indices.len(), 2);
    }

    #[test]
    fn chart_range_dates_roundtrip_as_iso_strings() {
        let cfg = RuntimeConfig::default();
        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(json["chart_default_start"], "2024-08-30");
        assert_eq!(json["chart_default_end"], "2024-12-30");

        let cfg2: RuntimeConfig = serde_json::from_value(json).unwrap();
        assert_eq!(cfg.chart_default_start, cfg2.chart_default_start);
        assert_eq!(cfg.basket, cfg2.basket);
    }
}
