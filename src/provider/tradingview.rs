// TradingView scanner client
use crate::model::{CommandArgs, ProviderError, Snapshot};
use crate::provider::summary::compute_summary;
use crate::provider::traits::IndicatorProvider;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};

/// Columns requested from the scanner. Each gets the interval suffix on the wire.
pub const COLUMNS: &[&str] = &[
    "Recommend.Other",
    "Recommend.All",
    "Recommend.MA",
    "RSI",
    "RSI[1]",
    "Stoch.K",
    "Stoch.D",
    "Stoch.K[1]",
    "Stoch.D[1]",
    "CCI20",
    "CCI20[1]",
    "ADX",
    "ADX+DI",
    "ADX-DI",
    "ADX+DI[1]",
    "ADX-DI[1]",
    "AO",
    "AO[1]",
    "AO[2]",
    "Mom",
    "Mom[1]",
    "MACD.macd",
    "MACD.signal",
    "Rec.Stoch.RSI",
    "Stoch.RSI.K",
    "Rec.WR",
    "W.R",
    "Rec.BBPower",
    "BBPower",
    "Rec.UO",
    "UO",
    "EMA10",
    "SMA10",
    "EMA20",
    "SMA20",
    "EMA30",
    "SMA30",
    "EMA50",
    "SMA50",
    "EMA100",
    "SMA100",
    "EMA200",
    "SMA200",
    "Rec.Ichimoku",
    "Ichimoku.BLine",
    "Rec.VWMA",
    "VWMA",
    "Rec.HullMA9",
    "HullMA9",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "change",
];

#[derive(Debug, Deserialize)]
struct ScanResponse {
    data: Vec<ScanRow>,
}

#[derive(Debug, Deserialize)]
struct ScanRow {
    #[serde(rename = "s")]
    ticker: String,
    #[serde(rename = "d")]
    values: Vec<Value>,
}

pub struct TradingViewProvider {
    client: Client,
    base_url: String,
}

impl TradingViewProvider {
    pub fn new(base_url: &str, timeout_seconds: u64) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent("ta-chart-bot/0.1")
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn build_url(&self, screener: &str) -> String {
        format!("{}/{}/scan", self.base_url, screener.to_lowercase())
    }
}

/// Ticker in the `EXCHANGE:SYMBOL` form the scanner expects.
pub fn ticker(args: &CommandArgs) -> String {
    format!("{}:{}", args.exchange.to_uppercase(), args.symbol.to_uppercase())
}

pub fn build_body(args: &CommandArgs) -> Value {
    let suffix = args.interval.scanner_suffix();
    let columns: Vec<String> = COLUMNS.iter().map(|c| format!("{c}{suffix}")).collect();
    json!({
        "symbols": {
            "tickers": [ticker(args)],
            "query": { "types": [] }
        },
        "columns": columns
    })
}

/// Zips the first result row with the unsuffixed column names. Nulls are dropped.
pub fn parse_scan(body: &str, ticker: &str) -> Result<HashMap<String, f64>, ProviderError> {
    let response: ScanResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;
    let row = response
        .data
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::SymbolNotFound(ticker.to_string()))?;

    if row.values.len() != COLUMNS.len() {
        warn!(
            "Scanner returned {} values for {} columns ({})",
            row.values.len(),
            COLUMNS.len(),
            row.ticker
        );
    }

    Ok(COLUMNS
        .iter()
        .zip(row.values)
        .filter_map(|(name, value)| value.as_f64().map(|v| (name.to_string(), v)))
        .collect())
}

#[async_trait::async_trait]
impl IndicatorProvider for TradingViewProvider {
    async fn fetch(&self, args: &CommandArgs) -> Result<Snapshot, ProviderError> {
        let url = self.build_url(&args.screener);
        let ticker = ticker(args);
        info!("Requesting {} {:?} from {}", ticker, args.interval, url);

        let response = self
            .client
            .post(&url)
            .json(&build_body(args))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let indicators = parse_scan(&body, &ticker)?;
        let summary = compute_summary(&indicators);

        Ok(Snapshot {
            symbol: args.symbol.clone(),
            exchange: args.exchange.clone(),
            screener: args.screener.clone(),
            interval: args.interval,
            indicators,
            summary,
            fetched_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Interval;

    fn args(interval: Interval) -> CommandArgs {
        CommandArgs {
            symbol: "BTCUSDT".into(),
            interval_key: "1H".into(),
            interval,
            exchange: "binance".into(),
            screener: "crypto".into(),
        }
    }

    #[test]
    fn body_carries_ticker_and_suffixed_columns() {
        let body = build_body(&args(Interval::Hour1));
        assert_eq!(body["symbols"]["tickers"][0], "BINANCE:BTCUSDT");
        let columns = body["columns"].as_array().unwrap();
        assert_eq!(columns.len(), COLUMNS.len());
        assert!(columns.iter().any(|c| c == "RSI|60"));
        assert!(columns.iter().any(|c| c == "MACD.signal|60"));
    }

    #[test]
    fn daily_body_uses_bare_columns() {
        let body = build_body(&args(Interval::Day1));
        assert!(body["columns"].as_array().unwrap().iter().any(|c| c == "EMA200"));
    }

    #[test]
    fn parse_drops_nulls_and_keeps_names() {
        let mut values: Vec<Value> = vec![Value::Null; COLUMNS.len()];
        let rsi = COLUMNS.iter().position(|c| *c == "RSI").unwrap();
        let close = COLUMNS.iter().position(|c| *c == "close").unwrap();
        values[rsi] = json!(28.4);
        values[close] = json!(101.25);
        let body = json!({"totalCount": 1, "data": [{"s": "BIST:ASELS", "d": values}]}).to_string();

        let indicators = parse_scan(&body, "BIST:ASELS").unwrap();
        assert_eq!(indicators.len(), 2);
        assert_eq!(indicators["RSI"], 28.4);
        assert_eq!(indicators["close"], 101.25);
        assert!(!indicators.contains_key("EMA50"));
    }

    #[test]
    fn empty_data_means_unknown_symbol() {
        let body = r#"{"totalCount": 0, "data": []}"#;
        let err = parse_scan(body, "BIST:NOPE").unwrap_err();
        assert!(matches!(err, ProviderError::SymbolNotFound(t) if t == "BIST:NOPE"));
    }

    #[test]
    fn garbage_is_malformed() {
        let err = parse_scan("<html>blocked</html>", "BIST:ASELS").unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[test]
    fn screener_is_lowercased_in_url() {
        let provider = TradingViewProvider::new("https://scanner.example/", 5).unwrap();
        assert_eq!(provider.build_url("Turkey"), "https://scanner.example/turkey/scan");
    }
}
