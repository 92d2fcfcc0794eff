use crate::model::{Interval, ProviderError};
use crate::provider::traits::HistoryProvider;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::info;

/// Binance public klines, used when the chart should show real history.
pub struct BinanceHistory {
    client: Client,
    base_url: String,
}

impl BinanceHistory {
    pub fn new(base_url: &str, timeout_seconds: u64) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// `btc_usdt`, `BTC/USDT` and `BTCUSDT` all become `BTCUSDT`.
pub fn pair_symbol(symbol: &str) -> String {
    symbol.replace(['_', '/', '-'], "").to_uppercase()
}

/// Extracts close prices (index 4, sent as strings) from a klines payload.
pub fn parse_closes(body: &str) -> Result<Vec<f64>, ProviderError> {
    let rows: Vec<Vec<Value>> =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

    rows.iter()
        .map(|row| {
            let close = row.get(4).ok_or_else(|| {
                ProviderError::Malformed("kline row without close price".into())
            })?;
            match close {
                Value::String(s) => s
                    .parse::<f64>()
                    .map_err(|e| ProviderError::Malformed(format!("close `{s}`: {e}"))),
                Value::Number(n) => n
                    .as_f64()
                    .ok_or_else(|| ProviderError::Malformed(format!("close `{n}`"))),
                other => Err(ProviderError::Malformed(format!("close `{other}`"))),
            }
        })
        .collect()
}

#[async_trait::async_trait]
impl HistoryProvider for BinanceHistory {
    async fn closes(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<f64>, ProviderError> {
        let url = format!("{}/klines", self.base_url);
        let pair = pair_symbol(symbol);
        info!("Fetching {} {} klines for {}", limit, interval.kline_code(), pair);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", pair.clone()),
                ("interval", interval.kline_code().to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::History(format!("{pair}: {status} {body}")));
        }

        let closes = parse_closes(&body)?;
        if closes.is_empty() {
            return Err(ProviderError::History(format!("{pair}: no klines")));
        }
        Ok(closes)
    }
}
