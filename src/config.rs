use crate::model::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Values substituted for `/ta` arguments the user left out.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CommandDefaults {
    pub symbol: String,
    pub interval: String,
    pub exchange: String,
    pub screener: String,
}

impl Default for CommandDefaults {
    fn default() -> Self {
        Self {
            symbol: "ASELS".into(),
            interval: "1D".into(),
            exchange: "BIST".into(),
            screener: "turkey".into(),
        }
    }
}

/// Where the chart series come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesSource {
    /// Illustrative lines interpolated around the latest snapshot.
    #[default]
    Synthetic,
    /// Real closes from Binance klines with indicators computed locally.
    Binance,
}

/// Everything in `config.json`. Every field is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub defaults: CommandDefaults,
    pub series_source: SeriesSource,
    pub provider_timeout_seconds: u64,
    pub send_timeout_seconds: u64,
    pub poll_timeout_seconds: u64,
    pub scanner_url: String,
    pub binance_url: String,
    pub telegram_api_url: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            defaults: CommandDefaults::default(),
            series_source: SeriesSource::default(),
            provider_timeout_seconds: 15,
            send_timeout_seconds: 30,
            poll_timeout_seconds: 30,
            scanner_url: "https://scanner.tradingview.com".into(),
            binance_url: "https://api.binance.com/api/v3".into(),
            telegram_api_url: "https://api.telegram.org".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram_bot_token: String,
    pub defaults: CommandDefaults,
    pub series_source: SeriesSource,
    pub provider_timeout_seconds: u64,
    pub send_timeout_seconds: u64,
    pub poll_timeout_seconds: u64,
    pub scanner_url: String,
    pub binance_url: String,
    pub telegram_api_url: String,
}

impl AppConfig {
    pub fn from_parts(file: FileConfig, token: Option<String>) -> Result<Self, ConfigError> {
        let telegram_bot_token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        Ok(Self {
            telegram_bot_token,
            defaults: file.defaults,
            series_source: file.series_source,
            provider_timeout_seconds: file.provider_timeout_seconds,
            send_timeout_seconds: file.send_timeout_seconds,
            poll_timeout_seconds: file.poll_timeout_seconds,
            scanner_url: file.scanner_url,
            binance_url: file.binance_url,
            telegram_api_url: file.telegram_api_url,
        })
    }
}

/// Reads `path` if it exists (built-in defaults otherwise) and takes the token from `BOT_TOKEN`.
pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let file = if Path::new(path).exists() {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)?
    } else {
        FileConfig::default()
    };
    AppConfig::from_parts(file, std::env::var("BOT_TOKEN").ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_builtin_defaults() {
        let file: FileConfig = serde_json::from_str("{}").unwrap();
        let config = AppConfig::from_parts(file, Some("123:abc".into())).unwrap();
        assert_eq!(config.defaults.symbol, "ASELS");
        assert_eq!(config.defaults.interval, "1D");
        assert_eq!(config.defaults.exchange, "BIST");
        assert_eq!(config.defaults.screener, "turkey");
        assert_eq!(config.series_source, SeriesSource::Synthetic);
        assert_eq!(config.provider_timeout_seconds, 15);
    }

    #[test]
    fn partial_defaults_keep_the_rest() {
        let file: FileConfig = serde_json::from_str(
            r#"{"defaults": {"symbol": "BTCUSDT", "exchange": "BINANCE"}, "series_source": "binance"}"#,
        )
        .unwrap();
        let config = AppConfig::from_parts(file, Some("t".into())).unwrap();
        assert_eq!(config.defaults.symbol, "BTCUSDT");
        assert_eq!(config.defaults.exchange, "BINANCE");
        assert_eq!(config.defaults.screener, "turkey");
        assert_eq!(config.series_source, SeriesSource::Binance);
    }

    #[test]
    fn token_is_required() {
        let missing = AppConfig::from_parts(FileConfig::default(), None);
        assert!(matches!(missing, Err(ConfigError::MissingToken)));
        let blank = AppConfig::from_parts(FileConfig::default(), Some("  ".into()));
        assert!(matches!(blank, Err(ConfigError::MissingToken)));
    }
}
