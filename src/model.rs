// Core structs: Snapshot, Summary, Analysis, CommandArgs + error types
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Chart intervals accepted by `/ta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Minute1,
    Minute5,
    Minute15,
    Hour1,
    Hour4,
    Day1,
    Week1,
    Month1,
}

impl Interval {
    /// Maps a user key (`1`, `5`, `15`, `1H`, `4H`, `1D`, `1W`, `1M`) to an interval.
    /// Anything else falls back to the daily interval.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_uppercase().as_str() {
            "1" => Interval::Minute1,
            "5" => Interval::Minute5,
            "15" => Interval::Minute15,
            "1H" => Interval::Hour1,
            "4H" => Interval::Hour4,
            "1D" => Interval::Day1,
            "1W" => Interval::Week1,
            "1M" => Interval::Month1,
            _ => Interval::Day1,
        }
    }

    /// Column suffix used by the TradingView scanner. Daily columns carry none.
    pub fn scanner_suffix(&self) -> &'static str {
        match self {
            Interval::Minute1 => "|1",
            Interval::Minute5 => "|5",
            Interval::Minute15 => "|15",
            Interval::Hour1 => "|60",
            Interval::Hour4 => "|240",
            Interval::Day1 => "",
            Interval::Week1 => "|1W",
            Interval::Month1 => "|1M",
        }
    }

    /// Kline interval code used by Binance.
    pub fn kline_code(&self) -> &'static str {
        match self {
            Interval::Minute1 => "1m",
            Interval::Minute5 => "5m",
            Interval::Minute15 => "15m",
            Interval::Hour1 => "1h",
            Interval::Hour4 => "4h",
            Interval::Day1 => "1d",
            Interval::Week1 => "1w",
            Interval::Month1 => "1M",
        }
    }
}

/// Arguments of one `/ta` command after defaults were applied.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandArgs {
    pub symbol: String,
    /// Interval as typed by the user, shown back in the caption.
    pub interval_key: String,
    pub interval: Interval,
    pub exchange: String,
    pub screener: String,
}

/// Provider recommendation tally.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub recommendation: String,
    pub buy: u32,
    pub sell: u32,
    pub neutral: u32,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            recommendation: "N/A".into(),
            buy: 0,
            sell: 0,
            neutral: 0,
        }
    }
}

/// One point-in-time set of indicator values.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub symbol: String,
    pub exchange: String,
    pub screener: String,
    pub interval: Interval,
    pub indicators: HashMap<String, f64>,
    pub summary: Summary,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    /// Indicator value, or `None` when the provider did not return it.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.indicators.get(name).copied()
    }

    /// Indicator value with absent keys read as zero.
    pub fn get(&self, name: &str) -> f64 {
        self.value(name).unwrap_or(0.0)
    }

    pub fn rsi(&self) -> f64 {
        self.get("RSI")
    }

    pub fn macd(&self) -> f64 {
        self.get("MACD.macd")
    }

    pub fn macd_signal(&self) -> f64 {
        self.get("MACD.signal")
    }

    pub fn ema50(&self) -> f64 {
        self.get("EMA50")
    }

    pub fn ema200(&self) -> f64 {
        self.get("EMA200")
    }

    pub fn close(&self) -> f64 {
        self.get("close")
    }
}

/// Which scoring rule fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    Oversold,
    Recovering,
    Overbought,
    BullishCrossover,
    Bearish,
    PriceAboveEma50,
    PriceBelowEma50,
    Uptrend,
    Downtrend,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Reason::Oversold => "RSI < 30 (oversold)",
            Reason::Recovering => "RSI 30-45 (recovering)",
            Reason::Overbought => "RSI > 70 (overbought)",
            Reason::BullishCrossover => "MACD > Signal (bullish crossover)",
            Reason::Bearish => "MACD < Signal (bearish)",
            Reason::PriceAboveEma50 => "Price above EMA50",
            Reason::PriceBelowEma50 => "Price below EMA50",
            Reason::Uptrend => "EMA50 > EMA200 (uptrend)",
            Reason::Downtrend => "EMA50 < EMA200 (downtrend)",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    StrongBuy,
    Buy,
    Neutral,
    Sell,
    StrongSell,
}

impl Verdict {
    /// Caption label, legacy Markdown.
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::StrongBuy => "🟢 *STRONG BUY*",
            Verdict::Buy => "🟢 *BUY*",
            Verdict::Neutral => "⚪ *NEUTRAL*",
            Verdict::Sell => "🔴 *SELL*",
            Verdict::StrongSell => "🔴 *STRONG SELL*",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub score: i32,
    pub reasons: Vec<Reason>,
    pub verdict: Verdict,
}

/// The six series drawn on the chart, all of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSeries {
    pub price: Vec<f64>,
    pub ema50: Vec<f64>,
    pub ema200: Vec<f64>,
    pub rsi: Vec<f64>,
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider responded {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("exchange or symbol not found: {0}")]
    SymbolNotFound(String),
    #[error("no response within {0}s")]
    Timeout(u64),
    #[error("price history unavailable: {0}")]
    History(String),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("series lengths differ")]
    LengthMismatch,
    #[error("series `{0}` contains a non-finite value")]
    InvalidInput(&'static str),
    #[error("drawing failed: {0}")]
    Draw(String),
    #[error("font loading failed: {0}")]
    Font(String),
    #[error("png encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("telegram request failed: {0}")]
    ApiError(#[from] reqwest::Error),
    #[error("telegram responded {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("unexpected telegram response: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("BOT_TOKEN is not set")]
    MissingToken,
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Any failure of the `/ta` pipeline.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_interval_keys_map_to_their_interval() {
        assert_eq!(Interval::from_key("1"), Interval::Minute1);
        assert_eq!(Interval::from_key("15"), Interval::Minute15);
        assert_eq!(Interval::from_key("1H"), Interval::Hour1);
        assert_eq!(Interval::from_key("4h"), Interval::Hour4);
        assert_eq!(Interval::from_key("1W"), Interval::Week1);
        assert_eq!(Interval::from_key("1M"), Interval::Month1);
    }

    #[test]
    fn unknown_interval_falls_back_to_daily() {
        assert_eq!(Interval::from_key("7X"), Interval::Day1);
        assert_eq!(Interval::from_key(""), Interval::Day1);
        assert_eq!(Interval::from_key("30"), Interval::Day1);
    }

    #[test]
    fn daily_columns_have_no_suffix() {
        assert_eq!(Interval::Day1.scanner_suffix(), "");
        assert_eq!(Interval::Hour4.scanner_suffix(), "|240");
    }

    #[test]
    fn missing_indicator_reads_as_zero() {
        let snapshot = Snapshot {
            symbol: "ASELS".into(),
            exchange: "BIST".into(),
            screener: "turkey".into(),
            interval: Interval::Day1,
            indicators: HashMap::from([("RSI".to_string(), 41.5)]),
            summary: Summary::default(),
            fetched_at: Utc::now(),
        };
        assert_eq!(snapshot.rsi(), 41.5);
        assert_eq!(snapshot.macd(), 0.0);
        assert_eq!(snapshot.ema200(), 0.0);
        assert_eq!(snapshot.value("close"), None);
    }
}
