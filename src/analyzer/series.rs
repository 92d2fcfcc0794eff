use crate::analyzer::indicators::{ema, linspace, macd, rsi};
use crate::model::{ChartSeries, Snapshot};

/// Points drawn on the chart.
pub const CHART_POINTS: usize = 50;

/// Extra klines fetched so EMA200 has settled before the plotted window.
pub const HISTORY_WARMUP: usize = 250;

/// Illustrative lines interpolated around the latest snapshot values.
/// They show the shape of the current readings, not real price history.
pub fn synthetic(snapshot: &Snapshot) -> ChartSeries {
    let close = snapshot.close();
    let price = linspace(close * 0.98, close * 1.02, CHART_POINTS);
    let ema50 = price.iter().map(|p| p * 0.99).collect();
    let ema200 = price.iter().map(|p| p * 1.01).collect();

    ChartSeries {
        price,
        ema50,
        ema200,
        rsi: linspace(snapshot.rsi() - 10.0, snapshot.rsi(), CHART_POINTS),
        macd: linspace(snapshot.macd() - 0.1, snapshot.macd(), CHART_POINTS),
        signal: linspace(snapshot.macd_signal() - 0.1, snapshot.macd_signal(), CHART_POINTS),
    }
}

/// EMA50/EMA200, RSI14 and MACD 12/26/9 over real closes, trimmed to the last `points`.
pub fn from_closes(closes: &[f64], points: usize) -> ChartSeries {
    let (macd_line, signal_line) = macd(closes, 12, 26, 9);
    let start = closes.len().saturating_sub(points);
    let tail = |v: Vec<f64>| v[start..].to_vec();

    ChartSeries {
        price: closes[start..].to_vec(),
        ema50: tail(ema(closes, 50)),
        ema200: tail(ema(closes, 200)),
        rsi: tail(rsi(closes, 14)),
        macd: tail(macd_line),
        signal: tail(signal_line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Interval, Summary};
    use chrono::Utc;
    use std::collections::HashMap;

    #[test]
    fn synthetic_series_end_at_the_snapshot_values() {
        let snapshot = Snapshot {
            symbol: "ASELS".into(),
            exchange: "BIST".into(),
            screener: "turkey".into(),
            interval: Interval::Day1,
            indicators: HashMap::from([
                ("close".to_string(), 100.0),
                ("RSI".to_string(), 40.0),
                ("MACD.macd".to_string(), 0.5),
                ("MACD.signal".to_string(), 0.3),
            ]),
            summary: Summary::default(),
            fetched_at: Utc::now(),
        };
        let series = synthetic(&snapshot);
        assert_eq!(series.price.len(), CHART_POINTS);
        assert_eq!(series.signal.len(), CHART_POINTS);
        assert!((series.price[0] - 98.0).abs() < 1e-9);
        assert!((series.price[CHART_POINTS - 1] - 102.0).abs() < 1e-9);
        assert!((series.ema50[0] - 98.0 * 0.99).abs() < 1e-9);
        assert!((series.rsi[0] - 30.0).abs() < 1e-9);
        assert!((series.rsi[CHART_POINTS - 1] - 40.0).abs() < 1e-9);
        assert!((series.macd[CHART_POINTS - 1] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn history_is_trimmed_to_the_window() {
        let closes: Vec<f64> = (0..300).map(|i| 100.0 + i as f64).collect();
        let series = from_closes(&closes, CHART_POINTS);
        assert_eq!(series.price.len(), CHART_POINTS);
        assert_eq!(series.ema200.len(), CHART_POINTS);
        assert_eq!(series.rsi.len(), CHART_POINTS);
        assert_eq!(*series.price.last().unwrap(), 399.0);
        assert_eq!(*series.rsi.last().unwrap(), 100.0);
    }

    #[test]
    fn short_history_keeps_what_it_has() {
        let series = from_closes(&[1.0, 2.0, 3.0], CHART_POINTS);
        assert_eq!(series.price, vec![1.0, 2.0, 3.0]);
        assert_eq!(series.macd.len(), 3);
    }
}
