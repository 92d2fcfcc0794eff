// Indicator math over closing prices (oldest first)

/// Exponential moving average seeded with the first price. Same length as input.
pub fn ema(prices: &[f64], period: usize) -> Vec<f64> {
    let Some(&first) = prices.first() else {
        return Vec::new();
    };
    let k = 2.0 / (period as f64 + 1.0);
    let mut prev = first;
    let mut out = Vec::with_capacity(prices.len());
    out.push(prev);
    for &price in &prices[1..] {
        prev = price * k + prev * (1.0 - k);
        out.push(prev);
    }
    out
}

/// RSI with Wilder smoothing. Values before the first full period read 50.
pub fn rsi(prices: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![50.0; prices.len()];
    if period == 0 || prices.len() <= period {
        return out;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for w in prices[..=period].windows(2) {
        let delta = w[1] - w[0];
        if delta > 0.0 {
            avg_gain += delta;
        } else {
            avg_loss -= delta;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    out[period] = rsi_value(avg_gain, avg_loss);

    for i in period + 1..prices.len() {
        let delta = prices[i] - prices[i - 1];
        let (gain, loss) = if delta > 0.0 { (delta, 0.0) } else { (0.0, -delta) };
        avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
        out[i] = rsi_value(avg_gain, avg_loss);
    }
    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain + avg_loss == 0.0 {
        return 50.0;
    }
    if avg_loss == 0.0 {
        return 100.0;
    }
    100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
}

/// MACD line (fast EMA - slow EMA) and its signal EMA.
pub fn macd(prices: &[f64], fast: usize, slow: usize, signal: usize) -> (Vec<f64>, Vec<f64>) {
    let line: Vec<f64> = ema(prices, fast)
        .iter()
        .zip(ema(prices, slow))
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema(&line, signal);
    (line, signal_line)
}

/// `n` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_of_constant_series_is_constant() {
        let out = ema(&[5.0; 30], 10);
        assert_eq!(out.len(), 30);
        assert!(out.iter().all(|v| (v - 5.0).abs() < 1e-12));
    }

    #[test]
    fn ema_follows_trend() {
        let prices: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        let out = ema(&prices, 5);
        assert!(out.windows(2).all(|w| w[1] > w[0]));
        assert!(*out.last().unwrap() < 20.0);
    }

    #[test]
    fn rsi_of_rising_series_is_100() {
        let prices: Vec<f64> = (1..=30).map(|i| i as f64).collect();
        let out = rsi(&prices, 14);
        assert_eq!(out[13], 50.0);
        assert_eq!(out[14], 100.0);
        assert_eq!(*out.last().unwrap(), 100.0);
    }

    #[test]
    fn rsi_of_flat_series_is_50() {
        let out = rsi(&[3.0; 20], 14);
        assert!(out.iter().all(|v| *v == 50.0));
    }

    #[test]
    fn rsi_short_input_is_neutral() {
        assert_eq!(rsi(&[1.0, 2.0], 14), vec![50.0, 50.0]);
    }

    #[test]
    fn macd_of_constant_series_is_zero() {
        let (line, signal) = macd(&[42.0; 40], 12, 26, 9);
        assert!(line.iter().all(|v| v.abs() < 1e-9));
        assert!(signal.iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn linspace_includes_both_ends() {
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(2.0, 9.0, 1), vec![2.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }
}
