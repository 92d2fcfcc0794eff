use crate::model::{Analysis, Reason, Snapshot, Verdict};

/// Applies the four rules in order and returns the total with the reasons that fired.
pub fn score(snapshot: &Snapshot) -> (i32, Vec<Reason>) {
    let rsi = snapshot.rsi();
    let close = snapshot.close();
    let ema50 = snapshot.ema50();
    let mut total = 0;
    let mut reasons = Vec::with_capacity(4);

    if rsi < 30.0 {
        total += 2;
        reasons.push(Reason::Oversold);
    } else if rsi < 45.0 {
        total += 1;
        reasons.push(Reason::Recovering);
    } else if rsi > 70.0 {
        total -= 2;
        reasons.push(Reason::Overbought);
    }

    if snapshot.macd() > snapshot.macd_signal() {
        total += 2;
        reasons.push(Reason::BullishCrossover);
    } else {
        total -= 1;
        reasons.push(Reason::Bearish);
    }

    if close > ema50 {
        total += 1;
        reasons.push(Reason::PriceAboveEma50);
    } else {
        total -= 1;
        reasons.push(Reason::PriceBelowEma50);
    }

    if ema50 > snapshot.ema200() {
        total += 1;
        reasons.push(Reason::Uptrend);
    } else {
        total -= 1;
        reasons.push(Reason::Downtrend);
    }

    (total, reasons)
}

impl Verdict {
    /// First matching threshold wins.
    pub fn from_score(score: i32) -> Self {
        if score >= 4 {
            Verdict::StrongBuy
        } else if score >= 2 {
            Verdict::Buy
        } else if score <= -4 {
            Verdict::StrongSell
        } else if score <= -2 {
            Verdict::Sell
        } else {
            Verdict::Neutral
        }
    }
}

pub fn analyze(snapshot: &Snapshot) -> Analysis {
    let (score, reasons) = score(snapshot);
    Analysis {
        score,
        reasons,
        verdict: Verdict::from_score(score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Interval, Summary};
    use chrono::Utc;
    use std::collections::HashMap;

    fn snapshot(rsi: f64, macd: f64, signal: f64, close: f64, ema50: f64, ema200: f64) -> Snapshot {
        let indicators = HashMap::from([
            ("RSI".to_string(), rsi),
            ("MACD.macd".to_string(), macd),
            ("MACD.signal".to_string(), signal),
            ("close".to_string(), close),
            ("EMA50".to_string(), ema50),
            ("EMA200".to_string(), ema200),
        ]);
        Snapshot {
            symbol: "ASELS".into(),
            exchange: "BIST".into(),
            screener: "turkey".into(),
            interval: Interval::Day1,
            indicators,
            summary: Summary::default(),
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn all_bullish_rules_give_strong_buy() {
        let analysis = analyze(&snapshot(25.0, 1.2, 0.8, 110.0, 100.0, 90.0));
        assert_eq!(analysis.score, 6);
        assert_eq!(analysis.verdict, Verdict::StrongBuy);
        assert_eq!(
            analysis.reasons,
            vec![
                Reason::Oversold,
                Reason::BullishCrossover,
                Reason::PriceAboveEma50,
                Reason::Uptrend
            ]
        );
    }

    #[test]
    fn neutral_rsi_with_bearish_rest_gives_sell() {
        let analysis = analyze(&snapshot(50.0, 0.1, 0.5, 90.0, 100.0, 110.0));
        assert_eq!(analysis.score, -3);
        assert_eq!(analysis.verdict, Verdict::Sell);
        assert_eq!(
            analysis.reasons,
            vec![Reason::Bearish, Reason::PriceBelowEma50, Reason::Downtrend]
        );
    }

    #[test]
    fn rsi_bands() {
        assert_eq!(score(&snapshot(30.0, 0.0, 0.0, 0.0, 0.0, 0.0)).1[0], Reason::Recovering);
        assert_eq!(score(&snapshot(44.99, 0.0, 0.0, 0.0, 0.0, 0.0)).1[0], Reason::Recovering);
        assert_eq!(score(&snapshot(70.01, 0.0, 0.0, 0.0, 0.0, 0.0)).1[0], Reason::Overbought);
        // 45..=70 adds nothing, so the MACD reason comes first
        assert_eq!(score(&snapshot(45.0, 0.0, 0.0, 0.0, 0.0, 0.0)).1[0], Reason::Bearish);
        assert_eq!(score(&snapshot(70.0, 0.0, 0.0, 0.0, 0.0, 0.0)).1[0], Reason::Bearish);
    }

    #[test]
    fn overbought_and_bearish_reaches_strong_sell() {
        let analysis = analyze(&snapshot(80.0, -1.0, 0.0, 90.0, 100.0, 110.0));
        assert_eq!(analysis.score, -5);
        assert_eq!(analysis.verdict, Verdict::StrongSell);
    }

    #[test]
    fn scoring_is_deterministic() {
        let s = snapshot(38.0, 0.3, 0.2, 101.0, 100.0, 102.0);
        assert_eq!(score(&s), score(&s));
    }

    #[test]
    fn empty_snapshot_scores_as_all_zero() {
        let mut s = snapshot(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        s.indicators.clear();
        // RSI 0 is oversold, everything else compares equal
        assert_eq!(score(&s).0, 2 - 1 - 1 - 1);
    }

    #[test]
    fn verdict_boundaries() {
        assert_eq!(Verdict::from_score(6), Verdict::StrongBuy);
        assert_eq!(Verdict::from_score(4), Verdict::StrongBuy);
        assert_eq!(Verdict::from_score(3), Verdict::Buy);
        assert_eq!(Verdict::from_score(2), Verdict::Buy);
        assert_eq!(Verdict::from_score(1), Verdict::Neutral);
        assert_eq!(Verdict::from_score(0), Verdict::Neutral);
        assert_eq!(Verdict::from_score(-1), Verdict::Neutral);
        assert_eq!(Verdict::from_score(-2), Verdict::Sell);
        assert_eq!(Verdict::from_score(-3), Verdict::Sell);
        assert_eq!(Verdict::from_score(-4), Verdict::StrongSell);
        assert_eq!(Verdict::from_score(-5), Verdict::StrongSell);
    }
}
