// Recommendation tally over the scanner columns
use crate::model::Summary;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Buy,
    Sell,
    Neutral,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub buy: u32,
    pub sell: u32,
    pub neutral: u32,
}

impl Tally {
    fn add(&mut self, vote: Option<Vote>) {
        match vote {
            Some(Vote::Buy) => self.buy += 1,
            Some(Vote::Sell) => self.sell += 1,
            Some(Vote::Neutral) => self.neutral += 1,
            None => {}
        }
    }
}

const MOVING_AVERAGES: &[&str] = &[
    "EMA10", "SMA10", "EMA20", "SMA20", "EMA30", "SMA30", "EMA50", "SMA50", "EMA100", "SMA100",
    "EMA200", "SMA200",
];

/// All named values, or `None` if any of them is absent.
fn values<const N: usize>(ind: &HashMap<String, f64>, names: [&str; N]) -> Option<[f64; N]> {
    let mut out = [0.0; N];
    for (slot, name) in out.iter_mut().zip(names) {
        *slot = *ind.get(name)?;
    }
    Some(out)
}

pub fn rsi_vote(rsi: f64, prev: f64) -> Vote {
    if rsi < 30.0 && prev < rsi {
        Vote::Buy
    } else if rsi > 70.0 && prev > rsi {
        Vote::Sell
    } else {
        Vote::Neutral
    }
}

pub fn stoch_vote(k: f64, d: f64, k1: f64, d1: f64) -> Vote {
    if k < 20.0 && d < 20.0 && k > d && k1 < d1 {
        Vote::Buy
    } else if k > 80.0 && d > 80.0 && k < d && k1 > d1 {
        Vote::Sell
    } else {
        Vote::Neutral
    }
}

pub fn cci_vote(cci: f64, prev: f64) -> Vote {
    if cci < -100.0 && cci > prev {
        Vote::Buy
    } else if cci > 100.0 && cci < prev {
        Vote::Sell
    } else {
        Vote::Neutral
    }
}

pub fn adx_vote(adx: f64, plus: f64, minus: f64, plus1: f64, minus1: f64) -> Vote {
    if adx > 20.0 && plus1 < minus1 && plus > minus {
        Vote::Buy
    } else if adx > 20.0 && plus1 > minus1 && plus < minus {
        Vote::Sell
    } else {
        Vote::Neutral
    }
}

pub fn ao_vote(ao: f64, ao1: f64, ao2: f64) -> Vote {
    if (ao > 0.0 && ao1 < 0.0) || (ao > 0.0 && ao1 > 0.0 && ao > ao1 && ao2 > ao1) {
        Vote::Buy
    } else if (ao < 0.0 && ao1 > 0.0) || (ao < 0.0 && ao1 < 0.0 && ao < ao1 && ao2 < ao1) {
        Vote::Sell
    } else {
        Vote::Neutral
    }
}

pub fn momentum_vote(mom: f64, prev: f64) -> Vote {
    if mom > prev {
        Vote::Buy
    } else if mom < prev {
        Vote::Sell
    } else {
        Vote::Neutral
    }
}

pub fn macd_vote(macd: f64, signal: f64) -> Vote {
    if macd > signal {
        Vote::Buy
    } else if macd < signal {
        Vote::Sell
    } else {
        Vote::Neutral
    }
}

/// Provider-side `Rec.*` columns: 1 buy, -1 sell.
pub fn simple_vote(rec: f64) -> Vote {
    if rec == 1.0 {
        Vote::Buy
    } else if rec == -1.0 {
        Vote::Sell
    } else {
        Vote::Neutral
    }
}

pub fn moving_average_vote(ma: f64, close: f64) -> Vote {
    if ma < close {
        Vote::Buy
    } else if ma > close {
        Vote::Sell
    } else {
        Vote::Neutral
    }
}

pub fn oscillators(ind: &HashMap<String, f64>) -> Tally {
    let mut tally = Tally::default();
    tally.add(values(ind, ["RSI", "RSI[1]"]).map(|[r, r1]| rsi_vote(r, r1)));
    tally.add(
        values(ind, ["Stoch.K", "Stoch.D", "Stoch.K[1]", "Stoch.D[1]"])
            .map(|[k, d, k1, d1]| stoch_vote(k, d, k1, d1)),
    );
    tally.add(values(ind, ["CCI20", "CCI20[1]"]).map(|[c, c1]| cci_vote(c, c1)));
    tally.add(
        values(ind, ["ADX", "ADX+DI", "ADX-DI", "ADX+DI[1]", "ADX-DI[1]"])
            .map(|[a, p, m, p1, m1]| adx_vote(a, p, m, p1, m1)),
    );
    tally.add(values(ind, ["AO", "AO[1]", "AO[2]"]).map(|[a, a1, a2]| ao_vote(a, a1, a2)));
    tally.add(values(ind, ["Mom", "Mom[1]"]).map(|[m, m1]| momentum_vote(m, m1)));
    tally.add(values(ind, ["MACD.macd", "MACD.signal"]).map(|[m, s]| macd_vote(m, s)));
    for rec in ["Rec.Stoch.RSI", "Rec.WR", "Rec.BBPower", "Rec.UO"] {
        tally.add(ind.get(rec).map(|&v| simple_vote(v)));
    }
    tally
}

pub fn moving_averages(ind: &HashMap<String, f64>) -> Tally {
    let mut tally = Tally::default();
    for name in MOVING_AVERAGES {
        tally.add(values(ind, [*name, "close"]).map(|[ma, close]| moving_average_vote(ma, close)));
    }
    for rec in ["Rec.Ichimoku", "Rec.VWMA", "Rec.HullMA9"] {
        tally.add(ind.get(rec).map(|&v| simple_vote(v)));
    }
    tally
}

/// Label for a `Recommend.*` value in [-1, 1].
pub fn recommendation_label(value: f64) -> Option<&'static str> {
    if (-1.0..-0.5).contains(&value) {
        Some("STRONG_SELL")
    } else if (-0.5..-0.1).contains(&value) {
        Some("SELL")
    } else if (-0.1..=0.1).contains(&value) {
        Some("NEUTRAL")
    } else if value > 0.1 && value <= 0.5 {
        Some("BUY")
    } else if value > 0.5 && value <= 1.0 {
        Some("STRONG_BUY")
    } else {
        None
    }
}

pub fn compute_summary(ind: &HashMap<String, f64>) -> Summary {
    let osc = oscillators(ind);
    let ma = moving_averages(ind);
    let recommendation = ind
        .get("Recommend.All")
        .and_then(|&v| recommendation_label(v))
        .unwrap_or("N/A")
        .to_string();

    Summary {
        recommendation,
        buy: osc.buy + ma.buy,
        sell: osc.sell + ma.sell,
        neutral: osc.neutral + ma.neutral,
    }
}
