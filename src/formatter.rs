// Caption and static texts sent back to the chat
use crate::model::{Analysis, CommandArgs, Snapshot};

pub const DISCLAIMER: &str = "_Disclaimer: this is not investment advice._";

pub const USAGE: &str = "Welcome to the TradingView chart analysis bot! 🧭\n\
    Usage: /ta ASELS 1D BIST or /ta BTCUSDT 1H BINANCE crypto";

pub const HELP: &str = "📋 Available commands:\n\
    /ta [symbol] [interval] [exchange] [screener] — technical analysis with chart\n\
    /start — welcome message\n\
    /help — command list\n\
    Intervals: 1, 5, 15, 1H, 4H, 1D, 1W, 1M";

/// Text placed inside a legacy-Markdown entity is taken literally up to the
/// entity's closing `delimiter`, so only that character has to go.
fn inside(delimiter: char, text: &str) -> String {
    text.chars().filter(|c| *c != delimiter).collect()
}

pub fn format_caption(args: &CommandArgs, snapshot: &Snapshot, analysis: &Analysis) -> String {
    let summary = &snapshot.summary;
    let reasons = analysis
        .reasons
        .iter()
        .map(|r| format!("• {r}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "📊 *{symbol}* `{interval}` _{exchange}/{screener}_\n\
         Price: `{close:.2}`\n\
         RSI: `{rsi:.2}` | MACD: `{macd:.2}` | Signal: `{signal:.2}`\n\
         EMA50: `{ema50:.2}` | EMA200: `{ema200:.2}`\n\
         \n\
         🧮 Score: `{score}` → {verdict}\n\
         📌 TradingView summary: *{rec}* ({buy}B / {sell}S / {neutral}N)\n\
         \n\
         ℹ️ Notes:\n\
         {reasons}\n\
         \n\
         {DISCLAIMER}",
        symbol = inside('*', &args.symbol.to_uppercase()),
        interval = inside('`', &args.interval_key),
        exchange = inside('_', &args.exchange),
        screener = inside('_', &args.screener),
        close = snapshot.close(),
        rsi = snapshot.rsi(),
        macd = snapshot.macd(),
        signal = snapshot.macd_signal(),
        ema50 = snapshot.ema50(),
        ema200 = snapshot.ema200(),
        score = analysis.score,
        verdict = analysis.verdict.label(),
        rec = summary.recommendation,
        buy = summary.buy,
        sell = summary.sell,
        neutral = summary.neutral,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Interval, Reason, Summary, Verdict};
    use chrono::Utc;
    use std::collections::HashMap;

    fn fixture() -> (CommandArgs, Snapshot, Analysis) {
        let args = CommandArgs {
            symbol: "asels".into(),
            interval_key: "1D".into(),
            interval: Interval::Day1,
            exchange: "BIST".into(),
            screener: "turkey".into(),
        };
        let snapshot = Snapshot {
            symbol: "ASELS".into(),
            exchange: "BIST".into(),
            screener: "turkey".into(),
            interval: Interval::Day1,
            indicators: HashMap::from([
                ("close".to_string(), 64.123),
                ("RSI".to_string(), 28.456),
                ("MACD.macd".to_string(), 0.5),
                ("MACD.signal".to_string(), 0.25),
                ("EMA50".to_string(), 60.0),
                ("EMA200".to_string(), 55.5),
            ]),
            summary: Summary {
                recommendation: "STRONG_BUY".into(),
                buy: 15,
                sell: 2,
                neutral: 9,
            },
            fetched_at: Utc::now(),
        };
        let analysis = Analysis {
            score: 6,
            reasons: vec![
                Reason::Oversold,
                Reason::BullishCrossover,
                Reason::PriceAboveEma50,
                Reason::Uptrend,
            ],
            verdict: Verdict::StrongBuy,
        };
        (args, snapshot, analysis)
    }

    #[test]
    fn caption_layout() {
        let (args, snapshot, analysis) = fixture();
        let caption = format_caption(&args, &snapshot, &analysis);
        let lines: Vec<&str> = caption.lines().collect();

        assert_eq!(lines[0], "📊 *ASELS* `1D` _BIST/turkey_");
        assert_eq!(lines[1], "Price: `64.12`");
        assert_eq!(lines[2], "RSI: `28.46` | MACD: `0.50` | Signal: `0.25`");
        assert_eq!(lines[3], "EMA50: `60.00` | EMA200: `55.50`");
        assert_eq!(lines[5], "🧮 Score: `6` → 🟢 *STRONG BUY*");
        assert_eq!(lines[6], "📌 TradingView summary: *STRONG_BUY* (15B / 2S / 9N)");
        assert_eq!(lines[9], "• RSI < 30 (oversold)");
        assert_eq!(lines[12], "• EMA50 > EMA200 (uptrend)");
        assert_eq!(*lines.last().unwrap(), DISCLAIMER);
    }

    #[test]
    fn header_shows_symbols_as_fetched() {
        let (mut args, snapshot, analysis) = fixture();
        args.symbol = "btc_usdt".into();
        args.interval_key = "1[D".into();
        let caption = format_caption(&args, &snapshot, &analysis);
        assert!(caption.starts_with("📊 *BTC_USDT* `1[D` _BIST/turkey_"));
    }

    #[test]
    fn header_fields_cannot_close_their_entity() {
        let (mut args, snapshot, analysis) = fixture();
        args.symbol = "a*b".into();
        args.interval_key = "1`D".into();
        args.exchange = "MY_EX".into();
        args.screener = "*crypto*".into();
        let caption = format_caption(&args, &snapshot, &analysis);
        assert!(caption.starts_with("📊 *AB* `1D` _MYEX/*crypto*_"));
    }
}
