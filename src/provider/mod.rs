// Market data: indicator snapshots and price history.

pub mod binance;
pub mod summary;
pub mod traits;
pub mod tradingview;

pub use binance::BinanceHistory;
pub use traits::{HistoryProvider, IndicatorProvider};
pub use tradingview::TradingViewProvider;
