mod analyzer;
mod chart;
mod config;
mod formatter;
mod model;
mod notifier;
mod provider;

use config::load_config;
use notifier::TelegramNotifier;
use notifier::telegram::command_handler::TaPipeline;
use provider::{BinanceHistory, TradingViewProvider};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // .env is optional; BOT_TOKEN may come from the real environment
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        error!("😱 Panic occurred: {}", panic_info);
    }));

    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.json".into());
    let config = match load_config(&config_path) {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!("Config load error: {}", e);
            return;
        }
    };

    let provider = match TradingViewProvider::new(&config.scanner_url, config.provider_timeout_seconds) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to create TradingView client: {}", e);
            return;
        }
    };
    let history = match BinanceHistory::new(&config.binance_url, config.provider_timeout_seconds) {
        Ok(h) => h,
        Err(e) => {
            error!("Failed to create Binance client: {}", e);
            return;
        }
    };
    let mut notifier = match TelegramNotifier::new(&config) {
        Ok(n) => n,
        Err(e) => {
            error!("Failed to create Telegram client: {}", e);
            return;
        }
    };
    if let Err(e) = notifier.identify().await {
        error!("getMe failed, check BOT_TOKEN: {}", e);
        return;
    }
    let notifier = Arc::new(notifier);

    let pipeline = Arc::new(TaPipeline::new(
        Arc::new(provider),
        Arc::new(history),
        config.clone(),
    ));

    info!(
        "Defaults: {} {} {} {} | chart series: {:?}",
        config.defaults.symbol,
        config.defaults.interval,
        config.defaults.exchange,
        config.defaults.screener,
        config.series_source
    );

    if let Err(e) = notifier.set_my_commands().await {
        warn!("setMyCommands failed: {}", e);
    }

    tokio::select! {
        _ = TelegramNotifier::listen_for_commands(notifier, pipeline) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down.");
        }
    }
}
