// notifier/telegram/command_handler.rs

use crate::analyzer::analyze;
use crate::analyzer::series::{self, CHART_POINTS, HISTORY_WARMUP};
use crate::chart::render_chart;
use crate::config::{AppConfig, CommandDefaults, SeriesSource};
use crate::formatter::{HELP, USAGE, format_caption};
use crate::model::{
    Analysis, ChartSeries, CommandArgs, CommandError, Interval, NotifyError, ProviderError,
    RenderError, Snapshot,
};
use crate::provider::{HistoryProvider, IndicatorProvider};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// Where replies go. Implemented by the Telegram client.
#[async_trait::async_trait]
pub trait Replier: Send + Sync {
    async fn reply_text(&self, chat_id: i64, text: &str) -> Result<(), NotifyError>;
    async fn reply_photo(&self, chat_id: i64, png: Vec<u8>, caption: &str) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Help,
    Ta(Vec<String>),
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Replied,
    Failed(String),
    Ignored,
}

/// Parses `/name[@bot] args…`. Text that is not a command, or a command
/// addressed to a bot other than `bot_username`, yields `None`.
pub fn parse_command(text: &str, bot_username: &str) -> Option<Command> {
    let mut parts = text.split_whitespace();
    let head = parts.next()?.strip_prefix('/')?;
    let name = match head.split_once('@') {
        Some((name, addressee)) if addressee.eq_ignore_ascii_case(bot_username) => name,
        Some(_) => return None,
        None => head,
    };
    let command = match name.to_lowercase().as_str() {
        "start" => Command::Start,
        "help" => Command::Help,
        "ta" => Command::Ta(parts.map(str::to_string).collect()),
        other => Command::Unknown(other.to_string()),
    };
    Some(command)
}

/// Longest argument taken from the user; the rest is cut off so the caption
/// stays under Telegram's 1024-character limit.
pub const MAX_ARG_CHARS: usize = 32;

/// Up to four positional arguments; missing ones come from `defaults`.
pub fn resolve_args(args: &[String], defaults: &CommandDefaults) -> CommandArgs {
    let arg = |i: usize, default: &str| match args.get(i) {
        Some(given) => given.chars().take(MAX_ARG_CHARS).collect(),
        None => default.to_string(),
    };
    let interval_key = arg(1, &defaults.interval);

    CommandArgs {
        symbol: arg(0, &defaults.symbol).to_uppercase(),
        interval: Interval::from_key(&interval_key),
        interval_key,
        exchange: arg(2, &defaults.exchange),
        screener: arg(3, &defaults.screener),
    }
}

/// Everything one `/ta` reply consists of.
pub struct Report {
    pub caption: String,
    pub chart: Vec<u8>,
    pub analysis: Analysis,
}

/// Fetch → score → series → render → format.
pub struct TaPipeline {
    provider: Arc<dyn IndicatorProvider>,
    history: Arc<dyn HistoryProvider>,
    config: Arc<AppConfig>,
}

impl TaPipeline {
    pub fn new(
        provider: Arc<dyn IndicatorProvider>,
        history: Arc<dyn HistoryProvider>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            provider,
            history,
            config,
        }
    }

    pub fn defaults(&self) -> &CommandDefaults {
        &self.config.defaults
    }

    pub async fn run(&self, args: &CommandArgs) -> Result<Report, CommandError> {
        let limit = self.config.provider_timeout_seconds;
        let snapshot = timeout(Duration::from_secs(limit), self.provider.fetch(args))
            .await
            .map_err(|_| ProviderError::Timeout(limit))??;

        let analysis = analyze(&snapshot);
        info!(
            "{}:{} ({}) {:?} at {}: score {} ({:?}), provider says {}",
            snapshot.exchange,
            snapshot.symbol,
            snapshot.screener,
            snapshot.interval,
            snapshot.fetched_at,
            analysis.score,
            analysis.verdict,
            snapshot.summary.recommendation
        );

        let chart_series = self.chart_series(args, &snapshot).await?;
        let symbol = args.symbol.clone();
        let chart = tokio::task::spawn_blocking(move || render_chart(&symbol, &chart_series))
            .await
            .map_err(|e| RenderError::Draw(e.to_string()))??;

        let caption = format_caption(args, &snapshot, &analysis);
        Ok(Report {
            caption,
            chart,
            analysis,
        })
    }

    async fn chart_series(
        &self,
        args: &CommandArgs,
        snapshot: &Snapshot,
    ) -> Result<ChartSeries, ProviderError> {
        match self.config.series_source {
            SeriesSource::Synthetic => Ok(series::synthetic(snapshot)),
            SeriesSource::Binance => {
                let limit = self.config.provider_timeout_seconds;
                let closes = timeout(
                    Duration::from_secs(limit),
                    self.history
                        .closes(&args.symbol, args.interval, CHART_POINTS + HISTORY_WARMUP),
                )
                .await
                .map_err(|_| ProviderError::Timeout(limit))??;
                Ok(series::from_closes(&closes, CHART_POINTS))
            }
        }
    }
}

/// Text the user sees when the pipeline fails.
pub fn error_reply(err: &CommandError) -> String {
    match err {
        CommandError::Provider(e) => format!("❌ Data error: {e}"),
        CommandError::Render(e) => format!("❌ Chart error: {e}"),
    }
}

async fn reply_or_warn(replier: &dyn Replier, chat_id: i64, text: &str) -> CommandOutcome {
    match replier.reply_text(chat_id, text).await {
        Ok(()) => CommandOutcome::Replied,
        Err(e) => {
            warn!("Reply to chat {} failed: {:?}", chat_id, e);
            CommandOutcome::Failed(e.to_string())
        }
    }
}

/// Handles one incoming message start to finish.
pub async fn handle_command(
    text: &str,
    chat_id: i64,
    bot_username: &str,
    pipeline: &TaPipeline,
    replier: &dyn Replier,
) -> CommandOutcome {
    let Some(command) = parse_command(text, bot_username) else {
        return CommandOutcome::Ignored;
    };
    info!("Handling command: {:?}", command);

    let args = match command {
        Command::Start => return reply_or_warn(replier, chat_id, USAGE).await,
        Command::Help => return reply_or_warn(replier, chat_id, HELP).await,
        Command::Unknown(name) => {
            let hint = format!("🤖 Unknown command /{name}. Type /help for a list of commands.");
            return reply_or_warn(replier, chat_id, &hint).await;
        }
        Command::Ta(args) => resolve_args(&args, pipeline.defaults()),
    };

    let sent = match pipeline.run(&args).await {
        Ok(report) => {
            info!("Sending {:?} chart for {}", report.analysis.verdict, args.symbol);
            replier
                .reply_photo(chat_id, report.chart, &report.caption)
                .await
                .map_err(|e| format!("❌ Error: {e}"))
        }
        Err(e) => {
            error!("Analysis of {:?} failed: {:?}", args, e);
            Err(error_reply(&e))
        }
    };

    match sent {
        Ok(()) => CommandOutcome::Replied,
        Err(message) => {
            if let Err(e) = replier.reply_text(chat_id, &message).await {
                warn!("Error reply to chat {} failed: {:?}", chat_id, e);
            }
            CommandOutcome::Failed(message)
        }
    }
}
