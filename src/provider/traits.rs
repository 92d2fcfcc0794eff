use crate::model::{CommandArgs, Interval, ProviderError, Snapshot};

/// Source of indicator snapshots.
#[async_trait::async_trait]
pub trait IndicatorProvider: Send + Sync {
    async fn fetch(&self, args: &CommandArgs) -> Result<Snapshot, ProviderError>;
}

/// Source of historical closing prices, oldest first.
#[async_trait::async_trait]
pub trait HistoryProvider: Send + Sync {
    async fn closes(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<f64>, ProviderError>;
}
