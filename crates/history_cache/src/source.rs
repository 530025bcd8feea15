use async_trait::async_trait;
use history_model::{PricePoint, Symbol};

pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// Where the cache gets a symbol's full history on a miss.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// All available closes for `symbol`, oldest first. An empty vector means
    /// the provider answered but had nothing, which is not an error.
    async fn fetch_history(&self, symbol: &Symbol) -> Result<Vec<PricePoint>, SourceError>;
}
