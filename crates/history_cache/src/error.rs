use history_model::SymbolError;

/// Outcome of a failed lookup. `Clone` because one fetch result is handed
/// to every caller waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(#[from] SymbolError),
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}
