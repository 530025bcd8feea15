//! Process-lifetime cache of full price histories keyed by symbol.
//!
//! Entries expire lazily: age is checked on lookup, nothing sweeps in the
//! background. Concurrent misses on one symbol share a single upstream
//! fetch and all of its waiters see the same outcome.

mod cache;
mod error;
mod source;

pub use cache::{CacheConfig, DEFAULT_FETCH_TIMEOUT, DEFAULT_TTL, HistoryCache, HistoryEntry};
pub use error::CacheError;
pub use source::{HistorySource, SourceError};
