use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use history_model::{PricePoint, Symbol};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

use crate::error::CacheError;
use crate::source::HistorySource;

pub const DEFAULT_TTL: Duration = Duration::from_secs(30);
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Entries this old or older are refetched on the next lookup.
    pub ttl: Duration,
    /// Upper bound on one upstream fetch. Hitting it counts as a failure.
    pub fetch_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl: DEFAULT_TTL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

/// A complete history as returned by one successful fetch. Never mutated;
/// a refresh stores a new entry.
#[derive(Debug)]
pub struct HistoryEntry {
    symbol: Symbol,
    points: Vec<PricePoint>,
    fetched_at: Instant,
}

impl HistoryEntry {
    fn new(symbol: Symbol, points: Vec<PricePoint>) -> Self {
        HistoryEntry {
            symbol,
            points,
            fetched_at: Instant::now(),
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn fetched_at(&self) -> Instant {
        self.fetched_at
    }

    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }
}

type FetchOutcome = Result<Arc<HistoryEntry>, CacheError>;

struct InFlight {
    generation: u64,
    outcome: Shared<BoxFuture<'static, FetchOutcome>>,
}

#[derive(Default)]
struct Slot {
    entry: Option<Arc<HistoryEntry>>,
    in_flight: Option<InFlight>,
}

struct CacheState {
    source: Arc<dyn HistorySource>,
    config: CacheConfig,
    // held only for map bookkeeping, never across an await
    slots: Mutex<HashMap<Symbol, Slot>>,
    generations: AtomicU64,
}

impl CacheState {
    fn lock_slots(&self) -> MutexGuard<'_, HashMap<Symbol, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records the result of fetch `generation`. Ignored when the slot has
    /// since moved on to another fetch.
    fn complete(&self, symbol: &Symbol, generation: u64, entry: Option<Arc<HistoryEntry>>) {
        let mut slots = self.lock_slots();
        let Some(slot) = slots.get_mut(symbol) else {
            return;
        };

        let current = slot.in_flight.as_ref().map(|in_flight| in_flight.generation);
        if current != Some(generation) {
            debug!(
                "complete | stale result dropped | symbol: {} | generation: {}",
                symbol, generation
            );
            return;
        }

        slot.in_flight = None;
        if entry.is_some() {
            slot.entry = entry;
        }
        if slot.entry.is_none() {
            slots.remove(symbol);
        }
    }
}

/// Cache-aside store of full histories with per-symbol request coalescing.
///
/// Cloning is cheap and every clone shares the same entries.
#[derive(Clone)]
pub struct HistoryCache {
    state: Arc<CacheState>,
}

impl HistoryCache {
    pub fn new(source: Arc<dyn HistorySource>, config: CacheConfig) -> Self {
        HistoryCache {
            state: Arc::new(CacheState {
                source,
                config,
                slots: Mutex::new(HashMap::new()),
                generations: AtomicU64::new(0),
            }),
        }
    }

    /// Full history for `ticker`.
    ///
    /// A fresh entry is returned without touching upstream. Otherwise the
    /// caller joins the fetch already running for this symbol, or starts
    /// one. Failures are not stored, so the next call after a failed fetch
    /// tries again.
    pub async fn get_history(&self, ticker: &str) -> Result<Arc<HistoryEntry>, CacheError> {
        let symbol = Symbol::parse(ticker).map_err(|e| {
            warn!("get_history | invalid symbol | ticker: {:?} | {}", ticker, e);
            CacheError::InvalidSymbol(e)
        })?;

        let pending = {
            let mut slots = self.state.lock_slots();
            let slot = slots.entry(symbol.clone()).or_default();

            if let Some(entry) = &slot.entry {
                if entry.is_fresh(self.state.config.ttl) {
                    debug!("get_history | cache hit | symbol: {}", symbol);
                    return Ok(Arc::clone(entry));
                }
                debug!(
                    "get_history | entry expired | symbol: {} | age: {:?}",
                    symbol,
                    entry.age()
                );
                slot.entry = None;
            }

            match &slot.in_flight {
                Some(in_flight) => {
                    debug!(
                        "get_history | joining in-flight fetch | symbol: {} | generation: {}",
                        symbol, in_flight.generation
                    );
                    in_flight.outcome.clone()
                }
                None => {
                    debug!("get_history | cache miss | symbol: {}", symbol);
                    let in_flight = self.start_fetch(symbol.clone());
                    let outcome = in_flight.outcome.clone();
                    slot.in_flight = Some(in_flight);
                    outcome
                }
            }
        };

        pending.await
    }

    /// Entry currently stored for `ticker`, expired or not. Never fetches.
    pub fn cached(&self, ticker: &str) -> Option<Arc<HistoryEntry>> {
        let symbol = Symbol::parse(ticker).ok()?;
        let slots = self.state.lock_slots();
        slots.get(&symbol).and_then(|slot| slot.entry.clone())
    }

    // The fetch runs as its own task so it finishes and updates the slot even
    // when every waiting request has gone away.
    fn start_fetch(&self, symbol: Symbol) -> InFlight {
        let generation = self.state.generations.fetch_add(1, Ordering::Relaxed);
        let task = tokio::spawn(fetch(Arc::clone(&self.state), symbol.clone(), generation));

        let state = Arc::clone(&self.state);
        let outcome = async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(
                        "start_fetch | fetch task failed | symbol: {} | error: {}",
                        symbol, e
                    );
                    state.complete(&symbol, generation, None);
                    Err(CacheError::UpstreamUnavailable(format!(
                        "fetch task failed: {}",
                        e
                    )))
                }
            }
        }
        .boxed()
        .shared();

        InFlight {
            generation,
            outcome,
        }
    }
}

async fn fetch(state: Arc<CacheState>, symbol: Symbol, generation: u64) -> FetchOutcome {
    let timeout = state.config.fetch_timeout;
    let result = tokio::time::timeout(timeout, state.source.fetch_history(&symbol)).await;

    let outcome = match result {
        Ok(Ok(points)) => {
            if points.is_empty() {
                info!("fetch | upstream returned no data | symbol: {}", symbol);
            } else {
                debug!(
                    "fetch | upstream ok | symbol: {} | points: {}",
                    symbol,
                    points.len()
                );
            }
            Ok(Arc::new(HistoryEntry::new(symbol.clone(), points)))
        }
        Ok(Err(e)) => {
            error!("fetch | upstream failed | symbol: {} | error: {}", symbol, e);
            Err(CacheError::UpstreamUnavailable(e.to_string()))
        }
        Err(_) => {
            error!(
                "fetch | upstream timed out | symbol: {} | timeout: {:?}",
                symbol, timeout
            );
            Err(CacheError::UpstreamUnavailable(format!(
                "timed out after {:?}",
                timeout
            )))
        }
    };

    state.complete(&symbol, generation, outcome.as_ref().ok().cloned());
    outcome
}
