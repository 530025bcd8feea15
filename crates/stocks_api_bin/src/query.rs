use chrono::NaiveDate;
use history_cache::HistoryCache;
use history_model::{DateWindow, PricePoint};
use log::{debug, info};
use range_resolver::{filter_window, resolve_period};

/// Closing prices for `ticker` inside `window`, or the whole history when
/// there is no window. Every failure degrades to an empty result; the cause
/// is only logged.
pub async fn query(
    cache: &HistoryCache,
    ticker: &str,
    window: Option<DateWindow>,
    today: NaiveDate,
) -> Vec<PricePoint> {
    // informational only, the cache always holds the longest lookback
    if let Some(period) = resolve_period(window.map(|window| window.from), today) {
        debug!("query | ticker: {} | lookback hint: {}", ticker, period);
    }

    let entry = match cache.get_history(ticker).await {
        Ok(entry) => entry,
        Err(e) => {
            info!("query | no data | ticker: {:?} | cause: {}", ticker, e);
            return vec![];
        }
    };

    match window {
        Some(window) => filter_window(entry.points(), window),
        None => entry.points().to_vec(),
    }
}
