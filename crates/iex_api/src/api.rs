use async_trait::async_trait;
use history_cache::{HistorySource, SourceError};
use history_model::{LookbackPeriod, PricePoint, Symbol, parse_hyphen_date};
use log::debug;
use serde::Deserialize;
use std::time::Duration;

pub const IEX_BASE_API_URL: &str = "https://cloud.iexapis.com";

// slightly above the cache's generation timeout; the cache decides when to give up
const CLIENT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct IexChartJSON {
    date: String,
    close: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IexChartEnvelopeJSON {
    Records(Vec<IexChartJSON>),
    Chart { chart: Vec<IexChartJSON> },
}

impl IexChartEnvelopeJSON {
    fn into_records(self) -> Vec<IexChartJSON> {
        match self {
            IexChartEnvelopeJSON::Records(records) => records,
            IexChartEnvelopeJSON::Chart { chart } => chart,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IexError {
    #[error("Malformed chart payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("Malformed date in chart record: {0}")]
    Date(String),
}

#[derive(Clone)]
pub struct IexAPI {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl IexAPI {
    pub fn new(base_url: &str, token: &str) -> Result<Self, reqwest::Error> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(CLIENT_TIMEOUT)
            .build()?;

        return Ok(IexAPI {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            client,
        });
    }

    /// Closing prices for `symbol` over `period`, oldest first.
    pub async fn get_ticker(
        &self,
        symbol: &Symbol,
        period: LookbackPeriod,
    ) -> Result<Vec<PricePoint>, SourceError> {
        let url = self.chart_url(symbol, period);

        debug!("get_ticker | url: {}", url);

        let body = self
            .client
            .get(&url)
            .query(&[("token", &self.token)])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let history = parse_chart(&body)?;

        debug!(
            "get_ticker | symbol: {} | period: {} | points: {}",
            symbol,
            period,
            history.len()
        );

        Ok(history)
    }

    fn chart_url(&self, symbol: &Symbol, period: LookbackPeriod) -> String {
        format!("{}/beta/stock/{}/chart/{}", self.base_url, symbol, period)
    }
}

#[async_trait]
impl HistorySource for IexAPI {
    // Always the longest lookback, so one cached copy answers every range.
    async fn fetch_history(&self, symbol: &Symbol) -> Result<Vec<PricePoint>, SourceError> {
        self.get_ticker(symbol, LookbackPeriod::Max).await
    }
}

/// Extracts `(date, close)` pairs from a chart response, sorted by date.
/// Records without a close are skipped.
pub fn parse_chart(body: &str) -> Result<Vec<PricePoint>, IexError> {
    let envelope: IexChartEnvelopeJSON = serde_json::from_str(body)?;

    let mut history = Vec::new();
    for record in envelope.into_records() {
        let Some(close) = record.close else {
            continue;
        };
        let date = parse_hyphen_date(&record.date).ok_or(IexError::Date(record.date))?;
        history.push(PricePoint::new(date, close));
    }
    history.sort_by_key(|point| point.date);

    Ok(history)
}
