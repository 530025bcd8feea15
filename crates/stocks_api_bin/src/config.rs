use dotenvy::dotenv;
use history_cache::CacheConfig;
use iex_api::api::IEX_BASE_API_URL;
use std::env;
use std::error::Error;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3333;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{key} has invalid value {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug)]
pub struct Config {
    pub workers: usize,
    pub host: String,
    pub port: u16,
    pub upstream_url: String,
    pub token: String,
    pub cache: CacheConfig,
}

impl Config {
    pub fn new() -> Result<Config, Box<dyn Error>> {
        dotenv().ok();
        Config::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, Box<dyn Error>> {
        let value = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let token = value("STOCKS_API_TOKEN").ok_or(ConfigError::Missing("STOCKS_API_TOKEN"))?;
        let upstream_url =
            value("STOCKS_API_UPSTREAM_URL").unwrap_or_else(|| IEX_BASE_API_URL.to_string());
        let host = value("STOCKS_API_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or(&value, "STOCKS_API_PORT", DEFAULT_PORT)?;

        let mut workers: usize = parse_or(&value, "STOCKS_API_WORKERS", 1)?;
        if workers == 0 {
            workers = 1;
        }

        let defaults = CacheConfig::default();
        let ttl_secs = parse_or(&value, "STOCKS_API_CACHE_TTL_SECS", defaults.ttl.as_secs())?;
        let timeout_secs = parse_or(
            &value,
            "STOCKS_API_FETCH_TIMEOUT_SECS",
            defaults.fetch_timeout.as_secs(),
        )?;
        if timeout_secs == 0 {
            return Err(Box::new(ConfigError::Invalid {
                key: "STOCKS_API_FETCH_TIMEOUT_SECS",
                value: "0".to_string(),
            }));
        }

        let config = Config {
            workers,
            host,
            port,
            upstream_url,
            token,
            cache: CacheConfig {
                ttl: Duration::from_secs(ttl_secs),
                fetch_timeout: Duration::from_secs(timeout_secs),
            },
        };
        Ok(config)
    }
}

fn parse_or<T: FromStr>(
    value: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}
