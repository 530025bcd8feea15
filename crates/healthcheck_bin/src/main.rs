use reqwest;
use serde::Deserialize;
use std::env;

const DEFAULT_HEALTHCHECK_URL: &str = "http://localhost:3333/healthcheck";

#[derive(Debug)]
enum CustomError {
    ReqwestError(String),
    NotOk,
}

#[derive(Debug, Deserialize)]
struct StatusJSON {
    status: String,
}

impl std::fmt::Display for CustomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CustomError::ReqwestError(e) => write!(f, "Reqwest error: {}", e),
            CustomError::NotOk => write!(f, "Status code != 200 or no healthcheck"),
        }
    }
}

impl From<reqwest::Error> for CustomError {
    fn from(err: reqwest::Error) -> CustomError {
        CustomError::ReqwestError(err.to_string())
    }
}

fn healthcheck_url(configured: Option<String>) -> String {
    configured
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_HEALTHCHECK_URL.to_string())
}

fn check_status(status: reqwest::StatusCode, body: &StatusJSON) -> Result<(), CustomError> {
    if status != reqwest::StatusCode::OK || body.status != "ok" {
        return Err(CustomError::NotOk);
    }
    Ok(())
}

fn main() -> Result<(), CustomError> {
    dotenvy::dotenv().ok();
    let url = healthcheck_url(env::var("STOCKS_API_HEALTHCHECK_URL").ok());

    let res = reqwest::blocking::get(&url)?;
    let status = res.status();
    let body: StatusJSON = res.json::<StatusJSON>()?;
    check_status(status, &body)
}
