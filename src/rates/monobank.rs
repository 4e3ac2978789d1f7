//! Monobank public currency endpoint

use super::{CurrencyPair, FetchError, RateProvider};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub const DEFAULT_URL: &str = "https://api.monobank.ua/bank/currency";

/// Client for `GET /bank/currency` (no authentication)
pub struct MonobankClient {
    client: Client,
    url: String,
}

impl MonobankClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl RateProvider for MonobankClient {
    async fn fetch_pairs(&self) -> Result<Vec<CurrencyPair>, FetchError> {
        let start = std::time::Instant::now();
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::Unavailable(e.to_string()))?;

        let status = response.status();
        tracing::debug!(
            status = status.as_u16(),
            duration_ms = %start.elapsed().as_millis(),
            "Monobank request completed"
        );
        check_status(status)?;

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Unavailable(e.to_string()))?;
        parse_body(&body)
    }
}

fn check_status(status: StatusCode) -> Result<(), FetchError> {
    if status == StatusCode::OK {
        Ok(())
    } else {
        Err(FetchError::BadStatus(status.as_u16()))
    }
}

fn parse_body(body: &str) -> Result<Vec<CurrencyPair>, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Unavailable(format!("invalid body: {e}")))
}
