//! Currency rate lookup
//!
//! Pulls the public Monobank rate list and renders the USD, EUR and CNY to
//! UAH buy/sell rates. Failures never leave this module: they are rendered
//! as a user-facing message instead.

mod cache;
mod monobank;

pub use cache::CachedRateProvider;
pub use monobank::{MonobankClient, DEFAULT_URL as MONOBANK_URL};

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// ISO 4217 numeric code of the local currency (UAH)
pub const LOCAL_CURRENCY: u32 = 980;
pub const USD: u32 = 840;
pub const EUR: u32 = 978;
pub const CNY: u32 = 156;

/// Rate fetch failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("provider responded with status {0}")]
    BadStatus(u16),
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

impl FetchError {
    /// Text shown to the user in place of the report
    pub fn user_message(&self) -> String {
        match self {
            FetchError::BadStatus(code) => format!("❌ Monobank API error: {code}"),
            FetchError::Unavailable(_) => "❌ Failed to fetch rates from Monobank.".to_string(),
        }
    }
}

/// One record of the provider's rate list
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyPair {
    pub currency_code_a: u32,
    pub currency_code_b: u32,
    #[serde(default, deserialize_with = "lenient_rate")]
    pub rate_buy: Option<f64>,
    #[serde(default, deserialize_with = "lenient_rate")]
    pub rate_sell: Option<f64>,
}

/// Accepts numbers and numeric strings; anything else reads as absent
fn lenient_rate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Source of the raw rate list
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_pairs(&self) -> Result<Vec<CurrencyPair>, FetchError>;
}

#[async_trait]
impl<T: RateProvider + ?Sized> RateProvider for Arc<T> {
    async fn fetch_pairs(&self) -> Result<Vec<CurrencyPair>, FetchError> {
        (**self).fetch_pairs().await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RatePair {
    pub buy: f64,
    pub sell: f64,
}

/// Buy/sell rates against the local currency
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CurrencySnapshot {
    pub usd: RatePair,
    pub eur: RatePair,
    pub cny: RatePair,
}

impl CurrencySnapshot {
    /// Pick the three tracked currencies out of the provider list
    ///
    /// Later records for the same currency win; missing rates are `0.0`.
    pub fn from_pairs(pairs: &[CurrencyPair]) -> Self {
        let mut snapshot = Self::default();
        for pair in pairs.iter().filter(|p| p.currency_code_b == LOCAL_CURRENCY) {
            let rate = RatePair {
                buy: pair.rate_buy.unwrap_or(0.0),
                sell: pair.rate_sell.unwrap_or(0.0),
            };
            match pair.currency_code_a {
                USD => snapshot.usd = rate,
                EUR => snapshot.eur = rate,
                CNY => snapshot.cny = rate,
                _ => {}
            }
        }
        snapshot
    }

    pub fn report(&self) -> String {
        format!(
            "💰 *Monobank Currency Rates*\n\
             💵 USD: {:.2} / {:.2} ₴\n\
             💶 EUR: {:.2} / {:.2} ₴\n\
             🇨🇳 CNY: {:.2} / {:.2} ₴\n\
             (via api.monobank.ua)\n",
            self.usd.buy, self.usd.sell, self.eur.buy, self.eur.sell, self.cny.buy, self.cny.sell,
        )
    }
}

pub async fn fetch_snapshot<P: RateProvider + ?Sized>(
    provider: &P,
) -> Result<CurrencySnapshot, FetchError> {
    let pairs = provider.fetch_pairs().await?;
    Ok(CurrencySnapshot::from_pairs(&pairs))
}

/// Report text for the user; errors are logged and rendered, never returned
pub async fn currency_report<P: RateProvider + ?Sized>(provider: &P) -> String {
    match fetch_snapshot(provider).await {
        Ok(snapshot) => snapshot.report(),
        Err(e) => {
            tracing::warn!(error = %e, "Currency rate fetch failed");
            e.user_message()
        }
    }
}
