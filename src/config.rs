//! Process configuration read from the environment

use crate::gateway::TELEGRAM_API_URL;
use crate::rates::MONOBANK_URL;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("BOT_TOKEN is not set; export the Telegram bot token before starting")]
    MissingToken,
    #[error("invalid value for {name}: {value:?} (expected whole seconds)")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone)]
pub struct BotConfig {
    pub bot_token: String,
    pub telegram_api_url: String,
    pub monobank_url: String,
    /// Bound on rate fetches and reply sends
    pub http_timeout: Duration,
    /// Long-poll wait for `getUpdates`
    pub poll_timeout: Duration,
    pub rates_cache_ttl: Duration,
}

// The token never appears in logs
impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &"<redacted>")
            .field("telegram_api_url", &self.telegram_api_url)
            .field("monobank_url", &self.monobank_url)
            .field("http_timeout", &self.http_timeout)
            .field("poll_timeout", &self.poll_timeout)
            .field("rates_cache_ttl", &self.rates_cache_ttl)
            .finish()
    }
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bot_token = lookup("BOT_TOKEN")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let secs = |name: &'static str, default: u64| -> Result<Duration, ConfigError> {
            match lookup(name) {
                None => Ok(Duration::from_secs(default)),
                Some(value) => value
                    .trim()
                    .parse()
                    .map(Duration::from_secs)
                    .map_err(|_| ConfigError::Invalid { name, value }),
            }
        };

        Ok(Self {
            bot_token,
            telegram_api_url: lookup("TELEGRAM_API_URL")
                .unwrap_or_else(|| TELEGRAM_API_URL.to_string()),
            monobank_url: lookup("MONOBANK_API_URL")
                .unwrap_or_else(|| MONOBANK_URL.to_string()),
            http_timeout: secs("HTTP_TIMEOUT_SECS", 10)?,
            poll_timeout: secs("POLL_TIMEOUT_SECS", 30)?,
            rates_cache_ttl: secs("RATES_CACHE_TTL_SECS", 300)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_missing_token_fails() {
        assert_eq!(
            BotConfig::from_lookup(lookup(&[])).unwrap_err(),
            ConfigError::MissingToken
        );
        assert_eq!(
            BotConfig::from_lookup(lookup(&[("BOT_TOKEN", "  ")])).unwrap_err(),
            ConfigError::MissingToken
        );
    }

    #[test]
    fn test_defaults() {
        let config = BotConfig::from_lookup(lookup(&[("BOT_TOKEN", "123:abc")])).unwrap();
        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.telegram_api_url, "https://api.telegram.org");
        assert_eq!(config.monobank_url, "https://api.monobank.ua/bank/currency");
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.poll_timeout, Duration::from_secs(30));
        assert_eq!(config.rates_cache_ttl, Duration::from_secs(300));
    }

    #[test]
    fn test_overrides_and_invalid_numbers() {
        let config = BotConfig::from_lookup(lookup(&[
            ("BOT_TOKEN", "t"),
            ("POLL_TIMEOUT_SECS", "5"),
            ("RATES_CACHE_TTL_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.poll_timeout, Duration::from_secs(5));
        assert_eq!(config.rates_cache_ttl, Duration::ZERO);

        let err = BotConfig::from_lookup(lookup(&[("BOT_TOKEN", "t"), ("HTTP_TIMEOUT_SECS", "ten")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "HTTP_TIMEOUT_SECS",
                value: "ten".to_string()
            }
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = BotConfig::from_lookup(lookup(&[("BOT_TOKEN", "secret-token")])).unwrap();
        assert!(!format!("{config:?}").contains("secret-token"));
    }
}
