//! Modebot - Telegram chat bot with switchable reply modes
//!
//! Echo and Reverse modes, a guided age-in-seconds dialogue, and a Monobank
//! currency rate lookup, served over Telegram long polling.

mod clock;
mod config;
mod dispatcher;
mod gateway;
mod keyboard;
mod rates;
mod runtime;
mod state_machine;
mod store;

#[cfg(test)]
mod testing;

use clock::SystemClock;
use config::BotConfig;
use dispatcher::Dispatcher;
use gateway::{TelegramConfig, TelegramGateway};
use rates::{CachedRateProvider, MonobankClient};
use runtime::BotRuntime;
use std::sync::Arc;
use store::{InMemoryModes, InMemorySessions};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "modebot=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    tracing::info!(config = ?config, "Configuration loaded");

    // Rate source, cached so a burst of lookups costs one upstream call
    let monobank = MonobankClient::new(config.monobank_url.clone(), config.http_timeout)?;
    let rates = CachedRateProvider::new(monobank, config.rates_cache_ttl);

    let gateway = TelegramGateway::new(TelegramConfig {
        api_url: config.telegram_api_url.clone(),
        token: config.bot_token.clone(),
        poll_timeout: config.poll_timeout,
        request_timeout: config.http_timeout,
    })?;

    let dispatcher = Dispatcher::new(
        InMemoryModes::new(),
        InMemorySessions::new(),
        rates,
        SystemClock,
    );

    // Ctrl-C stops polling; conversations already queued still get replies
    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            return;
        }
        tracing::info!("Shutdown signal received");
        shutdown.cancel();
    });

    BotRuntime::new(
        Arc::new(gateway),
        Arc::new(dispatcher),
        config.http_timeout,
        cancel,
    )
    .run()
    .await;

    Ok(())
}
