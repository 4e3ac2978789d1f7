//! Mock implementations for testing
//!
//! These mocks enable dispatcher and runtime tests without real I/O.

use crate::clock::Clock;
use crate::gateway::{GatewayError, Inbound, MessagingGateway};
use crate::keyboard::Keyboard;
use crate::rates::{CurrencyPair, FetchError, RateProvider};
use crate::store::ConversationId;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Fixed Clock
// ============================================================================

pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> Self {
        Self(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, min, 0)
                .unwrap(),
        )
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

// ============================================================================
// Mock Rate Provider
// ============================================================================

/// Rate provider that returns queued responses
pub struct MockRateProvider {
    responses: Mutex<VecDeque<Result<Vec<CurrencyPair>, FetchError>>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

#[allow(dead_code)]
impl MockRateProvider {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Sleep before answering, to simulate a slow provider
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn queue_pairs(&self, pairs: Vec<CurrencyPair>) {
        self.responses.lock().unwrap().push_back(Ok(pairs));
    }

    pub fn queue_error(&self, error: FetchError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateProvider for MockRateProvider {
    async fn fetch_pairs(&self) -> Result<Vec<CurrencyPair>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Unavailable("No mock response queued".to_string())))
    }
}

// ============================================================================
// Mock Gateway
// ============================================================================

/// A message handed to the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub id: ConversationId,
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

/// Gateway that serves queued batches and records sends
pub struct MockGateway {
    batches: Mutex<VecDeque<Result<Vec<Inbound>, GatewayError>>>,
    sent: Mutex<Vec<Sent>>,
    /// Sends to this conversation fail
    failing: Mutex<Option<ConversationId>>,
}

#[allow(dead_code)]
impl MockGateway {
    pub fn new() -> Self {
        Self {
            batches: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            failing: Mutex::new(None),
        }
    }

    pub fn queue_batch(&self, batch: Vec<Inbound>) {
        self.batches.lock().unwrap().push_back(Ok(batch));
    }

    pub fn queue_poll_error(&self, error: GatewayError) {
        self.batches.lock().unwrap().push_back(Err(error));
    }

    pub fn fail_sends_to(&self, id: ConversationId) {
        *self.failing.lock().unwrap() = Some(id);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, id: ConversationId) -> Vec<Sent> {
        self.sent().into_iter().filter(|s| s.id == id).collect()
    }

    fn record(&self, id: ConversationId, text: &str, keyboard: Option<&Keyboard>) -> Result<(), GatewayError> {
        let failing = *self.failing.lock().unwrap() == Some(id);
        if failing {
            return Err(GatewayError::Transport("mock send failure".to_string()));
        }
        self.sent.lock().unwrap().push(Sent {
            id,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(())
    }
}

#[async_trait]
impl MessagingGateway for MockGateway {
    async fn poll(&self) -> Result<Vec<Inbound>, GatewayError> {
        let next = self.batches.lock().unwrap().pop_front();
        match next {
            Some(batch) => batch,
            None => {
                // Behave like an idle long poll
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(Vec::new())
            }
        }
    }

    async fn send_text(&self, id: ConversationId, text: &str) -> Result<(), GatewayError> {
        self.record(id, text, None)
    }

    async fn send_text_with_keyboard(
        &self,
        id: ConversationId,
        text: &str,
        keyboard: &Keyboard,
    ) -> Result<(), GatewayError> {
        self.record(id, text, Some(keyboard))
    }
}
