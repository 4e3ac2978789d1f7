//! Messaging gateway abstraction
//!
//! The dispatcher never talks to a chat transport directly: the runtime
//! pulls inbound texts from a gateway and hands replies back to it.

mod telegram;

pub use telegram::{TelegramConfig, TelegramGateway, DEFAULT_API_URL as TELEGRAM_API_URL};

use crate::keyboard::{Keyboard, Reply};
use crate::store::ConversationId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// One inbound text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub conversation_id: ConversationId,
    pub text: String,
}

impl Inbound {
    pub fn new(conversation_id: ConversationId, text: impl Into<String>) -> Self {
        Self {
            conversation_id,
            text: text.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("API error: {description}")]
    Api { description: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("request timed out")]
    Timeout,
    #[error("gateway setup failed: {0}")]
    Setup(String),
}

#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Wait for the next batch of inbound messages (may be empty)
    async fn poll(&self) -> Result<Vec<Inbound>, GatewayError>;

    async fn send_text(&self, id: ConversationId, text: &str) -> Result<(), GatewayError>;

    async fn send_text_with_keyboard(
        &self,
        id: ConversationId,
        text: &str,
        keyboard: &Keyboard,
    ) -> Result<(), GatewayError>;
}

#[async_trait]
impl<T: MessagingGateway + ?Sized> MessagingGateway for Arc<T> {
    async fn poll(&self) -> Result<Vec<Inbound>, GatewayError> {
        (**self).poll().await
    }

    async fn send_text(&self, id: ConversationId, text: &str) -> Result<(), GatewayError> {
        (**self).send_text(id, text).await
    }

    async fn send_text_with_keyboard(
        &self,
        id: ConversationId,
        text: &str,
        keyboard: &Keyboard,
    ) -> Result<(), GatewayError> {
        (**self).send_text_with_keyboard(id, text, keyboard).await
    }
}

/// Send a reply through whichever call matches its keyboard
pub async fn deliver<G: MessagingGateway + ?Sized>(
    gateway: &G,
    id: ConversationId,
    reply: &Reply,
) -> Result<(), GatewayError> {
    match reply.keyboard() {
        None => gateway.send_text(id, &reply.text).await,
        Some(keyboard) => {
            gateway
                .send_text_with_keyboard(id, &reply.text, keyboard)
                .await
        }
    }
}
