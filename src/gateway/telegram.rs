//! Telegram Bot API gateway over long polling
//!
//! Only `getUpdates` and `sendMessage` are used. The token is part of every
//! request URL, so it is scrubbed from error text before errors leave this
//! module.

use super::{GatewayError, Inbound, MessagingGateway};
use crate::keyboard::Keyboard;
use crate::store::ConversationId;
use async_trait::async_trait;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;
use teloxide::payloads::{GetUpdatesSetters, SendMessageSetters};
use teloxide::requests::Requester;
use teloxide::types::{
    AllowedUpdate, ChatId, KeyboardButton, KeyboardMarkup, Update, UpdateKind,
};
use teloxide::{Bot, RequestError};

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub api_url: String,
    pub token: String,
    /// Long-poll wait passed to `getUpdates`
    pub poll_timeout: Duration,
    /// Slack on top of the poll wait for each HTTP request
    pub request_timeout: Duration,
}

pub struct TelegramGateway {
    bot: Bot,
    token: String,
    poll_timeout: u32,
    /// Next update id to request; acknowledges everything before it
    offset: AtomicI32,
}

impl TelegramGateway {
    pub fn new(config: TelegramConfig) -> Result<Self, GatewayError> {
        let api_url: reqwest::Url = config
            .api_url
            .parse()
            .map_err(|e| GatewayError::Setup(format!("bad API URL {:?}: {e}", config.api_url)))?;

        let client = teloxide::net::default_reqwest_settings()
            .timeout(config.poll_timeout + config.request_timeout)
            .build()
            .map_err(|e| GatewayError::Setup(e.to_string()))?;

        let bot = Bot::with_client(config.token.clone(), client).set_api_url(api_url);
        Ok(Self {
            bot,
            token: config.token,
            poll_timeout: u32::try_from(config.poll_timeout.as_secs()).unwrap_or(u32::MAX),
            offset: AtomicI32::new(0),
        })
    }

    fn map_error(&self, e: RequestError) -> GatewayError {
        let scrub = |text: String| text.replace(&self.token, "<token>");
        match e {
            RequestError::Api(api) => GatewayError::Api {
                description: scrub(api.to_string()),
            },
            RequestError::Network(inner) if inner.is_timeout() => GatewayError::Timeout,
            e @ RequestError::InvalidJson { .. } => GatewayError::InvalidResponse(scrub(e.to_string())),
            other => GatewayError::Transport(scrub(other.to_string())),
        }
    }
}

/// Offset that acknowledges every update in the batch
fn next_offset(updates: &[Update]) -> Option<i32> {
    updates.iter().map(|u| u.id.as_offset()).max()
}

/// Plain text messages only; edits, stickers and other kinds are dropped
fn into_inbound(update: Update) -> Option<Inbound> {
    let UpdateKind::Message(message) = update.kind else {
        return None;
    };
    let text = message.text()?.to_string();
    Some(Inbound::new(ConversationId::new(message.chat.id.0), text))
}

fn reply_markup(keyboard: &Keyboard) -> KeyboardMarkup {
    KeyboardMarkup::new(
        keyboard
            .rows()
            .iter()
            .map(|row| row.iter().map(|label| KeyboardButton::new(label.clone()))),
    )
    .resize_keyboard()
}

#[async_trait]
impl MessagingGateway for TelegramGateway {
    async fn poll(&self) -> Result<Vec<Inbound>, GatewayError> {
        let updates = self
            .bot
            .get_updates()
            .offset(self.offset.load(Ordering::SeqCst))
            .timeout(self.poll_timeout)
            .allowed_updates([AllowedUpdate::Message])
            .await
            .map_err(|e| self.map_error(e))?;

        if let Some(next) = next_offset(&updates) {
            self.offset.fetch_max(next, Ordering::SeqCst);
        }

        Ok(updates.into_iter().filter_map(into_inbound).collect())
    }

    async fn send_text(&self, id: ConversationId, text: &str) -> Result<(), GatewayError> {
        self.bot
            .send_message(ChatId(id.get()), text)
            .await
            .map(drop)
            .map_err(|e| self.map_error(e))
    }

    async fn send_text_with_keyboard(
        &self,
        id: ConversationId,
        text: &str,
        keyboard: &Keyboard,
    ) -> Result<(), GatewayError> {
        self.bot
            .send_message(ChatId(id.get()), text)
            .reply_markup(reply_markup(keyboard))
            .await
            .map(drop)
            .map_err(|e| self.map_error(e))
    }
}
