//! Routes one inbound text to exactly one reply
//!
//! Menu commands are matched on their exact labels first; anything else goes
//! to the conversation's current mode.

use crate::clock::Clock;
use crate::keyboard::{
    Reply, AGE_MODE, CURRENCY_RATES, ECHO_MODE, REVERSE_MODE, START_COMMAND,
};
use crate::rates::{currency_report, RateProvider};
use crate::state_machine::{step, AgeState, YEAR_PROMPT};
use crate::store::{ConversationId, Mode, ModeRegistry, SessionStore};
use async_trait::async_trait;

const WELCOME: &str = "👋 Welcome! Choose a mode below:";
const ECHO_ACTIVATED: &str = "✅ Echo Mode activated.";
const REVERSE_ACTIVATED: &str = "✅ Reverse Mode activated.";

/// Anything that can answer a message for a conversation
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, id: ConversationId, text: &str) -> Reply;
}

/// Message dispatcher wired to its stores, rate source and clock
pub struct Dispatcher<M, S, R, C>
where
    M: ModeRegistry,
    S: SessionStore,
    R: RateProvider,
    C: Clock,
{
    modes: M,
    sessions: S,
    rates: R,
    clock: C,
}

impl<M, S, R, C> Dispatcher<M, S, R, C>
where
    M: ModeRegistry,
    S: SessionStore,
    R: RateProvider,
    C: Clock,
{
    pub fn new(modes: M, sessions: S, rates: R, clock: C) -> Self {
        Self {
            modes,
            sessions,
            rates,
            clock,
        }
    }

    pub async fn dispatch(&self, id: ConversationId, text: &str) -> Reply {
        let text = text.trim();
        match text {
            START_COMMAND => Reply::with_main_menu(WELCOME),
            CURRENCY_RATES => Reply::with_main_menu(currency_report(&self.rates).await),
            ECHO_MODE => self.switch_mode(id, Mode::Echo).await,
            REVERSE_MODE => self.switch_mode(id, Mode::Reverse).await,
            AGE_MODE => self.switch_mode(id, Mode::AgeCapture).await,
            _ => match self.modes.get_mode(id).await {
                Mode::Echo => Reply::with_main_menu(format!("Echo: {text}")),
                Mode::Reverse => Reply::with_main_menu(format!("Reverse: {}", reverse(text))),
                Mode::AgeCapture => self.age_step(id, text).await,
            },
        }
    }

    async fn switch_mode(&self, id: ConversationId, mode: Mode) -> Reply {
        self.modes.set_mode(id, mode).await;
        tracing::info!(conv_id = %id, mode = mode.as_str(), "Mode switched");
        match mode {
            Mode::Echo => Reply::with_main_menu(ECHO_ACTIVATED),
            Mode::Reverse => Reply::with_main_menu(REVERSE_ACTIVATED),
            Mode::AgeCapture => {
                self.sessions.save_session(id, AgeState::AwaitingYear).await;
                Reply::plain(YEAR_PROMPT)
            }
        }
    }

    async fn age_step(&self, id: ConversationId, text: &str) -> Reply {
        let state = self.sessions.load_session(id).await.unwrap_or_default();
        let result = step(&state, text, self.clock.now());

        match result.new_state {
            Some(next) => {
                if next != state {
                    tracing::debug!(
                        conv_id = %id,
                        from = state.name(),
                        to = next.name(),
                        progress = next.progress(),
                        "Age dialogue advanced"
                    );
                }
                self.sessions.save_session(id, next).await;
            }
            None => {
                tracing::info!(conv_id = %id, "Age dialogue completed");
                self.sessions.remove_session(id).await;
            }
        }

        result.reply
    }
}

#[async_trait]
impl<M, S, R, C> MessageHandler for Dispatcher<M, S, R, C>
where
    M: ModeRegistry,
    S: SessionStore,
    R: RateProvider,
    C: Clock,
{
    async fn handle(&self, id: ConversationId, text: &str) -> Reply {
        self.dispatch(id, text).await
    }
}

/// Reverse by Unicode scalar value
pub fn reverse(text: &str) -> String {
    text.chars().rev().collect()
}
