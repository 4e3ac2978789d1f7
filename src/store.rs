//! Per-conversation storage: selected mode and age dialogue sessions
//!
//! Both stores are injected into the dispatcher. The in-memory versions
//! keep everything for the life of the process.

use crate::state_machine::AgeState;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Stable identifier of one chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationId(i64);

impl ConversationId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Interaction mode selected from the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Echo,
    Reverse,
    AgeCapture,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Echo => "echo",
            Mode::Reverse => "reverse",
            Mode::AgeCapture => "age_capture",
        }
    }
}

/// Mapping from conversation to its selected mode
#[async_trait]
pub trait ModeRegistry: Send + Sync {
    async fn set_mode(&self, id: ConversationId, mode: Mode);

    /// Stored mode, or [`Mode::Echo`] if none was ever set
    async fn get_mode(&self, id: ConversationId) -> Mode;
}

/// Storage for in-progress age dialogues
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load_session(&self, id: ConversationId) -> Option<AgeState>;

    async fn save_session(&self, id: ConversationId, state: AgeState);

    async fn remove_session(&self, id: ConversationId);
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: ModeRegistry + ?Sized> ModeRegistry for Arc<T> {
    async fn set_mode(&self, id: ConversationId, mode: Mode) {
        (**self).set_mode(id, mode).await;
    }

    async fn get_mode(&self, id: ConversationId) -> Mode {
        (**self).get_mode(id).await
    }
}

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    async fn load_session(&self, id: ConversationId) -> Option<AgeState> {
        (**self).load_session(id).await
    }

    async fn save_session(&self, id: ConversationId, state: AgeState) {
        (**self).save_session(id, state).await;
    }

    async fn remove_session(&self, id: ConversationId) {
        (**self).remove_session(id).await;
    }
}

// ============================================================================
// In-memory implementations
// ============================================================================

/// Process-lifetime mode registry
#[derive(Default)]
pub struct InMemoryModes {
    modes: RwLock<HashMap<ConversationId, Mode>>,
}

impl InMemoryModes {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ModeRegistry for InMemoryModes {
    async fn set_mode(&self, id: ConversationId, mode: Mode) {
        self.modes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, mode);
    }

    async fn get_mode(&self, id: ConversationId) -> Mode {
        self.modes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .copied()
            .unwrap_or_default()
    }
}

/// Process-lifetime session store
#[derive(Default)]
pub struct InMemorySessions {
    sessions: RwLock<HashMap<ConversationId, AgeState>>,
}

impl InMemorySessions {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionStore for InMemorySessions {
    async fn load_session(&self, id: ConversationId) -> Option<AgeState> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .copied()
    }

    async fn save_session(&self, id: ConversationId, state: AgeState) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, state);
    }

    async fn remove_session(&self, id: ConversationId) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }
}
