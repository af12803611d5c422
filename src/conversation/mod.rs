//! Conversation ownership
//!
//! Each conversation owns exactly one [`SessionState`]. Turns within a
//! conversation are serialized by its mutex; separate conversations never
//! contend with each other.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::session::SessionState;

#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub session: SessionState,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            session: SessionState::new(),
        }
    }

    /// Start over with no resolved car
    pub fn restart(&mut self) {
        self.session.clear();
        self.started_at = Utc::now();
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedConversation = Arc<Mutex<Conversation>>;

/// Live conversations keyed by id
#[derive(Debug, Default)]
pub struct ConversationRegistry {
    conversations: RwLock<HashMap<Uuid, SharedConversation>>,
}

impl ConversationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new conversation with an unresolved session
    pub async fn start(&self) -> Uuid {
        let conversation = Conversation::new();
        let id = conversation.id;
        self.conversations
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(conversation)));
        tracing::debug!("conversation {} started", id);
        id
    }

    pub async fn get(&self, id: &Uuid) -> Option<SharedConversation> {
        self.conversations.read().await.get(id).cloned()
    }

    /// Discard a conversation and its session
    pub async fn end(&self, id: &Uuid) -> bool {
        let removed = self.conversations.write().await.remove(id).is_some();
        if removed {
            tracing::debug!("conversation {} ended", id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.conversations.read().await.is_empty()
    }
}
