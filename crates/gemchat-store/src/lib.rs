//! Session persistence for gemchat.
//!
//! Sessions live under `{userId}/{keySegment}/{sessionId}` where the key
//! segment is a SHA-256 fingerprint of the API key. Two backends implement
//! [`SessionStore`]: the Firebase Realtime Database REST API and an
//! in-process map.

pub mod firebase;
pub mod identity;
pub mod memory;
pub mod scope;

use async_trait::async_trait;
use gemchat_common::{ChatSession, SessionId, StoreError, StoredMessage};

pub use firebase::FirebaseStore;
pub use identity::{default_identity_path, Identity, IDENTITY_FILE};
pub use memory::MemoryStore;
pub use scope::StoreScope;

/// Remote document store holding sessions and their messages.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &'static str;

    async fn create_session(
        &self,
        scope: &StoreScope,
        session: &ChatSession,
    ) -> Result<(), StoreError>;

    /// Set the title and bump `updatedAt`.
    async fn update_title(
        &self,
        scope: &StoreScope,
        id: &SessionId,
        title: &str,
    ) -> Result<(), StoreError>;

    /// All sessions of the scope, most recently updated first. Message lists
    /// are not included.
    async fn list_sessions(&self, scope: &StoreScope) -> Result<Vec<ChatSession>, StoreError>;

    async fn delete_session(&self, scope: &StoreScope, id: &SessionId) -> Result<(), StoreError>;

    /// Replace the whole message list and bump `updatedAt`.
    async fn save_messages(
        &self,
        scope: &StoreScope,
        id: &SessionId,
        messages: &[StoredMessage],
    ) -> Result<(), StoreError>;

    /// Stored messages in insertion order; empty when there are none.
    async fn load_messages(
        &self,
        scope: &StoreScope,
        id: &SessionId,
    ) -> Result<Vec<StoredMessage>, StoreError>;
}

/// Order sessions by `updatedAt` descending, newest creation first on ties.
pub fn sort_sessions(sessions: &mut [ChatSession]) {
    sessions.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then(b.created_at.cmp(&a.created_at))
            .then_with(|| a.id.as_str().cmp(b.id.as_str()))
    });
}
