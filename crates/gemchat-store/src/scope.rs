//! Ownership scope of stored sessions.

use gemchat_common::SessionId;
use sha2::{Digest, Sha256};

/// The `(user, API key)` pair a set of sessions belongs to.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreScope {
    pub user_id: String,
    pub api_key: String,
}

impl std::fmt::Debug for StoreScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreScope")
            .field("user_id", &self.user_id)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl StoreScope {
    pub fn new(user_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            api_key: api_key.into(),
        }
    }

    /// Hex SHA-256 of the API key. Stands in for the key in remote paths.
    pub fn key_segment(&self) -> String {
        let hash = Sha256::digest(self.api_key.as_bytes());
        hash.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// `{userId}/{keySegment}`
    pub fn root_path(&self) -> String {
        format!("{}/{}", self.user_id, self.key_segment())
    }

    /// `{userId}/{keySegment}/{sessionId}`
    pub fn session_path(&self, id: &SessionId) -> String {
        format!("{}/{}", self.root_path(), id)
    }

    /// `{userId}/{keySegment}/{sessionId}/messages`
    pub fn messages_path(&self, id: &SessionId) -> String {
        format!("{}/messages", self.session_path(id))
    }
}
