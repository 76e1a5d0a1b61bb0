//! In-process session store.

use std::collections::HashMap;

use async_trait::async_trait;
use gemchat_common::{now_millis, ChatSession, SessionId, StoreError, StoredMessage};
use tokio::sync::RwLock;

use crate::{sort_sessions, SessionStore, StoreScope};

#[derive(Debug, Default)]
struct Inner {
    /// Keyed by `root_path`, then session id.
    scopes: HashMap<String, HashMap<String, ChatSession>>,
    last_stamp: i64,
}

impl Inner {
    /// Strictly increasing so ordering by `updatedAt` stays total, even for
    /// writes within the same millisecond.
    fn stamp(&mut self) -> i64 {
        self.last_stamp = now_millis().max(self.last_stamp + 1);
        self.last_stamp
    }

    fn session_mut(
        &mut self,
        scope: &StoreScope,
        id: &SessionId,
    ) -> Result<&mut ChatSession, StoreError> {
        self.scopes
            .get_mut(&scope.root_path())
            .and_then(|sessions| sessions.get_mut(id.as_str()))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

/// Sessions kept in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn create_session(
        &self,
        scope: &StoreScope,
        session: &ChatSession,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let mut session = session.clone();
        if session.updated_at > inner.last_stamp {
            inner.last_stamp = session.updated_at;
        } else {
            session.updated_at = inner.stamp();
        }
        inner
            .scopes
            .entry(scope.root_path())
            .or_default()
            .insert(session.id.as_str().to_string(), session);
        Ok(())
    }

    async fn update_title(
        &self,
        scope: &StoreScope,
        id: &SessionId,
        title: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let stamp = inner.stamp();
        let session = inner.session_mut(scope, id)?;
        session.title = title.to_string();
        session.updated_at = stamp;
        Ok(())
    }

    async fn list_sessions(&self, scope: &StoreScope) -> Result<Vec<ChatSession>, StoreError> {
        let inner = self.inner.read().await;
        let mut sessions: Vec<ChatSession> = inner
            .scopes
            .get(&scope.root_path())
            .map(|sessions| {
                sessions
                    .values()
                    .map(|s| ChatSession {
                        messages: None,
                        ..s.clone()
                    })
                    .collect()
            })
            .unwrap_or_default();
        sort_sessions(&mut sessions);
        Ok(sessions)
    }

    async fn delete_session(&self, scope: &StoreScope, id: &SessionId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(sessions) = inner.scopes.get_mut(&scope.root_path()) {
            sessions.remove(id.as_str());
        }
        Ok(())
    }

    async fn save_messages(
        &self,
        scope: &StoreScope,
        id: &SessionId,
        messages: &[StoredMessage],
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let stamp = inner.stamp();
        let session = inner.session_mut(scope, id)?;
        session.messages = Some(messages.to_vec());
        session.updated_at = stamp;
        Ok(())
    }

    async fn load_messages(
        &self,
        scope: &StoreScope,
        id: &SessionId,
    ) -> Result<Vec<StoredMessage>, StoreError> {
        let inner = self.inner.read().await;
        inner
            .scopes
            .get(&scope.root_path())
            .and_then(|sessions| sessions.get(id.as_str()))
            .map(|session| session.messages.clone().unwrap_or_default())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gemchat_common::Role;

    fn scope() -> StoreScope {
        StoreScope::new("user-1", "key-1")
    }

    fn message(text: &str) -> StoredMessage {
        StoredMessage {
            role: Role::User,
            text: text.into(),
            thinking: None,
            code_blocks: None,
            had_images: false,
            timestamp: Some(1),
        }
    }

    #[tokio::test]
    async fn list_orders_by_last_update() {
        let store = MemoryStore::new();
        let a = ChatSession::new("a");
        let b = ChatSession::new("b");
        store.create_session(&scope(), &a).await.unwrap();
        store.create_session(&scope(), &b).await.unwrap();

        store
            .save_messages(&scope(), &a.id, &[message("hi")])
            .await
            .unwrap();

        let listed = store.list_sessions(&scope()).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, a.id);
        assert!(listed.iter().all(|s| s.messages.is_none()));
    }

    #[tokio::test]
    async fn sessions_created_together_still_order() {
        let store = MemoryStore::new();
        let first = ChatSession::new("first");
        let second = ChatSession {
            created_at: first.created_at,
            updated_at: first.updated_at,
            ..ChatSession::new("second")
        };
        store.create_session(&scope(), &first).await.unwrap();
        store.create_session(&scope(), &second).await.unwrap();

        let listed = store.list_sessions(&scope()).await.unwrap();
        assert_eq!(listed[0].id, second.id);
        assert!(listed[0].updated_at > listed[1].updated_at);
    }

    #[tokio::test]
    async fn save_replaces_message_list() {
        let store = MemoryStore::new();
        let s = ChatSession::new("s");
        store.create_session(&scope(), &s).await.unwrap();

        store
            .save_messages(&scope(), &s.id, &[message("1"), message("2")])
            .await
            .unwrap();
        store
            .save_messages(&scope(), &s.id, &[message("3")])
            .await
            .unwrap();

        let loaded = store.load_messages(&scope(), &s.id).await.unwrap();
        assert_eq!(loaded, vec![message("3")]);
    }

    #[tokio::test]
    async fn scopes_are_isolated_by_key() {
        let store = MemoryStore::new();
        store
            .create_session(&scope(), &ChatSession::new("mine"))
            .await
            .unwrap();

        let other = StoreScope::new("user-1", "key-2");
        assert!(store.list_sessions(&other).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_title_bumps_updated_at() {
        let store = MemoryStore::new();
        let s = ChatSession::new("New Chat");
        store.create_session(&scope(), &s).await.unwrap();

        store.update_title(&scope(), &s.id, "Renamed").await.unwrap();
        let listed = store.list_sessions(&scope()).await.unwrap();
        assert_eq!(listed[0].title, "Renamed");
        assert!(listed[0].updated_at > s.updated_at);
    }

    #[tokio::test]
    async fn missing_session_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .load_messages(&scope(), &SessionId::from("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_removes_session() {
        let store = MemoryStore::new();
        let s = ChatSession::new("gone");
        store.create_session(&scope(), &s).await.unwrap();
        store.delete_session(&scope(), &s.id).await.unwrap();
        assert!(store.list_sessions(&scope()).await.unwrap().is_empty());
        // Deleting twice is fine.
        store.delete_session(&scope(), &s.id).await.unwrap();
    }
}
