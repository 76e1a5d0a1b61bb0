//! Session lifecycle: initialize, create, switch, delete, list, rename.

use gemchat_common::{ChatSession, Message, SessionId, DEFAULT_TITLE};
use tracing::{info, warn};

use super::{BusyGuard, ChatError, ControllerState, SessionController};

impl SessionController {
    /// Build the generation client, then open the most recently updated
    /// session or create one when there is none.
    ///
    /// Client construction failure does not fail this call: sessions still
    /// load, and [`send`](Self::send) reports the error until the settings
    /// change.
    pub async fn initialize(&self) -> Result<(), ChatError> {
        let _guard = BusyGuard::acquire(&self.busy)?;
        {
            let mut inner = self.inner.lock().await;
            if inner.state != ControllerState::Uninitialized {
                return Ok(());
            }
            self.rebuild_client(&mut inner);
        }

        let latest = self.list_or_empty().await.into_iter().next();
        match latest {
            Some(session) => {
                self.set_state(ControllerState::LoadingExisting).await;
                let messages = self.load_or_empty(&session.id).await;
                info!(session = %session.id, messages = messages.len(), "Opened latest session");
                self.open(session, messages).await;
            }
            None => {
                self.set_state(ControllerState::CreatingNew).await;
                let session = self.create_fresh().await;
                info!(session = %session.id, "Created first session");
                self.open(session, Vec::new()).await;
            }
        }
        Ok(())
    }

    pub async fn new_session(&self) -> Result<ChatSession, ChatError> {
        let _guard = BusyGuard::acquire(&self.busy)?;
        self.ensure_initialized().await?;
        let session = self.create_fresh().await;
        self.open(session.clone(), Vec::new()).await;
        Ok(session)
    }

    pub async fn select_session(&self, id: &SessionId) -> Result<ChatSession, ChatError> {
        let _guard = BusyGuard::acquire(&self.busy)?;
        self.ensure_initialized().await?;

        let session = self
            .list_or_empty()
            .await
            .into_iter()
            .find(|s| &s.id == id)
            .ok_or_else(|| ChatError::NoSuchSession(id.to_string()))?;

        self.set_state(ControllerState::LoadingDifferent).await;
        let messages = self.load_or_empty(id).await;
        self.open(session.clone(), messages).await;
        Ok(session)
    }

    /// Delete a session. Deleting the open one opens a fresh replacement
    /// before this returns.
    pub async fn delete_session(&self, id: &SessionId) -> Result<(), ChatError> {
        let _guard = BusyGuard::acquire(&self.busy)?;
        self.ensure_initialized().await?;

        self.store.delete_session(&self.scope, id).await?;

        let was_current = {
            let inner = self.inner.lock().await;
            inner.current.as_ref().is_some_and(|s| &s.id == id)
        };
        if was_current {
            let session = self.create_fresh().await;
            info!(deleted = %id, replacement = %session.id, "Replaced deleted session");
            self.open(session, Vec::new()).await;
        }
        Ok(())
    }

    /// Sessions ordered by last update, newest first. Empty when the store
    /// cannot be read.
    pub async fn list_sessions(&self) -> Vec<ChatSession> {
        self.list_or_empty().await
    }

    pub async fn rename_session(&self, id: &SessionId, title: &str) -> Result<(), ChatError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ChatError::EmptyInput);
        }
        self.store.update_title(&self.scope, id, title).await?;

        let mut inner = self.inner.lock().await;
        if let Some(current) = inner.current.as_mut().filter(|s| &s.id == id) {
            current.title = title.to_string();
        }
        Ok(())
    }

    pub(super) async fn ensure_initialized(&self) -> Result<(), ChatError> {
        if self.inner.lock().await.state == ControllerState::Uninitialized {
            return Err(ChatError::NotInitialized(
                "controller has not been initialized".into(),
            ));
        }
        Ok(())
    }

    async fn set_state(&self, state: ControllerState) {
        self.inner.lock().await.state = state;
    }

    async fn open(&self, session: ChatSession, messages: Vec<Message>) {
        let mut inner = self.inner.lock().await;
        inner.current = Some(session);
        inner.messages = messages;
        inner.state = ControllerState::Ready;
    }

    /// A new session, stored if possible. A failed write still yields a
    /// usable local session.
    async fn create_fresh(&self) -> ChatSession {
        let session = ChatSession::new(DEFAULT_TITLE);
        if let Err(e) = self.store.create_session(&self.scope, &session).await {
            warn!(session = %session.id, error = %e, "Failed to store new session");
        }
        session
    }

    async fn list_or_empty(&self) -> Vec<ChatSession> {
        match self.store.list_sessions(&self.scope).await {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!(store = self.store.name(), error = %e, "Failed to list sessions");
                Vec::new()
            }
        }
    }

    async fn load_or_empty(&self, id: &SessionId) -> Vec<Message> {
        match self.store.load_messages(&self.scope, id).await {
            Ok(stored) => stored.into_iter().map(Message::from).collect(),
            Err(e) => {
                warn!(session = %id, error = %e, "Failed to load messages");
                Vec::new()
            }
        }
    }
}

