//! Session controller: session lifecycle and the path from user input to a
//! streamed, persisted reply.
//!
//! The controller is shared behind `&self`. At most one operation that
//! touches the open conversation's shape (send, new, select, delete) runs at
//! a time; the others fail with [`ChatError::Busy`] instead of waiting.

mod code;
mod images;
mod send;
mod sessions;
mod settings;
mod types;


use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use gemchat_ai::{CodeExecutor, GenerationClient};
use gemchat_common::{ChatSession, ChatSettings, Message, SessionId, StoredMessage};
use gemchat_store::{SessionStore, StoreScope};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;

pub use images::load_images;
pub use types::{ChatError, ChatEvent, ClientFactory, ControllerState, SendOutcome};

pub(crate) use types::BusyGuard;

struct Inner {
    state: ControllerState,
    settings: ChatSettings,
    client: Option<Arc<dyn GenerationClient>>,
    client_error: Option<String>,
    current: Option<ChatSession>,
    messages: Vec<Message>,
}

pub struct SessionController {
    store: Arc<dyn SessionStore>,
    scope: StoreScope,
    factory: ClientFactory,
    executor: Arc<dyn CodeExecutor>,
    events: UnboundedSender<ChatEvent>,
    busy: AtomicBool,
    inner: Mutex<Inner>,
}

impl SessionController {
    /// Create an uninitialized controller and the receiver for its events.
    pub fn new(
        store: Arc<dyn SessionStore>,
        scope: StoreScope,
        settings: ChatSettings,
        factory: ClientFactory,
        executor: Arc<dyn CodeExecutor>,
    ) -> (Self, UnboundedReceiver<ChatEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let controller = Self {
            store,
            scope,
            factory,
            executor,
            events,
            busy: AtomicBool::new(false),
            inner: Mutex::new(Inner {
                state: ControllerState::Uninitialized,
                settings,
                client: None,
                client_error: None,
                current: None,
                messages: Vec::new(),
            }),
        };
        (controller, rx)
    }

    pub async fn state(&self) -> ControllerState {
        self.inner.lock().await.state
    }

    pub async fn settings(&self) -> ChatSettings {
        self.inner.lock().await.settings.clone()
    }

    /// Why the generation client could not be built, if it could not.
    pub async fn client_error(&self) -> Option<String> {
        self.inner.lock().await.client_error.clone()
    }

    pub async fn current_session(&self) -> Option<ChatSession> {
        self.inner.lock().await.current.clone()
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.inner.lock().await.messages.clone()
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    fn emit(&self, event: ChatEvent) {
        let _ = self.events.send(event);
    }

    /// Write the message list of `id`. Failures are logged, never surfaced.
    async fn persist(&self, id: &SessionId, messages: Vec<StoredMessage>) {
        if let Err(e) = self.store.save_messages(&self.scope, id, &messages).await {
            tracing::warn!(session = %id, error = %e, "Failed to save messages");
        }
    }
}

fn stored(messages: &[Message]) -> Vec<StoredMessage> {
    messages.iter().map(Message::to_stored).collect()
}
