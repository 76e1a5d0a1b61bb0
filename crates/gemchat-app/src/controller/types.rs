//! Controller types, events and the generation guard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use gemchat_ai::{AiError, GenerationClient};
use gemchat_common::{ChatSettings, CodeBlock, StoreError};

/// Builds a generation client for the given settings. Called again on every
/// model or feature change; clients are never mutated in place.
pub type ClientFactory =
    Box<dyn Fn(&ChatSettings) -> Result<Arc<dyn GenerationClient>, AiError> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Uninitialized,
    LoadingExisting,
    CreatingNew,
    Ready,
    LoadingDifferent,
}

/// Progress of a reply, emitted while [`send`](super::SessionController::send)
/// runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// Reasoning from the thinking pre-pass.
    Thinking(String),
    /// The full reply so far and every code block completed in it.
    Frame {
        text: String,
        code_blocks: Vec<CodeBlock>,
    },
    Done {
        cancelled: bool,
    },
    Error(String),
}

/// What a finished [`send`](super::SessionController::send) left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    /// Index of the model reply, `None` when a cancelled reply had no content.
    pub reply_index: Option<usize>,
    pub cancelled: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("chat is not available: {0}")]
    NotInitialized(String),

    #[error("a reply is still being generated")]
    Busy,

    #[error("message is empty")]
    EmptyInput,

    #[error("no such session: {0}")]
    NoSuchSession(String),

    #[error("no code block at that position")]
    InvalidIndex,

    #[error(transparent)]
    Ai(#[from] AiError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Settings(String),
}

/// Guard that clears the `busy` flag on drop, so it is released even if the
/// future is cancelled or returns early.
pub(crate) struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    /// Attempt to acquire the busy lock. Returns `Err` if already busy.
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Result<Self, ChatError> {
        if flag
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(ChatError::Busy);
        }
        Ok(Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
