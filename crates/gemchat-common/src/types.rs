//! Conversation data model shared by the controller, the generation client
//! and the session store.

use serde::{Deserialize, Serialize};

use crate::id::{now_millis, SessionId};

/// Titles longer than this many characters are truncated.
pub const TITLE_MAX_CHARS: usize = 30;

/// Title used until the first user message arrives.
pub const DEFAULT_TITLE: &str = "New Chat";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Error,
}

/// A fenced code block extracted from a model reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeBlock {
    pub language: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ExecutionStatus>,
}

impl CodeBlock {
    pub fn new(language: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            code: code.into(),
            result: None,
            status: None,
        }
    }
}

/// Inline image attached to an outgoing user message. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Base64-encoded bytes.
    pub data: String,
    pub mime_type: String,
}

impl std::fmt::Debug for ImageData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageData")
            .field("mime_type", &self.mime_type)
            .field("data_len", &self.data.len())
            .finish()
    }
}

/// A message as held in memory while a session is open.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub text: String,
    /// Set only while the reply is still being streamed.
    pub streaming: bool,
    pub thinking: Option<String>,
    pub code_blocks: Vec<CodeBlock>,
    pub images: Vec<ImageData>,
    pub timestamp: Option<i64>,
    /// Carried over from storage, where image bytes are dropped.
    pub had_images: bool,
}

impl Message {
    pub fn user(text: impl Into<String>, images: Vec<ImageData>) -> Self {
        let had_images = !images.is_empty();
        Self {
            role: Role::User,
            text: text.into(),
            streaming: false,
            thinking: None,
            code_blocks: Vec::new(),
            images,
            timestamp: Some(now_millis()),
            had_images,
        }
    }

    /// Empty model reply that is about to receive streamed text.
    pub fn placeholder(thinking: Option<String>) -> Self {
        Self {
            role: Role::Model,
            text: String::new(),
            streaming: true,
            thinking,
            code_blocks: Vec::new(),
            images: Vec::new(),
            timestamp: Some(now_millis()),
            had_images: false,
        }
    }

    pub fn to_stored(&self) -> StoredMessage {
        StoredMessage {
            role: self.role,
            text: self.text.clone(),
            thinking: self.thinking.clone(),
            code_blocks: if self.code_blocks.is_empty() {
                None
            } else {
                Some(self.code_blocks.clone())
            },
            had_images: self.had_images || !self.images.is_empty(),
            timestamp: self.timestamp,
        }
    }
}

/// Persisted form of a [`Message`]: no streaming flag, no image bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessage {
    pub role: Role,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_blocks: Option<Vec<CodeBlock>>,
    #[serde(default)]
    pub had_images: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl From<StoredMessage> for Message {
    fn from(stored: StoredMessage) -> Self {
        Self {
            role: stored.role,
            text: stored.text,
            streaming: false,
            thinking: stored.thinking,
            code_blocks: stored.code_blocks.unwrap_or_default(),
            images: Vec::new(),
            timestamp: stored.timestamp,
            had_images: stored.had_images,
        }
    }
}

/// Session metadata as kept in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: SessionId,
    pub title: String,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<StoredMessage>>,
}

impl ChatSession {
    pub fn new(title: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            id: SessionId::new(),
            title: title.into(),
            created_at: now,
            updated_at: now,
            messages: None,
        }
    }
}

/// Title for a session derived from its first user message.
pub fn derive_title(first_message: &str) -> String {
    let trimmed = first_message.trim();
    if trimmed.is_empty() {
        return DEFAULT_TITLE.to_string();
    }
    if trimmed.chars().count() > TITLE_MAX_CHARS {
        let head: String = trimmed.chars().take(TITLE_MAX_CHARS).collect();
        format!("{head}...")
    } else {
        trimmed.to_string()
    }
}
