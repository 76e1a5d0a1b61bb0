//! Generation engine for gemchat.
//!
//! Provides the Gemini API client with:
//! - Pull-based streaming (SSE) of reply chunks
//! - System instructions assembled from capability fragments
//! - The response assembler that extracts fenced code blocks
//! - The thinking pre-pass and its text extraction
//! - A simulated (never executing) code runner

pub mod assembler;
pub mod chat;
pub mod execution;
pub mod gemini;
pub mod instructions;
pub mod streaming;
pub mod thinking;
pub mod tools;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};

pub use assembler::{advance, extract_code_blocks, Frame, ResponseAssembler};
pub use chat::{history_from_messages, prompt_parts, ChatHandle};
pub use execution::{CodeExecutor, ExecutionOutcome, SimulatedExecutor};
pub use gemini::{GeminiClient, GeminiConfig, GenerationParams};
pub use gemchat_common::Role;
pub use instructions::system_instruction;
pub use thinking::{extract_thinking, thinking_prompt};

/// Lazy, finite sequence of reply chunks. Consumed once per request.
pub type ChunkStream = BoxStream<'static, Result<StreamChunk, AiError>>;

/// The boundary to the text-generation service.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Model id this client was constructed for.
    fn model_id(&self) -> &str;

    /// One-shot request returning the full reply text.
    async fn generate(&self, contents: &[Content]) -> Result<String, AiError>;

    /// Streaming request; the returned stream yields chunks as they arrive.
    async fn stream(&self, contents: &[Content]) -> Result<ChunkStream, AiError>;
}

/// One turn of conversation in wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part::Text(text.into())],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Text(String),
    InlineData(InlineData),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// One increment of a streamed reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamChunk {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("Initialization failed: {0}")]
    Init(String),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Timeout")]
    Timeout,
}

impl From<reqwest::Error> for AiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AiError::Timeout
        } else {
            AiError::NetworkError(e.to_string())
        }
    }
}
