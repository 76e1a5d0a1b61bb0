//! Response assembler.
//!
//! Turns the accumulated raw text of a streamed reply into what the view
//! shows: the text itself plus every fenced code block closed so far.
//! Each step re-scans the whole buffer, so a fence is reported only once
//! its closing backticks have arrived.

use std::sync::LazyLock;

use gemchat_common::CodeBlock;
use regex::Regex;

/// Opening fence with its info string (language first, then optional
/// attributes), then the body up to the next closing fence.
static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```([^`\n]*)\n(.*?)```").unwrap());

/// Language used when a fence carries no tag.
pub const DEFAULT_LANGUAGE: &str = "text";

/// Display state after one chunk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub display_text: String,
    pub code_blocks: Vec<CodeBlock>,
}

/// All closed code blocks in `text`, in source order.
pub fn extract_code_blocks(text: &str) -> Vec<CodeBlock> {
    FENCE_RE
        .captures_iter(text)
        .map(|caps| {
            let language = caps
                .get(1)
                .and_then(|m| m.as_str().split_whitespace().next())
                .map(str::to_lowercase)
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
            let code = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
            CodeBlock::new(language, code)
        })
        .collect()
}

/// One assembler step over the full accumulated text.
pub fn advance(accumulated: &str) -> Frame {
    Frame {
        display_text: accumulated.to_string(),
        code_blocks: extract_code_blocks(accumulated),
    }
}

/// Buffers chunks of one reply and produces a frame per chunk.
#[derive(Debug, Default)]
pub struct ResponseAssembler {
    buffer: String,
}

impl ResponseAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &str) -> Frame {
        self.buffer.push_str(chunk);
        advance(&self.buffer)
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn into_text(self) -> String {
        self.buffer
    }
}
