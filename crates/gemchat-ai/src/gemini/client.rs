//! Gemini API client struct, request building, and response parsing.

use crate::tools::to_gemini_tool;
use crate::{AiError, Content, StreamChunk, ToolCall};

use super::config::{GeminiConfig, HARM_CATEGORIES, SAFETY_THRESHOLD};

/// Gemini API client.
pub struct GeminiClient {
    pub(crate) config: GeminiConfig,
    pub(crate) http: reqwest::Client,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Validate the configuration and build the HTTP client.
    pub fn new(config: GeminiConfig) -> Result<Self, AiError> {
        if config.api_key.trim().is_empty() {
            return Err(AiError::Init("missing API key".into()));
        }
        if gemchat_common::find_model(&config.model).is_none() {
            return Err(AiError::Init(format!("unknown model: {}", config.model)));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.request_timeout)
            .build()
            .map_err(|e| AiError::Init(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, http })
    }

    pub(crate) fn api_url(&self, stream: bool) -> String {
        let method = if stream {
            "streamGenerateContent?alt=sse"
        } else {
            "generateContent"
        };
        format!("{}/{}:{}", self.config.base_url, self.config.model, method)
    }

    /// Build the JSON request body for the Gemini API.
    pub(crate) fn build_request_body(&self, contents: &[Content]) -> serde_json::Value {
        let params = &self.config.params;
        let safety: Vec<_> = HARM_CATEGORIES
            .iter()
            .map(|category| {
                serde_json::json!({
                    "category": category,
                    "threshold": SAFETY_THRESHOLD,
                })
            })
            .collect();

        let mut body = serde_json::json!({
            "contents": contents,
            "generationConfig": {
                "temperature": params.temperature,
                "topK": params.top_k,
                "topP": params.top_p,
                "maxOutputTokens": params.max_output_tokens,
            },
            "safetySettings": safety,
        });

        if let Some(ref instruction) = self.config.system_instruction {
            body["systemInstruction"] = serde_json::json!({
                "parts": [{ "text": instruction }]
            });
        }

        if !self.config.tools.is_empty() {
            let tool_defs: Vec<_> = self.config.tools.iter().map(to_gemini_tool).collect();
            body["tools"] = serde_json::json!([{
                "functionDeclarations": tool_defs
            }]);
        }

        body
    }

    /// Parse a non-streaming Gemini response into its reply text.
    pub(crate) fn parse_response(&self, json: serde_json::Value) -> Result<String, AiError> {
        let chunk = parse_chunk_value(&json)?;
        if chunk.text.is_empty() && chunk.tool_calls.is_empty() {
            return Err(AiError::ParseError("empty candidates".to_string()));
        }
        Ok(chunk.text)
    }
}

/// Parse one streamed SSE payload. `None` means the event carried nothing
/// worth surfacing (for example a bare usage update).
pub(crate) fn parse_stream_event(data: &str) -> Option<Result<StreamChunk, AiError>> {
    let json: serde_json::Value = match serde_json::from_str(data) {
        Ok(json) => json,
        Err(e) => return Some(Err(AiError::ParseError(e.to_string()))),
    };

    match parse_chunk_value(&json) {
        Ok(chunk) if chunk.text.is_empty() && chunk.tool_calls.is_empty() => None,
        other => Some(other),
    }
}

fn parse_chunk_value(json: &serde_json::Value) -> Result<StreamChunk, AiError> {
    if let Some(error) = json.get("error") {
        let message = error["message"].as_str().unwrap_or("unknown error");
        return Err(AiError::ApiError(message.to_string()));
    }

    if let Some(reason) = json["promptFeedback"]["blockReason"].as_str() {
        return Err(AiError::ApiError(format!("prompt blocked: {reason}")));
    }

    let mut chunk = StreamChunk::default();

    let Some(candidates) = json["candidates"].as_array() else {
        // Trailing usage-only events have no candidates.
        return Ok(chunk);
    };

    for candidate in candidates {
        if let Some(parts) = candidate["content"]["parts"].as_array() {
            for part in parts {
                if let Some(t) = part["text"].as_str() {
                    chunk.text.push_str(t);
                }
                if let Some(fc) = part.get("functionCall") {
                    chunk.tool_calls.push(ToolCall {
                        id: uuid::Uuid::new_v4().to_string(),
                        name: fc["name"].as_str().unwrap_or("").to_string(),
                        arguments: fc["args"].clone(),
                    });
                }
            }
        }

        if candidate["finishReason"].as_str() == Some("SAFETY") {
            return Err(AiError::ApiError("response blocked: SAFETY".into()));
        }
    }

    Ok(chunk)
}
