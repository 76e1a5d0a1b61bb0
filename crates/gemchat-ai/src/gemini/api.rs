//! GenerationClient trait implementation for GeminiClient.

use async_trait::async_trait;
use futures_util::StreamExt;
use tracing::debug;

use crate::streaming::sse_events;
use crate::{AiError, ChunkStream, Content, GenerationClient};

use super::client::{parse_stream_event, GeminiClient};

impl GeminiClient {
    async fn post(&self, contents: &[Content], stream: bool) -> Result<reqwest::Response, AiError> {
        let body = self.build_request_body(contents);
        let url = self.api_url(stream);

        debug!(model = %self.config.model, stream, turns = contents.len(), "Gemini API request");

        let mut request = self
            .http
            .post(&url)
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body);
        if !stream {
            request = request.timeout(self.config.request_timeout);
        }
        let response = request.send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AiError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AiError::ApiError(format!("HTTP {status}: {text}")));
        }

        Ok(response)
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    fn model_id(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, contents: &[Content]) -> Result<String, AiError> {
        let response = self.post(contents, false).await?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AiError::ParseError(e.to_string()))?;

        self.parse_response(json)
    }

    async fn stream(&self, contents: &[Content]) -> Result<ChunkStream, AiError> {
        let response = self.post(contents, true).await?;

        let chunks = sse_events(response).filter_map(|event| async move {
            match event {
                Ok(event) => parse_stream_event(&event.data),
                Err(e) => Some(Err(e)),
            }
        });

        Ok(chunks.boxed())
    }
}
