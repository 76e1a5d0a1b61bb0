//! Conversation handle over a [`GenerationClient`].

use std::sync::Arc;

use gemchat_common::{ImageData, Message};
use tracing::debug;

use crate::thinking::{extract_thinking, thinking_prompt};
use crate::{AiError, ChunkStream, Content, GenerationClient, InlineData, Part, Role};

/// A started chat: the client plus the wire history sent with each turn.
pub struct ChatHandle {
    client: Arc<dyn GenerationClient>,
    history: Vec<Content>,
}

impl std::fmt::Debug for ChatHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatHandle")
            .field("model", &self.client.model_id())
            .field("turns", &self.history.len())
            .finish()
    }
}

impl ChatHandle {
    pub fn start(client: Arc<dyn GenerationClient>, history: Vec<Content>) -> Self {
        Self { client, history }
    }

    pub fn history(&self) -> &[Content] {
        &self.history
    }

    pub fn model_id(&self) -> &str {
        self.client.model_id()
    }

    /// Send a user turn and stream the reply.
    ///
    /// The turn joins the history only if the request was accepted.
    pub async fn send_streaming(&mut self, parts: Vec<Part>) -> Result<ChunkStream, AiError> {
        self.history.push(Content {
            role: Role::User,
            parts,
        });
        match self.client.stream(&self.history).await {
            Ok(stream) => Ok(stream),
            Err(e) => {
                self.history.pop();
                Err(e)
            }
        }
    }

    /// Append the finished model reply so the next turn sees it.
    pub fn record_reply(&mut self, text: impl Into<String>) {
        self.history.push(Content::text(Role::Model, text));
    }

    /// Run the preliminary reasoning exchange for `user_text`.
    ///
    /// Uses a one-shot request on a copy of the history; the handle itself
    /// is left untouched.
    pub async fn think(&self, user_text: &str) -> Result<Option<String>, AiError> {
        let mut contents = self.history.clone();
        contents.push(Content::text(Role::User, thinking_prompt(user_text)));
        let raw = self.client.generate(&contents).await?;
        debug!(chars = raw.len(), "Thinking reply received");
        Ok(extract_thinking(&raw))
    }
}

/// Wire history for previously stored messages.
///
/// Replies still streaming and empty texts are skipped. Image bytes are not
/// kept in history.
pub fn history_from_messages(messages: &[Message]) -> Vec<Content> {
    messages
        .iter()
        .filter(|m| !m.streaming && !m.text.trim().is_empty())
        .map(|m| Content::text(m.role, m.text.clone()))
        .collect()
}

/// Parts of an outgoing user turn. Images are attached only when vision is
/// enabled.
pub fn prompt_parts(text: &str, images: &[ImageData], vision_enabled: bool) -> Vec<Part> {
    let mut parts = vec![Part::Text(text.to_string())];
    if vision_enabled {
        parts.extend(images.iter().map(|image| {
            Part::InlineData(InlineData {
                mime_type: image.mime_type.clone(),
                data: image.data.clone(),
            })
        }));
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures_util::{StreamExt, TryStreamExt};
    use std::sync::Mutex;

    use crate::StreamChunk;

    #[derive(Default)]
    struct FakeClient {
        seen: Mutex<Vec<Vec<Content>>>,
        fail_stream: bool,
        thinking_reply: String,
    }

    #[async_trait]
    impl GenerationClient for FakeClient {
        fn model_id(&self) -> &str {
            "gemini-2.0-flash"
        }

        async fn generate(&self, contents: &[Content]) -> Result<String, AiError> {
            self.seen.lock().unwrap().push(contents.to_vec());
            Ok(self.thinking_reply.clone())
        }

        async fn stream(&self, contents: &[Content]) -> Result<ChunkStream, AiError> {
            self.seen.lock().unwrap().push(contents.to_vec());
            if self.fail_stream {
                return Err(AiError::RateLimited);
            }
            let chunks = ["Hel", "lo"].map(|t| {
                Ok(StreamChunk {
                    text: t.to_string(),
                    tool_calls: Vec::new(),
                })
            });
            Ok(futures_util::stream::iter(chunks).boxed())
        }
    }

    fn image() -> ImageData {
        ImageData {
            data: "iVBORw0K".into(),
            mime_type: "image/png".into(),
        }
    }

    #[tokio::test]
    async fn send_streaming_includes_history_and_new_turn() {
        let client = Arc::new(FakeClient::default());
        let mut chat = ChatHandle::start(
            client.clone(),
            vec![
                Content::text(Role::User, "hi"),
                Content::text(Role::Model, "hello"),
            ],
        );

        let stream = chat
            .send_streaming(vec![Part::Text("again".into())])
            .await
            .unwrap();
        let chunks: Vec<StreamChunk> = stream.try_collect().await.unwrap();
        assert_eq!(chunks.len(), 2);

        chat.record_reply("Hello");
        assert_eq!(chat.history().len(), 4);
        assert_eq!(chat.history()[3].role, Role::Model);

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen[0].len(), 3);
        assert_eq!(seen[0][2].parts, vec![Part::Text("again".into())]);
    }

    #[tokio::test]
    async fn rejected_request_leaves_history_unchanged() {
        let client = Arc::new(FakeClient {
            fail_stream: true,
            ..Default::default()
        });
        let mut chat = ChatHandle::start(client, Vec::new());
        let err = chat
            .send_streaming(vec![Part::Text("x".into())])
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AiError::RateLimited));
        assert!(chat.history().is_empty());
    }

    #[tokio::test]
    async fn think_sends_prompt_without_touching_history() {
        let client = Arc::new(FakeClient {
            thinking_reply: "Thinking: compare both. Therefore B.".into(),
            ..Default::default()
        });
        let chat = ChatHandle::start(client.clone(), vec![Content::text(Role::User, "earlier")]);

        let thinking = chat.think("A or B?").await.unwrap();
        assert_eq!(thinking.as_deref(), Some("compare both."));
        assert_eq!(chat.history().len(), 1);

        let seen = client.seen.lock().unwrap();
        let Part::Text(prompt) = &seen[0][1].parts[0] else {
            panic!("expected text part");
        };
        assert!(prompt.contains("A or B?"));
    }

    #[test]
    fn history_skips_streaming_and_empty_messages() {
        let mut reply = Message::placeholder(None);
        reply.text = "partial".into();
        let messages = vec![
            Message::user("question", Vec::new()),
            Message::placeholder(None),
            reply,
        ];
        let history = history_from_messages(&messages);
        assert_eq!(history, vec![Content::text(Role::User, "question")]);
    }

    #[test]
    fn prompt_parts_attach_images_when_vision_enabled() {
        let parts = prompt_parts("describe", &[image()], true);
        assert_eq!(parts.len(), 2);
        assert!(matches!(&parts[1], Part::InlineData(d) if d.mime_type == "image/png"));
    }

    #[test]
    fn prompt_parts_drop_images_when_vision_disabled() {
        let parts = prompt_parts("describe", &[image()], false);
        assert_eq!(parts, vec![Part::Text("describe".into())]);
    }
}
