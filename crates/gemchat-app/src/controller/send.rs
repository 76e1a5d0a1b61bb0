//! Sending a message: optional thinking pass, streamed reply, persistence.

use futures_util::StreamExt;
use gemchat_ai::tools::RUN_CODE_TOOL;
use gemchat_ai::{
    history_from_messages, prompt_parts, AiError, ChatHandle, ResponseAssembler, ToolCall,
};
use gemchat_common::{
    derive_title, CodeBlock, ImageData, Message, Role, SessionId, DEFAULT_TITLE,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{
    stored, BusyGuard, ChatError, ChatEvent, ControllerState, SendOutcome, SessionController,
};

impl SessionController {
    /// Send `input` with optional images and stream the reply.
    ///
    /// Every chunk is applied to the reply and announced as a
    /// [`ChatEvent::Frame`] before the next one is pulled. Cancelling
    /// `cancel` stops the stream; whatever arrived is kept and saved. A
    /// failed stream removes the unfinished reply and returns the error.
    pub async fn send(
        &self,
        input: &str,
        images: Vec<ImageData>,
        cancel: CancellationToken,
    ) -> Result<SendOutcome, ChatError> {
        let _guard = BusyGuard::acquire(&self.busy)?;

        let text = input.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyInput);
        }

        let (client, session_id, history, settings, new_title) = {
            let mut inner = self.inner.lock().await;
            if inner.state == ControllerState::Uninitialized {
                return Err(ChatError::NotInitialized(
                    "controller has not been initialized".into(),
                ));
            }
            let Some(client) = inner.client.clone() else {
                let reason = inner
                    .client_error
                    .clone()
                    .unwrap_or_else(|| "no generation client".into());
                return Err(ChatError::NotInitialized(reason));
            };

            let Some(session_id) = inner.current.as_ref().map(|s| s.id.clone()) else {
                return Err(ChatError::NotInitialized("no open session".into()));
            };

            let history = history_from_messages(&inner.messages);
            let first_user_message = !inner.messages.iter().any(|m| m.role == Role::User);
            inner.messages.push(Message::user(text, images.clone()));

            let mut new_title = None;
            if let Some(session) = inner.current.as_mut() {
                if first_user_message && session.title == DEFAULT_TITLE {
                    session.title = derive_title(text);
                    new_title = Some(session.title.clone());
                }
            }
            (client, session_id, history, inner.settings.clone(), new_title)
        };

        if let Some(title) = new_title {
            if let Err(e) = self.store.update_title(&self.scope, &session_id, &title).await {
                warn!(session = %session_id, error = %e, "Failed to store session title");
            }
        }

        let features = settings.features();
        if !images.is_empty() && !features.vision {
            warn!(
                model = settings.model().id,
                count = images.len(),
                "Vision is off, images are not sent"
            );
        }

        let mut chat = ChatHandle::start(client, history);

        let thinking = if features.thinking {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = chat.think(text) => match result {
                    Ok(thinking) => thinking,
                    Err(e) => {
                        warn!(error = %e, "Thinking pass failed, answering without it");
                        None
                    }
                },
            }
        } else {
            None
        };
        if cancel.is_cancelled() {
            return Ok(self.stop_before_reply(&session_id).await);
        }
        if let Some(ref thinking) = thinking {
            self.emit(ChatEvent::Thinking(thinking.clone()));
        }

        let reply_index = {
            let mut inner = self.inner.lock().await;
            inner.messages.push(Message::placeholder(thinking));
            inner.messages.len() - 1
        };

        let parts = prompt_parts(text, &images, features.vision);
        let mut stream = match chat.send_streaming(parts).await {
            Ok(stream) => stream,
            Err(e) => return Err(self.fail_reply(&session_id, reply_index, e).await),
        };

        let mut assembler = ResponseAssembler::new();
        let mut tool_blocks: Vec<CodeBlock> = Vec::new();
        let mut cancelled = false;

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                next = stream.next() => next,
            };

            let chunk = match next {
                None => break,
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => return Err(self.fail_reply(&session_id, reply_index, e).await),
            };

            tool_blocks.extend(chunk.tool_calls.iter().filter_map(code_block_from_call));
            let frame = assembler.push(&chunk.text);
            let mut code_blocks = frame.code_blocks;
            code_blocks.extend(tool_blocks.iter().cloned());

            {
                let mut inner = self.inner.lock().await;
                if let Some(reply) = inner.messages.get_mut(reply_index) {
                    reply.text.clone_from(&frame.display_text);
                    reply.code_blocks.clone_from(&code_blocks);
                }
            }
            self.emit(ChatEvent::Frame {
                text: frame.display_text,
                code_blocks,
            });
        }
        drop(stream);

        let (reply_index, snapshot) = {
            let mut inner = self.inner.lock().await;
            let keep = inner
                .messages
                .get(reply_index)
                .is_some_and(|m| !cancelled || !m.text.is_empty() || !m.code_blocks.is_empty());
            let kept = if keep {
                if let Some(reply) = inner.messages.get_mut(reply_index) {
                    reply.streaming = false;
                }
                Some(reply_index)
            } else {
                if reply_index < inner.messages.len() {
                    inner.messages.remove(reply_index);
                }
                None
            };
            (kept, stored(&inner.messages))
        };

        chat.record_reply(assembler.text());
        debug!(turns = chat.history().len(), "Reply recorded");

        self.persist(&session_id, snapshot).await;
        if cancelled {
            info!(session = %session_id, "Reply stopped by user");
        }
        self.emit(ChatEvent::Done { cancelled });

        Ok(SendOutcome {
            reply_index,
            cancelled,
        })
    }

    /// Stopped before the reply was requested: only the user turn is kept.
    async fn stop_before_reply(&self, session_id: &SessionId) -> SendOutcome {
        let snapshot = {
            let inner = self.inner.lock().await;
            stored(&inner.messages)
        };
        self.persist(session_id, snapshot).await;
        info!(session = %session_id, "Reply stopped before it was requested");
        self.emit(ChatEvent::Done { cancelled: true });
        SendOutcome {
            reply_index: None,
            cancelled: true,
        }
    }

    /// Roll back the unfinished reply after a generation error.
    async fn fail_reply(
        &self,
        session_id: &SessionId,
        reply_index: usize,
        error: AiError,
    ) -> ChatError {
        warn!(session = %session_id, error = %error, "Generation failed");
        let snapshot = {
            let mut inner = self.inner.lock().await;
            if inner
                .messages
                .get(reply_index)
                .is_some_and(|m| m.streaming)
            {
                inner.messages.remove(reply_index);
            }
            stored(&inner.messages)
        };
        self.persist(session_id, snapshot).await;
        self.emit(ChatEvent::Error(error.to_string()));
        ChatError::Ai(error)
    }
}

/// A `run_code` call becomes a code block on the reply.
fn code_block_from_call(call: &ToolCall) -> Option<CodeBlock> {
    if call.name != RUN_CODE_TOOL {
        return None;
    }
    let code = call.arguments["code"].as_str()?.trim();
    if code.is_empty() {
        return None;
    }
    let language = call.arguments["language"]
        .as_str()
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| "text".to_string());
    Some(CodeBlock::new(language, code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(name: &str, arguments: serde_json::Value) -> ToolCall {
        ToolCall {
            id: "1".into(),
            name: name.into(),
            arguments,
        }
    }

    #[test]
    fn run_code_call_becomes_block() {
        let block = code_block_from_call(&call(
            "run_code",
            json!({ "language": "Python", "code": " print(1) " }),
        ))
        .unwrap();
        assert_eq!(block, CodeBlock::new("python", "print(1)"));
    }

    #[test]
    fn other_calls_and_empty_code_are_ignored() {
        assert!(code_block_from_call(&call("search", json!({ "code": "x" }))).is_none());
        assert!(code_block_from_call(&call("run_code", json!({ "code": "  " }))).is_none());
    }

    #[test]
    fn missing_language_defaults_to_text() {
        let block = code_block_from_call(&call("run_code", json!({ "code": "x" }))).unwrap();
        assert_eq!(block.language, "text");
    }
}
