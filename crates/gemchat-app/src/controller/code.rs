//! Running code blocks through the executor.

use gemchat_ai::ExecutionOutcome;
use tracing::{debug, warn};

use super::{stored, ChatError, SessionController};

impl SessionController {
    /// Run block `block_index` of message `message_index`, store the result
    /// on the block and save the session.
    pub async fn run_code(
        &self,
        message_index: usize,
        block_index: usize,
    ) -> Result<ExecutionOutcome, ChatError> {
        let (session_id, language, code) = {
            let inner = self.inner.lock().await;
            let session_id = inner
                .current
                .as_ref()
                .map(|s| s.id.clone())
                .ok_or_else(|| ChatError::NotInitialized("no open session".into()))?;
            let block = inner
                .messages
                .get(message_index)
                .filter(|m| !m.streaming)
                .and_then(|m| m.code_blocks.get(block_index))
                .ok_or(ChatError::InvalidIndex)?;
            (session_id, block.language.clone(), block.code.clone())
        };

        debug!(language = %language, message_index, block_index, "Running code block");
        let outcome = self.executor.run(&language, &code).await;

        let snapshot = {
            let mut inner = self.inner.lock().await;
            if inner.current.as_ref().map(|s| &s.id) != Some(&session_id) {
                warn!(session = %session_id, "Session changed while code ran, result not stored");
                return Ok(outcome);
            }
            let block = inner
                .messages
                .get_mut(message_index)
                .and_then(|m| m.code_blocks.get_mut(block_index))
                .ok_or(ChatError::InvalidIndex)?;
            block.result = Some(outcome.result.clone());
            block.status = Some(outcome.status);
            stored(&inner.messages)
        };

        self.persist(&session_id, snapshot).await;
        Ok(outcome)
    }
}
