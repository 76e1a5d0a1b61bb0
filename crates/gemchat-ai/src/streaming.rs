//! Server-Sent Events (SSE) streaming parser.
//!
//! The Gemini API streams `streamGenerateContent?alt=sse` replies as SSE.
//! Events are exposed as a pull-based stream so the consumer decides when
//! the next one is read.

use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio_util::io::StreamReader;

use crate::AiError;

/// A single SSE event parsed from the stream.
#[derive(Debug, Clone, PartialEq)]
pub struct SseEvent {
    /// The event type, when the server sends one.
    pub event: Option<String>,
    /// The event data (JSON string for Gemini).
    pub data: String,
}

pub type SseStream = BoxStream<'static, Result<SseEvent, AiError>>;

/// Turn a reqwest response body into a stream of SSE events.
pub fn sse_events(response: reqwest::Response) -> SseStream {
    let byte_stream = response
        .bytes_stream()
        .map(|result| result.map_err(std::io::Error::other));
    let reader = tokio::io::BufReader::new(StreamReader::new(byte_stream));
    sse_events_from_reader(reader)
}

struct ParserState<R> {
    lines: Lines<R>,
    finished: bool,
}

/// Parse SSE events from any buffered async reader.
pub fn sse_events_from_reader<R>(reader: R) -> SseStream
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let state = ParserState {
        lines: reader.lines(),
        finished: false,
    };

    futures_util::stream::unfold(state, |mut state| async move {
        if state.finished {
            return None;
        }

        let mut event: Option<String> = None;
        let mut data = String::new();

        loop {
            match state.lines.next_line().await {
                Ok(Some(line)) => {
                    if line.is_empty() {
                        // Empty line = end of event
                        if !data.is_empty() {
                            return Some((Ok(SseEvent { event, data }), state));
                        }
                        event = None;
                        continue;
                    }

                    if let Some(value) = field_value(&line, "event") {
                        event = Some(value.to_string());
                    } else if let Some(value) = field_value(&line, "data") {
                        if !data.is_empty() {
                            data.push('\n');
                        }
                        data.push_str(value);
                    }
                    // Ignore other fields (id:, retry:, comments)
                }
                Ok(None) => {
                    state.finished = true;
                    // Flush any remaining event
                    if data.is_empty() {
                        return None;
                    }
                    return Some((Ok(SseEvent { event, data }), state));
                }
                Err(e) => {
                    state.finished = true;
                    return Some((Err(AiError::NetworkError(e.to_string())), state));
                }
            }
        }
    })
    .boxed()
}

/// `field: value` with the single optional space after the colon removed.
fn field_value<'a>(line: &'a str, field: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(field)?.strip_prefix(':')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::TryStreamExt;
    use std::io::Cursor;

    async fn collect(input: &str) -> Result<Vec<SseEvent>, AiError> {
        let reader = Cursor::new(input.as_bytes().to_vec());
        sse_events_from_reader(reader).try_collect().await
    }

    #[tokio::test]
    async fn parses_data_events() {
        let events = collect("data: {\"a\":1}\n\ndata: {\"a\":2}\n\n").await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].data, "{\"a\":1}");
        assert_eq!(events[1].data, "{\"a\":2}");
        assert!(events[0].event.is_none());
    }

    #[tokio::test]
    async fn joins_multi_line_data() {
        let events = collect("data: first\ndata: second\n\n").await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "first\nsecond");
    }

    #[tokio::test]
    async fn keeps_event_type() {
        let events = collect("event: message\ndata: x\n\n").await.unwrap();
        assert_eq!(events[0].event.as_deref(), Some("message"));
    }

    #[tokio::test]
    async fn flushes_trailing_event_without_blank_line() {
        let events = collect("data: one\n\ndata: tail").await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].data, "tail");
    }

    #[tokio::test]
    async fn handles_crlf_and_missing_space() {
        let events = collect("data:{\"k\":true}\r\n\r\n").await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "{\"k\":true}");
    }

    #[tokio::test]
    async fn ignores_comments_and_unknown_fields() {
        let events = collect(": keep-alive\nid: 7\nretry: 100\ndata: body\n\n")
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "body");
    }

    #[tokio::test]
    async fn empty_input_yields_nothing() {
        assert!(collect("").await.unwrap().is_empty());
        assert!(collect("\n\n\n").await.unwrap().is_empty());
    }
}
