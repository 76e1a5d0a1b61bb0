//! Firebase Realtime Database REST backend.
//!
//! Every node is addressed as `{database_url}/{path}.json`; an optional
//! database secret or ID token goes in the `auth` query parameter.

use std::time::Duration;

use async_trait::async_trait;
use gemchat_common::{now_millis, ChatSession, SessionId, StoreError, StoredMessage};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{sort_sessions, SessionStore, StoreScope};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

pub struct FirebaseStore {
    base_url: String,
    auth_token: Option<String>,
    http: reqwest::Client,
}

impl std::fmt::Debug for FirebaseStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseStore")
            .field("base_url", &self.base_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl FirebaseStore {
    pub fn new(
        database_url: &str,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let base_url = database_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(StoreError::Request("database URL is empty".into()));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            auth_token: auth_token.filter(|t| !t.is_empty()),
            http,
        })
    }

    pub(crate) fn node_url(&self, path: &str) -> String {
        format!("{}/{}.json", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let request = self.http.request(method, self.node_url(path));
        match self.auth_token {
            Some(ref token) => request.query(&[("auth", token)]),
            None => request,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, StoreError> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn get_value(&self, path: &str) -> Result<Value, StoreError> {
        debug!(path, "Firebase GET");
        let response = self.send(self.request(Method::GET, path)).await?;
        response
            .json()
            .await
            .map_err(|e| StoreError::Payload(e.to_string()))
    }

    async fn patch_updated_at(&self, path: &str) -> Result<(), StoreError> {
        let body = serde_json::json!({ "updatedAt": now_millis() });
        self.send(self.request(Method::PATCH, path).json(&body))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FirebaseStore {
    fn name(&self) -> &'static str {
        "firebase"
    }

    async fn create_session(
        &self,
        scope: &StoreScope,
        session: &ChatSession,
    ) -> Result<(), StoreError> {
        let path = scope.session_path(&session.id);
        debug!(path = %path, "Firebase PUT session");
        self.send(self.request(Method::PUT, &path).json(session))
            .await?;
        Ok(())
    }

    async fn update_title(
        &self,
        scope: &StoreScope,
        id: &SessionId,
        title: &str,
    ) -> Result<(), StoreError> {
        let body = serde_json::json!({ "title": title, "updatedAt": now_millis() });
        self.send(self.request(Method::PATCH, &scope.session_path(id)).json(&body))
            .await?;
        Ok(())
    }

    async fn list_sessions(&self, scope: &StoreScope) -> Result<Vec<ChatSession>, StoreError> {
        let value = self.get_value(&scope.root_path()).await?;
        parse_sessions(value)
    }

    async fn delete_session(&self, scope: &StoreScope, id: &SessionId) -> Result<(), StoreError> {
        self.send(self.request(Method::DELETE, &scope.session_path(id)))
            .await?;
        Ok(())
    }

    async fn save_messages(
        &self,
        scope: &StoreScope,
        id: &SessionId,
        messages: &[StoredMessage],
    ) -> Result<(), StoreError> {
        let path = scope.messages_path(id);
        debug!(path = %path, count = messages.len(), "Firebase PUT messages");
        self.send(self.request(Method::PUT, &path).json(messages))
            .await?;
        self.patch_updated_at(&scope.session_path(id)).await
    }

    async fn load_messages(
        &self,
        scope: &StoreScope,
        id: &SessionId,
    ) -> Result<Vec<StoredMessage>, StoreError> {
        let value = self.get_value(&scope.messages_path(id)).await?;
        parse_messages(value)
    }
}

/// Sessions under a scope node. Entries that do not parse are skipped.
pub(crate) fn parse_sessions(value: Value) -> Result<Vec<ChatSession>, StoreError> {
    let map = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Object(map) => map,
        other => {
            return Err(StoreError::Payload(format!(
                "expected session map, got {other}"
            )))
        }
    };

    let mut sessions = Vec::with_capacity(map.len());
    for (key, entry) in map {
        match serde_json::from_value::<ChatSession>(entry) {
            Ok(mut session) => {
                session.messages = None;
                sessions.push(session);
            }
            Err(e) => warn!(key = %key, error = %e, "Skipping malformed session entry"),
        }
    }
    sort_sessions(&mut sessions);
    Ok(sessions)
}

/// A message list node. Firebase may hand arrays back as index-keyed maps.
pub(crate) fn parse_messages(value: Value) -> Result<Vec<StoredMessage>, StoreError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .into_iter()
            .filter(|item| !item.is_null())
            .map(decode)
            .collect(),
        Value::Object(map) => {
            let mut indexed: Vec<(usize, Value)> = map
                .into_iter()
                .filter_map(|(key, item)| key.parse().ok().map(|idx| (idx, item)))
                .collect();
            indexed.sort_by_key(|(idx, _)| *idx);
            indexed.into_iter().map(|(_, item)| decode(item)).collect()
        }
        other => Err(StoreError::Payload(format!(
            "expected message list, got {other}"
        ))),
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::Payload(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gemchat_common::Role;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn store(base: &str, token: Option<&str>) -> FirebaseStore {
        FirebaseStore::new(base, token.map(String::from), Duration::from_secs(5)).unwrap()
    }

    /// Answer `bodies.len()` requests in order and return the raw requests.
    async fn serve(bodies: Vec<&'static str>) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for body in bodies {
                let (mut socket, _) = listener.accept().await.unwrap();
                requests.push(read_request(&mut socket).await);
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.ok();
            }
            requests
        });

        (base, handle)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    fn stored(text: &str) -> StoredMessage {
        StoredMessage {
            role: Role::Model,
            text: text.into(),
            thinking: None,
            code_blocks: None,
            had_images: false,
            timestamp: Some(3),
        }
    }

    #[test]
    fn node_url_appends_json_suffix() {
        let s = store("https://demo.firebaseio.com/", None);
        assert_eq!(s.node_url("a/b"), "https://demo.firebaseio.com/a/b.json");
    }

    #[test]
    fn empty_url_is_rejected() {
        let err = FirebaseStore::new("  ", None, DEFAULT_TIMEOUT).unwrap_err();
        assert!(matches!(err, StoreError::Request(_)));
    }

    #[test]
    fn debug_redacts_auth_token() {
        let s = store("https://demo.firebaseio.com", Some("s3cret"));
        assert!(!format!("{s:?}").contains("s3cret"));
    }

    #[test]
    fn parse_sessions_sorts_and_strips_messages() {
        let value = json!({
            "a": { "id": "a", "title": "Older", "createdAt": 1, "updatedAt": 10,
                   "messages": [{ "role": "user", "text": "hi" }] },
            "b": { "id": "b", "title": "Newer", "createdAt": 2, "updatedAt": 20 },
            "junk": 42
        });
        let sessions = parse_sessions(value).unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].title, "Newer");
        assert!(sessions[1].messages.is_none());
    }

    #[test]
    fn parse_sessions_null_is_empty() {
        assert!(parse_sessions(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn parse_messages_accepts_array_and_index_map() {
        let array = json!([{ "role": "user", "text": "1" }, null, { "role": "model", "text": "2" }]);
        let messages = parse_messages(array).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, Role::Model);

        let map = json!({ "10": { "role": "model", "text": "b" }, "2": { "role": "user", "text": "a" } });
        let messages = parse_messages(map).unwrap();
        assert_eq!(messages[0].text, "a");
        assert_eq!(messages[1].text, "b");
    }

    #[test]
    fn parse_messages_rejects_bad_payload() {
        let err = parse_messages(json!([{ "role": "robot" }])).unwrap_err();
        assert!(matches!(err, StoreError::Payload(_)));
    }

    #[tokio::test]
    async fn list_sessions_gets_scope_node_with_auth() {
        let (base, server) = serve(vec![
            r#"{"s1":{"id":"s1","title":"Hello","createdAt":1,"updatedAt":2}}"#,
        ])
        .await;
        let scope = StoreScope::new("user-1", "key");
        let sessions = store(&base, Some("tok"))
            .list_sessions(&scope)
            .await
            .unwrap();
        assert_eq!(sessions[0].title, "Hello");

        let requests = server.await.unwrap();
        let request_line = requests[0].lines().next().unwrap();
        assert!(request_line.starts_with(&format!("GET /{}.json?auth=tok ", scope.root_path())));
    }

    #[tokio::test]
    async fn save_messages_puts_list_then_bumps_timestamp() {
        let (base, server) = serve(vec!["[]", "{}"]).await;
        let scope = StoreScope::new("user-1", "key");
        let id = SessionId::from("s1");
        store(&base, None)
            .save_messages(&scope, &id, &[stored("answer")])
            .await
            .unwrap();

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with(&format!("PUT /{}.json ", scope.messages_path(&id))));
        assert!(requests[0].contains(r#""text":"answer""#));
        assert!(requests[1].starts_with(&format!("PATCH /{}.json ", scope.session_path(&id))));
        assert!(requests[1].contains("updatedAt"));
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            let body = r#"{"error":"Permission denied"}"#;
            let response = format!(
                "HTTP/1.1 401 Unauthorized\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });

        let err = store(&base, None)
            .delete_session(&StoreScope::new("u", "k"), &SessionId::from("s"))
            .await
            .unwrap_err();
        server.await.unwrap();
        assert!(matches!(err, StoreError::Status { status: 401, ref body } if body.contains("Permission")));
    }
}
