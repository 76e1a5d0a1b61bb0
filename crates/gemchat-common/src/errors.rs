use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Request(String),

    #[error("store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("store payload error: {0}")]
    Payload(String),

    #[error("session not found: {0}")]
    NotFound(String),

    #[error("identity error: {0}")]
    Identity(String),
}

#[derive(Debug, thiserror::Error)]
pub enum GemchatError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("ai error: {0}")]
    Ai(String),

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("api.model unknown".into());
        assert_eq!(err.to_string(), "config validation error: api.model unknown");
    }

    #[test]
    fn store_error_display() {
        let err = StoreError::Status {
            status: 401,
            body: "Permission denied".into(),
        };
        assert_eq!(
            err.to_string(),
            "store returned HTTP 401: Permission denied"
        );

        let err = StoreError::NotFound("abc".into());
        assert_eq!(err.to_string(), "session not found: abc");
    }

    #[test]
    fn gemchat_error_from_config() {
        let config_err = ConfigError::ParseError("bad toml".into());
        let err: GemchatError = config_err.into();
        assert!(matches!(err, GemchatError::Config(_)));
        assert!(err.to_string().contains("bad toml"));
    }

    #[test]
    fn gemchat_error_from_store() {
        let store_err = StoreError::Request("connection refused".into());
        let err: GemchatError = store_err.into();
        assert!(matches!(err, GemchatError::Store(_)));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn gemchat_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: GemchatError = io_err.into();
        assert!(matches!(err, GemchatError::Io(_)));
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn gemchat_error_other_variants() {
        let err = GemchatError::Ai("model unavailable".into());
        assert_eq!(err.to_string(), "ai error: model unavailable");

        let err = GemchatError::Other("something went wrong".into());
        assert_eq!(err.to_string(), "something went wrong");
    }
}
