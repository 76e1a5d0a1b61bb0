pub mod errors;
pub mod id;
pub mod models;
pub mod settings;
pub mod types;

pub use errors::{ConfigError, GemchatError, StoreError};
pub use id::{new_id, now_millis, SessionId};
pub use models::{find_model, ModelInfo, DEFAULT_MODEL_ID, MODELS};
pub use settings::{ChatSettings, Feature, FeatureToggles};
pub use types::{
    derive_title, ChatSession, CodeBlock, ExecutionStatus, ImageData, Message, Role,
    StoredMessage, DEFAULT_TITLE, TITLE_MAX_CHARS,
};

pub type Result<T> = std::result::Result<T, GemchatError>;
