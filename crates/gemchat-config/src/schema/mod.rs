//! Configuration schema types for gemchat.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod api;
mod generation;
mod store;
mod system;

pub use api::*;
pub use generation::*;
pub use store::*;
pub use system::*;

pub use gemchat_common::FeatureToggles;

use serde::{Deserialize, Serialize};

/// Root configuration for gemchat.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GemchatConfig {
    pub api: ApiConfig,
    pub generation: GenerationConfig,
    pub features: FeatureToggles,
    pub store: StoreConfig,
    pub execution: ExecutionConfig,
    pub logging: LoggingConfig,
}
