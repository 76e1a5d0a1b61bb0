//! Locally generated user id.
//!
//! Not an authenticated identity: a random id created on first run and
//! kept in `identity.json` so sessions survive restarts.

use std::path::{Path, PathBuf};

use gemchat_common::{new_id, now_millis, StoreError};
use serde::{Deserialize, Serialize};

pub const IDENTITY_FILE: &str = "identity.json";

const IDENTITY_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub version: u32,
    pub user_id: String,
    pub created_at: i64,
}

impl Identity {
    pub fn generate() -> Self {
        Self {
            version: IDENTITY_VERSION,
            user_id: new_id(),
            created_at: now_millis(),
        }
    }

    /// Load the identity at `path`, or generate and save a new one.
    ///
    /// An unreadable file is replaced with a fresh identity.
    pub fn load_or_create(path: &Path) -> Result<Self, StoreError> {
        if path.exists() {
            match Self::load(path) {
                Ok(identity) => return Ok(identity),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to load identity, generating new one");
                }
            }
        }
        let identity = Self::generate();
        identity.save(path)?;
        tracing::info!(user_id = %identity.user_id, "Created new local identity");
        Ok(identity)
    }

    fn load(path: &Path) -> Result<Self, StoreError> {
        let data = std::fs::read_to_string(path).map_err(|e| ie(&e))?;
        let identity: Identity = serde_json::from_str(&data).map_err(|e| ie(&e))?;
        if identity.version != IDENTITY_VERSION {
            return Err(StoreError::Identity(format!(
                "unsupported identity version: {}",
                identity.version
            )));
        }
        if identity.user_id.trim().is_empty() {
            return Err(StoreError::Identity("empty user id".into()));
        }
        Ok(identity)
    }

    fn save(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| ie(&e))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ie(&e))?;
        }
        std::fs::write(path, json).map_err(|e| ie(&e))
    }
}

/// `<data_dir>/gemchat/identity.json`
pub fn default_identity_path() -> Result<PathBuf, StoreError> {
    dirs::data_dir()
        .map(|dir| dir.join("gemchat").join(IDENTITY_FILE))
        .ok_or_else(|| StoreError::Identity("could not determine data directory".into()))
}

fn ie(e: &dyn std::fmt::Display) -> StoreError {
    StoreError::Identity(e.to_string())
}
