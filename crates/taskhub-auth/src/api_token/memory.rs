//! In-memory API token store keyed by token digest.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use taskhub_core::result::AppResult;
use taskhub_core::traits::ApiTokenStore;

/// Stored API token record. The plaintext token is never kept.
#[derive(Debug, Clone)]
pub struct ApiTokenRecord {
    /// User the token acts as.
    pub owner_id: i64,
    /// Hard expiry.
    pub expires_at: DateTime<Utc>,
}

/// Process-local API token store.
#[derive(Debug)]
pub struct MemoryApiTokenStore {
    /// Prefix prepended to issued tokens.
    prefix: String,
    /// SHA-256 hex digest → record.
    tokens: RwLock<HashMap<String, ApiTokenRecord>>,
}

impl MemoryApiTokenStore {
    /// Creates an empty store issuing tokens with `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Issues a new token for `owner_id`, valid for `ttl`.
    ///
    /// Returns the plaintext token; only its digest is stored.
    pub async fn issue(&self, owner_id: i64, ttl: Duration) -> String {
        let token = format!("{}{}", self.prefix, Uuid::new_v4().simple());
        let record = ApiTokenRecord {
            owner_id,
            expires_at: Utc::now() + ttl,
        };
        self.tokens.write().await.insert(digest(&token), record);
        token
    }

    /// Revokes a token. Returns `true` if it existed.
    pub async fn revoke(&self, token: &str) -> bool {
        self.tokens.write().await.remove(&digest(token)).is_some()
    }
}

#[async_trait]
impl ApiTokenStore for MemoryApiTokenStore {
    async fn find_owner(&self, token: &str) -> AppResult<Option<i64>> {
        let tokens = self.tokens.read().await;
        let Some(record) = tokens.get(&digest(token)) else {
            return Ok(None);
        };

        if record.expires_at <= Utc::now() {
            debug!(owner_id = record.owner_id, "API token expired");
            return Ok(None);
        }

        Ok(Some(record.owner_id))
    }
}

fn digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
