//! Lookup of API credentials to their owning user.

use async_trait::async_trait;

use crate::result::AppResult;

/// Persistent-store lookup for API tokens.
///
/// Implementations receive the plaintext token as presented by the client
/// and are responsible for hashing and expiry checks.
#[async_trait]
pub trait ApiTokenStore: Send + Sync + std::fmt::Debug + 'static {
    /// Returns the owning user ID, or `None` if the token is unknown or expired.
    async fn find_owner(&self, token: &str) -> AppResult<Option<i64>>;
}
