//! Token verification used by the WebSocket handshake.

use async_trait::async_trait;

use crate::result::AppResult;

/// Resolves a signed client token to the user it authenticates.
#[async_trait]
pub trait TokenValidator: Send + Sync + std::fmt::Debug + 'static {
    /// Validates `token` and returns the authenticated user ID.
    ///
    /// Any failure (malformed, bad signature, restricted credential, unknown
    /// owner) is reported as an authentication error.
    async fn validate(&self, token: &str) -> AppResult<i64>;
}
