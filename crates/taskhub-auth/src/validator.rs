//! WebSocket handshake token validation.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use taskhub_core::config::AuthConfig;
use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;
use taskhub_core::traits::{ApiTokenStore, TokenValidator};

use crate::jwt::{JwtDecoder, TokenKind};

/// Accepts user session JWTs and API tokens; rejects link shares.
#[derive(Debug, Clone)]
pub struct JwtTokenValidator {
    /// JWT verification.
    decoder: JwtDecoder,
    /// API credential lookup.
    api_tokens: Arc<dyn ApiTokenStore>,
    /// Prefix identifying API tokens.
    api_token_prefix: String,
}

impl JwtTokenValidator {
    /// Creates a validator from auth configuration and an API-token store.
    pub fn new(config: &AuthConfig, api_tokens: Arc<dyn ApiTokenStore>) -> Self {
        Self {
            decoder: JwtDecoder::new(config),
            api_tokens,
            api_token_prefix: config.api_token_prefix.clone(),
        }
    }
}

#[async_trait]
impl TokenValidator for JwtTokenValidator {
    async fn validate(&self, token: &str) -> AppResult<i64> {
        if !self.api_token_prefix.is_empty() && token.starts_with(&self.api_token_prefix) {
            return match self.api_tokens.find_owner(token).await? {
                Some(owner_id) => Ok(owner_id),
                None => Err(AppError::authentication("Unknown or expired API token")),
            };
        }

        let claims = self.decoder.decode(token)?;

        if claims.kind == TokenKind::LinkShare {
            debug!(share_id = claims.id, "Link share token rejected");
            return Err(AppError::authentication(
                "Link share tokens cannot open a push connection",
            ));
        }

        if claims.id <= 0 {
            return Err(AppError::authentication("Token carries no valid user id"));
        }

        Ok(claims.id)
    }
}
