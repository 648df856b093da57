//! JWT token creation.
//!
//! The push layer only verifies tokens; issuance lives here so the login
//! flow and tests sign with exactly the claims the decoder expects.

use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use taskhub_core::config::AuthConfig;
use taskhub_core::error::AppError;

use super::claims::{Claims, TokenKind};

/// Creates signed session and link-share tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Token TTL in minutes.
    ttl_minutes: i64,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl_minutes: config.jwt_ttl_minutes as i64,
        }
    }

    /// Generates a user session token.
    pub fn generate_user_token(
        &self,
        user_id: i64,
        username: &str,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        self.generate(TokenKind::User, user_id, Some(username.to_string()))
    }

    /// Generates a link-share token for the given share.
    pub fn generate_link_share_token(
        &self,
        share_id: i64,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        self.generate(TokenKind::LinkShare, share_id, None)
    }

    fn generate(
        &self,
        kind: TokenKind,
        id: i64,
        username: Option<String>,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let now = Utc::now();
        let exp = now + chrono::Duration::minutes(self.ttl_minutes);

        let claims = Claims {
            kind,
            id,
            username,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))?;

        Ok((token, exp))
    }
}
