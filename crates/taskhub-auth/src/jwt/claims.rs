//! JWT claims structure embedded in session and link-share tokens.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// What kind of principal this token represents.
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// User ID for user tokens, share ID for link-share tokens.
    pub id: i64,
    /// Username for convenience.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// JWT ID.
    pub jti: Uuid,
}

/// Numeric `type` claim.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "u8", into = "u8")]
pub enum TokenKind {
    /// A full user session.
    User,
    /// A restricted link-share credential.
    LinkShare,
}

impl TryFrom<u8> for TokenKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::User),
            2 => Ok(Self::LinkShare),
            other => Err(format!("unknown token type {other}")),
        }
    }
}

impl From<TokenKind> for u8 {
    fn from(kind: TokenKind) -> Self {
        match kind {
            TokenKind::User => 1,
            TokenKind::LinkShare => 2,
        }
    }
}
