//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Token verification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Session token TTL in minutes.
    #[serde(default = "default_ttl")]
    pub jwt_ttl_minutes: u64,
    /// Prefix that marks a token as an API credential rather than a JWT.
    #[serde(default = "default_api_token_prefix")]
    pub api_token_prefix: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_ttl_minutes: default_ttl(),
            api_token_prefix: default_api_token_prefix(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_ttl() -> u64 {
    60
}

fn default_api_token_prefix() -> String {
    "tk_".to_string()
}
