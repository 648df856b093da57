//! # taskhub-auth
//!
//! Token verification for the TaskHub push layer.
//!
//! ## Modules
//!
//! - `jwt`: session token claims, signing, and verification
//! - `api_token`: API credential storage and owner lookup
//! - `validator`: the [`JwtTokenValidator`] used by the WebSocket handshake

pub mod api_token;
pub mod jwt;
pub mod validator;

pub use api_token::MemoryApiTokenStore;
pub use jwt::{Claims, JwtDecoder, JwtEncoder, TokenKind};
pub use validator::JwtTokenValidator;
