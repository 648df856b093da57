//! Collaborator traits defined in `taskhub-core` and implemented by other crates.

pub mod api_token;
pub mod listener;
pub mod token;

pub use api_token::ApiTokenStore;
pub use listener::EventListener;
pub use token::TokenValidator;
