//! # taskhub-core
//!
//! Core crate for the TaskHub push layer. Contains configuration schemas,
//! domain events and the in-process event bus, the collaborator traits the
//! other crates implement, and the unified error system.
//!
//! This crate has **no** internal dependencies on other TaskHub crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
