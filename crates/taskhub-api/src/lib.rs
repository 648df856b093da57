//! # taskhub-api
//!
//! HTTP layer for the TaskHub push service built on Axum.
//!
//! Serves the WebSocket upgrade at `/ws`, a health endpoint, and maps
//! [`taskhub_core::AppError`] onto JSON error responses.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
