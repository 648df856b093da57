//! Unmatched routes.

use axum::http::Uri;

use taskhub_core::error::AppError;

use crate::error::ApiError;

/// Any route not otherwise matched.
pub async fn not_found(uri: Uri) -> ApiError {
    AppError::not_found(format!("No route for {}", uri.path())).into()
}
