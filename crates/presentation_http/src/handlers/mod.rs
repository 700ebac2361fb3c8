//! HTTP request handlers

pub mod classes;
pub mod common;
pub mod health;
pub mod roster;

use axum::http::Uri;

use crate::error::ApiError;

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
