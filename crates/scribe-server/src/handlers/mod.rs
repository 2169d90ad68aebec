//! HTTP route handlers.

pub mod analyze;

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}
