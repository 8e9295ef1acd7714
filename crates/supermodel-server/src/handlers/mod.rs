//! HTTP route handlers for the backend.

pub mod queries;
pub mod users;

use axum::Json;
use supermodel_core::GREETING;

use crate::dto::GreetingResponse;

/// Fixed JSON greeting at the root route.
pub async fn root() -> Json<GreetingResponse> {
    Json(GreetingResponse { message: GREETING })
}

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}
