//! Data transfer objects for HTTP message serialization.

use serde::{Deserialize, Serialize};

// === Root Endpoint ===

/// Fixed greeting payload served at `/`.
#[derive(Debug, Serialize)]
pub struct GreetingResponse {
    pub message: &'static str,
}

// === User Types ===

/// A user row, serialized the way the API exposes it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub role: String,
    pub created_at: String,
}

/// Request body for user creation.
#[derive(Debug, Deserialize)]
pub struct NewUserRequest {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

// === Conversation Types ===

/// A conversation row.
#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
}

/// A stored conversation message (role is user, assistant, or sql).
#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub role: String,
    pub content: String,
}

// === Ask / History Types ===

/// Query parameters for the ask endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskParams {
    pub user_id: i64,
    pub question: String,
    #[serde(default)]
    pub conversation_id: Option<i64>,
}

/// Response from the ask pipeline.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub conversation_id: i64,
    pub question: String,
    pub sql: String,
    pub answer: String,
}

/// Query parameters for the history endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryParams {
    pub user_id: i64,
}

/// One entry of a user's question/answer history.
#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub question: String,
    pub answer: Option<String>,
    pub timestamp: String,
}
