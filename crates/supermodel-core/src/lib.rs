//! Core domain types and error definitions for the supermodel backend.
//!
//! This crate provides the fundamental types shared across the workspace:
//!
//! - [`AgentError`] — Error type for LLM and SQL-tool operations
//! - [`Message`] and [`MessageRole`] — Conversation message types
//! - [`SERVICE_TITLE`] and [`GREETING`] — Service identity constants
//!
//! # Example
//!
//! ```rust
//! use supermodel_core::{Message, MessageRole};
//!
//! let msg = Message::user("How many users are there?");
//! assert_eq!(msg.role, MessageRole::User);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application title, attached to the service self-description.
pub const SERVICE_TITLE: &str = "Agentic AI Supermodel";

/// Fixed greeting returned by the root endpoint.
pub const GREETING: &str = "🚀 Agentic AI Supermodel Backend is Running!";

/// Errors that can occur during LLM calls or SQL tool execution.
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM API request failed.
    #[error("LLM request failed: {0}")]
    LlmError(String),

    /// Failed to parse the LLM response.
    #[error("Failed to parse LLM response: {0}")]
    ParseError(String),

    /// Generated statement failed the safety check.
    #[error("Unsafe SQL rejected: {0}")]
    UnsafeSql(String),
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::ParseError(err.to_string())
    }
}

/// Role of a message in a conversation.
///
/// `Sql` marks the generated statement persisted between the user's
/// question and the assistant's answer; it never reaches the LLM API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the assistant/LLM.
    Assistant,
    /// Generated SQL recorded in the conversation log.
    Sql,
}

impl MessageRole {
    /// Returns the wire/storage name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Sql => "sql",
        }
    }

    /// Parses a stored role name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(MessageRole::User),
            "assistant" => Some(MessageRole::Assistant),
            "sql" => Some(MessageRole::Sql),
            _ => None,
        }
    }
}

/// A single message in a conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub content: String,
}

impl Message {
    /// Creates a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: MessageRole::User, content: content.into() }
    }

    /// Creates a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: MessageRole::Assistant, content: content.into() }
    }

    /// Creates a new SQL log message.
    pub fn sql(content: impl Into<String>) -> Self {
        Self { role: MessageRole::Sql, content: content.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_string(&MessageRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        let back: MessageRole = serde_json::from_str("\"sql\"").unwrap();
        assert_eq!(back, MessageRole::Sql);
    }

    #[test]
    fn role_round_trips_through_storage_name() {
        for role in [MessageRole::User, MessageRole::Assistant, MessageRole::Sql] {
            assert_eq!(MessageRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(MessageRole::parse("system"), None);
    }

    #[test]
    fn constructors_set_role_and_content() {
        let msg = Message::sql("SELECT COUNT(*) FROM users;");
        assert_eq!(msg.role, MessageRole::Sql);
        assert_eq!(msg.content, "SELECT COUNT(*) FROM users;");
    }
}
