//! LLM-backed SQL generation.
//!
//! The server talks to the generation seam through the [`SqlGenerator`]
//! trait; [`PerplexityClient`] is the live implementation and
//! [`ScriptedSqlGenerator`] the test double. The model either returns a
//! candidate SELECT statement or declines with the [`UNSUPPORTED`]
//! sentinel, which [`GeneratedSql::from_model_output`] normalizes.

mod client;
mod mock;
mod prompt;

pub use client::PerplexityClient;
pub use mock::ScriptedSqlGenerator;

use async_trait::async_trait;
use supermodel_core::{AgentError, Message};

/// Sentinel the model replies with when no safe SELECT exists.
pub const UNSUPPORTED: &str = "UNSUPPORTED";

/// Outcome of a SQL generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedSql {
    /// A candidate SELECT statement (not yet validated).
    Query(String),
    /// The model declined to produce a safe SELECT.
    Unsupported,
}

impl GeneratedSql {
    /// Normalizes raw model output: strips markdown fences, maps the
    /// sentinel (or an empty reply) to [`GeneratedSql::Unsupported`].
    pub fn from_model_output(raw: &str) -> Self {
        let sql = prompt::strip_code_fences(raw);
        if sql.is_empty() || sql.eq_ignore_ascii_case(UNSUPPORTED) {
            GeneratedSql::Unsupported
        } else {
            GeneratedSql::Query(sql)
        }
    }
}

/// Turns a natural-language question into a candidate SQL statement.
#[async_trait]
pub trait SqlGenerator: Send + Sync {
    /// Generates SQL for `question` given the conversation `history`.
    /// `user_id` resolves first-person references in the question.
    async fn generate_sql(
        &self,
        question: &str,
        history: &[Message],
        user_id: i64,
    ) -> Result<GeneratedSql, AgentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_output_maps_sentinel_to_unsupported() {
        assert_eq!(GeneratedSql::from_model_output("UNSUPPORTED"), GeneratedSql::Unsupported);
        assert_eq!(GeneratedSql::from_model_output("unsupported"), GeneratedSql::Unsupported);
        assert_eq!(GeneratedSql::from_model_output("   "), GeneratedSql::Unsupported);
    }

    #[test]
    fn model_output_keeps_plain_sql() {
        assert_eq!(
            GeneratedSql::from_model_output("SELECT COUNT(*) FROM users;"),
            GeneratedSql::Query("SELECT COUNT(*) FROM users;".into())
        );
    }

    #[test]
    fn model_output_strips_fences() {
        assert_eq!(
            GeneratedSql::from_model_output("```sql\nSELECT id FROM users;\n```"),
            GeneratedSql::Query("SELECT id FROM users;".into())
        );
    }
}
