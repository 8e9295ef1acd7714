//! Scripted SQL generator for tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use supermodel_core::{AgentError, Message};

use crate::{GeneratedSql, SqlGenerator};

/// A scripted generator. Returns pre-defined outcomes in order; once the
/// script is exhausted it keeps answering [`GeneratedSql::Unsupported`],
/// matching how the server degrades when generation fails.
pub struct ScriptedSqlGenerator {
    script: Vec<GeneratedSql>,
    index: AtomicUsize,
}

impl ScriptedSqlGenerator {
    pub fn new(script: Vec<GeneratedSql>) -> Self {
        Self { script, index: AtomicUsize::new(0) }
    }

    /// Convenience constructor for a single scripted statement.
    pub fn query(sql: impl Into<String>) -> Self {
        Self::new(vec![GeneratedSql::Query(sql.into())])
    }

    /// Generator that always declines.
    pub fn unsupported() -> Self {
        Self::new(vec![])
    }
}

#[async_trait]
impl SqlGenerator for ScriptedSqlGenerator {
    async fn generate_sql(
        &self,
        _question: &str,
        _history: &[Message],
        _user_id: i64,
    ) -> Result<GeneratedSql, AgentError> {
        let i = self.index.fetch_add(1, Ordering::SeqCst);
        Ok(self.script.get(i).cloned().unwrap_or(GeneratedSql::Unsupported))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_script_then_declines() {
        let gen = ScriptedSqlGenerator::new(vec![
            GeneratedSql::Query("SELECT COUNT(*) FROM users;".into()),
        ]);
        assert_eq!(
            gen.generate_sql("q", &[], 1).await.unwrap(),
            GeneratedSql::Query("SELECT COUNT(*) FROM users;".into())
        );
        assert_eq!(gen.generate_sql("q", &[], 1).await.unwrap(), GeneratedSql::Unsupported);
    }
}
