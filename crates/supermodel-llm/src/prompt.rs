//! System prompt and chat-context assembly for SQL generation.

use supermodel_core::{Message, MessageRole};
use tracing::debug;

use crate::client::ChatMessage;

/// Builds the system instruction for the SQL generator.
///
/// The schema listing below must stay in sync with the tables created by
/// the server's database initialization.
pub(crate) fn system_prompt(user_id: i64) -> String {
    format!(
        "You are an expert SQL generator. Convert natural language questions into SQL queries \
         for a SQLite database.\n\n\
         STRICT RULES:\n\
         - Only generate safe SELECT queries.\n\
         - Allowed operations: WHERE filters, ORDER BY, LIMIT, GROUP BY, aggregations \
         (COUNT, SUM, etc.), and safe joins.\n\
         - Forbidden: INSERT, UPDATE, DELETE, DROP, ALTER, CREATE, TRUNCATE, or any DDL/DML.\n\
         - If truly impossible with a SELECT query, respond only with: UNSUPPORTED.\n\n\
         Interpretation rules:\n\
         - The phrase 'I' or 'me' always refers to the current user with id = {user_id}.\n\
         - 'User <number>' means users.id = <number>.\n\
         - 'User <name>' means users.username = '<name>' (case-insensitive).\n\
         - To fetch questions asked by a user, select from the queries table using \
         queries.user_id.\n\n\
         Database schema:\n\
         users(id INTEGER, username TEXT, email TEXT, role TEXT, created_at TEXT)\n\
         queries(id INTEGER, user_id INTEGER, query_text TEXT, response_text TEXT, created_at TEXT)\n\
         reports(id INTEGER, user_id INTEGER, report_name TEXT, report_file TEXT, created_at TEXT)\n\
         audit_logs(id INTEGER, user_id INTEGER, action TEXT, metadata TEXT, created_at TEXT)\n\n\
         Examples:\n\
         - Question: 'Show me all questions I have asked.'\n\
           SQL: SELECT query_text FROM queries WHERE user_id = {user_id} ORDER BY created_at ASC;\n\n\
         Always output only the SQL query, no explanations, no markdown."
    )
}

/// Assembles the wire messages for a generation request.
///
/// Only user and assistant turns are forwarded; stored `sql` turns are
/// bookkeeping. Consecutive same-role turns collapse to the first, and the
/// live question is appended only when the context does not already end
/// with a user turn.
pub(crate) fn build_messages(system: &str, history: &[Message], question: &str) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage { role: "system", content: system.to_string() }];

    let mut last_role: Option<MessageRole> = None;
    for msg in history {
        let role = match msg.role {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Sql => continue,
        };
        if last_role == Some(msg.role) {
            debug!("skipping consecutive {} turn in context", msg.role.as_str());
            continue;
        }
        messages.push(ChatMessage { role, content: msg.content.clone() });
        last_role = Some(msg.role);
    }

    if last_role != Some(MessageRole::User) {
        messages.push(ChatMessage { role: "user", content: question.to_string() });
    }

    messages
}

/// Strips markdown code fences from model output.
pub(crate) fn strip_code_fences(raw: &str) -> String {
    raw.replace("```sql", "").replace("```", "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(messages: &[ChatMessage]) -> Vec<&'static str> {
        messages.iter().map(|m| m.role).collect()
    }

    #[test]
    fn context_starts_with_system_and_ends_with_question() {
        let messages = build_messages("sys", &[], "How many users are there?");
        assert_eq!(roles(&messages), vec!["system", "user"]);
        assert_eq!(messages[1].content, "How many users are there?");
    }

    #[test]
    fn sql_turns_are_not_forwarded() {
        let history = vec![
            Message::user("How many users?"),
            Message::sql("SELECT COUNT(*) FROM users;"),
            Message::assistant("2"),
        ];
        let messages = build_messages("sys", &history, "And reports?");
        assert_eq!(roles(&messages), vec!["system", "user", "assistant", "user"]);
    }

    #[test]
    fn consecutive_same_role_turns_collapse_to_first() {
        let history = vec![
            Message::user("first"),
            Message::user("second"),
            Message::assistant("answer"),
        ];
        let messages = build_messages("sys", &history, "next");
        assert_eq!(roles(&messages), vec!["system", "user", "assistant", "user"]);
        assert_eq!(messages[1].content, "first");
    }

    #[test]
    fn question_not_duplicated_when_context_ends_with_user_turn() {
        let history = vec![Message::user("pending question")];
        let messages = build_messages("sys", &history, "pending question");
        assert_eq!(roles(&messages), vec!["system", "user"]);
        assert_eq!(messages[1].content, "pending question");
    }

    #[test]
    fn system_prompt_carries_current_user_id() {
        let prompt = system_prompt(42);
        assert!(prompt.contains("the current user with id = 42"));
        assert!(prompt.contains("respond only with: UNSUPPORTED"));
    }

    #[test]
    fn fence_stripping_handles_plain_and_fenced_output() {
        assert_eq!(strip_code_fences("SELECT 1 FROM users;"), "SELECT 1 FROM users;");
        assert_eq!(strip_code_fences("```sql\nSELECT 1 FROM users;\n```"), "SELECT 1 FROM users;");
        assert_eq!(strip_code_fences("```\nSELECT 1 FROM users;\n```"), "SELECT 1 FROM users;");
    }
}
