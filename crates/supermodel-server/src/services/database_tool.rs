//! Safe execution of generated SELECT statements.
//!
//! Every statement the model produces passes through [`validate_select`]
//! before touching the database. Failures surface as answer strings, not
//! HTTP errors: the pipeline persists whatever the tool says.

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::Value;
use supermodel_core::AgentError;
use tracing::warn;

/// Answer returned when a statement fails validation.
pub const UNSAFE_ANSWER: &str = "❌ This type of query is not supported for safety reasons.";

/// Answer returned when a query yields no rows.
pub const EMPTY_ANSWER: &str = "No results found.";

const DENYLIST: [&str; 7] =
    ["insert", "update", "delete", "drop", "alter", "create", "truncate"];

/// Validates that a statement is a single SELECT reading from a table,
/// with no write keywords anywhere in it.
pub fn validate_select(sql: &str) -> Result<(), AgentError> {
    let trimmed = sql.trim().trim_end_matches(';').trim();
    if trimmed.is_empty() {
        return Err(AgentError::UnsafeSql("empty statement".into()));
    }

    let lowered = trimmed.to_lowercase();
    if !lowered.starts_with("select") {
        return Err(AgentError::UnsafeSql("only SELECT statements are allowed".into()));
    }
    if lowered.contains(';') {
        return Err(AgentError::UnsafeSql("multiple statements are not allowed".into()));
    }

    let mut has_from = false;
    for word in lowered.split(|c: char| !c.is_ascii_alphanumeric() && c != '_') {
        if DENYLIST.contains(&word) {
            return Err(AgentError::UnsafeSql(format!("forbidden keyword '{word}'")));
        }
        if word == "from" {
            has_from = true;
        }
    }
    if !has_from {
        return Err(AgentError::UnsafeSql("statement must select from a table".into()));
    }

    Ok(())
}

/// Validates and runs a generated statement, shaping the result into an
/// answer string: scalar collapse for 1×1 results, [`EMPTY_ANSWER`] for
/// empty ones, pretty-printed JSON rows otherwise.
pub fn execute_safe_query(conn: &Connection, sql: &str) -> String {
    if let Err(e) = validate_select(sql) {
        warn!("rejected generated SQL: {}", e);
        return UNSAFE_ANSWER.to_string();
    }

    match run_select(conn, sql) {
        Ok(answer) => answer,
        Err(e) => format!("❌ Error executing query: {e}"),
    }
}

fn run_select(conn: &Connection, sql: &str) -> rusqlite::Result<String> {
    let mut stmt = conn.prepare(sql)?;
    let column_count = stmt.column_count();
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

    let mut results: Vec<Value> = Vec::new();
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let mut object = serde_json::Map::new();
        for (i, column) in columns.iter().enumerate() {
            object.insert(column.clone(), value_to_json(row.get_ref(i)?));
        }
        results.push(Value::Object(object));
    }

    if results.is_empty() {
        return Ok(EMPTY_ANSWER.to_string());
    }

    if results.len() == 1 && column_count == 1 {
        if let Some(value) = results[0].as_object().and_then(|o| o.values().next()) {
            return Ok(scalar_to_text(value));
        }
    }

    Ok(serde_json::to_string_pretty(&results).unwrap_or_else(|_| "[]".into()))
}

fn scalar_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".into(),
        other => other.to_string(),
    }
}

fn value_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(String::from_utf8_lossy(b).into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn seeded_conn() -> Connection {
        let conn = db::init_db(":memory:").unwrap();
        db::seed_demo_users(&conn).unwrap();
        conn
    }

    #[test]
    fn accepts_plain_and_filtered_selects() {
        validate_select("SELECT COUNT(*) FROM users;").unwrap();
        validate_select("SELECT username FROM users WHERE id = 1 ORDER BY created_at ASC LIMIT 1").unwrap();
        validate_select(
            "SELECT q.query_text FROM queries q JOIN users u ON q.user_id = u.id \
             WHERE LOWER(u.username) = 'alice'",
        )
        .unwrap();
    }

    #[test]
    fn rejects_write_statements() {
        for sql in [
            "INSERT INTO users (username) VALUES ('mallory')",
            "UPDATE users SET role = 'admin'",
            "DELETE FROM users",
            "DROP TABLE users",
            "ALTER TABLE users ADD COLUMN pwned TEXT",
            "CREATE TABLE pwned (id INTEGER)",
            "TRUNCATE TABLE users",
        ] {
            assert!(validate_select(sql).is_err(), "accepted: {sql}");
        }
    }

    #[test]
    fn rejects_stacked_statements_and_embedded_writes() {
        assert!(validate_select("SELECT * FROM users; DROP TABLE users").is_err());
        assert!(validate_select("SELECT * FROM users WHERE id IN (DELETE FROM users)").is_err());
    }

    #[test]
    fn rejects_non_table_selects() {
        assert!(validate_select("SELECT 1").is_err());
        assert!(validate_select("").is_err());
    }

    #[test]
    fn column_names_are_not_mistaken_for_keywords() {
        validate_select("SELECT created_at FROM users").unwrap();
    }

    #[test]
    fn single_scalar_collapses_to_text() {
        let conn = seeded_conn();
        assert_eq!(execute_safe_query(&conn, "SELECT COUNT(*) FROM users"), "2");
    }

    #[test]
    fn empty_result_has_fixed_answer() {
        let conn = seeded_conn();
        let answer = execute_safe_query(&conn, "SELECT * FROM audit_logs");
        assert_eq!(answer, EMPTY_ANSWER);
    }

    #[test]
    fn row_sets_come_back_as_json() {
        let conn = seeded_conn();
        let answer = execute_safe_query(&conn, "SELECT id, username FROM users ORDER BY id");
        let rows: Vec<serde_json::Value> = serde_json::from_str(&answer).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["username"], "alice");
        assert_eq!(rows[1]["username"], "bob");
    }

    #[test]
    fn unsafe_statement_yields_canned_answer() {
        let conn = seeded_conn();
        assert_eq!(execute_safe_query(&conn, "DROP TABLE users"), UNSAFE_ANSWER);
    }

    #[test]
    fn execution_failure_is_reported_in_the_answer() {
        let conn = seeded_conn();
        let answer = execute_safe_query(&conn, "SELECT no_such_column FROM users");
        assert!(answer.starts_with("❌ Error executing query:"), "got: {answer}");
    }
}
