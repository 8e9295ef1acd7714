//! SQLite persistence layer.
//!
//! Creates the schema on startup and seeds demo users on first run. The
//! `reports` and `audit_logs` tables are never written by the API; they
//! exist because the SQL generator's schema listing documents them as
//! queryable.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use supermodel_core::MessageRole;
use tracing::info;

use crate::dto::{Conversation, HistoryEntry, NewUserRequest, StoredMessage, User};

/// Initializes the database, creating tables if needed.
pub fn init_db(path: &str) -> Result<Connection> {
    if let Some(parent) = Path::new(path).parent() {
        fs::create_dir_all(parent).context("failed to create db directory")?;
    }
    let conn = Connection::open(path).context("failed to open database")?;
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            email TEXT UNIQUE,
            role TEXT NOT NULL DEFAULT 'user',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE TABLE IF NOT EXISTS conversations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            title TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE TABLE IF NOT EXISTS conversation_messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            conversation_id INTEGER NOT NULL,
            role TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE TABLE IF NOT EXISTS queries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            query_text TEXT NOT NULL,
            response_text TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE TABLE IF NOT EXISTS reports (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER,
            report_name TEXT,
            report_file TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE TABLE IF NOT EXISTS audit_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER,
            action TEXT,
            metadata TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .context("failed to create tables")?;
    info!("Database initialized at {}", path);
    Ok(conn)
}

/// Seeds demo users (and a sample report) if the users table is empty.
pub fn seed_demo_users(conn: &Connection) -> Result<()> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?;
    if count > 0 {
        info!("Database already has {} users, skipping seed", count);
        return Ok(());
    }

    info!("Seeding demo users...");
    conn.execute(
        "INSERT INTO users (username, email, role) VALUES ('alice', 'alice@example.com', 'admin')",
        [],
    )?;
    conn.execute(
        "INSERT INTO users (username, email, role) VALUES ('bob', 'bob@example.com', 'user')",
        [],
    )?;
    conn.execute(
        "INSERT INTO reports (user_id, report_name, report_file) \
         VALUES (2, 'Quarterly Summary', 'reports/q1-summary.pdf')",
        [],
    )?;
    Ok(())
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        role: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Looks up a user by id.
pub fn find_user(conn: &Connection, id: i64) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        "SELECT id, username, email, role, created_at FROM users WHERE id = ?1",
        params![id],
        user_from_row,
    )
    .optional()
}

/// Lists all users.
pub fn list_users(conn: &Connection) -> rusqlite::Result<Vec<User>> {
    let mut stmt =
        conn.prepare("SELECT id, username, email, role, created_at FROM users ORDER BY id ASC")?;
    let users = stmt.query_map([], user_from_row)?.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(users)
}

/// Inserts a new user and returns the stored row.
pub fn insert_user(conn: &Connection, req: &NewUserRequest) -> rusqlite::Result<User> {
    let role = req.role.as_deref().unwrap_or("user");
    conn.execute(
        "INSERT INTO users (username, email, role) VALUES (?1, ?2, ?3)",
        params![req.username, req.email, role],
    )?;
    let id = conn.last_insert_rowid();
    find_user(conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
}

/// Creates a conversation titled with the current timestamp.
pub fn create_conversation(conn: &Connection, user_id: i64) -> rusqlite::Result<Conversation> {
    conn.execute(
        "INSERT INTO conversations (user_id, title) \
         VALUES (?1, 'Conversation started at ' || datetime('now'))",
        params![user_id],
    )?;
    let id = conn.last_insert_rowid();
    find_conversation(conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
}

/// Looks up a conversation by id.
pub fn find_conversation(conn: &Connection, id: i64) -> rusqlite::Result<Option<Conversation>> {
    conn.query_row(
        "SELECT id, user_id, title FROM conversations WHERE id = ?1",
        params![id],
        |row| Ok(Conversation { id: row.get(0)?, user_id: row.get(1)?, title: row.get(2)? }),
    )
    .optional()
}

/// Appends a message to a conversation.
pub fn insert_message(
    conn: &Connection,
    conversation_id: i64,
    role: MessageRole,
    content: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO conversation_messages (conversation_id, role, content) VALUES (?1, ?2, ?3)",
        params![conversation_id, role.as_str(), content],
    )?;
    Ok(())
}

/// Lists a conversation's messages in insertion order.
pub fn list_messages(conn: &Connection, conversation_id: i64) -> rusqlite::Result<Vec<StoredMessage>> {
    let mut stmt = conn.prepare(
        "SELECT role, content FROM conversation_messages \
         WHERE conversation_id = ?1 ORDER BY created_at ASC, id ASC",
    )?;
    let messages = stmt
        .query_map(params![conversation_id], |row| {
            Ok(StoredMessage { role: row.get(0)?, content: row.get(1)? })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(messages)
}

/// Appends to the legacy per-user question/answer log.
pub fn insert_query_record(
    conn: &Connection,
    user_id: i64,
    question: &str,
    answer: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO queries (user_id, query_text, response_text) VALUES (?1, ?2, ?3)",
        params![user_id, question, answer],
    )?;
    Ok(())
}

/// Lists a user's question/answer log in chronological order.
pub fn list_query_records(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<HistoryEntry>> {
    let mut stmt = conn.prepare(
        "SELECT query_text, response_text, created_at FROM queries \
         WHERE user_id = ?1 ORDER BY created_at ASC, id ASC",
    )?;
    let entries = stmt
        .query_map(params![user_id], |row| {
            Ok(HistoryEntry { question: row.get(0)?, answer: row.get(1)?, timestamp: row.get(2)? })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_conn() -> Connection {
        init_db(":memory:").unwrap()
    }

    #[test]
    fn init_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.db");
        let conn = init_db(path.to_str().unwrap()).unwrap();
        seed_demo_users(&conn).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn seed_runs_once() {
        let conn = test_conn();
        seed_demo_users(&conn).unwrap();
        seed_demo_users(&conn).unwrap();
        assert_eq!(list_users(&conn).unwrap().len(), 2);
    }

    #[test]
    fn insert_and_find_user() {
        let conn = test_conn();
        let req = NewUserRequest {
            username: "carol".into(),
            email: Some("carol@example.com".into()),
            role: None,
        };
        let user = insert_user(&conn, &req).unwrap();
        assert_eq!(user.role, "user");

        let found = find_user(&conn, user.id).unwrap().unwrap();
        assert_eq!(found.username, "carol");
        assert!(find_user(&conn, 9999).unwrap().is_none());
    }

    #[test]
    fn duplicate_username_is_a_constraint_error() {
        let conn = test_conn();
        seed_demo_users(&conn).unwrap();
        let req = NewUserRequest { username: "alice".into(), email: None, role: None };
        assert!(insert_user(&conn, &req).is_err());
    }

    #[test]
    fn conversation_title_carries_timestamp() {
        let conn = test_conn();
        seed_demo_users(&conn).unwrap();
        let conv = create_conversation(&conn, 1).unwrap();
        assert!(conv.title.starts_with("Conversation started at "));
        assert_eq!(conv.user_id, 1);
    }

    #[test]
    fn messages_come_back_in_insertion_order() {
        let conn = test_conn();
        seed_demo_users(&conn).unwrap();
        let conv = create_conversation(&conn, 1).unwrap();
        insert_message(&conn, conv.id, MessageRole::User, "How many users?").unwrap();
        insert_message(&conn, conv.id, MessageRole::Sql, "SELECT COUNT(*) FROM users;").unwrap();
        insert_message(&conn, conv.id, MessageRole::Assistant, "2").unwrap();

        let messages = list_messages(&conn, conv.id).unwrap();
        let roles: Vec<&str> = messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["user", "sql", "assistant"]);
    }

    #[test]
    fn query_log_is_chronological_and_per_user() {
        let conn = test_conn();
        seed_demo_users(&conn).unwrap();
        insert_query_record(&conn, 1, "first?", "one").unwrap();
        insert_query_record(&conn, 1, "second?", "two").unwrap();
        insert_query_record(&conn, 2, "other user", "n/a").unwrap();

        let entries = list_query_records(&conn, 1).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].question, "first?");
        assert_eq!(entries[1].question, "second?");
    }
}
