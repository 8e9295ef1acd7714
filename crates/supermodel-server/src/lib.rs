//! HTTP server for the Agentic AI Supermodel backend.
//!
//! Exposes the fixed root greeting, the agentic ask pipeline (natural
//! language → validated SELECT → answer), per-user history, and user
//! management. Routing and state live here so integration tests can drive
//! the router directly; the binary in `main.rs` only wires configuration
//! and serves.

pub mod db;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod services;

use std::sync::{Arc, Mutex, MutexGuard};

use supermodel_config::ServerConfig;
use supermodel_llm::SqlGenerator;

pub use router::router;

/// Shared server state accessible from all handlers.
pub struct ServerState {
    pub db: Mutex<rusqlite::Connection>,
    pub llm: Arc<dyn SqlGenerator>,
    pub config: ServerConfig,
}

impl ServerState {
    pub fn new(
        conn: rusqlite::Connection,
        llm: Arc<dyn SqlGenerator>,
        config: ServerConfig,
    ) -> Self {
        Self { db: Mutex::new(conn), llm, config }
    }

    /// Acquires the database lock, converting poison errors to AppError.
    pub fn db_lock(&self) -> Result<MutexGuard<'_, rusqlite::Connection>, error::AppError> {
        self.db.lock().map_err(|e| {
            tracing::error!("DB lock poisoned: {}", e);
            error::AppError::Internal("database lock error".into())
        })
    }
}
