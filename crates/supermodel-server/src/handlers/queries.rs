//! Ask pipeline and history handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;

use crate::dto::{AskParams, AskResponse, HistoryEntry, HistoryParams};
use crate::error::AppError;
use crate::services::agent;
use crate::{db, ServerState};

/// `POST /api/queries/ask` — answers a natural-language question.
pub async fn ask(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<AskParams>,
) -> Result<Json<AskResponse>, AppError> {
    let response = agent::handle_question(&state, params).await?;
    Ok(Json(response))
}

/// `GET /api/queries/history` — a user's question/answer log.
pub async fn history(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    let conn = state.db_lock()?;
    if db::find_user(&conn, params.user_id)?.is_none() {
        return Err(AppError::BadRequest("User not found".into()));
    }
    Ok(Json(db::list_query_records(&conn, params.user_id)?))
}
