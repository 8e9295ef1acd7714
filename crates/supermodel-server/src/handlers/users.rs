//! User management handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::dto::{NewUserRequest, User};
use crate::error::AppError;
use crate::{db, ServerState};

/// `GET /api/users` — all users.
pub async fn list(State(state): State<Arc<ServerState>>) -> Result<Json<Vec<User>>, AppError> {
    let conn = state.db_lock()?;
    Ok(Json(db::list_users(&conn)?))
}

/// `POST /api/users` — creates a user.
pub async fn create(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<NewUserRequest>,
) -> Result<Json<User>, AppError> {
    let conn = state.db_lock()?;
    match db::insert_user(&conn, &req) {
        Ok(user) => Ok(Json(user)),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(AppError::BadRequest("username or email already exists".into()))
        }
        Err(e) => Err(e.into()),
    }
}
