//! The ask pipeline: question → context → generated SQL → validated
//! execution → persisted answer.

use supermodel_core::{Message, MessageRole};
use supermodel_llm::{GeneratedSql, UNSUPPORTED};
use tracing::{info, warn};

use crate::db;
use crate::dto::{AskParams, AskResponse};
use crate::error::AppError;
use crate::services::database_tool;
use crate::ServerState;

/// Canned answer when no safe SELECT could be generated.
pub const UNSUPPORTED_ANSWER: &str = "I can only answer safe database-related questions. \
    Examples:\n- How many users are there?\n- What was the first question asked by User 1?\n\
    - Show me all reports for User 2.";

/// Runs the full ask pipeline for one question.
pub async fn handle_question(
    state: &ServerState,
    params: AskParams,
) -> Result<AskResponse, AppError> {
    let AskParams { user_id, question, conversation_id: requested_conversation } = params;

    // Everything before the LLM call happens under one lock; the guard is
    // dropped before the await.
    let (conversation_id, history) = {
        let conn = state.db_lock()?;
        if db::find_user(&conn, user_id)?.is_none() {
            return Err(AppError::BadRequest("User not found".into()));
        }

        let conversation = match requested_conversation {
            Some(id) => db::find_conversation(&conn, id)?
                .ok_or_else(|| AppError::NotFound("Conversation not found".into()))?,
            None => db::create_conversation(&conn, user_id)?,
        };

        db::insert_message(&conn, conversation.id, MessageRole::User, &question)?;

        // Context: this conversation's turns, then the user's legacy log as
        // user/assistant pairs.
        let mut history: Vec<Message> = db::list_messages(&conn, conversation.id)?
            .iter()
            .filter_map(|m| {
                MessageRole::parse(&m.role)
                    .map(|role| Message { role, content: m.content.clone() })
            })
            .collect();
        for entry in db::list_query_records(&conn, user_id)? {
            history.push(Message::user(entry.question));
            history.push(Message::assistant(entry.answer.unwrap_or_default()));
        }

        (conversation.id, history)
    };

    let generated = match state.llm.generate_sql(&question, &history, user_id).await {
        Ok(generated) => generated,
        Err(e) => {
            warn!("SQL generation failed, treating as unsupported: {}", e);
            GeneratedSql::Unsupported
        }
    };

    let conn = state.db_lock()?;
    let (sql, answer) = match &generated {
        GeneratedSql::Query(sql) => {
            db::insert_message(&conn, conversation_id, MessageRole::Sql, sql)?;
            let answer = database_tool::execute_safe_query(&conn, sql);
            (sql.clone(), answer)
        }
        GeneratedSql::Unsupported => {
            db::insert_message(&conn, conversation_id, MessageRole::Sql, UNSUPPORTED)?;
            (UNSUPPORTED.to_string(), UNSUPPORTED_ANSWER.to_string())
        }
    };

    db::insert_message(&conn, conversation_id, MessageRole::Assistant, &answer)?;
    db::insert_query_record(&conn, user_id, &question, &answer)?;
    info!("answered question for user {} in conversation {}", user_id, conversation_id);

    Ok(AskResponse { conversation_id, question, sql, answer })
}
