use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use crate::db::{ChatHistory, ChatLogEntry};
use crate::error::{ApiError, ApiResult};
use crate::routes::{AppState, SharedState};
use crate::services::chat::{self, ChatReply, ChatRequest};

/// Chat with the health assistant
pub async fn send_message(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Json<ChatReply>> {
    let Json(req) = payload?;
    reply(&state, req).map(Json)
}

pub fn reply(state: &AppState, req: ChatRequest) -> ApiResult<ChatReply> {
    if req.message.trim().is_empty() {
        return Err(ApiError::unprocessable("Message cannot be empty"));
    }

    let mut reply = chat::process_message(&req.message, req.context.as_ref());
    let stored = state.db()?.insert_chat_message(&ChatLogEntry {
        timestamp: reply.timestamp.clone(),
        user_message: req.message,
        detected_intent: reply.intent.clone(),
        ai_response: reply.response.clone(),
        entities: reply.entities_detected.clone(),
    })?;
    reply.conversation_id = stored;

    log::debug!("Chat message {} classified as {}", reply.conversation_id, reply.intent);
    Ok(reply)
}

/// Conversation summary and full history
pub async fn history(State(state): State<SharedState>) -> ApiResult<Json<ChatHistory>> {
    Ok(Json(state.db()?.chat_summary()?))
}
