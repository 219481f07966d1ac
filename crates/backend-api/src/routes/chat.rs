use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};

use crate::extract::Json;
use crate::routes::models::{MessageSentResponse, MessagesResponse, SendMessageRequest};
use crate::services::message;
use crate::util::require_bearer;
use crate::{ApiError, AppState};

#[utoipa::path(
    get,
    path = "/api/chat/{user_id}",
    tag = "Chat",
    security(("bearerAuth" = [])),
    params(("user_id" = String, Path, description = "Public id of the other participant")),
    responses(
        (status = 200, description = "Conversation history, oldest first", body = MessagesResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_conversation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let identity = state.authenticate(&token).await?;

    let messages = message::fetch_conversation(state.db_pool(), &identity, &user_id).await?;

    Ok(Json(MessagesResponse {
        success: true,
        messages,
    }))
}

#[utoipa::path(
    post,
    path = "/api/chat/{user_id}",
    tag = "Chat",
    security(("bearerAuth" = [])),
    params(("user_id" = String, Path, description = "Public id of the recipient")),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message stored", body = MessageSentResponse),
        (status = 400, description = "Empty message or self-messaging", body = crate::error::ErrorResponse),
        (status = 404, description = "Recipient not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageSentResponse>), ApiError> {
    let token = require_bearer(&headers)?;
    let identity = state.authenticate(&token).await?;

    let sent = message::send_message(
        state.db_pool(),
        state.mailer(),
        &identity,
        &user_id,
        &payload.message,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageSentResponse {
            success: true,
            sent,
        }),
    ))
}
