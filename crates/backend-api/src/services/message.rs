use nexus_auth::Identity;
use nexus_mailer::Mailer;
use sqlx::SqlitePool;

use super::error::ServiceError;
use crate::routes::models::ChatMessageView;

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i64,
    sender_public_id: String,
    receiver_public_id: String,
    sender_name: String,
    sender_avatar_url: Option<String>,
    body: String,
    created_at: String,
}

impl From<MessageRow> for ChatMessageView {
    fn from(row: MessageRow) -> Self {
        ChatMessageView {
            id: row.id,
            sender_id: row.sender_public_id,
            receiver_id: row.receiver_public_id,
            sender_name: row.sender_name,
            sender_avatar_url: row.sender_avatar_url,
            message: row.body,
            timestamp: row.created_at,
        }
    }
}

/// Store a direct message and notify the receiver by email without blocking
/// the response.
pub async fn send_message(
    pool: &SqlitePool,
    mailer: &Mailer,
    sender: &Identity,
    receiver_public_id: &str,
    body: &str,
) -> Result<ChatMessageView, ServiceError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(ServiceError::bad_request("Message cannot be empty"));
    }
    if receiver_public_id == sender.public_id {
        return Err(ServiceError::bad_request(
            "You cannot message yourself",
        ));
    }

    let receiver: Option<(i64, String, String)> =
        sqlx::query_as("SELECT id, name, email FROM users WHERE public_id = ?")
            .bind(receiver_public_id)
            .fetch_optional(pool)
            .await?;
    let (receiver_id, receiver_name, receiver_email) =
        receiver.ok_or_else(|| ServiceError::not_found("Recipient not found"))?;

    let message_id = sqlx::query(
        "INSERT INTO messages (sender_id, receiver_id, body, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(sender.user_id)
    .bind(receiver_id)
    .bind(body)
    .bind(chrono::Utc::now().to_rfc3339())
    .execute(pool)
    .await?
    .last_insert_rowid();

    let sender_name: String = sqlx::query_scalar("SELECT name FROM users WHERE id = ?")
        .bind(sender.user_id)
        .fetch_one(pool)
        .await?;

    // Fire-and-forget notification.
    {
        let mailer = mailer.clone();
        let sender_public_id = sender.public_id.clone();
        let sender_name = sender_name.clone();
        tokio::spawn(async move {
            if let Err(err) = mailer
                .send_new_message(&receiver_email, &receiver_name, &sender_name, &sender_public_id)
                .await
            {
                tracing::warn!(error = %err, "failed to send new-message email");
            }
        });
    }

    fetch_message(pool, message_id).await
}

async fn fetch_message(
    pool: &SqlitePool,
    message_id: i64,
) -> Result<ChatMessageView, ServiceError> {
    let row: Option<MessageRow> = sqlx::query_as(
        r#"
        SELECT m.id, s.public_id AS sender_public_id, r.public_id AS receiver_public_id,
               s.name AS sender_name, s.avatar_url AS sender_avatar_url,
               m.body, m.created_at
        FROM messages m
        JOIN users s ON s.id = m.sender_id
        JOIN users r ON r.id = m.receiver_id
        WHERE m.id = ?
        "#,
    )
    .bind(message_id)
    .fetch_optional(pool)
    .await?;

    row.map(ChatMessageView::from)
        .ok_or_else(|| ServiceError::not_found("Message not found"))
}

/// The full conversation between the caller and another user, both
/// directions, oldest first.
pub async fn fetch_conversation(
    pool: &SqlitePool,
    caller: &Identity,
    other_public_id: &str,
) -> Result<Vec<ChatMessageView>, ServiceError> {
    let other_id = super::user::resolve_user_id(pool, other_public_id).await?;

    let rows: Vec<MessageRow> = sqlx::query_as(
        r#"
        SELECT m.id, s.public_id AS sender_public_id, r.public_id AS receiver_public_id,
               s.name AS sender_name, s.avatar_url AS sender_avatar_url,
               m.body, m.created_at
        FROM messages m
        JOIN users s ON s.id = m.sender_id
        JOIN users r ON r.id = m.receiver_id
        WHERE (m.sender_id = ? AND m.receiver_id = ?)
           OR (m.sender_id = ? AND m.receiver_id = ?)
        ORDER BY m.created_at ASC, m.id ASC
        "#,
    )
    .bind(caller.user_id)
    .bind(other_id)
    .bind(other_id)
    .bind(caller.user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ChatMessageView::from).collect())
}
