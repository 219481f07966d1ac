use nexus_auth::{Identity, UserRole};
use nexus_mailer::Mailer;
use sqlx::SqlitePool;

use super::error::ServiceError;
use crate::routes::models::CollaborationRequestView;

const VIEW_SQL: &str = r#"
    r.id,
    inv.public_id AS investor_public_id,
    ent.public_id AS entrepreneur_public_id,
    r.status,
    r.created_at,
    inv.name AS investor_name,
    inv.avatar_url AS investor_avatar_url,
    ent.name AS entrepreneur_name,
    ent.avatar_url AS entrepreneur_avatar_url
    FROM requests r
    JOIN users inv ON inv.id = r.investor_id
    JOIN users ent ON ent.id = r.entrepreneur_id
"#;

#[derive(Debug, sqlx::FromRow)]
struct RequestRow {
    id: i64,
    investor_public_id: String,
    entrepreneur_public_id: String,
    status: String,
    created_at: String,
    investor_name: String,
    investor_avatar_url: Option<String>,
    entrepreneur_name: String,
    entrepreneur_avatar_url: Option<String>,
}

impl RequestRow {
    /// The counterpart is the other side of the request from the viewer.
    fn into_view(self, viewer: &UserRole) -> CollaborationRequestView {
        let (counterpart_name, counterpart_avatar_url) = match viewer {
            UserRole::Investor => (self.entrepreneur_name, self.entrepreneur_avatar_url),
            _ => (self.investor_name, self.investor_avatar_url),
        };
        CollaborationRequestView {
            id: self.id,
            investor_id: self.investor_public_id,
            entrepreneur_id: self.entrepreneur_public_id,
            counterpart_name,
            counterpart_avatar_url,
            status: self.status,
            timestamp: self.created_at,
        }
    }
}

async fn fetch_view(
    pool: &SqlitePool,
    request_id: i64,
    viewer: &UserRole,
) -> Result<CollaborationRequestView, ServiceError> {
    let row: Option<RequestRow> =
        sqlx::query_as(&format!("SELECT {VIEW_SQL} WHERE r.id = ?"))
            .bind(request_id)
            .fetch_optional(pool)
            .await?;

    row.map(|row| row.into_view(viewer))
        .ok_or_else(|| ServiceError::not_found("Request not found"))
}

/// Create a pending collaboration request towards an entrepreneur. Only
/// investors may send one, and only one request per pair ever exists.
pub async fn create_request(
    pool: &SqlitePool,
    caller: &Identity,
    entrepreneur_public_id: &str,
) -> Result<CollaborationRequestView, ServiceError> {
    if caller.role != UserRole::Investor {
        return Err(ServiceError::forbidden(
            "Only investors can send collaboration requests",
        ));
    }

    let entrepreneur: Option<(i64, String)> =
        sqlx::query_as("SELECT id, role FROM users WHERE public_id = ?")
            .bind(entrepreneur_public_id)
            .fetch_optional(pool)
            .await?;

    let (entrepreneur_id, role) =
        entrepreneur.ok_or_else(|| ServiceError::not_found("Entrepreneur not found"))?;
    if role != "entrepreneur" {
        return Err(ServiceError::bad_request(
            "Requests can only target entrepreneurs",
        ));
    }

    let now = chrono::Utc::now().to_rfc3339();

    let inserted = sqlx::query(
        r#"
        INSERT INTO requests (investor_id, entrepreneur_id, status, created_at, updated_at)
        VALUES (?, ?, 'pending', ?, ?)
        "#,
    )
    .bind(caller.user_id)
    .bind(entrepreneur_id)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await;

    let request_id = match inserted {
        Ok(result) => result.last_insert_rowid(),
        Err(err) if err.to_string().contains("UNIQUE constraint failed") => {
            return Err(ServiceError::conflict(
                "A request to this entrepreneur already exists",
            ));
        }
        Err(err) => return Err(err.into()),
    };

    fetch_view(pool, request_id, &caller.role).await
}

/// Requests visible to the caller: sent ones for investors, received ones
/// for entrepreneurs. Newest first.
pub async fn list_requests(
    pool: &SqlitePool,
    caller: &Identity,
) -> Result<Vec<CollaborationRequestView>, ServiceError> {
    let filter = match caller.role {
        UserRole::Investor => "r.investor_id = ?",
        UserRole::Entrepreneur => "r.entrepreneur_id = ?",
        UserRole::Admin => {
            return Err(ServiceError::forbidden(
                "Admins do not take part in collaboration requests",
            ))
        }
    };

    let rows: Vec<RequestRow> = sqlx::query_as(&format!(
        "SELECT {VIEW_SQL} WHERE {filter} ORDER BY r.created_at DESC"
    ))
    .bind(caller.user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| row.into_view(&caller.role))
        .collect())
}

/// Move a pending request to `accepted` or `rejected`. Only the receiving
/// entrepreneur may decide, and a decided request never changes again. On
/// acceptance the investor is emailed, without blocking the response.
pub async fn transition_request(
    pool: &SqlitePool,
    mailer: &Mailer,
    caller: &Identity,
    request_id: i64,
    status: &str,
) -> Result<CollaborationRequestView, ServiceError> {
    if !matches!(status, "accepted" | "rejected") {
        return Err(ServiceError::bad_request(
            "Status must be 'accepted' or 'rejected'",
        ));
    }
    if caller.role != UserRole::Entrepreneur {
        return Err(ServiceError::forbidden(
            "Only entrepreneurs can respond to collaboration requests",
        ));
    }

    let now = chrono::Utc::now().to_rfc3339();

    // The status guard makes the transition atomic: a concurrent or repeated
    // decision finds zero pending rows and changes nothing.
    let updated = sqlx::query(
        r#"
        UPDATE requests SET status = ?, updated_at = ?
        WHERE id = ? AND entrepreneur_id = ? AND status = 'pending'
        "#,
    )
    .bind(status)
    .bind(&now)
    .bind(request_id)
    .bind(caller.user_id)
    .execute(pool)
    .await?;

    if updated.rows_affected() == 0 {
        let existing: Option<(i64, String)> =
            sqlx::query_as("SELECT entrepreneur_id, status FROM requests WHERE id = ?")
                .bind(request_id)
                .fetch_optional(pool)
                .await?;

        return Err(match existing {
            None => ServiceError::not_found("Request not found"),
            Some((entrepreneur_id, _)) if entrepreneur_id != caller.user_id => {
                ServiceError::forbidden("This request was not sent to you")
            }
            Some((_, current)) => {
                ServiceError::conflict(format!("Request was already {current}"))
            }
        });
    }

    if status == "accepted" {
        let recipient: Option<(String, String, String, String)> = sqlx::query_as(
            r#"
            SELECT inv.email, inv.name, ent.name, ent.public_id
            FROM requests r
            JOIN users inv ON inv.id = r.investor_id
            JOIN users ent ON ent.id = r.entrepreneur_id
            WHERE r.id = ?
            "#,
        )
        .bind(request_id)
        .fetch_optional(pool)
        .await?;

        if let Some((investor_email, investor_name, entrepreneur_name, entrepreneur_public_id)) =
            recipient
        {
            // Fire-and-forget: a mail failure must not fail the decision.
            let mailer = mailer.clone();
            tokio::spawn(async move {
                if let Err(err) = mailer
                    .send_collaboration_accepted(
                        &investor_email,
                        &investor_name,
                        &entrepreneur_name,
                        &entrepreneur_public_id,
                    )
                    .await
                {
                    tracing::warn!(error = %err, "failed to send acceptance email");
                }
            });
        }
    }

    fetch_view(pool, request_id, &caller.role).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_utils::{create_test_db, insert_user, SeededUser, TestUser};

    fn identity(user: &SeededUser, role: UserRole) -> Identity {
        Identity {
            user_id: user.id,
            public_id: user.public_id.clone(),
            role,
        }
    }

    #[tokio::test]
    async fn test_create_request_and_duplicate_rejected() {
        let (pool, _dir) = create_test_db().await;
        let investor = insert_user(&pool, TestUser::investor("inv")).await;
        let entrepreneur = insert_user(&pool, TestUser::entrepreneur("ent")).await;
        let caller = identity(&investor, UserRole::Investor);

        let view = create_request(&pool, &caller, &entrepreneur.public_id)
            .await
            .unwrap();
        assert_eq!(view.status, "pending");
        assert_eq!(view.counterpart_name, "ent");

        let err = create_request(&pool, &caller, &entrepreneur.public_id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_only_investors_can_create() {
        let (pool, _dir) = create_test_db().await;
        let a = insert_user(&pool, TestUser::entrepreneur("a")).await;
        let b = insert_user(&pool, TestUser::entrepreneur("b")).await;

        let err = create_request(&pool, &identity(&a, UserRole::Entrepreneur), &b.public_id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_request_must_target_entrepreneur() {
        let (pool, _dir) = create_test_db().await;
        let investor = insert_user(&pool, TestUser::investor("inv")).await;
        let other = insert_user(&pool, TestUser::investor("other")).await;

        let err = create_request(
            &pool,
            &identity(&investor, UserRole::Investor),
            &other.public_id,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_list_requests_per_role() {
        let (pool, _dir) = create_test_db().await;
        let investor = insert_user(&pool, TestUser::investor("inv")).await;
        let ent_a = insert_user(&pool, TestUser::entrepreneur("a")).await;
        let ent_b = insert_user(&pool, TestUser::entrepreneur("b")).await;
        let investor_id = identity(&investor, UserRole::Investor);

        create_request(&pool, &investor_id, &ent_a.public_id)
            .await
            .unwrap();
        create_request(&pool, &investor_id, &ent_b.public_id)
            .await
            .unwrap();

        let sent = list_requests(&pool, &investor_id).await.unwrap();
        assert_eq!(sent.len(), 2);

        let received = list_requests(&pool, &identity(&ent_a, UserRole::Entrepreneur))
            .await
            .unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].counterpart_name, "inv");
    }

    #[tokio::test]
    async fn test_transition_accept_and_terminal_immutability() {
        let (pool, _dir) = create_test_db().await;
        let mailer = Mailer::disabled();
        let investor = insert_user(&pool, TestUser::investor("inv")).await;
        let entrepreneur = insert_user(&pool, TestUser::entrepreneur("ent")).await;
        let ent_id = identity(&entrepreneur, UserRole::Entrepreneur);

        let view = create_request(
            &pool,
            &identity(&investor, UserRole::Investor),
            &entrepreneur.public_id,
        )
        .await
        .unwrap();

        let accepted = transition_request(&pool, &mailer, &ent_id, view.id, "accepted")
            .await
            .unwrap();
        assert_eq!(accepted.status, "accepted");

        // Once decided, further transitions are rejected, even to the same
        // state.
        for attempt in ["rejected", "accepted"] {
            let err = transition_request(&pool, &mailer, &ent_id, view.id, attempt)
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::Conflict(_)));
        }
    }

    #[tokio::test]
    async fn test_transition_guards() {
        let (pool, _dir) = create_test_db().await;
        let mailer = Mailer::disabled();
        let investor = insert_user(&pool, TestUser::investor("inv")).await;
        let entrepreneur = insert_user(&pool, TestUser::entrepreneur("ent")).await;
        let bystander = insert_user(&pool, TestUser::entrepreneur("bystander")).await;
        let ent_id = identity(&entrepreneur, UserRole::Entrepreneur);

        let view = create_request(
            &pool,
            &identity(&investor, UserRole::Investor),
            &entrepreneur.public_id,
        )
        .await
        .unwrap();

        let err = transition_request(&pool, &mailer, &ent_id, view.id, "approved")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));

        let err = transition_request(
            &pool,
            &mailer,
            &identity(&investor, UserRole::Investor),
            view.id,
            "accepted",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let err = transition_request(
            &pool,
            &mailer,
            &identity(&bystander, UserRole::Entrepreneur),
            view.id,
            "accepted",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let err = transition_request(&pool, &mailer, &ent_id, 9999, "accepted")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
