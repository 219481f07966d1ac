use sqlx::SqlitePool;

use super::error::ServiceError;
use crate::routes::models::UserProfile;

/// Flip a bookmark on a profile. Returns `true` when the profile is now
/// bookmarked and `false` when the toggle removed it. The delete-then-insert
/// runs in one transaction, so concurrent toggles settle on a single row at
/// most.
pub async fn toggle_bookmark(
    pool: &SqlitePool,
    user_id: i64,
    profile_public_id: &str,
) -> Result<bool, ServiceError> {
    let profile_id = super::user::resolve_user_id(pool, profile_public_id).await?;
    if profile_id == user_id {
        return Err(ServiceError::bad_request("You cannot bookmark yourself"));
    }

    let mut tx = pool.begin().await?;

    let removed = sqlx::query("DELETE FROM bookmarks WHERE user_id = ? AND profile_id = ?")
        .bind(user_id)
        .bind(profile_id)
        .execute(&mut *tx)
        .await?;

    let bookmarked = if removed.rows_affected() == 0 {
        sqlx::query(
            "INSERT OR IGNORE INTO bookmarks (user_id, profile_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(profile_id)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await?;
        true
    } else {
        false
    };

    tx.commit().await?;

    Ok(bookmarked)
}

/// The caller's bookmarked profiles, in the order they were saved.
pub async fn list_bookmarks(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<UserProfile>, ServiceError> {
    // created_at has second granularity, so rowid breaks ties.
    let profile_ids: Vec<i64> = sqlx::query_scalar(
        "SELECT profile_id FROM bookmarks WHERE user_id = ? ORDER BY created_at ASC, rowid ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut profiles = Vec::with_capacity(profile_ids.len());
    for profile_id in profile_ids {
        // A bookmarked profile deleted mid-listing is simply skipped.
        match super::user::fetch_profile(pool, profile_id).await {
            Ok(profile) => profiles.push(profile),
            Err(ServiceError::NotFound(_)) => continue,
            Err(err) => return Err(err),
        }
    }

    Ok(profiles)
}

/// Public ids of every profile the caller has bookmarked.
pub async fn list_bookmark_ids(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<String>, ServiceError> {
    let ids: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT u.public_id FROM bookmarks b
        JOIN users u ON u.id = b.profile_id
        WHERE b.user_id = ?
        ORDER BY b.created_at ASC, b.rowid ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}
