use sqlx::SqlitePool;

use super::error::ServiceError;
use crate::routes::models::{UpdateProfileRequest, UserProfile};

const PROFILE_COLUMNS: &str = "public_id, name, email, role, avatar_url, bio, \
     has_completed_onboarding, startup_name, startup_description, funding_needs, \
     pitch_deck_url, investment_interests, portfolio_companies, created_at";

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    public_id: String,
    name: String,
    email: String,
    role: String,
    avatar_url: Option<String>,
    bio: String,
    has_completed_onboarding: bool,
    startup_name: Option<String>,
    startup_description: Option<String>,
    funding_needs: Option<String>,
    pitch_deck_url: Option<String>,
    investment_interests: String,
    portfolio_companies: String,
    created_at: String,
}

impl From<ProfileRow> for UserProfile {
    fn from(row: ProfileRow) -> Self {
        UserProfile {
            id: row.public_id,
            name: row.name,
            email: row.email,
            role: row.role,
            avatar_url: row.avatar_url,
            bio: row.bio,
            has_completed_onboarding: row.has_completed_onboarding,
            startup_name: row.startup_name,
            startup_description: row.startup_description,
            funding_needs: row.funding_needs,
            pitch_deck_url: row.pitch_deck_url,
            investment_interests: serde_json::from_str(&row.investment_interests)
                .unwrap_or_default(),
            portfolio_companies: serde_json::from_str(&row.portfolio_companies)
                .unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}

/// Resolve a public id into the internal row id.
pub async fn resolve_user_id(pool: &SqlitePool, public_id: &str) -> Result<i64, ServiceError> {
    let id: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE public_id = ?")
        .bind(public_id)
        .fetch_optional(pool)
        .await?;

    id.ok_or_else(|| ServiceError::not_found("User not found"))
}

pub async fn fetch_profile(pool: &SqlitePool, user_id: i64) -> Result<UserProfile, ServiceError> {
    let row: Option<ProfileRow> =
        sqlx::query_as(&format!("SELECT {PROFILE_COLUMNS} FROM users WHERE id = ?"))
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    row.map(UserProfile::from)
        .ok_or_else(|| ServiceError::not_found("User not found"))
}

/// Apply a partial profile update. Missing fields keep their current value;
/// completing the startup or interests sections marks onboarding as done.
pub async fn update_profile(
    pool: &SqlitePool,
    user_id: i64,
    update: UpdateProfileRequest,
) -> Result<UserProfile, ServiceError> {
    let current = fetch_profile(pool, user_id).await?;

    let name = update.name.unwrap_or(current.name);
    if name.trim().is_empty() {
        return Err(ServiceError::bad_request("Name cannot be empty"));
    }

    let avatar_url = update.avatar_url.or(current.avatar_url);
    let bio = update.bio.unwrap_or(current.bio);
    let startup_name = update.startup_name.or(current.startup_name);
    let startup_description = update.startup_description.or(current.startup_description);
    let funding_needs = update.funding_needs.or(current.funding_needs);
    let pitch_deck_url = update.pitch_deck_url.or(current.pitch_deck_url);
    let investment_interests = update
        .investment_interests
        .map(|interests| interests.into_vec())
        .unwrap_or(current.investment_interests);
    let portfolio_companies = update
        .portfolio_companies
        .unwrap_or(current.portfolio_companies);
    let has_completed_onboarding = update
        .has_completed_onboarding
        .unwrap_or(current.has_completed_onboarding);

    let interests_json = serde_json::to_string(&investment_interests)
        .map_err(|e| ServiceError::internal(format!("failed to encode interests: {e}")))?;
    let portfolio_json = serde_json::to_string(&portfolio_companies)
        .map_err(|e| ServiceError::internal(format!("failed to encode portfolio: {e}")))?;

    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        UPDATE users SET
            name = ?, avatar_url = ?, bio = ?, has_completed_onboarding = ?,
            startup_name = ?, startup_description = ?, funding_needs = ?,
            pitch_deck_url = ?, investment_interests = ?, portfolio_companies = ?,
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&name)
    .bind(&avatar_url)
    .bind(&bio)
    .bind(has_completed_onboarding)
    .bind(&startup_name)
    .bind(&startup_description)
    .bind(&funding_needs)
    .bind(&pitch_deck_url)
    .bind(&interests_json)
    .bind(&portfolio_json)
    .bind(&now)
    .bind(user_id)
    .execute(pool)
    .await?;

    fetch_profile(pool, user_id).await
}

/// Every non-admin profile except the caller's own, newest first. Backs the
/// member directory.
pub async fn list_directory(
    pool: &SqlitePool,
    caller_id: i64,
) -> Result<Vec<UserProfile>, ServiceError> {
    let rows: Vec<ProfileRow> = sqlx::query_as(&format!(
        "SELECT {PROFILE_COLUMNS} FROM users WHERE role != 'admin' AND id != ? ORDER BY created_at DESC"
    ))
    .bind(caller_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(UserProfile::from).collect())
}

fn matches_search(needle: &str, haystacks: &[Option<&str>]) -> bool {
    haystacks.iter().any(|field| {
        field
            .map(|text| text.to_lowercase().contains(needle))
            .unwrap_or(false)
    })
}

/// Investor profiles, optionally narrowed by a substring search over name
/// and bio and to those declaring every one of the given interests.
pub async fn list_investors(
    pool: &SqlitePool,
    search: Option<String>,
    interests: Option<Vec<String>>,
) -> Result<Vec<UserProfile>, ServiceError> {
    let rows: Vec<ProfileRow> = sqlx::query_as(&format!(
        "SELECT {PROFILE_COLUMNS} FROM users WHERE role = 'investor' ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await?;

    let mut investors: Vec<UserProfile> = rows.into_iter().map(UserProfile::from).collect();

    if let Some(needle) = search.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty()) {
        investors.retain(|profile| {
            matches_search(
                &needle,
                &[Some(profile.name.as_str()), Some(profile.bio.as_str())],
            )
        });
    }

    if let Some(wanted) = interests {
        let wanted: Vec<String> = wanted
            .into_iter()
            .map(|interest| interest.trim().to_lowercase())
            .filter(|interest| !interest.is_empty())
            .collect();
        if !wanted.is_empty() {
            investors.retain(|profile| {
                let declared: Vec<String> = profile
                    .investment_interests
                    .iter()
                    .map(|interest| interest.to_lowercase())
                    .collect();
                wanted.iter().all(|interest| declared.contains(interest))
            });
        }
    }

    Ok(investors)
}

/// Entrepreneur profiles, optionally narrowed by a substring search over
/// name, startup name/description and bio.
pub async fn list_entrepreneurs(
    pool: &SqlitePool,
    search: Option<String>,
) -> Result<Vec<UserProfile>, ServiceError> {
    let rows: Vec<ProfileRow> = sqlx::query_as(&format!(
        "SELECT {PROFILE_COLUMNS} FROM users WHERE role = 'entrepreneur' ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await?;

    let mut entrepreneurs: Vec<UserProfile> = rows.into_iter().map(UserProfile::from).collect();

    if let Some(needle) = search.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty()) {
        entrepreneurs.retain(|profile| {
            matches_search(
                &needle,
                &[
                    Some(profile.name.as_str()),
                    profile.startup_name.as_deref(),
                    profile.startup_description.as_deref(),
                    Some(profile.bio.as_str()),
                ],
            )
        });
    }

    Ok(entrepreneurs)
}

/// Distinct investment interests declared by any investor, sorted. Feeds the
/// filter dropdown on the investor directory.
pub async fn list_interest_options(pool: &SqlitePool) -> Result<Vec<String>, ServiceError> {
    let rows: Vec<String> =
        sqlx::query_scalar("SELECT investment_interests FROM users WHERE role = 'investor'")
            .fetch_all(pool)
            .await?;

    let mut options: Vec<String> = Vec::new();
    for raw in rows {
        let interests: Vec<String> = serde_json::from_str(&raw).unwrap_or_default();
        for interest in interests {
            let interest = interest.trim().to_string();
            if !interest.is_empty() && !options.contains(&interest) {
                options.push(interest);
            }
        }
    }
    options.sort();

    Ok(options)
}

/// Every account including admins, for the admin panel.
pub async fn list_all_users(pool: &SqlitePool) -> Result<Vec<UserProfile>, ServiceError> {
    let rows: Vec<ProfileRow> = sqlx::query_as(&format!(
        "SELECT {PROFILE_COLUMNS} FROM users ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(UserProfile::from).collect())
}

/// Delete an account and everything referencing it, in one transaction:
/// bookmarks in both directions, collaboration requests on either side,
/// messages sent or received, then the user row itself.
pub async fn delete_user(pool: &SqlitePool, public_id: &str) -> Result<(), ServiceError> {
    let user_id = resolve_user_id(pool, public_id).await?;

    let mut tx = pool.begin().await?;
    cascade_delete(&mut tx, user_id).await?;
    tx.commit().await?;

    Ok(())
}

/// Removes a user and every row referencing them. Must run inside a
/// transaction so a failure part-way leaves nothing deleted.
async fn cascade_delete(
    conn: &mut sqlx::SqliteConnection,
    user_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM bookmarks WHERE user_id = ? OR profile_id = ?")
        .bind(user_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM requests WHERE investor_id = ? OR entrepreneur_id = ?")
        .bind(user_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM messages WHERE sender_id = ? OR receiver_id = ?")
        .bind(user_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}
