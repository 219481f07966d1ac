use axum::{extract::State, http::HeaderMap, Json};

use crate::routes::models::{MeResponse, UsersResponse};
use crate::services::{bookmark, user};
use crate::util::require_bearer;
use crate::{ApiError, AppState};

#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = MeResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MeResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let identity = state.authenticate(&token).await?;

    let profile = user::fetch_profile(state.db_pool(), identity.user_id).await?;
    let bookmarked_profile_ids =
        bookmark::list_bookmark_ids(state.db_pool(), identity.user_id).await?;

    Ok(Json(MeResponse {
        success: true,
        user: profile,
        bookmarked_profile_ids,
    }))
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "All member profiles except the caller", body = UsersResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UsersResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let identity = state.authenticate(&token).await?;

    let users = user::list_directory(state.db_pool(), identity.user_id).await?;

    Ok(Json(UsersResponse {
        success: true,
        users,
    }))
}
