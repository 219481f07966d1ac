use axum::{extract::State, http::HeaderMap};

use crate::extract::Json;

use crate::routes::models::{BookmarkToggleResponse, BookmarksResponse, ToggleBookmarkRequest};
use crate::services::bookmark;
use crate::util::require_bearer;
use crate::{ApiError, AppState};

#[utoipa::path(
    get,
    path = "/api/profile/bookmarks",
    tag = "Bookmarks",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Bookmarked profiles", body = BookmarksResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_bookmarks(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<BookmarksResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let identity = state.authenticate(&token).await?;

    let bookmarks = bookmark::list_bookmarks(state.db_pool(), identity.user_id).await?;

    Ok(Json(BookmarksResponse {
        success: true,
        bookmarks,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/profile/bookmarks",
    tag = "Bookmarks",
    security(("bearerAuth" = [])),
    request_body = ToggleBookmarkRequest,
    responses(
        (status = 200, description = "Bookmark toggled", body = BookmarkToggleResponse),
        (status = 400, description = "Cannot bookmark yourself", body = crate::error::ErrorResponse),
        (status = 404, description = "Profile not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn toggle_bookmark(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ToggleBookmarkRequest>,
) -> Result<Json<BookmarkToggleResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let identity = state.authenticate(&token).await?;

    let bookmarked =
        bookmark::toggle_bookmark(state.db_pool(), identity.user_id, &payload.profile_id).await?;

    let message = if bookmarked {
        "Profile bookmarked"
    } else {
        "Bookmark removed"
    };

    Ok(Json(BookmarkToggleResponse {
        success: true,
        bookmarked,
        message: message.to_string(),
    }))
}
