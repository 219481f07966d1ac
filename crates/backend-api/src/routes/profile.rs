use axum::{extract::State, http::HeaderMap};

use crate::extract::Json;

use crate::routes::models::{ProfileResponse, UpdateProfileRequest};
use crate::services::user;
use crate::util::require_bearer;
use crate::{ApiError, AppState};

#[utoipa::path(
    put,
    path = "/api/profile",
    tag = "Profile",
    security(("bearerAuth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Invalid profile payload", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let identity = state.authenticate(&token).await?;

    let user = user::update_profile(state.db_pool(), identity.user_id, payload).await?;

    Ok(Json(ProfileResponse {
        success: true,
        user,
    }))
}
