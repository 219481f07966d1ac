use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use nexus_auth::{Identity, UserRole};

use crate::routes::models::{SuccessResponse, UsersResponse};
use crate::services::user;
use crate::util::require_bearer;
use crate::{ApiError, AppState};

fn require_admin(identity: &Identity) -> Result<(), ApiError> {
    if identity.role != UserRole::Admin {
        return Err(ApiError::forbidden("Admin access required"));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    operation_id = "admin_list_users",
    tag = "Admin",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Every account on the platform", body = UsersResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin access required", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UsersResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let identity = state.authenticate(&token).await?;
    require_admin(&identity)?;

    let users = user::list_all_users(state.db_pool()).await?;

    Ok(Json(UsersResponse {
        success: true,
        users,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{user_id}",
    tag = "Admin",
    security(("bearerAuth" = [])),
    params(("user_id" = String, Path, description = "Public id of the account to delete")),
    responses(
        (status = 200, description = "Account and all related data deleted", body = SuccessResponse),
        (status = 400, description = "Admins cannot delete themselves", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin access required", body = crate::error::ErrorResponse),
        (status = 404, description = "Account not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let identity = state.authenticate(&token).await?;
    require_admin(&identity)?;

    if user_id == identity.public_id {
        return Err(ApiError::bad_request(
            "Admins cannot delete their own account",
        ));
    }

    user::delete_user(state.db_pool(), &user_id).await?;

    Ok(Json(SuccessResponse::new(
        "User and all related data deleted",
    )))
}
