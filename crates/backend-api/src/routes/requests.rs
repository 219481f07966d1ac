use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};

use crate::extract::Json;
use crate::routes::models::{
    CreateCollaborationRequest, RequestResponse, RequestsResponse, UpdateRequestStatusRequest,
};
use crate::services::request;
use crate::util::require_bearer;
use crate::{ApiError, AppState};

#[utoipa::path(
    get,
    path = "/api/requests",
    tag = "Requests",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Requests visible to the caller", body = RequestsResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Role cannot hold requests", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_requests(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RequestsResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let identity = state.authenticate(&token).await?;

    let requests = request::list_requests(state.db_pool(), &identity).await?;

    Ok(Json(RequestsResponse {
        success: true,
        requests,
    }))
}

#[utoipa::path(
    post,
    path = "/api/requests",
    tag = "Requests",
    security(("bearerAuth" = [])),
    request_body = CreateCollaborationRequest,
    responses(
        (status = 201, description = "Request created", body = RequestResponse),
        (status = 403, description = "Only investors can send requests", body = crate::error::ErrorResponse),
        (status = 404, description = "Entrepreneur not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Request already exists for this pair", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateCollaborationRequest>,
) -> Result<(StatusCode, Json<RequestResponse>), ApiError> {
    let token = require_bearer(&headers)?;
    let identity = state.authenticate(&token).await?;

    let created =
        request::create_request(state.db_pool(), &identity, &payload.entrepreneur_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(RequestResponse {
            success: true,
            message: "Collaboration request sent".to_string(),
            request: created,
        }),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/requests/{request_id}",
    tag = "Requests",
    security(("bearerAuth" = [])),
    params(("request_id" = i64, Path, description = "Request to decide")),
    request_body = UpdateRequestStatusRequest,
    responses(
        (status = 200, description = "Request decided", body = RequestResponse),
        (status = 400, description = "Invalid status", body = crate::error::ErrorResponse),
        (status = 403, description = "Not the receiving entrepreneur", body = crate::error::ErrorResponse),
        (status = 404, description = "Request not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Request already decided", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_request_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(request_id): Path<i64>,
    Json(payload): Json<UpdateRequestStatusRequest>,
) -> Result<Json<RequestResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let identity = state.authenticate(&token).await?;

    let updated = request::transition_request(
        state.db_pool(),
        state.mailer(),
        &identity,
        request_id,
        &payload.status,
    )
    .await?;

    Ok(Json(RequestResponse {
        success: true,
        message: format!("Request {}", updated.status),
        request: updated,
    }))
}
