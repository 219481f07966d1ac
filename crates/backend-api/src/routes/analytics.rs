use axum::{extract::State, http::HeaderMap, Json};

use crate::routes::models::AnalyticsResponse;
use crate::services::analytics;
use crate::util::require_bearer;
use crate::{ApiError, AppState};

#[utoipa::path(
    get,
    path = "/api/analytics",
    tag = "Analytics",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Dashboard numbers for the caller's role", body = AnalyticsResponse),
        (status = 400, description = "No analytics for this role", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_analytics(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let identity = state.authenticate(&token).await?;

    let analytics = analytics::summarize(state.db_pool(), &identity).await?;

    Ok(Json(AnalyticsResponse {
        success: true,
        analytics,
    }))
}
