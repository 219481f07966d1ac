use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::routes::models::{InterestsResponse, UsersResponse};
use crate::services::user;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize, IntoParams)]
pub struct InvestorQuery {
    /// Case-insensitive substring match over name and bio.
    pub search: Option<String>,
    /// Comma-separated interests; only investors declaring all of them match.
    pub interests: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct EntrepreneurQuery {
    /// Case-insensitive substring match over name, startup and bio.
    pub search: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/investors",
    tag = "Discovery",
    params(InvestorQuery),
    responses(
        (status = 200, description = "Investor profiles", body = UsersResponse)
    )
)]
pub async fn list_investors(
    State(state): State<AppState>,
    Query(query): Query<InvestorQuery>,
) -> Result<Json<UsersResponse>, ApiError> {
    let interests = query
        .interests
        .map(|raw| raw.split(',').map(str::to_string).collect());
    let users = user::list_investors(state.db_pool(), query.search, interests).await?;

    Ok(Json(UsersResponse {
        success: true,
        users,
    }))
}

#[utoipa::path(
    get,
    path = "/api/investors/interests",
    tag = "Discovery",
    responses(
        (status = 200, description = "Distinct declared investment interests", body = InterestsResponse)
    )
)]
pub async fn list_interests(
    State(state): State<AppState>,
) -> Result<Json<InterestsResponse>, ApiError> {
    let interests = user::list_interest_options(state.db_pool()).await?;

    Ok(Json(InterestsResponse {
        success: true,
        interests,
    }))
}

#[utoipa::path(
    get,
    path = "/api/entrepreneurs",
    tag = "Discovery",
    params(EntrepreneurQuery),
    responses(
        (status = 200, description = "Entrepreneur profiles", body = UsersResponse)
    )
)]
pub async fn list_entrepreneurs(
    State(state): State<AppState>,
    Query(query): Query<EntrepreneurQuery>,
) -> Result<Json<UsersResponse>, ApiError> {
    let users = user::list_entrepreneurs(state.db_pool(), query.search).await?;

    Ok(Json(UsersResponse {
        success: true,
        users,
    }))
}
