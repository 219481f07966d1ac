use std::str::FromStr;

use axum::{extract::State, http::StatusCode};
use nexus_auth::UserRole;

use crate::extract::Json;

use crate::routes::models::{
    AuthResponse, ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest,
    SuccessResponse,
};
use crate::services::user;
use crate::{ApiError, AppState};

const MIN_PASSWORD_LENGTH: usize = 8;

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid registration payload", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Name is required"));
    }
    let email = payload.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(ApiError::bad_request("A valid email address is required"));
    }
    validate_password(&payload.password)?;

    // Admin accounts are provisioned out of band, never self-registered.
    let role = match UserRole::from_str(&payload.role) {
        Ok(UserRole::Investor) => UserRole::Investor,
        Ok(UserRole::Entrepreneur) => UserRole::Entrepreneur,
        _ => {
            return Err(ApiError::bad_request(
                "Role must be 'investor' or 'entrepreneur'",
            ))
        }
    };

    let account = state
        .authenticator()
        .register(name, &email, &payload.password, role)
        .await?;
    let token = state
        .authenticator()
        .issue_token(&account.public_id, account.role)?;
    let profile = user::fetch_profile(state.db_pool(), account.user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "Account created".to_string(),
            token,
            user: profile,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = payload.email.trim().to_lowercase();
    let (account, token) = state.authenticator().login(&email, &payload.password).await?;
    let profile = user::fetch_profile(state.db_pool(), account.user_id).await?;

    Ok(Json(AuthResponse {
        success: true,
        message: "Logged in".to_string(),
        token,
        user: profile,
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    tag = "Auth",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset email sent if the account exists", body = SuccessResponse)
    )
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let email = payload.email.trim().to_lowercase();

    // The response never reveals whether the address exists.
    if let Some((reset_token, name)) = state.authenticator().begin_password_reset(&email).await? {
        let mailer = state.mailer().clone();
        tokio::spawn(async move {
            if let Err(err) = mailer.send_password_reset(&email, &name, &reset_token).await {
                tracing::warn!(error = %err, "failed to send password reset email");
            }
        });
    }

    Ok(Json(SuccessResponse::new(
        "If that email is registered, a reset link is on its way",
    )))
}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    tag = "Auth",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = SuccessResponse),
        (status = 400, description = "Invalid or expired reset token", body = crate::error::ErrorResponse)
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    validate_password(&payload.password)?;

    state
        .authenticator()
        .reset_password(&payload.token, &payload.password)
        .await?;

    Ok(Json(SuccessResponse::new("Password updated")))
}
