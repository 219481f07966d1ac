mod docs;
mod error;
mod extract;
mod state;
mod util;

pub mod routes;
pub mod services;

pub use docs::ApiDoc;
pub use error::ApiError;
pub use state::AppState;

use axum::{
    http::header::{AUTHORIZATION, CONTENT_TYPE},
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        // Auth routes
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route(
            "/api/auth/forgot-password",
            post(routes::auth::forgot_password),
        )
        .route(
            "/api/auth/reset-password",
            post(routes::auth::reset_password),
        )
        // User routes
        .route("/api/users/me", get(routes::users::get_current_user))
        .route("/api/users", get(routes::users::list_users))
        .route("/api/profile", put(routes::profile::update_profile))
        .route(
            "/api/profile/bookmarks",
            get(routes::bookmarks::list_bookmarks),
        )
        .route(
            "/api/profile/bookmarks",
            patch(routes::bookmarks::toggle_bookmark),
        )
        // Discovery routes
        .route("/api/investors", get(routes::discovery::list_investors))
        .route(
            "/api/investors/interests",
            get(routes::discovery::list_interests),
        )
        .route(
            "/api/entrepreneurs",
            get(routes::discovery::list_entrepreneurs),
        )
        // Collaboration request routes
        .route("/api/requests", get(routes::requests::list_requests))
        .route("/api/requests", post(routes::requests::create_request))
        .route(
            "/api/requests/:request_id",
            patch(routes::requests::update_request_status),
        )
        // Chat routes
        .route("/api/chat/:user_id", get(routes::chat::get_conversation))
        .route("/api/chat/:user_id", post(routes::chat::send_message))
        // Analytics
        .route("/api/analytics", get(routes::analytics::get_analytics))
        // Admin routes
        .route("/api/admin/users", get(routes::admin::list_users))
        .route(
            "/api/admin/users/:user_id",
            delete(routes::admin::delete_user),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}
