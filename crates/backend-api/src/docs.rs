use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::forgot_password,
        crate::routes::auth::reset_password,
        crate::routes::users::get_current_user,
        crate::routes::users::list_users,
        crate::routes::profile::update_profile,
        crate::routes::discovery::list_investors,
        crate::routes::discovery::list_interests,
        crate::routes::discovery::list_entrepreneurs,
        crate::routes::bookmarks::list_bookmarks,
        crate::routes::bookmarks::toggle_bookmark,
        crate::routes::requests::list_requests,
        crate::routes::requests::create_request,
        crate::routes::requests::update_request_status,
        crate::routes::chat::get_conversation,
        crate::routes::chat::send_message,
        crate::routes::analytics::get_analytics,
        crate::routes::admin::list_users,
        crate::routes::admin::delete_user
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::routes::health::HealthResponse,
            crate::routes::models::UserProfile,
            crate::routes::models::PortfolioCompany,
            crate::routes::models::CollaborationRequestView,
            crate::routes::models::ChatMessageView,
            crate::routes::models::AnalyticsSummary,
            crate::routes::models::InterestList,
            crate::routes::models::RegisterRequest,
            crate::routes::models::LoginRequest,
            crate::routes::models::ForgotPasswordRequest,
            crate::routes::models::ResetPasswordRequest,
            crate::routes::models::UpdateProfileRequest,
            crate::routes::models::CreateCollaborationRequest,
            crate::routes::models::UpdateRequestStatusRequest,
            crate::routes::models::ToggleBookmarkRequest,
            crate::routes::models::SendMessageRequest,
            crate::routes::models::SuccessResponse,
            crate::routes::models::AuthResponse,
            crate::routes::models::MeResponse,
            crate::routes::models::ProfileResponse,
            crate::routes::models::UsersResponse,
            crate::routes::models::BookmarkToggleResponse,
            crate::routes::models::BookmarksResponse,
            crate::routes::models::RequestsResponse,
            crate::routes::models::RequestResponse,
            crate::routes::models::MessagesResponse,
            crate::routes::models::MessageSentResponse,
            crate::routes::models::InterestsResponse,
            crate::routes::models::AnalyticsResponse
        )
    ),
    tags(
        (name = "Health", description = "Service health endpoints"),
        (name = "Auth", description = "Registration, login and password reset"),
        (name = "Users", description = "Current user and member directory"),
        (name = "Profile", description = "Profile editing"),
        (name = "Discovery", description = "Public investor and entrepreneur listings"),
        (name = "Bookmarks", description = "Saved profiles"),
        (name = "Requests", description = "Collaboration request workflow"),
        (name = "Chat", description = "Direct messaging"),
        (name = "Analytics", description = "Role-specific dashboard numbers"),
        (name = "Admin", description = "Platform administration")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        let schemes = &mut components.security_schemes;

        let mut scheme = SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer));
        if let SecurityScheme::Http(http) = &mut scheme {
            http.bearer_format = Some("Bearer".to_string());
        }

        schemes.insert("bearerAuth".to_string(), scheme);
    }
}
