//! Shared request/response DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PortfolioCompany {
    pub name: String,
    pub url: String,
}

/// A user profile as exposed over the API. Never carries the password hash
/// or reset-token material; `id` is the public id.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub avatar_url: Option<String>,
    pub bio: String,
    pub has_completed_onboarding: bool,
    pub startup_name: Option<String>,
    pub startup_description: Option<String>,
    pub funding_needs: Option<String>,
    pub pitch_deck_url: Option<String>,
    pub investment_interests: Vec<String>,
    pub portfolio_companies: Vec<PortfolioCompany>,
    pub created_at: String,
}

/// A collaboration request enriched with the counterpart's display data.
/// For an entrepreneur the counterpart is the investor and vice versa.
#[derive(Debug, Serialize, ToSchema)]
pub struct CollaborationRequestView {
    pub id: i64,
    pub investor_id: String,
    pub entrepreneur_id: String,
    pub counterpart_name: String,
    pub counterpart_avatar_url: Option<String>,
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatMessageView {
    pub id: i64,
    pub sender_id: String,
    pub receiver_id: String,
    pub sender_name: String,
    pub sender_avatar_url: Option<String>,
    pub message: String,
    pub timestamp: String,
}

/// Investment interests arrive either as a list or as a comma-separated
/// string (the profile form submits the latter).
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum InterestList {
    List(Vec<String>),
    Csv(String),
}

impl InterestList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            InterestList::List(items) => items
                .into_iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
            InterestList::Csv(raw) => raw
                .split(',')
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
        }
    }
}

/// Role-specific dashboard numbers. Serializes flat, so each role's client
/// sees only its own fields.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum AnalyticsSummary {
    Entrepreneur {
        total_requests: i64,
        accepted_requests: i64,
        pending_requests: i64,
    },
    Investor {
        requests_sent: i64,
        acceptance_rate: f64,
        bookmarked_profiles: i64,
    },
}

// Request bodies. Unknown fields are rejected rather than silently dropped.

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub has_completed_onboarding: Option<bool>,
    pub startup_name: Option<String>,
    pub startup_description: Option<String>,
    pub funding_needs: Option<String>,
    pub pitch_deck_url: Option<String>,
    pub investment_interests: Option<InterestList>,
    pub portfolio_companies: Option<Vec<PortfolioCompany>>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateCollaborationRequest {
    pub entrepreneur_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateRequestStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ToggleBookmarkRequest {
    pub profile_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub message: String,
}

// Response bodies. Every success body carries `success: true` to mirror the
// error contract.

#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

impl SuccessResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub success: bool,
    pub user: UserProfile,
    pub bookmarked_profile_ids: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: UserProfile,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UsersResponse {
    pub success: bool,
    pub users: Vec<UserProfile>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookmarkToggleResponse {
    pub success: bool,
    pub bookmarked: bool,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookmarksResponse {
    pub success: bool,
    pub bookmarks: Vec<UserProfile>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RequestsResponse {
    pub success: bool,
    pub requests: Vec<CollaborationRequestView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RequestResponse {
    pub success: bool,
    pub message: String,
    pub request: CollaborationRequestView,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessagesResponse {
    pub success: bool,
    pub messages: Vec<ChatMessageView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageSentResponse {
    pub success: bool,
    pub sent: ChatMessageView,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InterestsResponse {
    pub success: bool,
    pub interests: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyticsResponse {
    pub success: bool,
    pub analytics: AnalyticsSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interest_list_accepts_both_shapes() {
        let list = InterestList::List(vec!["fintech".into(), " ".into(), "ai".into()]);
        assert_eq!(list.into_vec(), vec!["fintech", "ai"]);

        let csv = InterestList::Csv("fintech, ai, ,health".into());
        assert_eq!(csv.into_vec(), vec!["fintech", "ai", "health"]);
    }

    #[test]
    fn update_profile_rejects_unknown_fields() {
        let result =
            serde_json::from_str::<UpdateProfileRequest>(r#"{"bio":"x","is_admin":true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn analytics_summary_serializes_flat() {
        let summary = AnalyticsSummary::Investor {
            requests_sent: 4,
            acceptance_rate: 0.25,
            bookmarked_profiles: 2,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["requests_sent"], 4);
        assert!(json.get("Investor").is_none());
    }
}
