use nexus_auth::{Identity, UserRole};
use sqlx::SqlitePool;

use super::error::ServiceError;
use crate::routes::models::AnalyticsSummary;

/// Dashboard numbers for the caller's role. Entrepreneurs see the state of
/// requests they received; investors see what they sent and saved.
pub async fn summarize(
    pool: &SqlitePool,
    caller: &Identity,
) -> Result<AnalyticsSummary, ServiceError> {
    match caller.role {
        UserRole::Entrepreneur => {
            let (total, accepted, pending): (i64, i64, i64) = sqlx::query_as(
                r#"
                SELECT COUNT(*),
                       COALESCE(SUM(status = 'accepted'), 0),
                       COALESCE(SUM(status = 'pending'), 0)
                FROM requests WHERE entrepreneur_id = ?
                "#,
            )
            .bind(caller.user_id)
            .fetch_one(pool)
            .await?;

            Ok(AnalyticsSummary::Entrepreneur {
                total_requests: total,
                accepted_requests: accepted,
                pending_requests: pending,
            })
        }
        UserRole::Investor => {
            let (sent, accepted): (i64, i64) = sqlx::query_as(
                r#"
                SELECT COUNT(*), COALESCE(SUM(status = 'accepted'), 0)
                FROM requests WHERE investor_id = ?
                "#,
            )
            .bind(caller.user_id)
            .fetch_one(pool)
            .await?;

            let bookmarked: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM bookmarks WHERE user_id = ?")
                    .bind(caller.user_id)
                    .fetch_one(pool)
                    .await?;

            // Percentage, rounded to one decimal.
            let acceptance_rate = if sent > 0 {
                (accepted as f64 / sent as f64 * 1000.0).round() / 10.0
            } else {
                0.0
            };

            Ok(AnalyticsSummary::Investor {
                requests_sent: sent,
                acceptance_rate,
                bookmarked_profiles: bookmarked,
            })
        }
        UserRole::Admin => Err(ServiceError::bad_request(
            "Analytics are not available for admin accounts",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::bookmark::toggle_bookmark;
    use crate::services::request::{create_request, transition_request};
    use crate::services::test_utils::{create_test_db, insert_user, SeededUser, TestUser};
    use nexus_mailer::Mailer;

    fn identity(user: &SeededUser, role: UserRole) -> Identity {
        Identity {
            user_id: user.id,
            public_id: user.public_id.clone(),
            role,
        }
    }

    #[tokio::test]
    async fn test_summaries_per_role() {
        let (pool, _dir) = create_test_db().await;
        let mailer = Mailer::disabled();
        let investor = insert_user(&pool, TestUser::investor("inv")).await;
        let ent_a = insert_user(&pool, TestUser::entrepreneur("a")).await;
        let ent_b = insert_user(&pool, TestUser::entrepreneur("b")).await;
        let inv_id = identity(&investor, UserRole::Investor);

        let first = create_request(&pool, &inv_id, &ent_a.public_id)
            .await
            .unwrap();
        create_request(&pool, &inv_id, &ent_b.public_id)
            .await
            .unwrap();
        transition_request(
            &pool,
            &mailer,
            &identity(&ent_a, UserRole::Entrepreneur),
            first.id,
            "accepted",
        )
        .await
        .unwrap();
        toggle_bookmark(&pool, investor.id, &ent_a.public_id)
            .await
            .unwrap();

        let investor_summary = summarize(&pool, &inv_id).await.unwrap();
        match investor_summary {
            AnalyticsSummary::Investor {
                requests_sent,
                acceptance_rate,
                bookmarked_profiles,
            } => {
                assert_eq!(requests_sent, 2);
                assert!((acceptance_rate - 50.0).abs() < f64::EPSILON);
                assert_eq!(bookmarked_profiles, 1);
            }
            other => panic!("unexpected summary: {other:?}"),
        }

        let ent_summary = summarize(&pool, &identity(&ent_a, UserRole::Entrepreneur))
            .await
            .unwrap();
        match ent_summary {
            AnalyticsSummary::Entrepreneur {
                total_requests,
                accepted_requests,
                pending_requests,
            } => {
                assert_eq!(total_requests, 1);
                assert_eq!(accepted_requests, 1);
                assert_eq!(pending_requests, 0);
            }
            other => panic!("unexpected summary: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_investor_with_no_requests_has_zero_rate() {
        let (pool, _dir) = create_test_db().await;
        let investor = insert_user(&pool, TestUser::investor("inv")).await;

        let summary = summarize(&pool, &identity(&investor, UserRole::Investor))
            .await
            .unwrap();
        match summary {
            AnalyticsSummary::Investor {
                requests_sent,
                acceptance_rate,
                ..
            } => {
                assert_eq!(requests_sent, 0);
                assert_eq!(acceptance_rate, 0.0);
            }
            other => panic!("unexpected summary: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_admin_summary_rejected() {
        let (pool, _dir) = create_test_db().await;
        let admin = insert_user(&pool, TestUser::admin("root")).await;

        let err = summarize(&pool, &identity(&admin, UserRole::Admin))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
    }
}
