use nexus_auth::{Authenticator, Identity};
use nexus_mailer::Mailer;
use sqlx::SqlitePool;

use crate::ApiError;

/// Shared application state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    pool: SqlitePool,
    authenticator: Authenticator,
    mailer: Mailer,
}

impl AppState {
    pub fn new(pool: SqlitePool, authenticator: Authenticator, mailer: Mailer) -> Self {
        Self {
            pool,
            authenticator,
            mailer,
        }
    }

    pub fn db_pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn mailer(&self) -> &Mailer {
        &self.mailer
    }

    /// Resolve a bearer token into the calling identity.
    pub async fn authenticate(&self, token: &str) -> Result<Identity, ApiError> {
        self.authenticator
            .authenticate_token(token)
            .await
            .map_err(ApiError::from)
    }
}
