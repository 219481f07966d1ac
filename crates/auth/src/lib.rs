use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use nexus_config::AuthConfig;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::{Row, SqlitePool};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("a user with this email already exists")]
    EmailTaken,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("password reset token is invalid or has expired")]
    InvalidResetToken,
    #[error("user not found")]
    UserNotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),
    #[error("token encoding failed: {0}")]
    TokenEncoding(#[from] jsonwebtoken::errors::Error),
}

/// Marketplace role carried in the bearer token and the users table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Investor,
    Entrepreneur,
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Investor => write!(f, "investor"),
            UserRole::Entrepreneur => write!(f, "entrepreneur"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for UserRole {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "investor" => Ok(UserRole::Investor),
            "entrepreneur" => Ok(UserRole::Entrepreneur),
            "admin" => Ok(UserRole::Admin),
            _ => Err(()),
        }
    }
}

/// Claims embedded in issued bearer tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Public user id.
    pub sub: String,
    pub role: String,
    pub exp: usize,
    pub iat: usize,
}

/// The resolved caller of an authenticated request.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: i64,
    pub public_id: String,
    pub role: UserRole,
}

/// A freshly registered or logged-in account.
#[derive(Debug, Clone)]
pub struct Account {
    pub user_id: i64,
    pub public_id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

#[derive(Clone)]
pub struct Authenticator {
    pool: SqlitePool,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
    reset_token_ttl: Duration,
}

impl Authenticator {
    pub fn new(pool: SqlitePool, config: &AuthConfig) -> Self {
        Self {
            pool,
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            token_ttl: Duration::seconds(config.token_ttl_seconds.min(i64::MAX as u64) as i64),
            reset_token_ttl: Duration::seconds(
                config.reset_token_ttl_seconds.min(i64::MAX as u64) as i64
            ),
        }
    }

    /// Create an account. The caller is responsible for restricting which
    /// roles are self-registrable.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<Account, AuthError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query("SELECT id FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&mut *tx)
            .await?;

        if existing.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let now = Utc::now().to_rfc3339();
        let public_id = cuid2::cuid();
        let password_hash = self.hash_password(password)?;

        sqlx::query(
            "INSERT INTO users (public_id, name, email, password_hash, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(name)
        .bind(email)
        .bind(&password_hash)
        .bind(role.to_string())
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query("SELECT id FROM users WHERE public_id = ?")
            .bind(&public_id)
            .fetch_one(&mut *tx)
            .await?;
        let user_id: i64 = row.try_get("id")?;

        tx.commit().await?;

        info!(user = %public_id, role = %role, "registered new user");

        Ok(Account {
            user_id,
            public_id,
            name: name.to_owned(),
            email: email.to_owned(),
            role,
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(Account, String), AuthError> {
        let row = sqlx::query(
            "SELECT id, public_id, name, email, password_hash, role FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Err(AuthError::InvalidCredentials);
        };

        let stored: String = row.try_get("password_hash")?;
        let parsed_hash = PasswordHash::new(&stored)?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidCredentials)?;

        let role: String = row.try_get("role")?;
        let role = UserRole::from_str(&role).map_err(|_| AuthError::InvalidCredentials)?;

        let account = Account {
            user_id: row.try_get("id")?,
            public_id: row.try_get("public_id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            role,
        };

        let token = self.issue_token(&account.public_id, role)?;
        Ok((account, token))
    }

    /// Sign a bearer token for the given user.
    pub fn issue_token(&self, public_id: &str, role: UserRole) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: public_id.to_owned(),
            role: role.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + self.token_ttl).timestamp() as usize,
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Verify a bearer token and resolve the caller against the user store.
    pub async fn authenticate_token(&self, token: &str) -> Result<Identity, AuthError> {
        let validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| AuthError::InvalidToken)?;

        let role = UserRole::from_str(&data.claims.role).map_err(|_| AuthError::InvalidToken)?;

        // The token is stateless; the row lookup rejects deleted accounts.
        let user_id: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE public_id = ?")
            .bind(&data.claims.sub)
            .fetch_optional(&self.pool)
            .await?;

        let Some(user_id) = user_id else {
            return Err(AuthError::InvalidToken);
        };

        Ok(Identity {
            user_id,
            public_id: data.claims.sub,
            role,
        })
    }

    /// Start a password reset. Returns the plaintext token to be emailed
    /// together with the recipient's name, or `None` when the email does not
    /// map to an account (the caller must not reveal which).
    pub async fn begin_password_reset(
        &self,
        email: &str,
    ) -> Result<Option<(String, String)>, AuthError> {
        let row = sqlx::query("SELECT id, name FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let user_id: i64 = row.try_get("id")?;
        let name: String = row.try_get("name")?;

        let token = generate_reset_token();
        let token_hash = hash_reset_token(&token);
        let expires_at = (Utc::now() + self.reset_token_ttl).to_rfc3339();

        sqlx::query(
            "UPDATE users SET reset_token_hash = ?, reset_token_expires_at = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&token_hash)
        .bind(&expires_at)
        .bind(Utc::now().to_rfc3339())
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(Some((token, name)))
    }

    /// Complete a password reset: consume the token and set the new password.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        let token_hash = hash_reset_token(token);

        let row = sqlx::query(
            "SELECT id, reset_token_expires_at FROM users WHERE reset_token_hash = ?",
        )
        .bind(&token_hash)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Err(AuthError::InvalidResetToken);
        };

        let user_id: i64 = row.try_get("id")?;
        let expires_at: Option<String> = row.try_get("reset_token_expires_at")?;
        let valid = expires_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|when| when.with_timezone(&Utc) > Utc::now())
            .unwrap_or(false);

        if !valid {
            return Err(AuthError::InvalidResetToken);
        }

        let password_hash = self.hash_password(new_password)?;

        sqlx::query(
            "UPDATE users SET password_hash = ?, reset_token_hash = NULL, reset_token_expires_at = NULL, updated_at = ? WHERE id = ?",
        )
        .bind(&password_hash)
        .bind(Utc::now().to_rfc3339())
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn hash_password(&self, password: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }
}

fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
