//! Test utilities for service layer testing

use sqlx::{sqlite::SqliteConnectOptions, sqlite::SqliteJournalMode, SqlitePool};
use tempfile::TempDir;

/// Creates a test database with the real schema applied.
pub async fn create_test_db() -> (SqlitePool, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");

    let connect_options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Memory)
        .foreign_keys(true);

    let pool = SqlitePool::connect_with(connect_options)
        .await
        .expect("Failed to create test database");

    nexus_database::migrations::MIGRATOR
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    (pool, temp_dir)
}

/// An account to seed, with sensible defaults per role.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub name: String,
    pub email: String,
    pub role: &'static str,
    pub investment_interests: Vec<String>,
    pub startup_name: Option<String>,
}

impl TestUser {
    pub fn investor(name: &str) -> Self {
        Self {
            name: name.to_string(),
            email: format!("{name}@example.com"),
            role: "investor",
            investment_interests: Vec::new(),
            startup_name: None,
        }
    }

    pub fn entrepreneur(name: &str) -> Self {
        Self {
            name: name.to_string(),
            email: format!("{name}@example.com"),
            role: "entrepreneur",
            investment_interests: Vec::new(),
            startup_name: Some(format!("{name} Ventures")),
        }
    }

    pub fn admin(name: &str) -> Self {
        Self {
            name: name.to_string(),
            email: format!("{name}@example.com"),
            role: "admin",
            investment_interests: Vec::new(),
            startup_name: None,
        }
    }
}

/// A seeded account with its assigned ids.
#[derive(Debug, Clone)]
pub struct SeededUser {
    pub id: i64,
    pub public_id: String,
    pub name: String,
    pub email: String,
}

/// Inserts a user row directly, bypassing registration.
pub async fn insert_user(pool: &SqlitePool, user: TestUser) -> SeededUser {
    let public_id = format!("pub-{}", user.name);
    let interests = serde_json::to_string(&user.investment_interests).unwrap();
    let now = chrono::Utc::now().to_rfc3339();

    let id = sqlx::query(
        r#"
        INSERT INTO users (public_id, name, email, password_hash, role, startup_name,
                           investment_interests, created_at, updated_at)
        VALUES (?, ?, ?, 'not-a-real-hash', ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&public_id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(user.role)
    .bind(&user.startup_name)
    .bind(&interests)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .expect("Failed to insert test user")
    .last_insert_rowid();

    SeededUser {
        id,
        public_id,
        name: user.name,
        email: user.email,
    }
}
