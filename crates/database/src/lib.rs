//! NexusConnect database crate
//!
//! Connection management and schema migrations for the marketplace backend.

use sqlx::SqlitePool;

pub mod connection;
pub mod migrations;

pub use connection::prepare_database;
pub use migrations::run_migrations;
pub use nexus_config::DatabaseConfig;

/// Errors raised while bringing the database up.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("migration error: {0}")]
    Migration(String),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Connect to the configured database and apply pending migrations.
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::Connection(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_database() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db_url = format!("sqlite://{}", db_path.display());

        let config = DatabaseConfig {
            url: db_url,
            max_connections: 1,
        };

        let pool = initialize_database(&config).await.unwrap();
        (pool, temp_dir)
    }

    #[tokio::test]
    async fn test_database_initialization() {
        let (pool, _temp_dir) = create_test_database().await;

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND name != '_sqlx_migrations' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        assert_eq!(tables, vec!["bookmarks", "messages", "requests", "users"]);
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled() {
        let (pool, _temp_dir) = create_test_database().await;

        let result: (bool,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();

        assert!(result.0);
    }

    #[tokio::test]
    async fn test_duplicate_request_pair_rejected_by_schema() {
        let (pool, _temp_dir) = create_test_database().await;

        let now = "2024-01-01T00:00:00Z";
        for (id, public_id, role) in [(1, "inv1", "investor"), (2, "ent1", "entrepreneur")] {
            sqlx::query(
                "INSERT INTO users (id, public_id, name, email, password_hash, role, created_at, updated_at) VALUES (?, ?, ?, ?, 'x', ?, ?, ?)",
            )
            .bind(id)
            .bind(public_id)
            .bind(format!("User {id}"))
            .bind(format!("{public_id}@example.com"))
            .bind(role)
            .bind(now)
            .bind(now)
            .execute(&pool)
            .await
            .unwrap();
        }

        let insert = "INSERT INTO requests (investor_id, entrepreneur_id, created_at, updated_at) VALUES (1, 2, ?, ?)";
        sqlx::query(insert)
            .bind(now)
            .bind(now)
            .execute(&pool)
            .await
            .unwrap();

        let duplicate = sqlx::query(insert)
            .bind(now)
            .bind(now)
            .execute(&pool)
            .await;

        let err = duplicate.unwrap_err().to_string();
        assert!(err.contains("UNIQUE constraint failed"), "{err}");
    }
}
