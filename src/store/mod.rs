//! SQLite persistence layer.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::AppError;

pub mod activities;
pub mod users;

pub use activities::{ActivityStore, NewTrackActivity, TrackActivity};
pub use users::User;

/// SQLite database handle shared by the stores.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a connection pool and run migrations.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // An in-memory database exists per connection, so it must not be
        // spread across a pool.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Self::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// In-memory database, used by tests.
    pub async fn in_memory() -> Result<Self, AppError> {
        Self::connect("sqlite::memory:").await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // Migrations are embedded so the binary carries its own schema.
    async fn run_migrations(pool: &SqlitePool) -> Result<(), AppError> {
        const MIGRATIONS: &[&str] = &[
            include_str!("../../migrations/0001_create_users.sql"),
            include_str!("../../migrations/0002_create_track_activities.sql"),
        ];

        for migration in MIGRATIONS {
            for statement in migration.split(';').filter(|s| !s.trim().is_empty()) {
                sqlx::query(statement).execute(pool).await?;
            }
        }

        Ok(())
    }
}
