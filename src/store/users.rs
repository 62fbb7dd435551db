//! User account rows.

use chrono::NaiveDateTime;
use sqlx::FromRow;

use crate::error::AppError;
use crate::store::Database;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub password: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Database {
    pub async fn find_user_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, User>(
            "SELECT id, email, username, password, created_at, updated_at
             FROM users
             WHERE email = ? OR username = ?",
        )
        .bind(email)
        .bind(username)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, User>(
            "SELECT id, email, username, password, created_at, updated_at
             FROM users
             WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    pub async fn create_user(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO users (email, username, password, created_at, updated_at)
             VALUES (?, ?, ?, datetime('now'), datetime('now'))",
        )
        .bind(email)
        .bind(username)
        .bind(password_hash)
        .execute(self.pool())
        .await?;

        Ok(())
    }
}
