//! User registration and login.

use serde::Deserialize;

use crate::auth::AuthService;
use crate::error::AppError;
use crate::store::Database;

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

pub struct UserService {
    db: Database,
    auth: AuthService,
}

impl UserService {
    pub fn new(db: Database, auth: AuthService) -> Self {
        Self { db, auth }
    }

    pub async fn register(&self, request: SignUpRequest) -> Result<(), AppError> {
        if request.username.is_empty() || request.email.is_empty() || request.password.is_empty() {
            return Err(AppError::Validation(
                "username, email and password are required".into(),
            ));
        }

        let existing = self
            .db
            .find_user_by_email_or_username(&request.email, &request.username)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(
                "email or username already registered".into(),
            ));
        }

        let hashed = self.auth.hash_password(&request.password)?;
        self.db
            .create_user(&request.email, &request.username, &hashed)
            .await
    }

    /// Returns a signed access token on success.
    pub async fn login(&self, request: SignInRequest) -> Result<String, AppError> {
        if request.email.is_empty() || request.password.is_empty() {
            return Err(AppError::Validation("email and password are required".into()));
        }

        let user = self
            .db
            .find_user_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("email not registered".into()))?;

        if !self.auth.verify_password(&request.password, &user.password)? {
            return Err(AppError::Unauthorized("password doesn't match".into()));
        }

        self.auth.create_token(user.id, &user.username)
    }
}
