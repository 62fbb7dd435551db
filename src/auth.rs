//! JWT issuing/verification, password hashing and the request auth extractor.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    username: String,
    iat: i64,
    exp: i64,
}

#[derive(Clone)]
pub struct AuthService {
    secret: String,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(secret: String, token_ttl: Duration) -> Self {
        Self { secret, token_ttl }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        Ok(bcrypt::verify(password, hash)?)
    }

    pub fn create_token(&self, user_id: i64, username: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(e.to_string()))
    }

    /// Verify a token and return `(user_id, username)`.
    pub fn verify_token(&self, token: &str) -> Result<(i64, String), AppError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized("invalid token".into()))?;

        let user_id = data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::Unauthorized("invalid token".into()))?;

        Ok((user_id, data.claims.username))
    }
}

/// Authenticated user identity, extracted from the Authorization header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AuthService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthService::from_ref(state);

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| AppError::Unauthorized("token not provided".into()))?;

        // Clients send either the raw token or a `Bearer `-prefixed one.
        let token = header.strip_prefix("Bearer ").unwrap_or(header);

        let (id, username) = auth.verify_token(token)?;
        Ok(AuthUser { id, username })
    }
}
