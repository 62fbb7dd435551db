//! HTTP handlers and route registration.

use std::sync::Arc;

use axum::{
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{AuthService, AuthUser};
use crate::error::AppError;
use crate::service::{
    CatalogueService, SignInRequest, SignUpRequest, TrackActivityRequest, UserService,
};

#[derive(Clone)]
pub struct AppState {
    pub catalogue: Arc<CatalogueService>,
    pub users: Arc<UserService>,
    pub auth: AuthService,
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

/// Query parameters for the search endpoint. Page values arrive as strings
/// so extraction never fails; defaulting and range checks happen in
/// `parse_page_param`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default, rename = "pageIndex")]
    pub page_index: Option<String>,
    #[serde(default, rename = "pageSize")]
    pub page_size: Option<String>,
}

/// Missing or non-numeric page values fall back to the default. Well-formed
/// numbers that cannot be a valid page value (negative or beyond u32) are
/// rejected; zero is rejected by the service's own window check.
fn parse_page_param(value: Option<String>, default: u32) -> Result<u32, AppError> {
    match value {
        None => Ok(default),
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) => u32::try_from(n)
                .map_err(|_| AppError::Validation("pageIndex and pageSize are out of range".into())),
            Err(_) => Ok(default),
        },
    }
}

/// GET /health - Health check.
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// POST /api/v1/auth/signup - Register a new user.
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.users.register(request).await?;
    Ok((StatusCode::CREATED, Json(json!({ "data": "created" }))))
}

/// POST /api/v1/auth/signin - Exchange credentials for an access token.
pub async fn signin(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> Result<impl IntoResponse, AppError> {
    let access_token = state.users.login(request).await?;
    Ok((StatusCode::OK, Json(json!({ "access_token": access_token }))))
}

/// GET /api/v1/spotify/search - Search the catalog, merged with the
/// caller's like activity.
pub async fn search(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = params.query.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(AppError::Validation(
            "query is required and cannot be empty".into(),
        ));
    }

    let page_size = parse_page_param(params.page_size, 10)?;
    let page_index = parse_page_param(params.page_index, 1)?;

    let response = state
        .catalogue
        .search(&query, page_size, page_index, user.id)
        .await?;

    Ok((StatusCode::OK, Json(response)))
}

/// POST /api/v1/spotify/activity - Record a like/unlike for a track.
pub async fn upsert_activity(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<TrackActivityRequest>,
) -> Result<impl IntoResponse, AppError> {
    if request.spotify_id.is_empty() {
        return Err(AppError::Validation("spotify_id is required".into()));
    }

    state.catalogue.upsert_activity(user.id, request).await?;
    Ok((StatusCode::OK, Json(json!({ "status": "created" }))))
}

/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/auth/signup", post(signup))
        .route("/api/v1/auth/signin", post(signin))
        .route("/api/v1/spotify/search", get(search))
        .route("/api/v1/spotify/activity", post(upsert_activity))
}
