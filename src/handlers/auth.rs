//! Login, logout and the current user.
//!
//! - POST /api/v1/auth/login - Public, returns a bearer token
//! - POST /api/v1/auth/logout - Revokes the calling session
//! - GET /api/v1/auth/me - Who am I

use std::sync::Arc;

use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::{
    config::Config,
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::user::{LoginRequest, LoginResponse},
    services::auth_service,
};

/// Exchange email and password for a bearer token.
///
/// # Response
///
/// - **Success (200 OK)**: token, expiry and the user
/// - **Error (401)**: Wrong credentials or inactive user; the two are not distinguished
pub async fn login(
    State(pool): State<DbPool>,
    State(config): State<Arc<Config>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = auth_service::login(
        &pool,
        &request.email,
        &request.password,
        config.session_ttl_hours,
    )
    .await?;

    Ok(Json(response))
}

pub async fn logout(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<StatusCode, AppError> {
    auth_service::logout(&pool, auth.session_id).await?;
    tracing::info!("User {} logged out", auth.user_id);

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: i64,
    pub name: Option<String>,
    pub email: String,
    pub role: Option<&'static str>,
}

pub async fn me(Extension(auth): Extension<AuthContext>) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: auth.user_id,
        name: auth.name,
        email: auth.email,
        role: auth.role.map(|role| role.as_str()),
    })
}
