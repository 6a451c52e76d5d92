//! Accounting settings (admin, accountant).
//!
//! - GET /api/v1/settings
//! - PATCH /api/v1/settings

use axum::{Extension, Json, extract::State};

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        role::FINANCE,
        settings::{Settings, UpdateSettingsRequest},
    },
    services::{audit_service, settings_service},
};

pub async fn get_settings(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Settings>, AppError> {
    auth.require(FINANCE)?;

    Ok(Json(settings_service::get_settings(&pool).await?))
}

/// Update rates or the lock date.
///
/// # Request Body
///
/// ```json
/// { "vat_rate_bps": 500, "books_locked_until": "2025-09-30" }
/// ```
///
/// Send `"clear_lock": true` to reopen the books.
pub async fn update_settings(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<UpdateSettingsRequest>,
) -> Result<Json<Settings>, AppError> {
    auth.require(FINANCE)?;

    let settings = settings_service::update_settings(&pool, &request).await?;

    audit_service::record(
        &pool,
        Some(auth.user_id),
        "update",
        "Settings",
        Some(1),
        serde_json::json!({
            "vat_rate_bps": settings.vat_rate_bps,
            "customs_rate_bps": settings.customs_rate_bps,
            "books_locked_until": settings.books_locked_until,
        }),
    )
    .await;

    Ok(Json(settings))
}
