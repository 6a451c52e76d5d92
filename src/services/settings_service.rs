//! Accounting settings: tax rates and the books lock date.

use chrono::NaiveDate;
use sqlx::PgExecutor;

use crate::{
    db::DbPool,
    error::AppError,
    models::settings::{Settings, UpdateSettingsRequest},
};

pub async fn get_settings<'e, E: PgExecutor<'e>>(executor: E) -> Result<Settings, AppError> {
    let settings = sqlx::query_as::<_, Settings>(
        "SELECT vat_rate_bps, customs_rate_bps, books_locked_until, updated_at FROM settings WHERE id = 1",
    )
    .fetch_optional(executor)
    .await?
    .ok_or(AppError::NotFound("Settings"))?;

    Ok(settings)
}

/// Current lock date, if any. Posting and approval read it inside their transaction.
pub async fn books_locked_until<'e, E: PgExecutor<'e>>(
    executor: E,
) -> Result<Option<NaiveDate>, AppError> {
    let locked_until: Option<Option<NaiveDate>> =
        sqlx::query_scalar("SELECT books_locked_until FROM settings WHERE id = 1")
            .fetch_optional(executor)
            .await?;

    Ok(locked_until.flatten())
}

/// Apply a partial update.
///
/// # Validation
///
/// - Rates must be between 0 and 10000 basis points
/// - `clear_lock` and `books_locked_until` cannot be sent together
pub async fn update_settings(
    pool: &DbPool,
    request: &UpdateSettingsRequest,
) -> Result<Settings, AppError> {
    for rate in [request.vat_rate_bps, request.customs_rate_bps].into_iter().flatten() {
        if !(0..=10_000).contains(&rate) {
            return Err(AppError::InvalidRequest(
                "Rates must be between 0 and 10000 basis points".to_string(),
            ));
        }
    }

    if request.clear_lock && request.books_locked_until.is_some() {
        return Err(AppError::InvalidRequest(
            "Send either books_locked_until or clear_lock, not both".to_string(),
        ));
    }

    let settings = sqlx::query_as::<_, Settings>(
        r#"
        UPDATE settings
        SET vat_rate_bps = COALESCE($1, vat_rate_bps),
            customs_rate_bps = COALESCE($2, customs_rate_bps),
            books_locked_until = CASE WHEN $4 THEN NULL ELSE COALESCE($3, books_locked_until) END,
            updated_at = NOW()
        WHERE id = 1
        RETURNING vat_rate_bps, customs_rate_bps, books_locked_until, updated_at
        "#,
    )
    .bind(request.vat_rate_bps)
    .bind(request.customs_rate_bps)
    .bind(request.books_locked_until)
    .bind(request.clear_lock)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Settings"))?;

    tracing::info!(
        "Settings updated: vat {} bps, customs {} bps, locked until {:?}",
        settings.vat_rate_bps,
        settings.customs_rate_bps,
        settings.books_locked_until
    );

    Ok(settings)
}
