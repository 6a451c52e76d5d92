//! Journal entry HTTP handlers (admin, accountant).
//!
//! This module implements the journal API endpoints:
//! - POST /api/v1/journals - Post an entry
//! - GET /api/v1/journals - List entries (status, from, to, customer_id, invoice_id, limit)
//! - GET /api/v1/journals/{id} - Entry with lines
//! - POST /api/v1/journals/{id}/approve
//! - POST /api/v1/journals/{id}/reject
//! - POST /api/v1/journals/{id}/reverse

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        journal::{
            JournalEntry, JournalEntryResponse, JournalQuery, PostJournalRequest, ReverseRequest,
            ReviewRequest,
        },
        role::FINANCE,
    },
    services::{audit_service, journal_service},
};

/// Post a journal entry.
///
/// # Endpoint
///
/// `POST /api/v1/journals`
///
/// # Request Body
///
/// ```json
/// {
///   "entry_date": "2025-10-28",
///   "description": "Owner capital injection",
///   "idempotency_key": "capital-2025-10",
///   "lines": [
///     { "account_code": "A100", "debit_baisa": 5000000 },
///     { "account_code": "Q100", "credit_baisa": 5000000 }
///   ]
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: Entry with lines (or the earlier entry for a repeated idempotency key)
/// - **Error (400)**: Malformed lines, unknown or inactive account
/// - **Error (422)**: Debits and credits differ, or the date is locked
pub async fn post_entry(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<PostJournalRequest>,
) -> Result<(StatusCode, Json<JournalEntryResponse>), AppError> {
    auth.require(FINANCE)?;

    let response = journal_service::post_entry(&pool, Some(auth.user_id), &request).await?;

    audit_service::record(
        &pool,
        Some(auth.user_id),
        "post",
        "JournalEntry",
        Some(response.entry.id),
        serde_json::json!({
            "total_baisa": response.total_baisa,
            "status": response.entry.status,
        }),
    )
    .await;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_entries(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<JournalQuery>,
) -> Result<Json<Vec<JournalEntry>>, AppError> {
    auth.require(FINANCE)?;

    Ok(Json(journal_service::list_entries(&pool, &query).await?))
}

pub async fn get_entry(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(entry_id): Path<i64>,
) -> Result<Json<JournalEntryResponse>, AppError> {
    auth.require(FINANCE)?;

    Ok(Json(journal_service::get_entry(&pool, entry_id).await?))
}

/// Approve a pending entry. Fails with 422 if it is not pending or its date is locked.
///
/// The `{ "notes": "..." }` body is optional.
pub async fn approve_entry(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(entry_id): Path<i64>,
    request: Option<Json<ReviewRequest>>,
) -> Result<Json<JournalEntryResponse>, AppError> {
    auth.require(FINANCE)?;
    let request = request.map(|Json(body)| body).unwrap_or_default();

    let response =
        journal_service::approve_entry(&pool, entry_id, auth.user_id, request.notes).await?;

    audit_service::record(
        &pool,
        Some(auth.user_id),
        "approve",
        "JournalEntry",
        Some(entry_id),
        serde_json::json!({}),
    )
    .await;

    Ok(Json(response))
}

pub async fn reject_entry(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(entry_id): Path<i64>,
    request: Option<Json<ReviewRequest>>,
) -> Result<Json<JournalEntryResponse>, AppError> {
    auth.require(FINANCE)?;
    let request = request.map(|Json(body)| body).unwrap_or_default();

    let response =
        journal_service::reject_entry(&pool, entry_id, auth.user_id, request.notes).await?;

    audit_service::record(
        &pool,
        Some(auth.user_id),
        "reject",
        "JournalEntry",
        Some(entry_id),
        serde_json::json!({}),
    )
    .await;

    Ok(Json(response))
}

/// Reverse an approved entry. The body (`entry_date`, `description`) is optional.
///
/// # Response
///
/// - **Success (201 Created)**: The reversing entry, linked through `reversal_of_entry_id`
/// - **Error (409)**: Already reversed, or the entry belongs to a deposit or expense
/// - **Error (422)**: Entry is not approved, or the reversal date is locked
pub async fn reverse_entry(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(entry_id): Path<i64>,
    request: Option<Json<ReverseRequest>>,
) -> Result<(StatusCode, Json<JournalEntryResponse>), AppError> {
    auth.require(FINANCE)?;
    let request = request.map(|Json(body)| body).unwrap_or_default();

    let response = journal_service::reverse_entry(&pool, entry_id, auth.user_id, request).await?;

    audit_service::record(
        &pool,
        Some(auth.user_id),
        "reverse",
        "JournalEntry",
        Some(entry_id),
        serde_json::json!({ "reversal_entry_id": response.entry.id }),
    )
    .await;

    Ok((StatusCode::CREATED, Json(response)))
}
