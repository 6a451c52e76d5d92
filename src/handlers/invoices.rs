//! Invoice HTTP handlers (admin, accountant).
//!
//! - POST /api/v1/invoices
//! - GET /api/v1/invoices?customer_id=&status=
//! - GET /api/v1/invoices/{id}
//! - PATCH /api/v1/invoices/{id}/status

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
        invoice::{CreateInvoiceRequest, InvoiceQuery, InvoiceResponse, UpdateInvoiceStatusRequest},
        role::FINANCE,
    },
    services::{audit_service, invoice_service},
};

/// Raise an invoice.
///
/// # Response
///
/// - **Success (201 Created)**: The invoice with `paid_baisa` and `outstanding_baisa`
/// - **Error (400)**: Vehicle owned by another customer, bad starting status
/// - **Error (404)**: Customer or vehicle doesn't exist
/// - **Error (409)**: Invoice number already used
/// - **Error (422)**: Total not positive or above the ledger limit
pub async fn create_invoice(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<InvoiceResponse>), AppError> {
    auth.require(FINANCE)?;

    let invoice = invoice_service::create_invoice(&pool, request).await?;

    audit_service::record(
        &pool,
        Some(auth.user_id),
        "create",
        "Invoice",
        Some(invoice.id),
        serde_json::json!({
            "invoice_number": invoice.invoice_number,
            "customer_id": invoice.customer_id,
            "total_baisa": invoice.total_baisa,
        }),
    )
    .await;

    Ok((StatusCode::CREATED, Json(invoice.into())))
}

pub async fn list_invoices(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<InvoiceQuery>,
) -> Result<Json<Vec<InvoiceResponse>>, AppError> {
    auth.require(FINANCE)?;

    let invoices = invoice_service::list_invoices(&pool, &query).await?;

    Ok(Json(invoices.into_iter().map(Into::into).collect()))
}

pub async fn get_invoice(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(invoice_id): Path<i64>,
) -> Result<Json<InvoiceResponse>, AppError> {
    auth.require(FINANCE)?;

    Ok(Json(
        invoice_service::get_invoice(&pool, invoice_id).await?.into(),
    ))
}

/// Move an invoice to another status.
///
/// # Response
///
/// - **Success (200 OK)**: The updated invoice
/// - **Error (404)**: Invoice doesn't exist
/// - **Error (409)**: Transition not allowed, or marked paid with money outstanding
pub async fn update_status(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(invoice_id): Path<i64>,
    Json(request): Json<UpdateInvoiceStatusRequest>,
) -> Result<Json<InvoiceResponse>, AppError> {
    auth.require(FINANCE)?;

    let invoice = invoice_service::update_status(&pool, invoice_id, request.status).await?;

    audit_service::record(
        &pool,
        Some(auth.user_id),
        "update_status",
        "Invoice",
        Some(invoice.id),
        serde_json::json!({ "status": invoice.status }),
    )
    .await;

    Ok(Json(invoice.into()))
}
