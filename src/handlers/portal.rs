//! Customer portal: read-only views for a logged-in customer.
//!
//! - GET /api/v1/me/vehicles
//! - GET /api/v1/me/vehicles/{id} - Vehicle with its shipments
//! - GET /api/v1/me/invoices
//! - GET /api/v1/me/invoices/{id}
//!
//! Records belonging to other customers answer 404, the same as missing ones.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Serialize;

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        invoice::{InvoiceQuery, InvoiceResponse},
        role::Role,
        shipment::Shipment,
        vehicle::{VEHICLE_COLUMNS, Vehicle},
    },
    services::{deposit_service, invoice_service, shipment_service},
};

const CUSTOMER: &[Role] = &[Role::Customer];

#[derive(Debug, Serialize)]
pub struct VehicleTracking {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub shipments: Vec<Shipment>,
}

async fn current_customer(pool: &DbPool, auth: &AuthContext) -> Result<i64, AppError> {
    auth.require(CUSTOMER)?;
    deposit_service::customer_id_for_user(pool, auth.user_id).await
}

pub async fn my_vehicles(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<Vehicle>>, AppError> {
    let customer_id = current_customer(&pool, &auth).await?;

    let vehicles = sqlx::query_as::<_, Vehicle>(&format!(
        r#"
        SELECT {VEHICLE_COLUMNS}
        FROM vehicles
        WHERE owner_customer_id = $1
        ORDER BY created_at DESC, id DESC
        "#
    ))
    .bind(customer_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(vehicles))
}

pub async fn my_vehicle(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(vehicle_id): Path<i64>,
) -> Result<Json<VehicleTracking>, AppError> {
    let customer_id = current_customer(&pool, &auth).await?;

    let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
        "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = $1 AND owner_customer_id = $2"
    ))
    .bind(vehicle_id)
    .bind(customer_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Vehicle"))?;

    let shipments = shipment_service::shipments_for_vehicle(&pool, vehicle.id).await?;

    Ok(Json(VehicleTracking { vehicle, shipments }))
}

pub async fn my_invoices(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<InvoiceResponse>>, AppError> {
    let customer_id = current_customer(&pool, &auth).await?;

    let query = InvoiceQuery {
        customer_id: Some(customer_id),
        status: None,
    };
    let invoices = invoice_service::list_invoices(&pool, &query).await?;

    Ok(Json(invoices.into_iter().map(Into::into).collect()))
}

pub async fn my_invoice(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(invoice_id): Path<i64>,
) -> Result<Json<InvoiceResponse>, AppError> {
    let customer_id = current_customer(&pool, &auth).await?;

    Ok(Json(
        invoice_service::get_customer_invoice(&pool, customer_id, invoice_id)
            .await?
            .into(),
    ))
}
