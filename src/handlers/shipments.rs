//! Shipment HTTP handlers (admin, employee).
//!
//! - POST /api/v1/shipments
//! - GET /api/v1/shipments
//! - GET /api/v1/shipments/{id}
//! - PATCH /api/v1/shipments/{id}/status
//! - PUT /api/v1/shipments/{id}/vehicles - Replace the attached vehicles

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        role::OPERATIONS,
        shipment::{
            AttachVehiclesRequest, CreateShipmentRequest, Shipment, ShipmentDetail,
            ShipmentSummary, UpdateShipmentStatusRequest,
        },
    },
    services::{audit_service, shipment_service},
};

/// Open a shipment, optionally with vehicles.
///
/// # Response
///
/// - **Success (201 Created)**: The shipment and its vehicles
/// - **Error (400)**: Arrival before departure, negative cost, unknown vehicle
/// - **Error (409)**: Shipment number already used
pub async fn create_shipment(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateShipmentRequest>,
) -> Result<(StatusCode, Json<ShipmentDetail>), AppError> {
    auth.require(OPERATIONS)?;

    let detail = shipment_service::create_shipment(&pool, request).await?;

    audit_service::record(
        &pool,
        Some(auth.user_id),
        "create",
        "Shipment",
        Some(detail.shipment.id),
        serde_json::json!({
            "shipment_number": detail.shipment.shipment_number,
            "vehicle_ids": detail.vehicles.iter().map(|vehicle| vehicle.id).collect::<Vec<_>>(),
        }),
    )
    .await;

    Ok((StatusCode::CREATED, Json(detail)))
}

pub async fn list_shipments(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<ShipmentSummary>>, AppError> {
    auth.require(OPERATIONS)?;

    Ok(Json(shipment_service::list_shipments(&pool).await?))
}

pub async fn get_shipment(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(shipment_id): Path<i64>,
) -> Result<Json<ShipmentDetail>, AppError> {
    auth.require(OPERATIONS)?;

    Ok(Json(
        shipment_service::get_shipment(&pool, shipment_id).await?,
    ))
}

pub async fn update_status(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(shipment_id): Path<i64>,
    Json(request): Json<UpdateShipmentStatusRequest>,
) -> Result<Json<Shipment>, AppError> {
    auth.require(OPERATIONS)?;

    let shipment = shipment_service::update_status(&pool, shipment_id, &request.status).await?;

    audit_service::record(
        &pool,
        Some(auth.user_id),
        "update_status",
        "Shipment",
        Some(shipment.id),
        serde_json::json!({ "status": shipment.status }),
    )
    .await;

    Ok(Json(shipment))
}

/// Replace the vehicles on a shipment. An empty list detaches all of them.
///
/// # Response
///
/// - **Success (200 OK)**: The shipment and its new vehicles
/// - **Error (400)**: Unknown vehicle id
/// - **Error (404)**: Shipment doesn't exist
pub async fn replace_vehicles(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(shipment_id): Path<i64>,
    Json(request): Json<AttachVehiclesRequest>,
) -> Result<Json<ShipmentDetail>, AppError> {
    auth.require(OPERATIONS)?;

    let detail =
        shipment_service::replace_vehicles(&pool, shipment_id, &request.vehicle_ids).await?;

    audit_service::record(
        &pool,
        Some(auth.user_id),
        "replace_vehicles",
        "Shipment",
        Some(shipment_id),
        serde_json::json!({
            "vehicle_ids": detail.vehicles.iter().map(|vehicle| vehicle.id).collect::<Vec<_>>(),
        }),
    )
    .await;

    Ok(Json(detail))
}
