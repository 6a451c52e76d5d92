//! Vehicle HTTP handlers (admin, employee).
//!
//! - POST /api/v1/vehicles
//! - GET /api/v1/vehicles?vin=&status=&customer_id=
//! - GET /api/v1/vehicles/{id}
//! - PATCH /api/v1/vehicles/{id}/status

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
        role::OPERATIONS,
        vehicle::{
            CreateVehicleRequest, UpdateVehicleStatusRequest, VEHICLE_COLUMNS, Vehicle, VehicleQuery,
        },
    },
    services::audit_service,
};

/// VINs are stored upper-case without surrounding whitespace.
pub fn normalize_vin(vin: &str) -> String {
    vin.trim().to_ascii_uppercase()
}

/// Register a vehicle.
///
/// # Response
///
/// - **Success (201 Created)**: The vehicle
/// - **Error (400)**: Empty VIN or negative price
/// - **Error (409)**: VIN already registered
pub async fn create_vehicle(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<Vehicle>), AppError> {
    auth.require(OPERATIONS)?;

    let vin = normalize_vin(&request.vin);
    if vin.is_empty() {
        return Err(AppError::InvalidRequest("VIN is required".to_string()));
    }
    if request.purchase_price_cents.is_some_and(|price| price < 0) {
        return Err(AppError::InvalidRequest(
            "Purchase price cannot be negative".to_string(),
        ));
    }

    let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
        r#"
        INSERT INTO vehicles (vin, make, model, year, owner_customer_id, status, purchase_price_cents)
        VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'New'), $7)
        RETURNING {VEHICLE_COLUMNS}
        "#
    ))
    .bind(&vin)
    .bind(request.make)
    .bind(request.model)
    .bind(request.year)
    .bind(request.owner_customer_id)
    .bind(request.status)
    .bind(request.purchase_price_cents)
    .fetch_one(&pool)
    .await?;

    audit_service::record(
        &pool,
        Some(auth.user_id),
        "create",
        "Vehicle",
        Some(vehicle.id),
        serde_json::json!({ "vin": vehicle.vin }),
    )
    .await;

    Ok((StatusCode::CREATED, Json(vehicle)))
}

pub async fn list_vehicles(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<VehicleQuery>,
) -> Result<Json<Vec<Vehicle>>, AppError> {
    auth.require(OPERATIONS)?;

    let vehicles = sqlx::query_as::<_, Vehicle>(&format!(
        r#"
        SELECT {VEHICLE_COLUMNS}
        FROM vehicles
        WHERE ($1::text IS NULL OR vin = $1)
          AND ($2::text IS NULL OR status = $2)
          AND ($3::bigint IS NULL OR owner_customer_id = $3)
        ORDER BY created_at DESC, id DESC
        "#
    ))
    .bind(query.vin.as_deref().map(normalize_vin))
    .bind(query.status)
    .bind(query.customer_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(vehicles))
}

pub async fn get_vehicle(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(vehicle_id): Path<i64>,
) -> Result<Json<Vehicle>, AppError> {
    auth.require(OPERATIONS)?;

    let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
        "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = $1"
    ))
    .bind(vehicle_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Vehicle"))?;

    Ok(Json(vehicle))
}

pub async fn update_status(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(vehicle_id): Path<i64>,
    Json(request): Json<UpdateVehicleStatusRequest>,
) -> Result<Json<Vehicle>, AppError> {
    auth.require(OPERATIONS)?;

    let status = request.status.trim();
    if status.is_empty() {
        return Err(AppError::InvalidRequest("Status is required".to_string()));
    }

    let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
        "UPDATE vehicles SET status = $1 WHERE id = $2 RETURNING {VEHICLE_COLUMNS}"
    ))
    .bind(status)
    .bind(vehicle_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Vehicle"))?;

    audit_service::record(
        &pool,
        Some(auth.user_id),
        "update_status",
        "Vehicle",
        Some(vehicle.id),
        serde_json::json!({ "status": vehicle.status }),
    )
    .await;

    Ok(Json(vehicle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vin_is_trimmed_and_upper_cased() {
        assert_eq!(normalize_vin("  jtmhv05j604123456 "), "JTMHV05J604123456");
        assert_eq!(normalize_vin(""), "");
    }
}
