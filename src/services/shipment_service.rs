//! Shipment service - shipments and the vehicles attached to them.
//!
//! A shipment and its vehicle links are always written in one transaction,
//! so a request naming an unknown vehicle leaves nothing behind.

use chrono::{NaiveDate, Utc};
use sqlx::{Postgres, Transaction};

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        shipment::{CreateShipmentRequest, Shipment, ShipmentDetail, ShipmentSummary},
        vehicle::{VEHICLE_COLUMNS, Vehicle},
    },
};

const SHIPMENT_COLUMNS: &str = r#"
    id, shipment_number, shipment_type, origin_port, destination_port, shipping_company,
    container_number, departure_date, arrival_date, status, cost_freight_cents,
    cost_insurance_cents, created_at
"#;

/// Arrival cannot come before departure.
pub fn validate_dates(
    departure: Option<NaiveDate>,
    arrival: Option<NaiveDate>,
) -> Result<(), AppError> {
    match (departure, arrival) {
        (Some(departure), Some(arrival)) if arrival < departure => Err(AppError::InvalidRequest(
            "Arrival date cannot be before departure date".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Sorted, de-duplicated vehicle ids.
pub fn unique_ids(ids: &[i64]) -> Vec<i64> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Requested ids that the database did not return.
fn missing_ids(requested: &[i64], found: &[i64]) -> Vec<i64> {
    requested
        .iter()
        .copied()
        .filter(|id| !found.contains(id))
        .collect()
}

fn shipment_number(requested: Option<&str>, now_secs: i64) -> String {
    requested
        .map(str::trim)
        .filter(|number| !number.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("SHP-{now_secs}"))
}

/// Open a shipment and attach its vehicles.
///
/// # Errors
///
/// - `InvalidRequest`: dates out of order, negative cost, unknown vehicle id
/// - `Database`: shipment number already used (409)
pub async fn create_shipment(
    pool: &DbPool,
    request: CreateShipmentRequest,
) -> Result<ShipmentDetail, AppError> {
    validate_dates(request.departure_date, request.arrival_date)?;
    if request.cost_freight_cents.is_some_and(|cost| cost < 0)
        || request.cost_insurance_cents.is_some_and(|cost| cost < 0)
    {
        return Err(AppError::InvalidRequest(
            "Shipment costs cannot be negative".to_string(),
        ));
    }

    let number = shipment_number(request.shipment_number.as_deref(), Utc::now().timestamp());
    let vehicle_ids = unique_ids(&request.vehicle_ids);

    let mut tx = pool.begin().await?;

    let shipment = sqlx::query_as::<_, Shipment>(&format!(
        r#"
        INSERT INTO shipments (
            shipment_number, shipment_type, origin_port, destination_port, shipping_company,
            container_number, departure_date, arrival_date, status, cost_freight_cents,
            cost_insurance_cents
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, 'Open'), $10, $11)
        RETURNING {SHIPMENT_COLUMNS}
        "#
    ))
    .bind(&number)
    .bind(request.shipment_type)
    .bind(request.origin_port)
    .bind(request.destination_port)
    .bind(request.shipping_company)
    .bind(request.container_number)
    .bind(request.departure_date)
    .bind(request.arrival_date)
    .bind(request.status)
    .bind(request.cost_freight_cents)
    .bind(request.cost_insurance_cents)
    .fetch_one(&mut *tx)
    .await?;

    let vehicles = attach_in_tx(&mut tx, shipment.id, &vehicle_ids).await?;
    tx.commit().await?;

    tracing::info!(
        "Shipment {} opened with {} vehicles",
        shipment.shipment_number,
        vehicles.len()
    );

    Ok(ShipmentDetail { shipment, vehicles })
}

/// Replace the vehicles attached to a shipment.
pub async fn replace_vehicles(
    pool: &DbPool,
    shipment_id: i64,
    vehicle_ids: &[i64],
) -> Result<ShipmentDetail, AppError> {
    let vehicle_ids = unique_ids(vehicle_ids);
    let mut tx = pool.begin().await?;

    let shipment = sqlx::query_as::<_, Shipment>(&format!(
        "SELECT {SHIPMENT_COLUMNS} FROM shipments WHERE id = $1 FOR UPDATE"
    ))
    .bind(shipment_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::NotFound("Shipment"))?;

    sqlx::query("DELETE FROM vehicle_shipments WHERE shipment_id = $1")
        .bind(shipment_id)
        .execute(&mut *tx)
        .await?;

    let vehicles = attach_in_tx(&mut tx, shipment_id, &vehicle_ids).await?;
    tx.commit().await?;

    tracing::info!(
        "Shipment {} now carries {} vehicles",
        shipment.shipment_number,
        vehicles.len()
    );

    Ok(ShipmentDetail { shipment, vehicles })
}

async fn attach_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    shipment_id: i64,
    vehicle_ids: &[i64],
) -> Result<Vec<Vehicle>, AppError> {
    if vehicle_ids.is_empty() {
        return Ok(Vec::new());
    }

    let vehicles = sqlx::query_as::<_, Vehicle>(&format!(
        "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = ANY($1) ORDER BY id"
    ))
    .bind(vehicle_ids)
    .fetch_all(&mut **tx)
    .await?;

    let found: Vec<i64> = vehicles.iter().map(|vehicle| vehicle.id).collect();
    let missing = missing_ids(vehicle_ids, &found);
    if !missing.is_empty() {
        return Err(AppError::InvalidRequest(format!(
            "Unknown vehicle ids: {missing:?}"
        )));
    }

    sqlx::query(
        r#"
        INSERT INTO vehicle_shipments (vehicle_id, shipment_id)
        SELECT vehicle_id, $2 FROM UNNEST($1::bigint[]) AS vehicle_id
        "#,
    )
    .bind(vehicle_ids)
    .bind(shipment_id)
    .execute(&mut **tx)
    .await?;

    Ok(vehicles)
}

/// Newest first, at most 200, with vehicle counts.
pub async fn list_shipments(pool: &DbPool) -> Result<Vec<ShipmentSummary>, AppError> {
    let shipments = sqlx::query_as::<_, ShipmentSummary>(&format!(
        r#"
        SELECT {SHIPMENT_COLUMNS},
               (SELECT COUNT(*) FROM vehicle_shipments vs WHERE vs.shipment_id = shipments.id)
                   AS vehicle_count
        FROM shipments
        ORDER BY created_at DESC, id DESC
        LIMIT 200
        "#
    ))
    .fetch_all(pool)
    .await?;

    Ok(shipments)
}

pub async fn get_shipment(pool: &DbPool, shipment_id: i64) -> Result<ShipmentDetail, AppError> {
    let shipment = sqlx::query_as::<_, Shipment>(&format!(
        "SELECT {SHIPMENT_COLUMNS} FROM shipments WHERE id = $1"
    ))
    .bind(shipment_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Shipment"))?;

    let vehicles = sqlx::query_as::<_, Vehicle>(&format!(
        r#"
        SELECT {VEHICLE_COLUMNS}
        FROM vehicles
        WHERE id IN (SELECT vehicle_id FROM vehicle_shipments WHERE shipment_id = $1)
        ORDER BY id
        "#
    ))
    .bind(shipment_id)
    .fetch_all(pool)
    .await?;

    Ok(ShipmentDetail { shipment, vehicles })
}

pub async fn update_status(
    pool: &DbPool,
    shipment_id: i64,
    status: &str,
) -> Result<Shipment, AppError> {
    let status = status.trim();
    if status.is_empty() {
        return Err(AppError::InvalidRequest("Status is required".to_string()));
    }

    let shipment = sqlx::query_as::<_, Shipment>(&format!(
        "UPDATE shipments SET status = $1 WHERE id = $2 RETURNING {SHIPMENT_COLUMNS}"
    ))
    .bind(status)
    .bind(shipment_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Shipment"))?;

    tracing::info!("Shipment {} status: {}", shipment.shipment_number, shipment.status);

    Ok(shipment)
}

/// Shipments carrying one vehicle, oldest first.
pub async fn shipments_for_vehicle(
    pool: &DbPool,
    vehicle_id: i64,
) -> Result<Vec<Shipment>, AppError> {
    let shipments = sqlx::query_as::<_, Shipment>(&format!(
        r#"
        SELECT {SHIPMENT_COLUMNS}
        FROM shipments
        WHERE id IN (SELECT shipment_id FROM vehicle_shipments WHERE vehicle_id = $1)
        ORDER BY created_at, id
        "#
    ))
    .bind(vehicle_id)
    .fetch_all(pool)
    .await?;

    Ok(shipments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_arrival_before_departure_rejected() {
        assert!(matches!(
            validate_dates(Some(date(2025, 10, 9)), Some(date(2025, 10, 2))),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(validate_dates(Some(date(2025, 10, 2)), Some(date(2025, 10, 2))).is_ok());
        assert!(validate_dates(None, Some(date(2025, 10, 2))).is_ok());
    }

    #[test]
    fn test_vehicle_ids_are_deduplicated() {
        assert_eq!(unique_ids(&[13, 12, 13, 12]), vec![12, 13]);
        assert!(unique_ids(&[]).is_empty());
    }

    #[test]
    fn test_missing_vehicle_ids() {
        assert_eq!(missing_ids(&[12, 13, 14], &[12, 14]), vec![13]);
        assert!(missing_ids(&[12], &[12]).is_empty());
    }

    #[test]
    fn test_shipment_number_defaults_to_timestamp() {
        assert_eq!(shipment_number(None, 1_760_000_000), "SHP-1760000000");
        assert_eq!(shipment_number(Some("  "), 5), "SHP-5");
        assert_eq!(shipment_number(Some(" MSC-778 "), 5), "MSC-778");
    }
}
