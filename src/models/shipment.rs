//! Shipments and the vehicles they carry.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::vehicle::Vehicle;

/// A sea or land shipment. Costs are USD cents as quoted by the carrier.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Shipment {
    pub id: i64,
    pub shipment_number: String,
    pub shipment_type: Option<String>,
    pub origin_port: Option<String>,
    pub destination_port: Option<String>,
    pub shipping_company: Option<String>,
    pub container_number: Option<String>,
    pub departure_date: Option<NaiveDate>,
    pub arrival_date: Option<NaiveDate>,
    pub status: String,
    pub cost_freight_cents: Option<i64>,
    pub cost_insurance_cents: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// List row: a shipment and how many vehicles are attached.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct ShipmentSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub shipment: Shipment,
    pub vehicle_count: i64,
}

#[derive(Debug, Serialize)]
pub struct ShipmentDetail {
    #[serde(flatten)]
    pub shipment: Shipment,
    pub vehicles: Vec<Vehicle>,
}

/// Request to open a shipment.
///
/// # JSON Example
///
/// ```json
/// {
///   "shipment_type": "Container",
///   "origin_port": "Savannah",
///   "destination_port": "Sohar",
///   "departure_date": "2025-10-02",
///   "cost_freight_cents": 185000,
///   "vehicle_ids": [12, 13]
/// }
/// ```
///
/// `shipment_number` defaults to `SHP-<unix seconds>`, `status` to `Open`.
#[derive(Debug, Deserialize)]
pub struct CreateShipmentRequest {
    pub shipment_number: Option<String>,
    pub shipment_type: Option<String>,
    pub origin_port: Option<String>,
    pub destination_port: Option<String>,
    pub shipping_company: Option<String>,
    pub container_number: Option<String>,
    pub departure_date: Option<NaiveDate>,
    pub arrival_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub cost_freight_cents: Option<i64>,
    pub cost_insurance_cents: Option<i64>,
    #[serde(default)]
    pub vehicle_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateShipmentStatusRequest {
    pub status: String,
}

/// Replaces the full set of vehicles on a shipment.
#[derive(Debug, Deserialize)]
pub struct AttachVehiclesRequest {
    pub vehicle_ids: Vec<i64>,
}
