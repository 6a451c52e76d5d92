use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Select list matching [`Vehicle`].
pub const VEHICLE_COLUMNS: &str =
    "id, vin, make, model, year, owner_customer_id, status, purchase_price_cents, created_at";

/// A car bought at auction, optionally owned by a customer.
///
/// `purchase_price_cents` is the auction hammer price in USD cents.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Vehicle {
    pub id: i64,
    pub vin: String,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub owner_customer_id: Option<i64>,
    pub status: String,
    pub purchase_price_cents: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateVehicleRequest {
    pub vin: String,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub owner_customer_id: Option<i64>,
    pub status: Option<String>,
    pub purchase_price_cents: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVehicleStatusRequest {
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct VehicleQuery {
    pub vin: Option<String>,
    pub status: Option<String>,
    pub customer_id: Option<i64>,
}
