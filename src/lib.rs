//! Back office for a car import business: general ledger, client deposits,
//! operating expenses and financial reports over a JSON API.
//!
//! # Layers
//!
//! - [`ledger`]: double-entry rules and report algorithms, no I/O
//! - [`services`]: PostgreSQL transactions that post to the ledger
//! - [`handlers`] and [`routes`]: the axum HTTP surface
//!
//! Money is `i64` minor units throughout: baisa for OMR, cents for USD.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod ledger;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber. Reads `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}
