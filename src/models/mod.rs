//! Data models representing database entities.
//!
//! This module contains all data structures that map to database tables,
//! plus the request and response bodies of the HTTP API.

pub mod account;
pub mod audit;
pub mod backup;
pub mod customer;
pub mod deposit;
pub mod expense;
pub mod invoice;
pub mod journal;
pub mod role;
pub mod session;
pub mod settings;
pub mod shipment;
pub mod user;
pub mod vehicle;
