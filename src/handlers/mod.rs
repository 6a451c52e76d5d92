//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Checks the caller's role against the route's allowed set
//! 3. Delegates to a service or runs a single query
//! 4. Returns HTTP response (JSON, status code)

pub mod accounts;
pub mod admin;
pub mod auth;
pub mod customers;
pub mod deposits;
pub mod expenses;
pub mod health;
pub mod invoices;
pub mod journals;
pub mod portal;
pub mod reports;
pub mod settings;
pub mod shipments;
pub mod users;
pub mod vehicles;
