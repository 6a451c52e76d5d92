//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They handle database transactions, validation, and every write that
//! has to reach the journal.

pub mod audit_service;
pub mod auth_service;
pub mod backup_service;
pub mod deposit_service;
pub mod expense_service;
pub mod invoice_service;
pub mod journal_service;
pub mod report_service;
pub mod settings_service;
pub mod shipment_service;
pub mod user_service;
