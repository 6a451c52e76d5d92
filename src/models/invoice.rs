//! Customer invoices.
//!
//! An invoice does not post anything by itself. Entries that bill or settle
//! it carry its `invoice_id`; the amount paid is the net debit those approved
//! entries put on cash accounts.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Invoice {
    pub id: i64,
    pub invoice_number: String,
    pub customer_id: i64,
    pub vehicle_id: Option<i64>,
    pub invoice_type: Option<String>,
    pub total_baisa: i64,
    pub status: String,
    pub issued_on: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,

    /// Cash received against the invoice through approved entries
    pub paid_baisa: i64,
}

#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub outstanding_baisa: i64,
}

impl From<Invoice> for InvoiceResponse {
    fn from(invoice: Invoice) -> Self {
        let outstanding_baisa = invoice.total_baisa.saturating_sub(invoice.paid_baisa);
        Self {
            invoice,
            outstanding_baisa,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Issued,
    Paid,
    Cancelled,
}

impl InvoiceStatus {
    pub fn parse(value: &str) -> Option<InvoiceStatus> {
        match value.trim().to_lowercase().as_str() {
            "draft" => Some(InvoiceStatus::Draft),
            "issued" => Some(InvoiceStatus::Issued),
            "paid" => Some(InvoiceStatus::Paid),
            "cancelled" => Some(InvoiceStatus::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Issued => "issued",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

    /// draft → issued | cancelled, issued → paid | cancelled.
    pub fn can_transition(self, to: InvoiceStatus) -> bool {
        matches!(
            (self, to),
            (InvoiceStatus::Draft, InvoiceStatus::Issued)
                | (InvoiceStatus::Draft, InvoiceStatus::Cancelled)
                | (InvoiceStatus::Issued, InvoiceStatus::Paid)
                | (InvoiceStatus::Issued, InvoiceStatus::Cancelled)
        )
    }
}

/// Request to raise an invoice.
///
/// # JSON Example
///
/// ```json
/// {
///   "customer_id": 3,
///   "vehicle_id": 12,
///   "invoice_type": "sale",
///   "total_baisa": 4200000,
///   "issued_on": "2025-10-20"
/// }
/// ```
///
/// `invoice_number` defaults to `INV-<unix seconds>`, `issued_on` to today and
/// `status` to `issued`.
#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    pub invoice_number: Option<String>,
    pub customer_id: i64,
    pub vehicle_id: Option<i64>,
    pub invoice_type: Option<String>,
    pub total_baisa: i64,
    pub status: Option<InvoiceStatus>,
    pub issued_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInvoiceStatusRequest {
    pub status: InvoiceStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct InvoiceQuery {
    pub customer_id: Option<i64>,
    pub status: Option<InvoiceStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_status_transitions() {
        assert!(InvoiceStatus::Draft.can_transition(InvoiceStatus::Issued));
        assert!(InvoiceStatus::Issued.can_transition(InvoiceStatus::Paid));
        assert!(InvoiceStatus::Issued.can_transition(InvoiceStatus::Cancelled));
        assert!(!InvoiceStatus::Draft.can_transition(InvoiceStatus::Paid));
        assert!(!InvoiceStatus::Paid.can_transition(InvoiceStatus::Cancelled));
        assert!(!InvoiceStatus::Cancelled.can_transition(InvoiceStatus::Issued));
    }

    #[test]
    fn test_invoice_status_names() {
        assert_eq!(InvoiceStatus::parse(" Paid "), Some(InvoiceStatus::Paid));
        assert_eq!(InvoiceStatus::parse("void"), None);
        assert_eq!(InvoiceStatus::Cancelled.as_str(), "cancelled");
    }

    #[test]
    fn test_outstanding_is_total_less_paid() {
        let invoice = Invoice {
            id: 1,
            invoice_number: "INV-1".to_string(),
            customer_id: 3,
            vehicle_id: None,
            invoice_type: None,
            total_baisa: 4_200_000,
            status: "issued".to_string(),
            issued_on: NaiveDate::from_ymd_opt(2025, 10, 20).unwrap(),
            notes: None,
            created_at: Utc::now(),
            paid_baisa: 1_000_000,
        };

        assert_eq!(InvoiceResponse::from(invoice).outstanding_baisa, 3_200_000);
    }
}
