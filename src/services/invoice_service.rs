//! Invoice service - raising invoices and moving them through their states.
//!
//! `paid_baisa` is derived on every read from approved entries tagged with
//! the invoice, so the ledger stays the single record of money received.

use chrono::Utc;
use sqlx::{Postgres, Transaction};

use crate::{
    db::DbPool,
    error::AppError,
    ledger,
    models::invoice::{CreateInvoiceRequest, Invoice, InvoiceQuery, InvoiceStatus},
};

const INVOICE_SELECT: &str = r#"
    SELECT i.id, i.invoice_number, i.customer_id, i.vehicle_id, i.invoice_type, i.total_baisa,
           i.status, i.issued_on, i.notes, i.created_at,
           COALESCE(p.paid_baisa, 0)::BIGINT AS paid_baisa
    FROM invoices i
    LEFT JOIN (
        SELECT je.invoice_id, SUM(jl.debit_baisa - jl.credit_baisa) AS paid_baisa
        FROM journal_entries je
        JOIN journal_lines jl ON jl.entry_id = je.id
        JOIN accounts a ON a.id = jl.account_id
        WHERE je.status = 'approved' AND a.is_cash AND je.invoice_id IS NOT NULL
        GROUP BY je.invoice_id
    ) p ON p.invoice_id = i.id
"#;

fn invoice_number(requested: Option<&str>, now_secs: i64) -> String {
    requested
        .map(str::trim)
        .filter(|number| !number.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("INV-{now_secs}"))
}

/// The vehicle on an invoice must belong to the invoiced customer, when it
/// belongs to anyone.
fn ensure_vehicle_owner(vehicle_owner: Option<i64>, customer_id: i64) -> Result<(), AppError> {
    match vehicle_owner {
        Some(owner) if owner != customer_id => Err(AppError::InvalidRequest(
            "Vehicle belongs to another customer".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Check a status change. Marking paid needs nothing left outstanding.
pub fn check_status_change(invoice: &Invoice, to: InvoiceStatus) -> Result<(), AppError> {
    let from = InvoiceStatus::parse(&invoice.status).ok_or_else(|| {
        AppError::Conflict(format!("Invoice has unknown status {}", invoice.status))
    })?;

    if !from.can_transition(to) {
        return Err(AppError::Conflict(format!(
            "Invoice cannot move from {} to {}",
            from.as_str(),
            to.as_str()
        )));
    }

    if to == InvoiceStatus::Paid && invoice.paid_baisa < invoice.total_baisa {
        return Err(AppError::Conflict(format!(
            "Invoice has {} baisa outstanding",
            invoice.total_baisa - invoice.paid_baisa
        )));
    }

    Ok(())
}

/// An entry may reference an invoice that is not cancelled and, when the
/// entry names a customer, belongs to that customer.
pub fn check_entry_invoice(
    invoice_customer: i64,
    invoice_status: &str,
    entry_customer: Option<i64>,
) -> Result<(), AppError> {
    if InvoiceStatus::parse(invoice_status) == Some(InvoiceStatus::Cancelled) {
        return Err(AppError::InvalidRequest(
            "Cannot post against a cancelled invoice".to_string(),
        ));
    }
    if entry_customer.is_some_and(|customer| customer != invoice_customer) {
        return Err(AppError::InvalidRequest(
            "Invoice belongs to another customer".to_string(),
        ));
    }
    Ok(())
}

/// Look up the invoice an entry is being posted against.
pub async fn check_entry_invoice_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    invoice_id: i64,
    entry_customer: Option<i64>,
) -> Result<(), AppError> {
    let (customer_id, status): (i64, String) =
        sqlx::query_as("SELECT customer_id, status FROM invoices WHERE id = $1")
            .bind(invoice_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(AppError::NotFound("Invoice"))?;

    check_entry_invoice(customer_id, &status, entry_customer)
}

/// Raise an invoice for a customer.
///
/// # Errors
///
/// - `Ledger`: total not positive or above the ledger limit
/// - `NotFound`: unknown customer or vehicle
/// - `InvalidRequest`: vehicle owned by another customer, status other than draft/issued
/// - `Database`: invoice number already used (409)
pub async fn create_invoice(
    pool: &DbPool,
    request: CreateInvoiceRequest,
) -> Result<Invoice, AppError> {
    ledger::ensure_positive(request.total_baisa)?;

    let status = request.status.unwrap_or(InvoiceStatus::Issued);
    if !matches!(status, InvoiceStatus::Draft | InvoiceStatus::Issued) {
        return Err(AppError::InvalidRequest(
            "New invoices start as draft or issued".to_string(),
        ));
    }

    let customer_exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM customers WHERE id = $1)")
            .bind(request.customer_id)
            .fetch_one(pool)
            .await?;
    if !customer_exists {
        return Err(AppError::NotFound("Customer"));
    }

    if let Some(vehicle_id) = request.vehicle_id {
        let owner: Option<i64> =
            sqlx::query_scalar("SELECT owner_customer_id FROM vehicles WHERE id = $1")
                .bind(vehicle_id)
                .fetch_optional(pool)
                .await?
                .ok_or(AppError::NotFound("Vehicle"))?;
        ensure_vehicle_owner(owner, request.customer_id)?;
    }

    let number = invoice_number(request.invoice_number.as_deref(), Utc::now().timestamp());
    let issued_on = request
        .issued_on
        .unwrap_or_else(|| Utc::now().date_naive());

    let invoice_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO invoices (
            invoice_number, customer_id, vehicle_id, invoice_type, total_baisa, status,
            issued_on, notes
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(&number)
    .bind(request.customer_id)
    .bind(request.vehicle_id)
    .bind(request.invoice_type)
    .bind(request.total_baisa)
    .bind(status.as_str())
    .bind(issued_on)
    .bind(request.notes)
    .fetch_one(pool)
    .await?;

    tracing::info!(
        "Invoice {} raised for customer {}: {} baisa",
        number,
        request.customer_id,
        request.total_baisa
    );

    get_invoice(pool, invoice_id).await
}

/// Newest first, at most 200.
pub async fn list_invoices(pool: &DbPool, query: &InvoiceQuery) -> Result<Vec<Invoice>, AppError> {
    let invoices = sqlx::query_as::<_, Invoice>(&format!(
        r#"
        {INVOICE_SELECT}
        WHERE ($1::bigint IS NULL OR i.customer_id = $1)
          AND ($2::text IS NULL OR i.status = $2)
        ORDER BY i.issued_on DESC, i.id DESC
        LIMIT 200
        "#
    ))
    .bind(query.customer_id)
    .bind(query.status.map(|status| status.as_str()))
    .fetch_all(pool)
    .await?;

    Ok(invoices)
}

pub async fn get_invoice(pool: &DbPool, invoice_id: i64) -> Result<Invoice, AppError> {
    let invoice = sqlx::query_as::<_, Invoice>(&format!("{INVOICE_SELECT} WHERE i.id = $1"))
        .bind(invoice_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Invoice"))?;

    Ok(invoice)
}

/// Invoice owned by a customer; another customer's invoice reads as missing.
pub async fn get_customer_invoice(
    pool: &DbPool,
    customer_id: i64,
    invoice_id: i64,
) -> Result<Invoice, AppError> {
    let invoice = sqlx::query_as::<_, Invoice>(&format!(
        "{INVOICE_SELECT} WHERE i.id = $1 AND i.customer_id = $2"
    ))
    .bind(invoice_id)
    .bind(customer_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Invoice"))?;

    Ok(invoice)
}

pub async fn update_status(
    pool: &DbPool,
    invoice_id: i64,
    to: InvoiceStatus,
) -> Result<Invoice, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT id FROM invoices WHERE id = $1 FOR UPDATE")
        .bind(invoice_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("Invoice"))?;

    let invoice = sqlx::query_as::<_, Invoice>(&format!("{INVOICE_SELECT} WHERE i.id = $1"))
        .bind(invoice_id)
        .fetch_one(&mut *tx)
        .await?;

    check_status_change(&invoice, to)?;

    sqlx::query("UPDATE invoices SET status = $1 WHERE id = $2")
        .bind(to.as_str())
        .bind(invoice_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(
        "Invoice {} moved from {} to {}",
        invoice.invoice_number,
        invoice.status,
        to.as_str()
    );

    Ok(Invoice {
        status: to.as_str().to_string(),
        ..invoice
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn invoice(status: &str, total: i64, paid: i64) -> Invoice {
        Invoice {
            id: 9,
            invoice_number: "INV-9".to_string(),
            customer_id: 3,
            vehicle_id: Some(12),
            invoice_type: Some("sale".to_string()),
            total_baisa: total,
            status: status.to_string(),
            issued_on: NaiveDate::from_ymd_opt(2025, 10, 20).unwrap(),
            notes: None,
            created_at: Utc::now(),
            paid_baisa: paid,
        }
    }

    #[test]
    fn test_paid_requires_full_settlement() {
        assert!(matches!(
            check_status_change(&invoice("issued", 4_200_000, 4_199_999), InvoiceStatus::Paid),
            Err(AppError::Conflict(_))
        ));
        assert!(
            check_status_change(&invoice("issued", 4_200_000, 4_200_000), InvoiceStatus::Paid)
                .is_ok()
        );
    }

    #[test]
    fn test_cancelled_invoice_stays_cancelled() {
        assert!(matches!(
            check_status_change(&invoice("cancelled", 100, 0), InvoiceStatus::Issued),
            Err(AppError::Conflict(_))
        ));
        assert!(check_status_change(&invoice("draft", 100, 0), InvoiceStatus::Cancelled).is_ok());
    }

    #[test]
    fn test_vehicle_must_belong_to_invoiced_customer() {
        assert!(ensure_vehicle_owner(Some(3), 3).is_ok());
        assert!(ensure_vehicle_owner(None, 3).is_ok());
        assert!(matches!(
            ensure_vehicle_owner(Some(4), 3),
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_entry_invoice_checks() {
        assert!(check_entry_invoice(3, "issued", Some(3)).is_ok());
        assert!(check_entry_invoice(3, "issued", None).is_ok());
        assert!(matches!(
            check_entry_invoice(3, "issued", Some(5)),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            check_entry_invoice(3, "cancelled", Some(3)),
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_invoice_number_defaults_to_timestamp() {
        assert_eq!(invoice_number(None, 1_760_000_000), "INV-1760000000");
        assert_eq!(invoice_number(Some(" INV-2025-7 "), 1), "INV-2025-7");
    }
}
