//! Customer HTTP handlers (admin, employee).
//!
//! - POST /api/v1/customers
//! - GET /api/v1/customers
//! - GET /api/v1/customers/{id}

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        customer::{CreateCustomerRequest, Customer},
        role::OPERATIONS,
    },
    services::audit_service,
};

const CUSTOMER_COLUMNS: &str = "id, user_id, account_number, company_name, address, phone, created_at";

/// Create a customer.
///
/// # Response
///
/// - **Success (201 Created)**: The customer
/// - **Error (400)**: Empty account number or company name
/// - **Error (409)**: Account number already in use
pub async fn create_customer(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    auth.require(OPERATIONS)?;

    let account_number = request.account_number.trim();
    let company_name = request.company_name.trim();
    if account_number.is_empty() || company_name.is_empty() {
        return Err(AppError::InvalidRequest(
            "Account number and company name are required".to_string(),
        ));
    }

    let customer = sqlx::query_as::<_, Customer>(&format!(
        r#"
        INSERT INTO customers (user_id, account_number, company_name, address, phone)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {CUSTOMER_COLUMNS}
        "#
    ))
    .bind(request.user_id)
    .bind(account_number)
    .bind(company_name)
    .bind(request.address)
    .bind(request.phone)
    .fetch_one(&pool)
    .await?;

    audit_service::record(
        &pool,
        Some(auth.user_id),
        "create",
        "Customer",
        Some(customer.id),
        serde_json::json!({ "account_number": customer.account_number }),
    )
    .await;

    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn list_customers(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<Customer>>, AppError> {
    auth.require(OPERATIONS)?;

    let customers = sqlx::query_as::<_, Customer>(&format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY company_name, id"
    ))
    .fetch_all(&pool)
    .await?;

    Ok(Json(customers))
}

pub async fn get_customer(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(customer_id): Path<i64>,
) -> Result<Json<Customer>, AppError> {
    auth.require(OPERATIONS)?;

    let customer = sqlx::query_as::<_, Customer>(&format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"
    ))
    .bind(customer_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Customer"))?;

    Ok(Json(customer))
}
