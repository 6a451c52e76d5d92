//! Router assembly.
//!
//! Everything under `/api/v1` except login sits behind the session
//! middleware; role checks happen inside each handler.

use axum::{
    Router,
    http::{Method, header},
    middleware as axum_middleware,
    routing::{get, patch, post, put},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{handlers, middleware, state::AppState};

pub fn build_router(state: AppState) -> Router {
    let authenticated_routes = Router::new()
        // Session
        .route("/api/v1/auth/logout", post(handlers::auth::logout))
        .route("/api/v1/auth/me", get(handlers::auth::me))
        // Users
        .route(
            "/api/v1/users",
            post(handlers::users::create_user).get(handlers::users::list_users),
        )
        .route(
            "/api/v1/users/{id}/active",
            patch(handlers::users::set_active),
        )
        .route("/api/v1/roles", get(handlers::users::list_roles))
        // Customers, vehicles and shipments
        .route(
            "/api/v1/customers",
            post(handlers::customers::create_customer).get(handlers::customers::list_customers),
        )
        .route(
            "/api/v1/customers/{id}",
            get(handlers::customers::get_customer),
        )
        .route(
            "/api/v1/customers/{id}/deposits",
            get(handlers::deposits::customer_statement),
        )
        .route(
            "/api/v1/vehicles",
            post(handlers::vehicles::create_vehicle).get(handlers::vehicles::list_vehicles),
        )
        .route("/api/v1/vehicles/{id}", get(handlers::vehicles::get_vehicle))
        .route(
            "/api/v1/vehicles/{id}/status",
            patch(handlers::vehicles::update_status),
        )
        .route(
            "/api/v1/shipments",
            post(handlers::shipments::create_shipment).get(handlers::shipments::list_shipments),
        )
        .route(
            "/api/v1/shipments/{id}",
            get(handlers::shipments::get_shipment),
        )
        .route(
            "/api/v1/shipments/{id}/status",
            patch(handlers::shipments::update_status),
        )
        .route(
            "/api/v1/shipments/{id}/vehicles",
            put(handlers::shipments::replace_vehicles),
        )
        // Chart of accounts
        .route(
            "/api/v1/accounts",
            post(handlers::accounts::create_account).get(handlers::accounts::list_accounts),
        )
        .route("/api/v1/accounts/{id}", get(handlers::accounts::get_account))
        // Journals
        .route(
            "/api/v1/journals",
            post(handlers::journals::post_entry).get(handlers::journals::list_entries),
        )
        .route("/api/v1/journals/{id}", get(handlers::journals::get_entry))
        .route(
            "/api/v1/journals/{id}/approve",
            post(handlers::journals::approve_entry),
        )
        .route(
            "/api/v1/journals/{id}/reject",
            post(handlers::journals::reject_entry),
        )
        .route(
            "/api/v1/journals/{id}/reverse",
            post(handlers::journals::reverse_entry),
        )
        // Deposits
        .route("/api/v1/deposits", post(handlers::deposits::receive_deposit))
        .route("/api/v1/deposits/{id}", get(handlers::deposits::get_deposit))
        .route(
            "/api/v1/deposits/{id}/commission",
            post(handlers::deposits::deduct_commission),
        )
        .route(
            "/api/v1/deposits/{id}/refund",
            post(handlers::deposits::refund_deposit),
        )
        .route("/api/v1/me/deposits", get(handlers::deposits::my_statement))
        // Invoices
        .route(
            "/api/v1/invoices",
            post(handlers::invoices::create_invoice).get(handlers::invoices::list_invoices),
        )
        .route("/api/v1/invoices/{id}", get(handlers::invoices::get_invoice))
        .route(
            "/api/v1/invoices/{id}/status",
            patch(handlers::invoices::update_status),
        )
        // Customer portal
        .route("/api/v1/me/vehicles", get(handlers::portal::my_vehicles))
        .route("/api/v1/me/vehicles/{id}", get(handlers::portal::my_vehicle))
        .route("/api/v1/me/invoices", get(handlers::portal::my_invoices))
        .route("/api/v1/me/invoices/{id}", get(handlers::portal::my_invoice))
        // Expenses
        .route(
            "/api/v1/expenses",
            post(handlers::expenses::record_expense).get(handlers::expenses::list_expenses),
        )
        .route(
            "/api/v1/expenses/{id}/pay",
            post(handlers::expenses::pay_expense),
        )
        // Reports
        .route(
            "/api/v1/reports/trial-balance",
            get(handlers::reports::trial_balance),
        )
        .route(
            "/api/v1/reports/profit-and-loss",
            get(handlers::reports::profit_and_loss),
        )
        .route(
            "/api/v1/reports/balance-sheet",
            get(handlers::reports::balance_sheet),
        )
        .route(
            "/api/v1/reports/general-ledger",
            get(handlers::reports::general_ledger),
        )
        .route("/api/v1/reports/cash-flow", get(handlers::reports::cash_flow))
        .route("/api/v1/reports/taxes", get(handlers::reports::taxes))
        // Settings and administration
        .route(
            "/api/v1/settings",
            get(handlers::settings::get_settings).patch(handlers::settings::update_settings),
        )
        .route("/api/v1/audit-logs", get(handlers::admin::list_audit_logs))
        .route("/api/v1/backups", get(handlers::admin::list_backups))
        // Apply session authentication to all routes in this group
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::PUT])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        // Public routes (no authentication required)
        .route("/health", get(handlers::health::health_check))
        .route("/api/v1/auth/login", post(handlers::auth::login))
        .merge(authenticated_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
