//! Financial report endpoints (admin, accountant).
//!
//! | Route                                 | Query                   |
//! |---------------------------------------|-------------------------|
//! | GET /api/v1/reports/trial-balance     | `as_of`                 |
//! | GET /api/v1/reports/profit-and-loss   | `from`, `to`            |
//! | GET /api/v1/reports/balance-sheet     | `as_of`                 |
//! | GET /api/v1/reports/general-ledger    | `from`, `to`, `account` |
//! | GET /api/v1/reports/cash-flow         | `from`, `to`            |
//! | GET /api/v1/reports/taxes             | `from`, `to`            |
//!
//! All dates are inclusive `YYYY-MM-DD`. Only approved entries are reported.

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    db::DbPool,
    error::AppError,
    ledger::reports::{
        self, BalanceSheet, CashFlow, GeneralLedger, Period, ProfitAndLoss, TaxRates, TaxReport,
        TrialBalance,
    },
    middleware::auth::AuthContext,
    models::role::FINANCE,
    services::{report_service, settings_service},
};

#[derive(Debug, Default, Deserialize)]
pub struct AsOfQuery {
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Account code filter, general ledger only
    pub account: Option<String>,
}

impl PeriodQuery {
    fn period(&self) -> Result<Period, AppError> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(AppError::InvalidRequest(
                    "`from` must not be after `to`".to_string(),
                ));
            }
        }
        Ok(Period::new(self.from, self.to))
    }
}

pub async fn trial_balance(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<TrialBalance>, AppError> {
    auth.require(FINANCE)?;

    let rows = report_service::load_ledger(&pool, query.as_of).await?;

    Ok(Json(reports::trial_balance(&rows, query.as_of)?))
}

/// Client-fund entries are left out; see `client_fund_excluded_baisa`.
pub async fn profit_and_loss(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<ProfitAndLoss>, AppError> {
    auth.require(FINANCE)?;

    let period = query.period()?;
    let rows = report_service::load_ledger(&pool, period.to).await?;

    Ok(Json(reports::profit_and_loss(&rows, period)?))
}

pub async fn balance_sheet(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<BalanceSheet>, AppError> {
    auth.require(FINANCE)?;

    let rows = report_service::load_ledger(&pool, query.as_of).await?;

    Ok(Json(reports::balance_sheet(&rows, query.as_of)?))
}

pub async fn general_ledger(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<GeneralLedger>, AppError> {
    auth.require(FINANCE)?;

    let period = query.period()?;
    let rows = report_service::load_ledger(&pool, period.to).await?;
    let account = query
        .account
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_ascii_uppercase);

    Ok(Json(reports::general_ledger(
        &rows,
        period,
        account.as_deref(),
    )?))
}

pub async fn cash_flow(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<CashFlow>, AppError> {
    auth.require(FINANCE)?;

    let period = query.period()?;
    let rows = report_service::load_ledger(&pool, period.to).await?;

    Ok(Json(reports::cash_flow(&rows, period)?))
}

/// VAT and customs for a period; the estimates use the configured rates.
pub async fn taxes(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<TaxReport>, AppError> {
    auth.require(FINANCE)?;

    let period = query.period()?;
    let settings = settings_service::get_settings(&pool).await?;
    let rows = report_service::load_ledger(&pool, period.to).await?;

    let rates = TaxRates {
        vat_rate_bps: settings.vat_rate_bps,
        customs_rate_bps: settings.customs_rate_bps,
    };

    Ok(Json(reports::taxes(&rows, period, rates)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_inverted_period_is_rejected() {
        let query = PeriodQuery {
            from: Some(date("2025-10-31")),
            to: Some(date("2025-10-01")),
            account: None,
        };
        assert!(matches!(query.period(), Err(AppError::InvalidRequest(_))));
    }

    #[test]
    fn test_open_ended_period() {
        let query = PeriodQuery {
            from: Some(date("2025-10-01")),
            ..Default::default()
        };
        assert_eq!(
            query.period().unwrap(),
            Period::new(Some(date("2025-10-01")), None)
        );
    }
}
