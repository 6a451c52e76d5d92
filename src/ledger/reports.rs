//! Financial statements computed from approved journal lines.
//!
//! Every report takes the same flat input, one [`LedgerRow`] per journal
//! line, and is a pure function of it. Account sections are sorted by code.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::{AccountType, LedgerError, apply_rate_bps, checked_add, checked_sub, codes};

/// A single approved journal line joined with its entry and account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRow {
    pub entry_id: i64,
    pub entry_date: NaiveDate,
    pub reference: Option<String>,
    pub description: String,
    pub is_client_fund: bool,
    pub account_code: String,
    pub account_name: String,
    pub account_type: AccountType,
    pub is_cash: bool,
    pub debit_baisa: i64,
    pub credit_baisa: i64,
}

impl LedgerRow {
    fn net_debit(&self) -> i64 {
        self.debit_baisa - self.credit_baisa
    }

    fn normal_amount(&self) -> i64 {
        self.account_type
            .signed_balance(self.debit_baisa, self.credit_baisa)
    }
}

/// Inclusive date window. Open ends are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Period {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl Period {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }

    fn is_before_start(&self, date: NaiveDate) -> bool {
        self.from.is_some_and(|from| date < from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportLine {
    pub account_code: String,
    pub account_name: String,
    pub amount_baisa: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialBalanceLine {
    pub account_code: String,
    pub account_name: String,
    pub account_type: AccountType,
    pub debit_baisa: i64,
    pub credit_baisa: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialBalance {
    pub as_of: Option<NaiveDate>,
    pub lines: Vec<TrialBalanceLine>,
    pub total_debit_baisa: i64,
    pub total_credit_baisa: i64,
    pub balanced: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfitAndLoss {
    pub period: Period,
    pub revenue: Vec<ReportLine>,
    pub total_revenue_baisa: i64,
    pub expenses: Vec<ReportLine>,
    pub total_expenses_baisa: i64,
    pub net_income_baisa: i64,
    /// Net income effect of client-fund entries left out of the statement.
    pub client_fund_excluded_baisa: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceSheet {
    pub as_of: Option<NaiveDate>,
    pub assets: Vec<ReportLine>,
    pub total_assets_baisa: i64,
    pub liabilities: Vec<ReportLine>,
    pub total_liabilities_baisa: i64,
    pub equity: Vec<ReportLine>,
    pub current_earnings_baisa: i64,
    pub total_equity_baisa: i64,
    pub balanced: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneralLedgerLine {
    pub entry_id: i64,
    pub entry_date: NaiveDate,
    pub reference: Option<String>,
    pub description: String,
    pub debit_baisa: i64,
    pub credit_baisa: i64,
    pub running_balance_baisa: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneralLedgerAccount {
    pub account_code: String,
    pub account_name: String,
    pub account_type: AccountType,
    pub opening_balance_baisa: i64,
    pub lines: Vec<GeneralLedgerLine>,
    pub closing_balance_baisa: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneralLedger {
    pub period: Period,
    pub accounts: Vec<GeneralLedgerAccount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CashFlow {
    pub period: Period,
    pub opening_cash_baisa: i64,
    pub operating_baisa: i64,
    pub investing_baisa: i64,
    pub financing_baisa: i64,
    pub net_change_baisa: i64,
    pub closing_cash_baisa: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxReport {
    pub period: Period,
    pub output_vat_baisa: i64,
    pub input_vat_baisa: i64,
    pub net_vat_payable_baisa: i64,
    pub customs_duties_baisa: i64,
    pub taxable_revenue_baisa: i64,
    pub vat_rate_bps: i64,
    pub estimated_vat_on_revenue_baisa: i64,
    /// Vehicle inventory purchases in the period (A200 debits)
    pub dutiable_imports_baisa: i64,
    pub customs_rate_bps: i64,
    pub estimated_customs_baisa: i64,
}

/// Per-account accumulator keyed by account code.
#[derive(Default)]
struct Totals<'a> {
    by_code: BTreeMap<&'a str, (&'a LedgerRow, i64, i64)>,
}

impl<'a> Totals<'a> {
    fn add(&mut self, row: &'a LedgerRow) -> Result<(), LedgerError> {
        let slot = self
            .by_code
            .entry(row.account_code.as_str())
            .or_insert((row, 0, 0));
        slot.1 = checked_add(slot.1, row.debit_baisa)?;
        slot.2 = checked_add(slot.2, row.credit_baisa)?;
        Ok(())
    }

    fn section(&self, account_type: AccountType) -> Vec<ReportLine> {
        self.by_code
            .values()
            .filter(|(row, _, _)| row.account_type == account_type)
            .map(|(row, debit, credit)| ReportLine {
                account_code: row.account_code.clone(),
                account_name: row.account_name.clone(),
                amount_baisa: account_type.signed_balance(*debit, *credit),
            })
            .filter(|line| line.amount_baisa != 0)
            .collect()
    }
}

fn sum(amounts: impl IntoIterator<Item = i64>) -> Result<i64, LedgerError> {
    amounts.into_iter().try_fold(0, checked_add)
}

fn section_total(lines: &[ReportLine]) -> Result<i64, LedgerError> {
    sum(lines.iter().map(|line| line.amount_baisa))
}

/// Net debit/credit per account for everything dated on or before `as_of`.
pub fn trial_balance(
    rows: &[LedgerRow],
    as_of: Option<NaiveDate>,
) -> Result<TrialBalance, LedgerError> {
    let window = Period::new(None, as_of);
    let mut totals = Totals::default();
    for row in rows.iter().filter(|row| window.contains(row.entry_date)) {
        totals.add(row)?;
    }

    let lines: Vec<TrialBalanceLine> = totals
        .by_code
        .values()
        .filter_map(|(row, debit, credit)| {
            let net = debit - credit;
            if net == 0 {
                return None;
            }
            Some(TrialBalanceLine {
                account_code: row.account_code.clone(),
                account_name: row.account_name.clone(),
                account_type: row.account_type,
                debit_baisa: net.max(0),
                credit_baisa: (-net).max(0),
            })
        })
        .collect();

    let total_debit_baisa = sum(lines.iter().map(|l| l.debit_baisa))?;
    let total_credit_baisa = sum(lines.iter().map(|l| l.credit_baisa))?;

    Ok(TrialBalance {
        as_of,
        lines,
        total_debit_baisa,
        total_credit_baisa,
        balanced: total_debit_baisa == total_credit_baisa,
    })
}

/// Revenue and expenses for the period, leaving out client-fund entries.
pub fn profit_and_loss(rows: &[LedgerRow], period: Period) -> Result<ProfitAndLoss, LedgerError> {
    let mut totals = Totals::default();
    let mut client_fund_excluded_baisa = 0;

    for row in rows.iter().filter(|row| period.contains(row.entry_date)) {
        if !matches!(row.account_type, AccountType::Revenue | AccountType::Expense) {
            continue;
        }
        if row.is_client_fund {
            client_fund_excluded_baisa =
                checked_sub(client_fund_excluded_baisa, row.net_debit())?;
            continue;
        }
        totals.add(row)?;
    }

    let revenue = totals.section(AccountType::Revenue);
    let expenses = totals.section(AccountType::Expense);
    let total_revenue_baisa = section_total(&revenue)?;
    let total_expenses_baisa = section_total(&expenses)?;

    Ok(ProfitAndLoss {
        period,
        revenue,
        total_revenue_baisa,
        expenses,
        total_expenses_baisa,
        net_income_baisa: checked_sub(total_revenue_baisa, total_expenses_baisa)?,
        client_fund_excluded_baisa,
    })
}

/// Positions as of a date. Current earnings include every revenue and
/// expense line so that assets = liabilities + equity always holds.
pub fn balance_sheet(
    rows: &[LedgerRow],
    as_of: Option<NaiveDate>,
) -> Result<BalanceSheet, LedgerError> {
    let window = Period::new(None, as_of);
    let mut totals = Totals::default();
    let mut current_earnings_baisa = 0;

    for row in rows.iter().filter(|row| window.contains(row.entry_date)) {
        match row.account_type {
            AccountType::Revenue | AccountType::Expense => {
                current_earnings_baisa =
                    checked_sub(current_earnings_baisa, row.net_debit())?;
            }
            _ => totals.add(row)?,
        }
    }

    let assets = totals.section(AccountType::Asset);
    let liabilities = totals.section(AccountType::Liability);
    let equity = totals.section(AccountType::Equity);
    let total_assets_baisa = section_total(&assets)?;
    let total_liabilities_baisa = section_total(&liabilities)?;
    let total_equity_baisa = checked_add(section_total(&equity)?, current_earnings_baisa)?;
    let claims_baisa = checked_add(total_liabilities_baisa, total_equity_baisa)?;

    Ok(BalanceSheet {
        as_of,
        assets,
        total_assets_baisa,
        liabilities,
        total_liabilities_baisa,
        equity,
        current_earnings_baisa,
        total_equity_baisa,
        balanced: total_assets_baisa == claims_baisa,
    })
}

/// Account-by-account movements with opening, running and closing balances.
///
/// `rows` must be ordered by entry date then entry id; the service query does so.
pub fn general_ledger(
    rows: &[LedgerRow],
    period: Period,
    account_code: Option<&str>,
) -> Result<GeneralLedger, LedgerError> {
    let mut accounts: BTreeMap<&str, GeneralLedgerAccount> = BTreeMap::new();

    for row in rows {
        if account_code.is_some_and(|code| code != row.account_code) {
            continue;
        }
        let before = period.is_before_start(row.entry_date);
        if !before && !period.contains(row.entry_date) {
            continue;
        }

        let account = accounts
            .entry(row.account_code.as_str())
            .or_insert_with(|| GeneralLedgerAccount {
                account_code: row.account_code.clone(),
                account_name: row.account_name.clone(),
                account_type: row.account_type,
                opening_balance_baisa: 0,
                lines: Vec::new(),
                closing_balance_baisa: 0,
            });

        account.closing_balance_baisa =
            checked_add(account.closing_balance_baisa, row.normal_amount())?;
        if before {
            account.opening_balance_baisa =
                checked_add(account.opening_balance_baisa, row.normal_amount())?;
        } else {
            account.lines.push(GeneralLedgerLine {
                entry_id: row.entry_id,
                entry_date: row.entry_date,
                reference: row.reference.clone(),
                description: row.description.clone(),
                debit_baisa: row.debit_baisa,
                credit_baisa: row.credit_baisa,
                running_balance_baisa: account.closing_balance_baisa,
            });
        }
    }

    Ok(GeneralLedger {
        period,
        accounts: accounts.into_values().collect(),
    })
}

enum CashActivity {
    Operating,
    Investing,
    Financing,
}

fn classify(account_type: AccountType) -> CashActivity {
    match account_type {
        AccountType::Asset => CashActivity::Investing,
        AccountType::Equity => CashActivity::Financing,
        AccountType::Revenue | AccountType::Expense | AccountType::Liability => {
            CashActivity::Operating
        }
    }
}

/// Direct-method cash flow over the accounts flagged as cash.
pub fn cash_flow(rows: &[LedgerRow], period: Period) -> Result<CashFlow, LedgerError> {
    let opening_cash_baisa = sum(
        rows.iter()
            .filter(|row| row.is_cash && period.is_before_start(row.entry_date))
            .map(LedgerRow::net_debit),
    )?;

    let mut entries: BTreeMap<i64, Vec<&LedgerRow>> = BTreeMap::new();
    for row in rows.iter().filter(|row| period.contains(row.entry_date)) {
        entries.entry(row.entry_id).or_default().push(row);
    }

    let (mut operating, mut investing, mut financing) = (0i64, 0i64, 0i64);
    for lines in entries.values() {
        let cash_delta = sum(
            lines
                .iter()
                .filter(|row| row.is_cash)
                .map(|row| row.net_debit()),
        )?;
        if cash_delta == 0 {
            continue;
        }

        let counterpart = lines
            .iter()
            .filter(|row| !row.is_cash)
            .max_by_key(|row| row.net_debit().abs());
        let activity = counterpart
            .map(|row| classify(row.account_type))
            .unwrap_or(CashActivity::Operating);

        let bucket = match activity {
            CashActivity::Operating => &mut operating,
            CashActivity::Investing => &mut investing,
            CashActivity::Financing => &mut financing,
        };
        *bucket = checked_add(*bucket, cash_delta)?;
    }

    let net_change_baisa = sum([operating, investing, financing])?;
    Ok(CashFlow {
        period,
        opening_cash_baisa,
        operating_baisa: operating,
        investing_baisa: investing,
        financing_baisa: financing,
        net_change_baisa,
        closing_cash_baisa: checked_add(opening_cash_baisa, net_change_baisa)?,
    })
}

/// Rates the tax report estimates with, in basis points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaxRates {
    pub vat_rate_bps: i64,
    pub customs_rate_bps: i64,
}

/// VAT and customs position for the period.
///
/// Estimated customs applies the customs rate to vehicles brought into
/// inventory (debits to A200) during the period.
pub fn taxes(
    rows: &[LedgerRow],
    period: Period,
    rates: TaxRates,
) -> Result<TaxReport, LedgerError> {
    let mut output_vat_baisa = 0;
    let mut input_vat_baisa = 0;
    let mut customs_duties_baisa = 0;
    let mut dutiable_imports_baisa = 0;

    for row in rows.iter().filter(|row| period.contains(row.entry_date)) {
        match row.account_code.as_str() {
            codes::VAT_PAYABLE => {
                output_vat_baisa = checked_sub(output_vat_baisa, row.net_debit())?;
            }
            codes::VAT_RECEIVABLE => {
                input_vat_baisa = checked_add(input_vat_baisa, row.net_debit())?;
            }
            codes::CUSTOMS_DUTIES => {
                customs_duties_baisa = checked_add(customs_duties_baisa, row.net_debit())?;
            }
            codes::VEHICLE_INVENTORY => {
                dutiable_imports_baisa = checked_add(dutiable_imports_baisa, row.debit_baisa)?;
            }
            _ => {}
        }
    }

    let taxable_revenue_baisa = profit_and_loss(rows, period)?.total_revenue_baisa;

    Ok(TaxReport {
        period,
        output_vat_baisa,
        input_vat_baisa,
        net_vat_payable_baisa: checked_sub(output_vat_baisa, input_vat_baisa)?,
        customs_duties_baisa,
        taxable_revenue_baisa,
        vat_rate_bps: rates.vat_rate_bps,
        estimated_vat_on_revenue_baisa: apply_rate_bps(
            taxable_revenue_baisa,
            rates.vat_rate_bps,
        )?,
        dutiable_imports_baisa,
        customs_rate_bps: rates.customs_rate_bps,
        estimated_customs_baisa: apply_rate_bps(
            dutiable_imports_baisa,
            rates.customs_rate_bps,
        )?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn account(code: &str) -> (&'static str, AccountType, bool) {
        match code {
            "A100" => ("Bank", AccountType::Asset, true),
            "A200" => ("Inventory - Vehicles", AccountType::Asset, false),
            "A300" => ("VAT Receivable", AccountType::Asset, false),
            "L200" => ("Customer Deposits", AccountType::Liability, false),
            "L210" => ("Accounts Payable - Supplier", AccountType::Liability, false),
            "L300" => ("VAT Payable", AccountType::Liability, false),
            "Q100" => ("Owner's Equity", AccountType::Equity, false),
            "R100" => ("Car Sales Revenue", AccountType::Revenue, false),
            "R200" => ("Commission Revenue", AccountType::Revenue, false),
            "E200" => ("Operational Expenses", AccountType::Expense, false),
            "E300" => ("Customs Duties", AccountType::Expense, false),
            other => panic!("unknown test account {other}"),
        }
    }

    /// Builds rows for one entry from `(code, debit, credit)` triples.
    fn entry(
        id: i64,
        on: NaiveDate,
        client_fund: bool,
        lines: &[(&str, i64, i64)],
    ) -> Vec<LedgerRow> {
        lines
            .iter()
            .map(|(code, debit, credit)| {
                let (name, account_type, is_cash) = account(code);
                LedgerRow {
                    entry_id: id,
                    entry_date: on,
                    reference: Some(format!("REF-{id}")),
                    description: format!("entry {id}"),
                    is_client_fund: client_fund,
                    account_code: code.to_string(),
                    account_name: name.to_string(),
                    account_type,
                    is_cash,
                    debit_baisa: *debit,
                    credit_baisa: *credit,
                }
            })
            .collect()
    }

    fn client_deposits_balance(rows: &[LedgerRow]) -> i64 {
        balance_sheet(rows, None)
            .unwrap()
            .liabilities
            .iter()
            .find(|line| line.account_code == "L200")
            .map(|line| line.amount_baisa)
            .unwrap_or(0)
    }

    #[test]
    fn test_client_fund_deposit_is_not_revenue() {
        let rows = entry(
            1,
            date(2025, 10, 1),
            true,
            &[("A100", 1_000_000, 0), ("L200", 0, 1_000_000)],
        );

        let pnl = profit_and_loss(&rows, Period::default()).unwrap();
        assert_eq!(pnl.total_revenue_baisa, 0);
        assert_eq!(client_deposits_balance(&rows), 1_000_000);
    }

    #[test]
    fn test_commission_is_recognised_as_revenue() {
        let rows = entry(
            1,
            date(2025, 10, 1),
            false,
            &[("A100", 150_000, 0), ("R200", 0, 150_000)],
        );

        let pnl = profit_and_loss(&rows, Period::default()).unwrap();
        assert_eq!(pnl.total_revenue_baisa, 150_000);
        assert_eq!(pnl.net_income_baisa, 150_000);
    }

    #[test]
    fn test_client_fund_flagged_deduction_stays_out_of_pnl() {
        let mut rows = entry(
            1,
            date(2025, 10, 1),
            true,
            &[("A100", 500_000, 0), ("L200", 0, 500_000)],
        );
        rows.extend(entry(
            2,
            date(2025, 10, 2),
            true,
            &[("L200", 200_000, 0), ("R200", 0, 200_000)],
        ));

        let pnl = profit_and_loss(&rows, Period::default()).unwrap();
        assert_eq!(pnl.total_revenue_baisa, 0);
        assert_eq!(pnl.client_fund_excluded_baisa, 200_000);
        assert_eq!(client_deposits_balance(&rows), 300_000);

        let sheet = balance_sheet(&rows, None).unwrap();
        assert!(sheet.balanced);
        assert_eq!(sheet.current_earnings_baisa, 200_000);
    }

    #[test]
    fn test_trial_balance_nets_each_account() {
        let mut rows = entry(
            1,
            date(2025, 10, 1),
            true,
            &[("A100", 500_000, 0), ("L200", 0, 500_000)],
        );
        rows.extend(entry(
            2,
            date(2025, 10, 5),
            false,
            &[("L200", 100_000, 0), ("R200", 0, 100_000)],
        ));

        let tb = trial_balance(&rows, None).unwrap();
        assert!(tb.balanced);
        assert_eq!(tb.total_debit_baisa, 500_000);
        let codes: Vec<_> = tb.lines.iter().map(|l| l.account_code.as_str()).collect();
        assert_eq!(codes, vec!["A100", "L200", "R200"]);
        assert_eq!(tb.lines[1].credit_baisa, 400_000);
        assert_eq!(tb.lines[1].debit_baisa, 0);

        let early = trial_balance(&rows, Some(date(2025, 10, 2))).unwrap();
        assert_eq!(early.total_credit_baisa, 500_000);
        assert_eq!(early.lines.len(), 2);
    }

    #[test]
    fn test_pnl_respects_period() {
        let mut rows = entry(
            1,
            date(2025, 9, 30),
            false,
            &[("A100", 100_000, 0), ("R100", 0, 100_000)],
        );
        rows.extend(entry(
            2,
            date(2025, 10, 15),
            false,
            &[("A100", 300_000, 0), ("R100", 0, 300_000)],
        ));
        rows.extend(entry(
            3,
            date(2025, 10, 20),
            false,
            &[("E200", 50_000, 0), ("A100", 0, 50_000)],
        ));

        let october = Period::new(Some(date(2025, 10, 1)), Some(date(2025, 10, 31)));
        let pnl = profit_and_loss(&rows, october).unwrap();
        assert_eq!(pnl.total_revenue_baisa, 300_000);
        assert_eq!(pnl.total_expenses_baisa, 50_000);
        assert_eq!(pnl.net_income_baisa, 250_000);
        assert_eq!(pnl.expenses[0].account_code, "E200");
    }

    #[test]
    fn test_balance_sheet_balances_with_equity_and_payables() {
        let mut rows = entry(
            1,
            date(2025, 1, 1),
            false,
            &[("A100", 10_000_000, 0), ("Q100", 0, 10_000_000)],
        );
        rows.extend(entry(
            2,
            date(2025, 2, 1),
            false,
            &[("A200", 5_775_000, 0), ("A100", 0, 5_775_000)],
        ));
        rows.extend(entry(
            3,
            date(2025, 2, 3),
            false,
            &[("E200", 120_000, 0), ("L210", 0, 120_000)],
        ));

        let sheet = balance_sheet(&rows, None).unwrap();
        assert!(sheet.balanced);
        assert_eq!(sheet.total_assets_baisa, 10_000_000);
        assert_eq!(sheet.total_liabilities_baisa, 120_000);
        assert_eq!(sheet.current_earnings_baisa, -120_000);
        assert_eq!(sheet.total_equity_baisa, 9_880_000);
    }

    #[test]
    fn test_general_ledger_running_balance() {
        let mut rows = entry(
            1,
            date(2025, 9, 1),
            true,
            &[("A100", 400_000, 0), ("L200", 0, 400_000)],
        );
        rows.extend(entry(
            2,
            date(2025, 10, 2),
            true,
            &[("A100", 100_000, 0), ("L200", 0, 100_000)],
        ));
        rows.extend(entry(
            3,
            date(2025, 10, 9),
            true,
            &[("L200", 50_000, 0), ("A100", 0, 50_000)],
        ));

        let period = Period::new(Some(date(2025, 10, 1)), None);
        let gl = general_ledger(&rows, period, Some("L200")).unwrap();
        assert_eq!(gl.accounts.len(), 1);

        let deposits = &gl.accounts[0];
        assert_eq!(deposits.opening_balance_baisa, 400_000);
        assert_eq!(deposits.lines.len(), 2);
        assert_eq!(deposits.lines[0].running_balance_baisa, 500_000);
        assert_eq!(deposits.lines[1].running_balance_baisa, 450_000);
        assert_eq!(deposits.closing_balance_baisa, 450_000);
    }

    #[test]
    fn test_cash_flow_classifies_by_counterpart() {
        let mut rows = entry(
            1,
            date(2025, 9, 1),
            false,
            &[("A100", 1_000_000, 0), ("Q100", 0, 1_000_000)],
        );
        // Customer deposit: operating inflow
        rows.extend(entry(
            2,
            date(2025, 10, 1),
            true,
            &[("A100", 500_000, 0), ("L200", 0, 500_000)],
        ));
        // Vehicle purchase: investing outflow
        rows.extend(entry(
            3,
            date(2025, 10, 2),
            false,
            &[("A200", 300_000, 0), ("A100", 0, 300_000)],
        ));
        // Owner injection: financing inflow
        rows.extend(entry(
            4,
            date(2025, 10, 3),
            false,
            &[("A100", 200_000, 0), ("Q100", 0, 200_000)],
        ));
        // Accrual without cash: ignored
        rows.extend(entry(
            5,
            date(2025, 10, 4),
            false,
            &[("E200", 10_000, 0), ("L210", 0, 10_000)],
        ));

        let period = Period::new(Some(date(2025, 10, 1)), Some(date(2025, 10, 31)));
        let flow = cash_flow(&rows, period).unwrap();
        assert_eq!(flow.opening_cash_baisa, 1_000_000);
        assert_eq!(flow.operating_baisa, 500_000);
        assert_eq!(flow.investing_baisa, -300_000);
        assert_eq!(flow.financing_baisa, 200_000);
        assert_eq!(flow.net_change_baisa, 400_000);
        assert_eq!(flow.closing_cash_baisa, 1_400_000);
    }

    #[test]
    fn test_taxes_report() {
        let mut rows = entry(
            1,
            date(2025, 10, 1),
            false,
            &[("A100", 1_050_000, 0), ("R100", 0, 1_000_000), ("L300", 0, 50_000)],
        );
        rows.extend(entry(
            2,
            date(2025, 10, 2),
            false,
            &[("E300", 40_000, 0), ("A300", 2_000, 0), ("A100", 0, 42_000)],
        ));

        let rates = TaxRates {
            vat_rate_bps: 500,
            customs_rate_bps: 500,
        };
        let report = taxes(&rows, Period::default(), rates).unwrap();
        assert_eq!(report.output_vat_baisa, 50_000);
        assert_eq!(report.input_vat_baisa, 2_000);
        assert_eq!(report.net_vat_payable_baisa, 48_000);
        assert_eq!(report.customs_duties_baisa, 40_000);
        assert_eq!(report.taxable_revenue_baisa, 1_000_000);
        assert_eq!(report.estimated_vat_on_revenue_baisa, 50_000);
        assert_eq!(report.dutiable_imports_baisa, 0);
        assert_eq!(report.estimated_customs_baisa, 0);
    }

    #[test]
    fn test_customs_estimate_uses_vehicle_purchases() {
        let mut rows = entry(
            1,
            date(2025, 9, 20),
            false,
            &[("A200", 4_000_000, 0), ("A100", 0, 4_000_000)],
        );
        rows.extend(entry(
            2,
            date(2025, 10, 3),
            false,
            &[("A200", 5_775_000, 0), ("L210", 0, 5_775_000)],
        ));

        let october = Period::new(Some(date(2025, 10, 1)), Some(date(2025, 10, 31)));
        let rates = TaxRates {
            vat_rate_bps: 500,
            customs_rate_bps: 500,
        };
        let report = taxes(&rows, october, rates).unwrap();
        assert_eq!(report.dutiable_imports_baisa, 5_775_000);
        assert_eq!(report.customs_rate_bps, 500);
        assert_eq!(report.estimated_customs_baisa, 288_750);
    }

    #[test]
    fn test_reports_refuse_totals_beyond_i64() {
        let half = i64::MAX / 2 + 1;
        let mut rows = entry(
            1,
            date(2025, 10, 1),
            false,
            &[("A100", half, 0), ("Q100", 0, half)],
        );
        rows.extend(entry(
            2,
            date(2025, 10, 2),
            false,
            &[("A100", half, 0), ("Q100", 0, half)],
        ));

        assert_eq!(trial_balance(&rows, None), Err(LedgerError::AmountTooLarge));
        assert_eq!(balance_sheet(&rows, None), Err(LedgerError::AmountTooLarge));
        assert_eq!(
            cash_flow(&rows, Period::default()),
            Err(LedgerError::AmountTooLarge)
        );
        assert_eq!(
            general_ledger(&rows, Period::default(), None),
            Err(LedgerError::AmountTooLarge)
        );
    }
}
