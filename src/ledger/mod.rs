//! Double-entry bookkeeping rules.
//!
//! Nothing in here touches the database. Services load rows, hand them to
//! these functions, and persist whatever comes back. Amounts are `i64` baisa
//! (1 OMR = 1000 baisa).

pub mod currency;
pub mod reports;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Chart-of-accounts codes the services post to directly.
pub mod codes {
    pub const BANK: &str = "A100";
    pub const VEHICLE_INVENTORY: &str = "A200";
    pub const VAT_RECEIVABLE: &str = "A300";
    pub const CUSTOMER_DEPOSITS: &str = "L200";
    pub const ACCOUNTS_PAYABLE: &str = "L210";
    pub const VAT_PAYABLE: &str = "L300";
    pub const COMMISSION_REVENUE: &str = "R200";
    pub const OPERATIONAL_EXPENSES: &str = "E200";
    pub const INTERNAL_SHIPPING_EXPENSES: &str = "E210";
    pub const CUSTOMS_DUTIES: &str = "E300";
}

/// Largest amount a single line, deposit or expense may carry (one billion
/// OMR). Keeps report totals well inside `i64`.
pub const MAX_AMOUNT_BAISA: i64 = 1_000_000_000_000;

/// Reasons a posting can be refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("A journal entry needs at least two lines")]
    TooFewLines,

    #[error("Line {line}: amounts cannot be negative")]
    NegativeAmount { line: usize },

    #[error("Line {line}: exactly one of debit or credit must be non-zero")]
    OneSidedLine { line: usize },

    #[error("Entry is unbalanced: debits {debits} != credits {credits}")]
    Unbalanced { debits: i64, credits: i64 },

    #[error("Entry total must be greater than zero")]
    ZeroTotal,

    #[error("Amount must be positive")]
    NonPositiveAmount,

    #[error("Amount exceeds the ledger limit of one billion OMR")]
    AmountTooLarge,

    #[error("Books are locked until {locked_until}; cannot post on {entry_date}")]
    PeriodLocked {
        entry_date: NaiveDate,
        locked_until: NaiveDate,
    },

    #[error("Cannot move entry from {from} to {to}")]
    InvalidTransition { from: EntryStatus, to: EntryStatus },

    #[error("Unknown account type: {0}")]
    UnknownAccountType(String),

    #[error("Unknown entry status: {0}")]
    UnknownStatus(String),

    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),
}

/// The five account classes of the chart of accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Asset => "ASSET",
            AccountType::Liability => "LIABILITY",
            AccountType::Equity => "EQUITY",
            AccountType::Revenue => "REVENUE",
            AccountType::Expense => "EXPENSE",
        }
    }

    /// Assets and expenses grow with debits; everything else with credits.
    pub fn is_debit_normal(&self) -> bool {
        matches!(self, AccountType::Asset | AccountType::Expense)
    }

    /// Balance expressed in the account's normal direction.
    pub fn signed_balance(&self, debit: i64, credit: i64) -> i64 {
        if self.is_debit_normal() {
            debit - credit
        } else {
            credit - debit
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASSET" => Ok(AccountType::Asset),
            "LIABILITY" => Ok(AccountType::Liability),
            "EQUITY" => Ok(AccountType::Equity),
            "REVENUE" => Ok(AccountType::Revenue),
            "EXPENSE" => Ok(AccountType::Expense),
            other => Err(LedgerError::UnknownAccountType(other.to_string())),
        }
    }
}

/// Workflow state of a journal entry. Only approved entries reach reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Pending,
    Approved,
    Rejected,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "pending",
            EntryStatus::Approved => "approved",
            EntryStatus::Rejected => "rejected",
        }
    }

    /// Pending entries may be approved or rejected; both outcomes are final.
    pub fn transition(self, to: EntryStatus) -> Result<EntryStatus, LedgerError> {
        match (self, to) {
            (EntryStatus::Pending, EntryStatus::Approved)
            | (EntryStatus::Pending, EntryStatus::Rejected) => Ok(to),
            (from, to) => Err(LedgerError::InvalidTransition { from, to }),
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(EntryStatus::Pending),
            "approved" => Ok(EntryStatus::Approved),
            "rejected" => Ok(EntryStatus::Rejected),
            other => Err(LedgerError::UnknownStatus(other.to_string())),
        }
    }
}

/// One side of a posting, addressed by account code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingLine {
    pub account_code: String,
    #[serde(default)]
    pub debit_baisa: i64,
    #[serde(default)]
    pub credit_baisa: i64,
}

impl PostingLine {
    pub fn debit(account_code: &str, amount: i64) -> Self {
        Self {
            account_code: account_code.to_string(),
            debit_baisa: amount,
            credit_baisa: 0,
        }
    }

    pub fn credit(account_code: &str, amount: i64) -> Self {
        Self {
            account_code: account_code.to_string(),
            debit_baisa: 0,
            credit_baisa: amount,
        }
    }
}

/// Totals of a validated entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryTotals {
    pub debits: i64,
    pub credits: i64,
}

/// Check the double-entry invariants and return the (equal) totals.
pub fn validate_lines(lines: &[PostingLine]) -> Result<EntryTotals, LedgerError> {
    if lines.len() < 2 {
        return Err(LedgerError::TooFewLines);
    }

    let mut debits: i64 = 0;
    let mut credits: i64 = 0;
    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        if line.debit_baisa < 0 || line.credit_baisa < 0 {
            return Err(LedgerError::NegativeAmount { line: line_no });
        }
        if (line.debit_baisa == 0) == (line.credit_baisa == 0) {
            return Err(LedgerError::OneSidedLine { line: line_no });
        }
        if line.debit_baisa > MAX_AMOUNT_BAISA || line.credit_baisa > MAX_AMOUNT_BAISA {
            return Err(LedgerError::AmountTooLarge);
        }
        debits = checked_add(debits, line.debit_baisa)?;
        credits = checked_add(credits, line.credit_baisa)?;
    }

    if debits != credits {
        return Err(LedgerError::Unbalanced { debits, credits });
    }
    if debits == 0 {
        return Err(LedgerError::ZeroTotal);
    }

    Ok(EntryTotals { debits, credits })
}

/// Reject dates on or before the lock date.
pub fn ensure_open_period(
    entry_date: NaiveDate,
    books_locked_until: Option<NaiveDate>,
) -> Result<(), LedgerError> {
    match books_locked_until {
        Some(locked_until) if entry_date <= locked_until => Err(LedgerError::PeriodLocked {
            entry_date,
            locked_until,
        }),
        _ => Ok(()),
    }
}

/// Status an entry moves to on review. Approval needs the entry date open.
pub fn review(
    from: EntryStatus,
    to: EntryStatus,
    entry_date: NaiveDate,
    books_locked_until: Option<NaiveDate>,
) -> Result<EntryStatus, LedgerError> {
    let status = from.transition(to)?;
    if status == EntryStatus::Approved {
        ensure_open_period(entry_date, books_locked_until)?;
    }
    Ok(status)
}

/// Mirror image of an entry, used to reverse it.
pub fn reverse_lines(lines: &[PostingLine]) -> Vec<PostingLine> {
    lines
        .iter()
        .map(|line| PostingLine {
            account_code: line.account_code.clone(),
            debit_baisa: line.credit_baisa,
            credit_baisa: line.debit_baisa,
        })
        .collect()
}

/// Amounts must be above zero and within [`MAX_AMOUNT_BAISA`].
pub fn ensure_positive(amount: i64) -> Result<(), LedgerError> {
    if amount <= 0 {
        return Err(LedgerError::NonPositiveAmount);
    }
    if amount > MAX_AMOUNT_BAISA {
        return Err(LedgerError::AmountTooLarge);
    }
    Ok(())
}

pub fn checked_add(a: i64, b: i64) -> Result<i64, LedgerError> {
    a.checked_add(b).ok_or(LedgerError::AmountTooLarge)
}

pub fn checked_sub(a: i64, b: i64) -> Result<i64, LedgerError> {
    a.checked_sub(b).ok_or(LedgerError::AmountTooLarge)
}

/// Apply a basis-point rate, rounding half away from zero.
pub fn apply_rate_bps(amount: i64, rate_bps: i64) -> Result<i64, LedgerError> {
    let scaled = amount as i128 * rate_bps as i128;
    let half = if scaled >= 0 { 5_000 } else { -5_000 };
    i64::try_from((scaled + half) / 10_000).map_err(|_| LedgerError::AmountTooLarge)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_balanced_entry_passes() {
        let lines = vec![
            PostingLine::debit("A100", 1_000_000),
            PostingLine::credit("L200", 1_000_000),
        ];
        let totals = validate_lines(&lines).unwrap();
        assert_eq!(totals.debits, 1_000_000);
        assert_eq!(totals.credits, 1_000_000);
    }

    #[test]
    fn test_split_entry_passes() {
        let lines = vec![
            PostingLine::debit("A100", 1_050_000),
            PostingLine::credit("R100", 1_000_000),
            PostingLine::credit("L300", 50_000),
        ];
        assert!(validate_lines(&lines).is_ok());
    }

    #[test]
    fn test_unbalanced_entry_reports_both_totals() {
        let lines = vec![
            PostingLine::debit("A100", 1_000),
            PostingLine::credit("L200", 900),
        ];
        assert_eq!(
            validate_lines(&lines),
            Err(LedgerError::Unbalanced {
                debits: 1_000,
                credits: 900
            })
        );
    }

    #[test]
    fn test_single_line_rejected() {
        let lines = vec![PostingLine::debit("A100", 1_000)];
        assert_eq!(validate_lines(&lines), Err(LedgerError::TooFewLines));
    }

    #[test]
    fn test_two_sided_and_empty_lines_rejected() {
        let both = vec![
            PostingLine {
                account_code: "A100".into(),
                debit_baisa: 500,
                credit_baisa: 500,
            },
            PostingLine::credit("L200", 0),
        ];
        assert_eq!(
            validate_lines(&both),
            Err(LedgerError::OneSidedLine { line: 1 })
        );

        let empty = vec![
            PostingLine::debit("A100", 500),
            PostingLine::credit("L200", 0),
        ];
        assert_eq!(
            validate_lines(&empty),
            Err(LedgerError::OneSidedLine { line: 2 })
        );
    }

    #[test]
    fn test_negative_amount_rejected() {
        let lines = vec![
            PostingLine::debit("A100", -500),
            PostingLine::credit("L200", -500),
        ];
        assert_eq!(
            validate_lines(&lines),
            Err(LedgerError::NegativeAmount { line: 1 })
        );
    }

    #[test]
    fn test_lock_date_is_inclusive() {
        let locked = Some(date(2025, 9, 30));
        assert!(ensure_open_period(date(2025, 9, 30), locked).is_err());
        assert!(ensure_open_period(date(2025, 9, 1), locked).is_err());
        assert!(ensure_open_period(date(2025, 10, 1), locked).is_ok());
        assert!(ensure_open_period(date(2000, 1, 1), None).is_ok());
    }

    #[test]
    fn test_status_transitions() {
        assert_eq!(
            EntryStatus::Pending.transition(EntryStatus::Approved),
            Ok(EntryStatus::Approved)
        );
        assert_eq!(
            EntryStatus::Pending.transition(EntryStatus::Rejected),
            Ok(EntryStatus::Rejected)
        );
        assert!(EntryStatus::Approved.transition(EntryStatus::Rejected).is_err());
        assert!(EntryStatus::Rejected.transition(EntryStatus::Approved).is_err());
        assert!(EntryStatus::Approved.transition(EntryStatus::Pending).is_err());
    }

    #[test]
    fn test_approval_rechecks_lock_date() {
        let locked = Some(date(2025, 9, 30));
        assert_eq!(
            review(EntryStatus::Pending, EntryStatus::Approved, date(2025, 9, 15), locked),
            Err(LedgerError::PeriodLocked {
                entry_date: date(2025, 9, 15),
                locked_until: date(2025, 9, 30),
            })
        );
        assert_eq!(
            review(EntryStatus::Pending, EntryStatus::Approved, date(2025, 10, 1), locked),
            Ok(EntryStatus::Approved)
        );
    }

    #[test]
    fn test_rejection_ignores_lock_date() {
        let locked = Some(date(2025, 9, 30));
        assert_eq!(
            review(EntryStatus::Pending, EntryStatus::Rejected, date(2025, 9, 15), locked),
            Ok(EntryStatus::Rejected)
        );
        assert!(matches!(
            review(EntryStatus::Approved, EntryStatus::Approved, date(2025, 10, 1), None),
            Err(LedgerError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_reverse_swaps_sides() {
        let lines = vec![
            PostingLine::debit("A100", 700),
            PostingLine::credit("R200", 700),
        ];
        let reversed = reverse_lines(&lines);
        assert_eq!(reversed[0], PostingLine::credit("A100", 700));
        assert_eq!(reversed[1], PostingLine::debit("R200", 700));
        assert!(validate_lines(&reversed).is_ok());
    }

    #[test]
    fn test_normal_balances() {
        assert_eq!(AccountType::Asset.signed_balance(1_000, 200), 800);
        assert_eq!(AccountType::Expense.signed_balance(1_000, 200), 800);
        assert_eq!(AccountType::Liability.signed_balance(200, 1_000), 800);
        assert_eq!(AccountType::Revenue.signed_balance(200, 1_000), 800);
        assert_eq!(AccountType::Equity.signed_balance(0, 50), 50);
    }

    #[test]
    fn test_account_type_parsing() {
        assert_eq!("asset".parse::<AccountType>(), Ok(AccountType::Asset));
        assert_eq!(" Revenue ".parse::<AccountType>(), Ok(AccountType::Revenue));
        assert!("income".parse::<AccountType>().is_err());
    }

    #[test]
    fn test_apply_rate_bps_rounds_half_up() {
        // 5% of 1.234 OMR
        assert_eq!(apply_rate_bps(1_234, 500), Ok(62));
        assert_eq!(apply_rate_bps(10_000, 500), Ok(500));
        assert_eq!(apply_rate_bps(0, 500), Ok(0));
    }

    #[test]
    fn test_apply_rate_bps_out_of_range() {
        assert_eq!(
            apply_rate_bps(i64::MAX, 20_000),
            Err(LedgerError::AmountTooLarge)
        );
    }

    #[test]
    fn test_overflowing_debits_do_not_balance() {
        let lines = vec![
            PostingLine::debit("A100", i64::MAX),
            PostingLine::debit("A110", 1),
            PostingLine::credit("L200", i64::MAX),
        ];
        assert_eq!(validate_lines(&lines), Err(LedgerError::AmountTooLarge));
    }

    #[test]
    fn test_line_above_ceiling_rejected() {
        let lines = vec![
            PostingLine::debit("A100", MAX_AMOUNT_BAISA + 1),
            PostingLine::credit("L200", MAX_AMOUNT_BAISA + 1),
        ];
        assert_eq!(validate_lines(&lines), Err(LedgerError::AmountTooLarge));

        let at_limit = vec![
            PostingLine::debit("A100", MAX_AMOUNT_BAISA),
            PostingLine::credit("L200", MAX_AMOUNT_BAISA),
        ];
        assert!(validate_lines(&at_limit).is_ok());
    }

    #[test]
    fn test_ensure_positive_bounds() {
        assert_eq!(ensure_positive(0), Err(LedgerError::NonPositiveAmount));
        assert!(ensure_positive(MAX_AMOUNT_BAISA).is_ok());
        assert_eq!(
            ensure_positive(MAX_AMOUNT_BAISA + 1),
            Err(LedgerError::AmountTooLarge)
        );
    }
}
