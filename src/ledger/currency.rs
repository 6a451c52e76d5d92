//! Currency conversion into the ledger's functional currency (OMR).
//!
//! Amounts arrive in the minor unit of their own currency: baisa for OMR
//! (1/1000) and cents for USD (1/100). Rates are integer millionths of an
//! OMR per unit of foreign currency.

use super::LedgerError;

pub const FUNCTIONAL_CURRENCY: &str = "OMR";

/// Convert `amount_minor` in `currency` into baisa.
pub fn to_baisa(amount_minor: i64, currency: &str, rate_micros: i64) -> Result<i64, LedgerError> {
    match currency.trim().to_ascii_uppercase().as_str() {
        "OMR" => Ok(amount_minor),
        "USD" => {
            if rate_micros <= 0 {
                return Err(LedgerError::NonPositiveAmount);
            }
            // cents * (OMR/USD * 1e6) * (1000 baisa / 100 cents) / 1e6
            let scaled = amount_minor as i128 * rate_micros as i128 * 10;
            let half: i128 = if scaled >= 0 { 500_000 } else { -500_000 };
            i64::try_from((scaled + half) / 1_000_000).map_err(|_| LedgerError::AmountTooLarge)
        }
        other => Err(LedgerError::UnsupportedCurrency(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_omr_passes_through() {
        assert_eq!(to_baisa(2_500_000, "OMR", 385_000), Ok(2_500_000));
        assert_eq!(to_baisa(10, "omr", 0), Ok(10));
    }

    #[test]
    fn test_usd_converts_at_rate() {
        // 15,000.00 USD at 0.385 = 5,775.000 OMR
        assert_eq!(to_baisa(1_500_000, "USD", 385_000), Ok(5_775_000));
        // 1.00 USD = 0.385 OMR
        assert_eq!(to_baisa(100, "USD", 385_000), Ok(385));
    }

    #[test]
    fn test_usd_rounds_to_nearest_baisa() {
        // 0.01 USD = 0.00385 OMR -> 4 baisa
        assert_eq!(to_baisa(1, "USD", 385_000), Ok(4));
        // 0.01 USD at 0.3845 = 0.003845 OMR -> 4 baisa
        assert_eq!(to_baisa(1, "USD", 384_500), Ok(4));
    }

    #[test]
    fn test_unknown_currency_rejected() {
        assert_eq!(
            to_baisa(100, "EUR", 385_000),
            Err(LedgerError::UnsupportedCurrency("EUR".to_string()))
        );
    }

    #[test]
    fn test_usd_conversion_out_of_range() {
        assert_eq!(
            to_baisa(i64::MAX, "USD", 385_000),
            Err(LedgerError::AmountTooLarge)
        );
    }

    #[test]
    fn test_usd_requires_positive_rate() {
        assert!(to_baisa(100, "USD", 0).is_err());
    }
}
