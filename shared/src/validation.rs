//! Validation utilities for the Procurement Contract Management Platform

use chrono::NaiveDate;
use rust_decimal::Decimal;

// ============================================================================
// Contract Date Validations
// ============================================================================

/// Validate the ordering sign <= begin <= finish
pub fn validate_contract_dates(
    sign_date: NaiveDate,
    official_begin_date: NaiveDate,
    official_finish_date: NaiveDate,
) -> Result<(), &'static str> {
    if sign_date > official_begin_date {
        return Err("Sign date must not be after the official begin date");
    }
    if official_begin_date > official_finish_date {
        return Err("Official begin date must not be after the official finish date");
    }
    Ok(())
}

/// Validate that a contract's date range sits inside the project window
///
/// Projects without a finish date only bound from below.
pub fn validate_project_window(
    official_begin_date: NaiveDate,
    official_finish_date: NaiveDate,
    project_start_date: NaiveDate,
    project_finish_date: Option<NaiveDate>,
) -> Result<(), &'static str> {
    if official_begin_date < project_start_date {
        return Err("Contract begins before the project start date");
    }
    if let Some(project_finish) = project_finish_date {
        if official_finish_date > project_finish {
            return Err("Contract finishes after the project finish date");
        }
    }
    Ok(())
}

// ============================================================================
// Monetary Validations
// ============================================================================

/// Validate a monetary amount or quantity is strictly positive
pub fn validate_positive(value: Decimal) -> Result<(), &'static str> {
    if value <= Decimal::ZERO {
        return Err("Value must be positive");
    }
    Ok(())
}

/// Validate an exchange rate is usable (strictly positive)
pub fn validate_exchange_rate(rate: Decimal) -> Result<(), &'static str> {
    if rate <= Decimal::ZERO {
        return Err("Exchange rate must be positive");
    }
    Ok(())
}

/// Validate a currency code (3 uppercase ASCII letters)
pub fn validate_currency_code(code: &str) -> Result<(), &'static str> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err("Currency code must be 3 uppercase letters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_contract_date_ordering_valid() {
        assert!(validate_contract_dates(d(2024, 1, 1), d(2024, 1, 15), d(2024, 6, 30)).is_ok());
        // Degenerate but legal: all on the same day
        assert!(validate_contract_dates(d(2024, 1, 1), d(2024, 1, 1), d(2024, 1, 1)).is_ok());
    }

    #[test]
    fn test_contract_date_ordering_invalid() {
        assert!(validate_contract_dates(d(2024, 2, 1), d(2024, 1, 15), d(2024, 6, 30)).is_err());
        assert!(validate_contract_dates(d(2024, 1, 1), d(2024, 7, 1), d(2024, 6, 30)).is_err());
    }

    #[test]
    fn test_project_window_containment() {
        assert!(validate_project_window(
            d(2024, 2, 1),
            d(2024, 11, 30),
            d(2024, 1, 1),
            Some(d(2024, 12, 31))
        )
        .is_ok());
        assert!(validate_project_window(
            d(2023, 12, 1),
            d(2024, 6, 1),
            d(2024, 1, 1),
            Some(d(2024, 12, 31))
        )
        .is_err());
        assert!(validate_project_window(
            d(2024, 2, 1),
            d(2025, 1, 1),
            d(2024, 1, 1),
            Some(d(2024, 12, 31))
        )
        .is_err());
    }

    #[test]
    fn test_open_ended_project_window() {
        // No project finish date: only the lower bound applies
        assert!(validate_project_window(d(2024, 2, 1), d(2030, 1, 1), d(2024, 1, 1), None).is_ok());
        assert!(
            validate_project_window(d(2023, 2, 1), d(2030, 1, 1), d(2024, 1, 1), None).is_err()
        );
    }

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive(Decimal::from_str("0.01").unwrap()).is_ok());
        assert!(validate_positive(Decimal::ZERO).is_err());
        assert!(validate_positive(Decimal::from_str("-5").unwrap()).is_err());
    }

    #[test]
    fn test_validate_exchange_rate() {
        assert!(validate_exchange_rate(Decimal::from_str("0.85").unwrap()).is_ok());
        assert!(validate_exchange_rate(Decimal::ZERO).is_err());
    }

    #[test]
    fn test_validate_currency_code() {
        assert!(validate_currency_code("USD").is_ok());
        assert!(validate_currency_code("RUB").is_ok());
        assert!(validate_currency_code("usd").is_err());
        assert!(validate_currency_code("US").is_err());
        assert!(validate_currency_code("USDX").is_err());
    }
}
