//! Payment ledger model and balance arithmetic
//!
//! All changes to a contract's `give_amount` go through the functions here;
//! the backend re-reads the contract row under a lock and applies these rules
//! inside the same transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Type of a payment ledger entry
///
/// `Canceled` is never written directly; a cancel operation flips an
/// existing entry to it (soft-cancel, the row is kept).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_entry_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentEntryType {
    Issued,
    Refund,
    Canceled,
}

impl PaymentEntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentEntryType::Issued => "issued",
            PaymentEntryType::Refund => "refund",
            PaymentEntryType::Canceled => "canceled",
        }
    }
}

/// A payment ledger entry against a contract
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContractPayment {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub currency_id: Uuid,
    pub entry_type: PaymentEntryType,
    /// Amount in the entry's own currency
    pub amount: Decimal,
    /// Required when the entry currency differs from the contract currency
    pub contract_currency_exchange_rate: Option<Decimal>,
    pub give_date: NaiveDate,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Amount an entry contributes in the contract's currency
pub fn effective_amount(amount: Decimal, exchange_rate: Option<Decimal>) -> Decimal {
    amount * exchange_rate.unwrap_or(Decimal::ONE)
}

/// Apply an issued payment to the running paid total
pub fn apply_issued(
    give_amount: Decimal,
    amount_cap: Decimal,
    effective: Decimal,
) -> Result<Decimal, &'static str> {
    if give_amount >= amount_cap {
        return Err("Contract is already fully paid");
    }
    let next = give_amount + effective;
    if next > amount_cap {
        return Err("Payment would exceed the contract amount");
    }
    Ok(next)
}

/// Apply a refund to the running paid total
pub fn apply_refund(give_amount: Decimal, effective: Decimal) -> Result<Decimal, &'static str> {
    let next = give_amount - effective;
    if next < Decimal::ZERO {
        return Err("Refund would exceed the paid total");
    }
    Ok(next)
}

/// Reverse a previously applied entry (the cancel operation)
///
/// Issued entries subtract on cancel, refunds add back; the same bounds as
/// creation apply in the opposite direction.
pub fn reverse_entry(
    give_amount: Decimal,
    amount_cap: Decimal,
    entry_type: PaymentEntryType,
    effective: Decimal,
) -> Result<Decimal, &'static str> {
    match entry_type {
        PaymentEntryType::Issued => {
            let next = give_amount - effective;
            if next < Decimal::ZERO {
                return Err("Cancel would drive the paid total negative");
            }
            Ok(next)
        }
        PaymentEntryType::Refund => {
            let next = give_amount + effective;
            if next > amount_cap {
                return Err("Cancel would exceed the contract amount");
            }
            Ok(next)
        }
        PaymentEntryType::Canceled => Err("Payment is already canceled"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_effective_amount_identity_without_rate() {
        assert_eq!(effective_amount(dec("250"), None), dec("250"));
    }

    #[test]
    fn test_effective_amount_applies_rate() {
        assert_eq!(effective_amount(dec("100"), Some(dec("1.5"))), dec("150"));
    }

    #[test]
    fn test_issued_accumulates() {
        assert_eq!(apply_issued(dec("0"), dec("1000"), dec("400")).unwrap(), dec("400"));
        assert_eq!(apply_issued(dec("400"), dec("1000"), dec("600")).unwrap(), dec("1000"));
    }

    #[test]
    fn test_issued_rejects_when_fully_paid() {
        assert!(apply_issued(dec("1000"), dec("1000"), dec("1")).is_err());
    }

    #[test]
    fn test_issued_rejects_overpayment() {
        assert!(apply_issued(dec("900"), dec("1000"), dec("200")).is_err());
    }

    #[test]
    fn test_refund_rejects_negative_total() {
        assert!(apply_refund(dec("100"), dec("150")).is_err());
        assert_eq!(apply_refund(dec("100"), dec("100")).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_cancel_is_inverse_of_issued() {
        let cap = dec("1000");
        let after = apply_issued(dec("200"), cap, dec("300")).unwrap();
        let reverted = reverse_entry(after, cap, PaymentEntryType::Issued, dec("300")).unwrap();
        assert_eq!(reverted, dec("200"));
    }

    #[test]
    fn test_cancel_is_inverse_of_refund() {
        let cap = dec("1000");
        let after = apply_refund(dec("500"), dec("200")).unwrap();
        let reverted = reverse_entry(after, cap, PaymentEntryType::Refund, dec("200")).unwrap();
        assert_eq!(reverted, dec("500"));
    }

    #[test]
    fn test_cancel_of_canceled_rejected() {
        assert!(reverse_entry(dec("0"), dec("1000"), PaymentEntryType::Canceled, dec("1")).is_err());
    }

    #[test]
    fn test_cancel_bounds() {
        // Canceling an issued entry larger than the current total
        assert!(reverse_entry(dec("100"), dec("1000"), PaymentEntryType::Issued, dec("200")).is_err());
        // Canceling a refund that would overflow the cap
        assert!(reverse_entry(dec("900"), dec("1000"), PaymentEntryType::Refund, dec("200")).is_err());
    }
}
