//! Tests for the payment ledger rules behind `give_amount`

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{
    apply_issued, apply_refund, effective_amount, reverse_entry, PaymentEntryType,
};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// A realistic payment sequence: partial payments up to the cap
    #[test]
    fn test_installment_sequence_reaches_cap() {
        let cap = dec("10000");
        let mut give = Decimal::ZERO;

        give = apply_issued(give, cap, dec("2500")).unwrap();
        give = apply_issued(give, cap, dec("2500")).unwrap();
        give = apply_issued(give, cap, dec("5000")).unwrap();

        assert_eq!(give, cap);
        // A fully paid contract accepts no further issued entries
        assert!(apply_issued(give, cap, dec("0.01")).is_err());
    }

    #[test]
    fn test_refund_reopens_headroom() {
        let cap = dec("10000");
        let mut give = apply_issued(Decimal::ZERO, cap, dec("10000")).unwrap();

        give = apply_refund(give, dec("3000")).unwrap();
        assert_eq!(give, dec("7000"));

        // Headroom is available again
        give = apply_issued(give, cap, dec("3000")).unwrap();
        assert_eq!(give, cap);
    }

    #[test]
    fn test_refund_cannot_exceed_paid_total() {
        let give = apply_issued(Decimal::ZERO, dec("1000"), dec("400")).unwrap();
        assert!(apply_refund(give, dec("400.01")).is_err());
    }

    /// Entries in a foreign currency count at their converted value
    #[test]
    fn test_foreign_currency_entry_converts() {
        let cap = dec("1000");
        // 100 units at rate 7.5 contributes 750 in contract currency
        let effective = effective_amount(dec("100"), Some(dec("7.5")));
        assert_eq!(effective, dec("750"));

        let give = apply_issued(Decimal::ZERO, cap, effective).unwrap();
        assert_eq!(give, dec("750"));

        // A second identical entry would overshoot
        assert!(apply_issued(give, cap, effective).is_err());
    }

    #[test]
    fn test_cancel_restores_prior_total() {
        let cap = dec("5000");
        let give0 = dec("1200");

        let after_issue = apply_issued(give0, cap, dec("800")).unwrap();
        assert_eq!(
            reverse_entry(after_issue, cap, PaymentEntryType::Issued, dec("800")).unwrap(),
            give0
        );

        let after_refund = apply_refund(give0, dec("200")).unwrap();
        assert_eq!(
            reverse_entry(after_refund, cap, PaymentEntryType::Refund, dec("200")).unwrap(),
            give0
        );
    }

    #[test]
    fn test_cancel_of_canceled_entry_rejected() {
        let result = reverse_entry(dec("500"), dec("1000"), PaymentEntryType::Canceled, dec("100"));
        assert_eq!(result.unwrap_err(), "Payment is already canceled");
    }

    /// Canceling an issued entry after a refund drained the total is rejected
    /// rather than driving the total negative
    #[test]
    fn test_cancel_bounded_below_after_refund() {
        let cap = dec("1000");
        let give = apply_issued(Decimal::ZERO, cap, dec("600")).unwrap();
        let give = apply_refund(give, dec("500")).unwrap();
        assert_eq!(give, dec("100"));

        assert!(reverse_entry(give, cap, PaymentEntryType::Issued, dec("600")).is_err());
    }

    #[test]
    fn test_fractional_amounts_exact() {
        let cap = dec("0.30");
        let mut give = Decimal::ZERO;
        give = apply_issued(give, cap, dec("0.10")).unwrap();
        give = apply_issued(give, cap, dec("0.20")).unwrap();
        // Decimal arithmetic is exact; no float drift below the cap
        assert_eq!(give, cap);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Amounts in cents, up to 100.00
    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10_000).prop_map(|cents| Decimal::new(cents, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// The paid total stays within [0, cap] under any sequence of
        /// accepted issued and refund entries
        #[test]
        fn prop_give_amount_stays_bounded(
            cap_cents in 10_000i64..=1_000_000,
            entries in prop::collection::vec((any::<bool>(), amount_strategy()), 0..40)
        ) {
            let cap = Decimal::new(cap_cents, 2);
            let mut give = Decimal::ZERO;

            for (issued, amount) in entries {
                let result = if issued {
                    apply_issued(give, cap, amount)
                } else {
                    apply_refund(give, amount)
                };
                // Rejected entries leave the total untouched
                if let Ok(next) = result {
                    give = next;
                }
                prop_assert!(give >= Decimal::ZERO);
                prop_assert!(give <= cap);
            }
        }

        /// Cancel exactly undoes the entry it reverses
        #[test]
        fn prop_cancel_is_inverse(
            start_cents in 0i64..=50_000,
            amount in amount_strategy(),
            issued in any::<bool>()
        ) {
            let cap = dec("1000000");
            let start = Decimal::new(start_cents, 2);

            let entry_type = if issued {
                PaymentEntryType::Issued
            } else {
                PaymentEntryType::Refund
            };
            let applied = if issued {
                apply_issued(start, cap, amount)
            } else {
                apply_refund(start, amount)
            };

            if let Ok(after) = applied {
                let reverted = reverse_entry(after, cap, entry_type, amount);
                prop_assert_eq!(reverted.unwrap(), start);
            }
        }

        /// Conversion into the contract currency is linear in the amount
        #[test]
        fn prop_effective_amount_scales(
            amount in amount_strategy(),
            rate_cents in 1i64..=100_000
        ) {
            let rate = Decimal::new(rate_cents, 4);
            prop_assert_eq!(effective_amount(amount, Some(rate)), amount * rate);
            prop_assert_eq!(effective_amount(amount, None), amount);
        }
    }
}
