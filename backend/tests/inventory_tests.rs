//! Tests for the inventory commitment ledger behind `take_quantity`

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{apply_movement, validate_commitment_change, InventoryEntryType};

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

    /// Deliveries accumulate up to the committed quantity, not beyond
    #[test]
    fn test_delivery_sequence_to_commitment() {
        let committed = dec("120");
        let mut taken = Decimal::ZERO;

        taken = apply_movement(taken, committed, InventoryEntryType::Issued, dec("40")).unwrap();
        taken = apply_movement(taken, committed, InventoryEntryType::Issued, dec("40")).unwrap();
        taken = apply_movement(taken, committed, InventoryEntryType::Issued, dec("40")).unwrap();

        assert_eq!(taken, committed);
        assert!(
            apply_movement(taken, committed, InventoryEntryType::Issued, dec("0.5")).is_err()
        );
    }

    #[test]
    fn test_refund_returns_goods() {
        let committed = dec("100");
        let taken = apply_movement(Decimal::ZERO, committed, InventoryEntryType::Issued, dec("80"))
            .unwrap();

        let taken =
            apply_movement(taken, committed, InventoryEntryType::Refund, dec("30")).unwrap();
        assert_eq!(taken, dec("50"));

        // Returned goods can be delivered again
        let taken =
            apply_movement(taken, committed, InventoryEntryType::Issued, dec("50")).unwrap();
        assert_eq!(taken, committed);
    }

    #[test]
    fn test_refund_cannot_exceed_delivered() {
        let taken = apply_movement(Decimal::ZERO, dec("100"), InventoryEntryType::Issued, dec("20"))
            .unwrap();
        assert!(apply_movement(taken, dec("100"), InventoryEntryType::Refund, dec("20.5")).is_err());
    }

    /// Bulk goods are tracked in fractional units
    #[test]
    fn test_fractional_units() {
        let committed = dec("2.500");
        let mut taken = Decimal::ZERO;

        taken = apply_movement(taken, committed, InventoryEntryType::Issued, dec("1.125")).unwrap();
        taken = apply_movement(taken, committed, InventoryEntryType::Issued, dec("1.375")).unwrap();

        assert_eq!(taken, committed);
    }

    #[test]
    fn test_commitment_cannot_shrink_below_delivered() {
        let taken = dec("75");
        assert!(validate_commitment_change(dec("74.99"), taken).is_err());
        assert!(validate_commitment_change(dec("75"), taken).is_ok());
        assert!(validate_commitment_change(dec("200"), taken).is_ok());
    }

    /// Raising the commitment opens delivery headroom
    #[test]
    fn test_commitment_raise_opens_headroom() {
        let committed = dec("50");
        let taken =
            apply_movement(Decimal::ZERO, committed, InventoryEntryType::Issued, dec("50")).unwrap();
        assert!(apply_movement(taken, committed, InventoryEntryType::Issued, dec("10")).is_err());

        let raised = dec("80");
        assert!(validate_commitment_change(raised, taken).is_ok());
        assert!(apply_movement(taken, raised, InventoryEntryType::Issued, dec("10")).is_ok());
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Quantities in thousandths, up to 50.000
    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=50_000).prop_map(|milli| Decimal::new(milli, 3))
    }

    fn entry_strategy() -> impl Strategy<Value = InventoryEntryType> {
        prop_oneof![
            Just(InventoryEntryType::Issued),
            Just(InventoryEntryType::Refund),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// The delivered total stays within [0, committed] under any
        /// sequence of accepted movements
        #[test]
        fn prop_take_quantity_stays_bounded(
            committed_milli in 50_000i64..=500_000,
            movements in prop::collection::vec((entry_strategy(), quantity_strategy()), 0..40)
        ) {
            let committed = Decimal::new(committed_milli, 3);
            let mut taken = Decimal::ZERO;

            for (entry_type, quantity) in movements {
                if let Ok(next) = apply_movement(taken, committed, entry_type, quantity) {
                    taken = next;
                }
                prop_assert!(taken >= Decimal::ZERO);
                prop_assert!(taken <= committed);
            }
        }

        /// A refund exactly undoes the issue of the same quantity
        #[test]
        fn prop_refund_undoes_issue(
            start_milli in 0i64..=100_000,
            quantity in quantity_strategy()
        ) {
            let committed = dec("1000");
            let start = Decimal::new(start_milli, 3);

            if let Ok(after) =
                apply_movement(start, committed, InventoryEntryType::Issued, quantity)
            {
                let reverted =
                    apply_movement(after, committed, InventoryEntryType::Refund, quantity);
                prop_assert_eq!(reverted.unwrap(), start);
            }
        }

        /// Commitment changes are accepted exactly when they keep the
        /// delivered quantity inside the commitment
        #[test]
        fn prop_commitment_floor(
            new_quantity in quantity_strategy(),
            taken in quantity_strategy()
        ) {
            let result = validate_commitment_change(new_quantity, taken);
            prop_assert_eq!(result.is_ok(), new_quantity >= taken);
        }
    }
}
