//! Tests for the contract status state machine and its completion gates

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use chrono::NaiveDate;
use shared::{
    completion_ready, resolve_update_exchange_rate, validate_contract_dates,
    validate_fields_changed, validate_no_attachments, validate_project_window,
    validate_status_change, ContractFields, ContractStatus, ContractType,
};
use uuid::Uuid;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_new_contracts_are_active() {
        assert!(!ContractStatus::Active.is_terminal());
    }

    #[test]
    fn test_terminal_statuses_block_updates() {
        assert!(ContractStatus::Completed.is_terminal());
        assert!(ContractStatus::Canceled.is_terminal());
    }

    /// Completing an unpaid contract is rejected regardless of deliveries
    #[test]
    fn test_completion_gated_on_payment() {
        let err = completion_ready(dec("900"), dec("1000"), ContractType::Service, true)
            .unwrap_err();
        assert_eq!(err, "Contract is not fully paid");
    }

    /// Product contracts additionally gate on delivery
    #[test]
    fn test_completion_gated_on_delivery() {
        let err = completion_ready(dec("1000"), dec("1000"), ContractType::Product, false)
            .unwrap_err();
        assert_eq!(err, "Contract has undelivered inventory");

        assert!(completion_ready(dec("1000"), dec("1000"), ContractType::Product, true).is_ok());
    }

    /// Service contracts complete on payment alone
    #[test]
    fn test_service_contract_ignores_inventory() {
        assert!(completion_ready(dec("1000"), dec("1000"), ContractType::Service, false).is_ok());
    }

    #[test]
    fn test_cancel_allowed_regardless_of_ledgers() {
        // Cancellation carries no financial gate
        assert!(validate_status_change(ContractStatus::Active, ContractStatus::Canceled).is_ok());
    }

    #[test]
    fn test_reactivation_allowed_from_both_terminal_states() {
        assert!(validate_status_change(ContractStatus::Completed, ContractStatus::Active).is_ok());
        assert!(validate_status_change(ContractStatus::Canceled, ContractStatus::Active).is_ok());
    }

    #[test]
    fn test_noop_status_change_rejected() {
        for status in [
            ContractStatus::Active,
            ContractStatus::Completed,
            ContractStatus::Canceled,
        ] {
            assert_eq!(
                validate_status_change(status, status).unwrap_err(),
                "Contract already has the requested status"
            );
        }
    }

    #[test]
    fn test_contract_dates_ordering() {
        // sign <= begin <= finish
        assert!(validate_contract_dates(
            date(2025, 1, 10),
            date(2025, 2, 1),
            date(2025, 12, 31)
        )
        .is_ok());
        assert!(validate_contract_dates(
            date(2025, 3, 1),
            date(2025, 2, 1),
            date(2025, 12, 31)
        )
        .is_err());
        assert!(validate_contract_dates(
            date(2025, 1, 10),
            date(2025, 2, 1),
            date(2025, 1, 31)
        )
        .is_err());
    }

    #[test]
    fn test_contract_inside_project_window() {
        let project_start = date(2025, 1, 1);
        let project_finish = Some(date(2025, 12, 31));

        assert!(validate_project_window(
            date(2025, 2, 1),
            date(2025, 11, 30),
            project_start,
            project_finish
        )
        .is_ok());
        // Starts before the project
        assert!(validate_project_window(
            date(2024, 12, 31),
            date(2025, 11, 30),
            project_start,
            project_finish
        )
        .is_err());
        // Runs past the project
        assert!(validate_project_window(
            date(2025, 2, 1),
            date(2026, 1, 1),
            project_start,
            project_finish
        )
        .is_err());
    }

    #[test]
    fn test_open_ended_project_accepts_any_finish() {
        assert!(validate_project_window(
            date(2025, 2, 1),
            date(2040, 1, 1),
            date(2025, 1, 1),
            None
        )
        .is_ok());
    }

    fn fields() -> ContractFields {
        ContractFields {
            name: "Bean supply 2025".to_string(),
            applicant_id: Uuid::nil(),
            purchaser_id: Uuid::nil(),
            company_id: Uuid::nil(),
            currency_id: Uuid::nil(),
            amount: dec("1000"),
            sign_date: date(2025, 1, 10),
            official_begin_date: date(2025, 2, 1),
            official_finish_date: date(2025, 12, 31),
            project_currency_exchange_rate: None,
            note: None,
        }
    }

    /// An update that resolves to the current state is a no-op and rejected
    #[test]
    fn test_identical_update_rejected() {
        let current = fields();
        let updated = current.clone();
        assert_eq!(
            validate_fields_changed(&current, &updated).unwrap_err(),
            "Nothing changed"
        );
    }

    #[test]
    fn test_single_field_change_accepted() {
        let current = fields();

        let mut renamed = current.clone();
        renamed.name = "Bean supply 2026".to_string();
        assert!(validate_fields_changed(&current, &renamed).is_ok());

        let mut repriced = current.clone();
        repriced.amount = dec("1200");
        assert!(validate_fields_changed(&current, &repriced).is_ok());

        let mut annotated = current.clone();
        annotated.note = Some("renegotiated".to_string());
        assert!(validate_fields_changed(&current, &annotated).is_ok());
    }

    #[test]
    fn test_attachments_block_contract_delete() {
        assert!(validate_no_attachments(0, 0).is_ok());
        assert_eq!(
            validate_no_attachments(1, 0).unwrap_err(),
            "Contract has attached files or links; remove them first"
        );
        assert!(validate_no_attachments(0, 1).is_err());
        assert!(validate_no_attachments(3, 2).is_err());
    }

    /// With the currency unchanged and no rate supplied, the stored rate
    /// carries over
    #[test]
    fn test_update_rate_defaults_to_stored() {
        let currency = Uuid::new_v4();
        let project_currency = Uuid::new_v4();

        let rate = resolve_update_exchange_rate(
            currency,
            currency,
            project_currency,
            Some(dec("7.25")),
            None,
        );
        assert_eq!(rate, Ok(Some(dec("7.25"))));
    }

    /// An explicit rate on the unchanged-currency path is validated, not
    /// stored as-is
    #[test]
    fn test_update_rate_rejects_nonpositive() {
        let currency = Uuid::new_v4();
        let project_currency = Uuid::new_v4();

        for bad in ["0", "-1.5"] {
            let result = resolve_update_exchange_rate(
                currency,
                currency,
                project_currency,
                Some(dec("7.25")),
                Some(dec(bad)),
            );
            assert_eq!(result.unwrap_err(), "Exchange rate must be positive");
        }

        let result = resolve_update_exchange_rate(
            currency,
            currency,
            project_currency,
            Some(dec("7.25")),
            Some(dec("7.30")),
        );
        assert_eq!(result, Ok(Some(dec("7.30"))));
    }

    /// A rate makes no sense on a contract already in the project currency
    #[test]
    fn test_update_rate_rejected_on_project_currency() {
        let project_currency = Uuid::new_v4();

        let result = resolve_update_exchange_rate(
            project_currency,
            project_currency,
            project_currency,
            None,
            Some(dec("1.1")),
        );
        assert_eq!(
            result.unwrap_err(),
            "Exchange rate only applies when the contract currency differs from the project currency"
        );
    }

    /// Changing onto the project currency pins the rate to 1
    #[test]
    fn test_currency_change_to_project_pins_rate() {
        let old_currency = Uuid::new_v4();
        let project_currency = Uuid::new_v4();

        let rate = resolve_update_exchange_rate(
            project_currency,
            old_currency,
            project_currency,
            Some(dec("7.25")),
            None,
        );
        assert_eq!(rate, Ok(Some(dec("1"))));
    }

    /// Changing onto any other currency requires an explicit positive rate
    #[test]
    fn test_currency_change_requires_rate() {
        let old_currency = Uuid::new_v4();
        let new_currency = Uuid::new_v4();
        let project_currency = Uuid::new_v4();

        let missing = resolve_update_exchange_rate(
            new_currency,
            old_currency,
            project_currency,
            None,
            None,
        );
        assert_eq!(
            missing.unwrap_err(),
            "Exchange rate is required when the contract currency differs from the project currency"
        );

        let negative = resolve_update_exchange_rate(
            new_currency,
            old_currency,
            project_currency,
            None,
            Some(dec("-2")),
        );
        assert_eq!(negative.unwrap_err(), "Exchange rate must be positive");

        let supplied = resolve_update_exchange_rate(
            new_currency,
            old_currency,
            project_currency,
            None,
            Some(dec("0.92")),
        );
        assert_eq!(supplied, Ok(Some(dec("0.92"))));
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(ContractStatus::Active.as_str(), "active");
        assert_eq!(ContractStatus::Completed.as_str(), "completed");
        assert_eq!(ContractStatus::Canceled.as_str(), "canceled");
        assert_eq!(ContractType::Product.as_str(), "product");
        assert_eq!(ContractType::Service.as_str(), "service");
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn status_strategy() -> impl Strategy<Value = ContractStatus> {
        prop_oneof![
            Just(ContractStatus::Active),
            Just(ContractStatus::Completed),
            Just(ContractStatus::Canceled),
        ]
    }

    fn day_strategy() -> impl Strategy<Value = NaiveDate> {
        (0i64..=3650).prop_map(|offset| {
            date(2020, 1, 1) + chrono::Duration::days(offset)
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// A status change is accepted exactly when it targets a different
        /// status
        #[test]
        fn prop_status_change_iff_distinct(
            current in status_strategy(),
            requested in status_strategy()
        ) {
            let result = validate_status_change(current, requested);
            prop_assert_eq!(result.is_ok(), current != requested);
        }

        /// Completion requires the paid total to equal the cap exactly
        #[test]
        fn prop_completion_requires_exact_payment(
            give_cents in 0i64..=200_000,
            cap_cents in 1i64..=200_000
        ) {
            let give = Decimal::new(give_cents, 2);
            let cap = Decimal::new(cap_cents, 2);

            let result = completion_ready(give, cap, ContractType::Service, true);
            prop_assert_eq!(result.is_ok(), give == cap);
        }

        /// Date ordering is accepted exactly when sign <= begin <= finish
        #[test]
        fn prop_date_ordering(
            sign in day_strategy(),
            begin in day_strategy(),
            finish in day_strategy()
        ) {
            let result = validate_contract_dates(sign, begin, finish);
            prop_assert_eq!(result.is_ok(), sign <= begin && begin <= finish);
        }

        /// Whatever path an update takes, a stored rate is always positive
        #[test]
        fn prop_resolved_rate_is_positive(
            rate_cents in -10_000i64..=10_000,
            stored_cents in prop::option::of(1i64..=10_000),
            same_currency in any::<bool>()
        ) {
            let existing_currency = Uuid::new_v4();
            let new_currency = if same_currency {
                existing_currency
            } else {
                Uuid::new_v4()
            };
            let project_currency = Uuid::new_v4();

            let resolved = resolve_update_exchange_rate(
                new_currency,
                existing_currency,
                project_currency,
                stored_cents.map(|c| Decimal::new(c, 2)),
                Some(Decimal::new(rate_cents, 2)),
            );
            if let Ok(Some(rate)) = resolved {
                prop_assert!(rate > Decimal::ZERO);
            }
        }

        /// Window containment is accepted exactly when the contract range
        /// sits inside the project range
        #[test]
        fn prop_project_window_containment(
            begin in day_strategy(),
            finish in day_strategy(),
            project_start in day_strategy(),
            project_finish in prop::option::of(day_strategy())
        ) {
            let result =
                validate_project_window(begin, finish, project_start, project_finish);
            let expected = begin >= project_start
                && project_finish.map_or(true, |end| finish <= end);
            prop_assert_eq!(result.is_ok(), expected);
        }
    }
}
