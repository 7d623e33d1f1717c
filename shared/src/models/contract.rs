//! Contract model and its status state machine

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::validation::validate_exchange_rate;

/// What a contract procures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "contract_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    Product,
    Service,
}

impl ContractType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractType::Product => "product",
            ContractType::Service => "service",
        }
    }
}

/// Lifecycle status of a contract
///
/// Contracts are created `Active`. `Completed` and `Canceled` are terminal
/// for field updates; an explicit status change can still move a contract
/// back to `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "contract_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Active,
    Completed,
    Canceled,
}

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Active => "active",
            ContractStatus::Completed => "completed",
            ContractStatus::Canceled => "canceled",
        }
    }

    /// Field updates and ledger writes are rejected outside `Active`
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ContractStatus::Active)
    }
}

impl std::fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check whether a status change is allowed, ignoring financial gating
///
/// Same-status changes are rejected; `Active` and `Canceled` are always
/// reachable. `Completed` additionally requires [`completion_ready`].
pub fn validate_status_change(
    current: ContractStatus,
    requested: ContractStatus,
) -> Result<(), &'static str> {
    if current == requested {
        return Err("Contract already has the requested status");
    }
    Ok(())
}

/// Check the financial and delivery gates for completing a contract
///
/// A contract completes only when fully paid and, for product contracts,
/// every inventory commitment is fully taken.
pub fn completion_ready(
    give_amount: Decimal,
    amount: Decimal,
    contract_type: ContractType,
    all_inventory_taken: bool,
) -> Result<(), &'static str> {
    if give_amount != amount {
        return Err("Contract is not fully paid");
    }
    if contract_type == ContractType::Product && !all_inventory_taken {
        return Err("Contract has undelivered inventory");
    }
    Ok(())
}

/// Resolve the exchange rate a contract stores after a field update
///
/// The rate only applies when the contract currency differs from the
/// project currency. A currency change onto the project currency pins the
/// rate to 1; a change onto any other currency requires an explicit rate.
/// With the currency unchanged, an explicit rate replaces the stored one
/// (and is rejected on contracts in the project currency).
pub fn resolve_update_exchange_rate(
    new_currency: Uuid,
    existing_currency: Uuid,
    project_currency: Uuid,
    existing_rate: Option<Decimal>,
    requested_rate: Option<Decimal>,
) -> Result<Option<Decimal>, &'static str> {
    if new_currency != existing_currency {
        if new_currency == project_currency {
            return Ok(Some(Decimal::ONE));
        }
        let rate = requested_rate
            .ok_or("Exchange rate is required when the contract currency differs from the project currency")?;
        validate_exchange_rate(rate)?;
        return Ok(Some(rate));
    }
    match requested_rate {
        Some(_) if new_currency == project_currency => {
            Err("Exchange rate only applies when the contract currency differs from the project currency")
        }
        Some(rate) => {
            validate_exchange_rate(rate)?;
            Ok(Some(rate))
        }
        None => Ok(existing_rate),
    }
}

/// The updatable field set of a contract
///
/// Updates merge absent input fields from the current row; the merged
/// result is compared against the current state before anything is written.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractFields {
    pub name: String,
    pub applicant_id: Uuid,
    pub purchaser_id: Uuid,
    pub company_id: Uuid,
    pub currency_id: Uuid,
    pub amount: Decimal,
    pub sign_date: NaiveDate,
    pub official_begin_date: NaiveDate,
    pub official_finish_date: NaiveDate,
    pub project_currency_exchange_rate: Option<Decimal>,
    pub note: Option<String>,
}

/// Reject update payloads that resolve to the current state
pub fn validate_fields_changed(
    current: &ContractFields,
    updated: &ContractFields,
) -> Result<(), &'static str> {
    if current == updated {
        return Err("Nothing changed");
    }
    Ok(())
}

/// A procurement contract
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Contract {
    pub id: Uuid,
    pub name: String,
    pub contract_type: ContractType,
    pub status: ContractStatus,
    pub project_id: Uuid,
    pub applicant_id: Uuid,
    pub purchaser_id: Uuid,
    pub company_id: Uuid,
    pub currency_id: Uuid,
    /// Monetary cap of the contract
    pub amount: Decimal,
    /// Running paid total; maintained only by the payment ledger
    pub give_amount: Decimal,
    pub sign_date: NaiveDate,
    pub official_begin_date: NaiveDate,
    pub official_finish_date: NaiveDate,
    /// Stamped when the contract enters a terminal status
    pub finish_date: Option<DateTime<Utc>>,
    /// Conversion into the project currency; absent when they match
    pub project_currency_exchange_rate: Option<Decimal>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contract {
    /// Snapshot of the updatable fields
    pub fn fields(&self) -> ContractFields {
        ContractFields {
            name: self.name.clone(),
            applicant_id: self.applicant_id,
            purchaser_id: self.purchaser_id,
            company_id: self.company_id,
            currency_id: self.currency_id,
            amount: self.amount,
            sign_date: self.sign_date,
            official_begin_date: self.official_begin_date,
            official_finish_date: self.official_finish_date,
            project_currency_exchange_rate: self.project_currency_exchange_rate,
            note: self.note.clone(),
        }
    }
}
