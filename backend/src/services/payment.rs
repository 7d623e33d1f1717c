//! Payment service: the monetary ledger behind `give_amount`
//!
//! Every mutation locks the contract row with `SELECT ... FOR UPDATE` and
//! re-validates against the locked state, so two concurrent payments cannot
//! both pass the cap check and overshoot `amount`.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{
    apply_issued, apply_refund, effective_amount, reverse_entry, Contract, ContractPayment,
    ContractStatus, PaymentEntryType,
};
use shared::validation::{validate_exchange_rate, validate_positive};

const PAYMENT_COLUMNS: &str = "id, contract_id, currency_id, entry_type, amount, \
     contract_currency_exchange_rate, give_date, note, created_at";

const CONTRACT_COLUMNS: &str = "id, name, contract_type, status, project_id, applicant_id, \
     purchaser_id, company_id, currency_id, amount, give_amount, sign_date, \
     official_begin_date, official_finish_date, finish_date, \
     project_currency_exchange_rate, note, created_at, updated_at";

/// Payment service
#[derive(Clone)]
pub struct PaymentService {
    db: PgPool,
}

/// Input for recording a payment
#[derive(Debug, Deserialize)]
pub struct CreatePaymentInput {
    pub currency_id: Uuid,
    pub entry_type: PaymentEntryType,
    pub amount: Decimal,
    pub contract_currency_exchange_rate: Option<Decimal>,
    pub give_date: NaiveDate,
    pub note: Option<String>,
}

/// Input for the finish-payment shortcut
#[derive(Debug, Default, Deserialize)]
pub struct FinishPaymentInput {
    pub give_date: Option<NaiveDate>,
    pub note: Option<String>,
}

impl PaymentService {
    /// Create a new PaymentService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn lock_contract(
        tx: &mut Transaction<'_, Postgres>,
        contract_id: Uuid,
    ) -> AppResult<Contract> {
        sqlx::query_as::<_, Contract>(&format!(
            "SELECT {CONTRACT_COLUMNS} FROM contracts WHERE id = $1 FOR UPDATE",
        ))
        .bind(contract_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Contract".to_string()))
    }

    fn ensure_active(contract: &Contract) -> AppResult<()> {
        if contract.status != ContractStatus::Active {
            return Err(AppError::InvalidStateTransition(format!(
                "Contract is {} and does not accept payments",
                contract.status
            )));
        }
        Ok(())
    }

    /// Record an issued or refund payment against a contract
    pub async fn create_payment(
        &self,
        contract_id: Uuid,
        input: CreatePaymentInput,
    ) -> AppResult<ContractPayment> {
        validate_positive(input.amount).map_err(|e| AppError::validation("amount", e))?;

        if input.entry_type == PaymentEntryType::Canceled {
            return Err(AppError::validation(
                "entry_type",
                "Canceled entries cannot be created directly",
            ));
        }

        let currency_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM currencies WHERE id = $1)")
                .bind(input.currency_id)
                .fetch_one(&self.db)
                .await?;
        if !currency_exists {
            return Err(AppError::NotFound("Currency".to_string()));
        }

        let mut tx = self.db.begin().await?;

        let contract = Self::lock_contract(&mut tx, contract_id).await?;
        Self::ensure_active(&contract)?;

        // The exchange rate matters only when the entry is denominated in a
        // currency other than the contract's
        let exchange_rate = if input.currency_id != contract.currency_id {
            let rate = input.contract_currency_exchange_rate.ok_or_else(|| {
                AppError::validation(
                    "contract_currency_exchange_rate",
                    "Required when the payment currency differs from the contract currency",
                )
            })?;
            validate_exchange_rate(rate)
                .map_err(|e| AppError::validation("contract_currency_exchange_rate", e))?;
            Some(rate)
        } else {
            None
        };

        let effective = effective_amount(input.amount, exchange_rate);
        let new_give_amount = match input.entry_type {
            PaymentEntryType::Issued => {
                apply_issued(contract.give_amount, contract.amount, effective)
            }
            PaymentEntryType::Refund => apply_refund(contract.give_amount, effective),
            PaymentEntryType::Canceled => unreachable!("rejected above"),
        }
        .map_err(|e| AppError::conflict("amount", e))?;

        let payment = sqlx::query_as::<_, ContractPayment>(&format!(
            r#"
            INSERT INTO contract_payments (
                contract_id, currency_id, entry_type, amount,
                contract_currency_exchange_rate, give_date, note
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PAYMENT_COLUMNS}
            "#,
        ))
        .bind(contract_id)
        .bind(input.currency_id)
        .bind(input.entry_type)
        .bind(input.amount)
        .bind(exchange_rate)
        .bind(input.give_date)
        .bind(&input.note)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE contracts SET give_amount = $1, updated_at = NOW() WHERE id = $2")
            .bind(new_give_amount)
            .bind(contract_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(payment)
    }

    /// Cancel a payment: reverse its effect on `give_amount` and flip the
    /// entry type to `canceled` (the row is kept)
    pub async fn cancel_payment(&self, payment_id: Uuid) -> AppResult<ContractPayment> {
        let mut tx = self.db.begin().await?;

        let payment = sqlx::query_as::<_, ContractPayment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM contract_payments WHERE id = $1 FOR UPDATE",
        ))
        .bind(payment_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Payment".to_string()))?;

        let contract = Self::lock_contract(&mut tx, payment.contract_id).await?;

        let effective =
            effective_amount(payment.amount, payment.contract_currency_exchange_rate);
        let new_give_amount = reverse_entry(
            contract.give_amount,
            contract.amount,
            payment.entry_type,
            effective,
        )
        .map_err(|e| AppError::conflict("payment", e))?;

        let canceled = sqlx::query_as::<_, ContractPayment>(&format!(
            r#"
            UPDATE contract_payments
            SET entry_type = 'canceled'
            WHERE id = $1
            RETURNING {PAYMENT_COLUMNS}
            "#,
        ))
        .bind(payment_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE contracts SET give_amount = $1, updated_at = NOW() WHERE id = $2")
            .bind(new_give_amount)
            .bind(payment.contract_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(canceled)
    }

    /// Issue one payment for exactly the remaining balance, in the
    /// contract's own currency
    pub async fn finish_payment(
        &self,
        contract_id: Uuid,
        input: FinishPaymentInput,
    ) -> AppResult<ContractPayment> {
        let mut tx = self.db.begin().await?;

        let contract = Self::lock_contract(&mut tx, contract_id).await?;
        Self::ensure_active(&contract)?;

        let remaining = contract.amount - contract.give_amount;
        if remaining <= Decimal::ZERO {
            return Err(AppError::conflict("amount", "Contract is already fully paid"));
        }

        let give_date = input.give_date.unwrap_or_else(|| Utc::now().date_naive());

        let payment = sqlx::query_as::<_, ContractPayment>(&format!(
            r#"
            INSERT INTO contract_payments (
                contract_id, currency_id, entry_type, amount,
                contract_currency_exchange_rate, give_date, note
            )
            VALUES ($1, $2, 'issued', $3, NULL, $4, $5)
            RETURNING {PAYMENT_COLUMNS}
            "#,
        ))
        .bind(contract_id)
        .bind(contract.currency_id)
        .bind(remaining)
        .bind(give_date)
        .bind(&input.note)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE contracts SET give_amount = amount, updated_at = NOW() WHERE id = $1")
            .bind(contract_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(payment)
    }

    /// Payment history for a contract, newest first
    pub async fn list_payments(&self, contract_id: Uuid) -> AppResult<Vec<ContractPayment>> {
        let contract_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM contracts WHERE id = $1)")
                .bind(contract_id)
                .fetch_one(&self.db)
                .await?;
        if !contract_exists {
            return Err(AppError::NotFound("Contract".to_string()));
        }

        let payments = sqlx::query_as::<_, ContractPayment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM contract_payments WHERE contract_id = $1 \
             ORDER BY give_date DESC, created_at DESC",
        ))
        .bind(contract_id)
        .fetch_all(&self.db)
        .await?;

        Ok(payments)
    }
}
