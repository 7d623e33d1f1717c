//! Contract service: field updates, the status state machine, and cascade
//! deletion
//!
//! Field updates are only allowed while a contract is active. Status checks
//! that gate on financial state run against a row locked with
//! `SELECT ... FOR UPDATE` inside the transaction that applies the change.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{
    completion_ready, resolve_update_exchange_rate, validate_fields_changed,
    validate_no_attachments, validate_status_change, Contract, ContractFields, ContractStatus,
    ContractType, PartyKind, Project,
};
use shared::types::{ContractSearchField, Page, Pagination};
use shared::validation::{
    validate_contract_dates, validate_exchange_rate, validate_positive, validate_project_window,
};

const CONTRACT_COLUMNS: &str = "id, name, contract_type, status, project_id, applicant_id, \
     purchaser_id, company_id, currency_id, amount, give_amount, sign_date, \
     official_begin_date, official_finish_date, finish_date, \
     project_currency_exchange_rate, note, created_at, updated_at";

/// Contract service
#[derive(Clone)]
pub struct ContractService {
    db: PgPool,
}

/// Input for creating a contract
#[derive(Debug, Deserialize)]
pub struct CreateContractInput {
    pub name: String,
    pub contract_type: ContractType,
    pub project_id: Uuid,
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

/// Input for updating a contract; absent fields stay unchanged
#[derive(Debug, Default, Deserialize)]
pub struct UpdateContractInput {
    pub name: Option<String>,
    pub applicant_id: Option<Uuid>,
    pub purchaser_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub currency_id: Option<Uuid>,
    pub amount: Option<Decimal>,
    pub sign_date: Option<NaiveDate>,
    pub official_begin_date: Option<NaiveDate>,
    pub official_finish_date: Option<NaiveDate>,
    pub project_currency_exchange_rate: Option<Decimal>,
    pub note: Option<String>,
}

/// Input for the status-change operation
#[derive(Debug, Deserialize)]
pub struct ChangeStatusInput {
    pub status: ContractStatus,
}

/// Query parameters for contract listings
#[derive(Debug, Default, Deserialize)]
pub struct ContractListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search_by: Option<ContractSearchField>,
    pub search_value: Option<String>,
}

impl ContractListQuery {
    fn pagination(&self) -> Pagination {
        let defaults = Pagination::default();
        Pagination {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

impl ContractService {
    /// Create a new ContractService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn fetch_project(&self, project_id: Uuid) -> AppResult<Project> {
        sqlx::query_as::<_, Project>(
            "SELECT id, name, currency_id, start_date, finish_date, is_open, note, created_at, \
             updated_at FROM projects WHERE id = $1",
        )
        .bind(project_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Project".to_string()))
    }

    async fn ensure_party(&self, party_id: Uuid, kind: PartyKind) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM parties WHERE id = $1 AND kind = $2)",
        )
        .bind(party_id)
        .bind(kind)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(AppError::NotFound(format!("Party ({})", kind)));
        }
        Ok(())
    }

    async fn ensure_currency(&self, currency_id: Uuid) -> AppResult<()> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM currencies WHERE id = $1)")
                .bind(currency_id)
                .fetch_one(&self.db)
                .await?;

        if !exists {
            return Err(AppError::NotFound("Currency".to_string()));
        }
        Ok(())
    }

    async fn ensure_unique_name(&self, name: &str, exclude_id: Option<Uuid>) -> AppResult<()> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM contracts WHERE name = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.db)
        .await?;

        if taken {
            return Err(AppError::DuplicateEntry("contract name".to_string()));
        }
        Ok(())
    }

    /// Create a contract; the exchange rate is stored only when the contract
    /// currency differs from the project currency
    pub async fn create_contract(&self, input: CreateContractInput) -> AppResult<Contract> {
        validate_positive(input.amount)
            .map_err(|e| AppError::validation("amount", e))?;

        let project = self.fetch_project(input.project_id).await?;
        self.ensure_party(input.applicant_id, PartyKind::Applicant).await?;
        self.ensure_party(input.purchaser_id, PartyKind::Purchaser).await?;
        self.ensure_party(input.company_id, PartyKind::Company).await?;
        self.ensure_currency(input.currency_id).await?;

        validate_contract_dates(
            input.sign_date,
            input.official_begin_date,
            input.official_finish_date,
        )
        .map_err(|e| AppError::conflict("dates", e))?;
        validate_project_window(
            input.official_begin_date,
            input.official_finish_date,
            project.start_date,
            project.finish_date,
        )
        .map_err(|e| AppError::conflict("dates", e))?;

        self.ensure_unique_name(&input.name, None).await?;

        let exchange_rate = if input.currency_id != project.currency_id {
            let rate = input.project_currency_exchange_rate.ok_or_else(|| {
                AppError::validation(
                    "project_currency_exchange_rate",
                    "Required when the contract currency differs from the project currency",
                )
            })?;
            validate_exchange_rate(rate)
                .map_err(|e| AppError::validation("project_currency_exchange_rate", e))?;
            Some(rate)
        } else {
            None
        };

        let contract = sqlx::query_as::<_, Contract>(&format!(
            r#"
            INSERT INTO contracts (
                name, contract_type, status, project_id, applicant_id, purchaser_id,
                company_id, currency_id, amount, sign_date, official_begin_date,
                official_finish_date, project_currency_exchange_rate, note
            )
            VALUES ($1, $2, 'active', $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {CONTRACT_COLUMNS}
            "#,
        ))
        .bind(&input.name)
        .bind(input.contract_type)
        .bind(input.project_id)
        .bind(input.applicant_id)
        .bind(input.purchaser_id)
        .bind(input.company_id)
        .bind(input.currency_id)
        .bind(input.amount)
        .bind(input.sign_date)
        .bind(input.official_begin_date)
        .bind(input.official_finish_date)
        .bind(exchange_rate)
        .bind(&input.note)
        .fetch_one(&self.db)
        .await?;

        Ok(contract)
    }

    /// Update contract fields; rejected for terminal contracts and for
    /// payloads identical to the current state
    pub async fn update_contract(
        &self,
        contract_id: Uuid,
        input: UpdateContractInput,
    ) -> AppResult<Contract> {
        let existing = self.get_contract(contract_id).await?;

        if existing.status.is_terminal() {
            return Err(AppError::InvalidStateTransition(format!(
                "Contract is {} and can no longer be updated",
                existing.status
            )));
        }

        let project = self.fetch_project(existing.project_id).await?;

        let name = input.name.unwrap_or_else(|| existing.name.clone());
        let applicant_id = input.applicant_id.unwrap_or(existing.applicant_id);
        let purchaser_id = input.purchaser_id.unwrap_or(existing.purchaser_id);
        let company_id = input.company_id.unwrap_or(existing.company_id);
        let currency_id = input.currency_id.unwrap_or(existing.currency_id);
        let amount = input.amount.unwrap_or(existing.amount);
        let sign_date = input.sign_date.unwrap_or(existing.sign_date);
        let official_begin_date = input
            .official_begin_date
            .unwrap_or(existing.official_begin_date);
        let official_finish_date = input
            .official_finish_date
            .unwrap_or(existing.official_finish_date);
        let note = input.note.clone().or_else(|| existing.note.clone());

        if currency_id != existing.currency_id {
            self.ensure_currency(currency_id).await?;
        }
        let exchange_rate = resolve_update_exchange_rate(
            currency_id,
            existing.currency_id,
            project.currency_id,
            existing.project_currency_exchange_rate,
            input.project_currency_exchange_rate,
        )
        .map_err(|e| AppError::validation("project_currency_exchange_rate", e))?;

        let updated_fields = ContractFields {
            name: name.clone(),
            applicant_id,
            purchaser_id,
            company_id,
            currency_id,
            amount,
            sign_date,
            official_begin_date,
            official_finish_date,
            project_currency_exchange_rate: exchange_rate,
            note: note.clone(),
        };
        validate_fields_changed(&existing.fields(), &updated_fields)
            .map_err(|e| AppError::conflict("contract", e))?;

        if applicant_id != existing.applicant_id {
            self.ensure_party(applicant_id, PartyKind::Applicant).await?;
        }
        if purchaser_id != existing.purchaser_id {
            self.ensure_party(purchaser_id, PartyKind::Purchaser).await?;
        }
        if company_id != existing.company_id {
            self.ensure_party(company_id, PartyKind::Company).await?;
        }
        if name != existing.name {
            self.ensure_unique_name(&name, Some(contract_id)).await?;
        }

        validate_positive(amount).map_err(|e| AppError::validation("amount", e))?;
        validate_contract_dates(sign_date, official_begin_date, official_finish_date)
            .map_err(|e| AppError::conflict("dates", e))?;
        validate_project_window(
            official_begin_date,
            official_finish_date,
            project.start_date,
            project.finish_date,
        )
        .map_err(|e| AppError::conflict("dates", e))?;

        let contract = sqlx::query_as::<_, Contract>(&format!(
            r#"
            UPDATE contracts
            SET name = $1, applicant_id = $2, purchaser_id = $3, company_id = $4,
                currency_id = $5, amount = $6, sign_date = $7, official_begin_date = $8,
                official_finish_date = $9, project_currency_exchange_rate = $10,
                note = $11, updated_at = NOW()
            WHERE id = $12
            RETURNING {CONTRACT_COLUMNS}
            "#,
        ))
        .bind(&name)
        .bind(applicant_id)
        .bind(purchaser_id)
        .bind(company_id)
        .bind(currency_id)
        .bind(amount)
        .bind(sign_date)
        .bind(official_begin_date)
        .bind(official_finish_date)
        .bind(exchange_rate)
        .bind(&note)
        .bind(contract_id)
        .fetch_one(&self.db)
        .await?;

        Ok(contract)
    }

    /// Change contract status
    ///
    /// The contract row is locked for the duration of the check so the
    /// completion gate cannot race a concurrent payment or delivery.
    pub async fn change_status(
        &self,
        contract_id: Uuid,
        input: ChangeStatusInput,
    ) -> AppResult<Contract> {
        let mut tx = self.db.begin().await?;

        let contract = sqlx::query_as::<_, Contract>(&format!(
            "SELECT {CONTRACT_COLUMNS} FROM contracts WHERE id = $1 FOR UPDATE",
        ))
        .bind(contract_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Contract".to_string()))?;

        validate_status_change(contract.status, input.status)
            .map_err(|e| AppError::conflict("status", e))?;

        if input.status == ContractStatus::Completed {
            let all_taken = sqlx::query_scalar::<_, bool>(
                "SELECT NOT EXISTS(SELECT 1 FROM product_inventories \
                 WHERE contract_id = $1 AND take_quantity < contract_quantity)",
            )
            .bind(contract_id)
            .fetch_one(&mut *tx)
            .await?;

            completion_ready(
                contract.give_amount,
                contract.amount,
                contract.contract_type,
                all_taken,
            )
            .map_err(|e| AppError::conflict("status", e))?;
        }

        let finish_date = if input.status.is_terminal() {
            Some(Utc::now())
        } else {
            None
        };

        let updated = sqlx::query_as::<_, Contract>(&format!(
            r#"
            UPDATE contracts
            SET status = $1, finish_date = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING {CONTRACT_COLUMNS}
            "#,
        ))
        .bind(input.status)
        .bind(finish_date)
        .bind(contract_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Delete a contract and its ledgers
    ///
    /// Blocked while any file volume or link still references the contract.
    pub async fn delete_contract(&self, contract_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let locked =
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM contracts WHERE id = $1 FOR UPDATE")
                .bind(contract_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(AppError::NotFound("Contract".to_string()));
        }

        let (volume_count, link_count) = sqlx::query_as::<_, (i64, i64)>(
            "SELECT (SELECT COUNT(*) FROM file_volumes WHERE contract_id = $1), \
                    (SELECT COUNT(*) FROM file_links WHERE contract_id = $1)",
        )
        .bind(contract_id)
        .fetch_one(&mut *tx)
        .await?;
        validate_no_attachments(volume_count, link_count)
            .map_err(|e| AppError::conflict("files", e))?;

        sqlx::query(
            "DELETE FROM inventory_movements WHERE product_inventory_id IN \
             (SELECT id FROM product_inventories WHERE contract_id = $1)",
        )
        .bind(contract_id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM product_inventories WHERE contract_id = $1")
            .bind(contract_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM contract_payments WHERE contract_id = $1")
            .bind(contract_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM contracts WHERE id = $1")
            .bind(contract_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Get a contract by ID
    pub async fn get_contract(&self, contract_id: Uuid) -> AppResult<Contract> {
        sqlx::query_as::<_, Contract>(&format!(
            "SELECT {CONTRACT_COLUMNS} FROM contracts WHERE id = $1",
        ))
        .bind(contract_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Contract".to_string()))
    }

    /// List contracts with pagination and an optional typed search filter
    pub async fn list_contracts(&self, query: ContractListQuery) -> AppResult<Page<Contract>> {
        let pagination = query.pagination();

        match (query.search_by, query.search_value) {
            (Some(field), Some(value)) => {
                let pattern = format!("%{}%", value);
                let total = sqlx::query_scalar::<_, i64>(&format!(
                    "SELECT COUNT(*) FROM contracts WHERE {} ILIKE $1",
                    field.column(),
                ))
                .bind(&pattern)
                .fetch_one(&self.db)
                .await?;

                let items = sqlx::query_as::<_, Contract>(&format!(
                    "SELECT {CONTRACT_COLUMNS} FROM contracts WHERE {} ILIKE $1 \
                     ORDER BY created_at DESC LIMIT $2 OFFSET $3",
                    field.column(),
                ))
                .bind(&pattern)
                .bind(pagination.limit())
                .bind(pagination.offset())
                .fetch_all(&self.db)
                .await?;

                Ok(Page::new(items, total, pagination))
            }
            _ => {
                let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM contracts")
                    .fetch_one(&self.db)
                    .await?;

                let items = sqlx::query_as::<_, Contract>(&format!(
                    "SELECT {CONTRACT_COLUMNS} FROM contracts \
                     ORDER BY created_at DESC LIMIT $1 OFFSET $2",
                ))
                .bind(pagination.limit())
                .bind(pagination.offset())
                .fetch_all(&self.db)
                .await?;

                Ok(Page::new(items, total, pagination))
            }
        }
    }
}
