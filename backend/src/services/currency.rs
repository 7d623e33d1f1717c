//! Currency reference-data service

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::Currency;
use shared::validation::validate_currency_code;

const CURRENCY_COLUMNS: &str = "id, code, name, created_at";

/// Currency service
#[derive(Clone)]
pub struct CurrencyService {
    db: PgPool,
}

/// Input for creating a currency
#[derive(Debug, Deserialize)]
pub struct CreateCurrencyInput {
    pub code: String,
    pub name: String,
}

/// Input for updating a currency; absent fields stay unchanged
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCurrencyInput {
    pub code: Option<String>,
    pub name: Option<String>,
}

impl CurrencyService {
    /// Create a new CurrencyService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a currency
    pub async fn create_currency(&self, input: CreateCurrencyInput) -> AppResult<Currency> {
        validate_currency_code(&input.code).map_err(|e| AppError::validation("code", e))?;

        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM currencies WHERE code = $1)",
        )
        .bind(&input.code)
        .fetch_one(&self.db)
        .await?;
        if taken {
            return Err(AppError::DuplicateEntry("currency code".to_string()));
        }

        let currency = sqlx::query_as::<_, Currency>(&format!(
            r#"
            INSERT INTO currencies (code, name)
            VALUES ($1, $2)
            RETURNING {CURRENCY_COLUMNS}
            "#,
        ))
        .bind(&input.code)
        .bind(&input.name)
        .fetch_one(&self.db)
        .await?;

        Ok(currency)
    }

    /// Update a currency's code or name
    pub async fn update_currency(
        &self,
        currency_id: Uuid,
        input: UpdateCurrencyInput,
    ) -> AppResult<Currency> {
        let existing = self.get_currency(currency_id).await?;

        let code = input.code.unwrap_or_else(|| existing.code.clone());
        let name = input.name.unwrap_or_else(|| existing.name.clone());

        validate_currency_code(&code).map_err(|e| AppError::validation("code", e))?;

        if code != existing.code {
            let taken = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM currencies WHERE code = $1 AND id <> $2)",
            )
            .bind(&code)
            .bind(currency_id)
            .fetch_one(&self.db)
            .await?;
            if taken {
                return Err(AppError::DuplicateEntry("currency code".to_string()));
            }
        }

        let currency = sqlx::query_as::<_, Currency>(&format!(
            r#"
            UPDATE currencies
            SET code = $1, name = $2
            WHERE id = $3
            RETURNING {CURRENCY_COLUMNS}
            "#,
        ))
        .bind(&code)
        .bind(&name)
        .bind(currency_id)
        .fetch_one(&self.db)
        .await?;

        Ok(currency)
    }

    /// Delete a currency; blocked while projects, contracts, or payments
    /// are denominated in it
    pub async fn delete_currency(&self, currency_id: Uuid) -> AppResult<()> {
        let referenced = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM projects WHERE currency_id = $1) \
             OR EXISTS(SELECT 1 FROM contracts WHERE currency_id = $1) \
             OR EXISTS(SELECT 1 FROM contract_payments WHERE currency_id = $1)",
        )
        .bind(currency_id)
        .fetch_one(&self.db)
        .await?;
        if referenced {
            return Err(AppError::conflict(
                "currency",
                "Currency is in use by projects, contracts, or payments",
            ));
        }

        let result = sqlx::query("DELETE FROM currencies WHERE id = $1")
            .bind(currency_id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Currency".to_string()));
        }

        Ok(())
    }

    /// Get a currency by ID
    pub async fn get_currency(&self, currency_id: Uuid) -> AppResult<Currency> {
        sqlx::query_as::<_, Currency>(&format!(
            "SELECT {CURRENCY_COLUMNS} FROM currencies WHERE id = $1",
        ))
        .bind(currency_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Currency".to_string()))
    }

    /// List all currencies
    pub async fn list_currencies(&self) -> AppResult<Vec<Currency>> {
        let currencies = sqlx::query_as::<_, Currency>(&format!(
            "SELECT {CURRENCY_COLUMNS} FROM currencies ORDER BY code",
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(currencies)
    }
}
