//! Inventory service: per-product commitments and the delivery ledger
//!
//! Movements lock the inventory row with `SELECT ... FOR UPDATE` and apply
//! the quantity rules against the locked state, mirroring the payment
//! ledger's treatment of `give_amount`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{
    apply_movement, validate_commitment_change, ContractStatus, InventoryEntryType,
    InventoryMovement, InventoryTotals, ProductInventory,
};
use shared::validation::validate_positive;

const INVENTORY_COLUMNS: &str = "id, product_id, contract_id, contract_quantity, take_quantity, \
     note, created_at, updated_at";

const MOVEMENT_COLUMNS: &str =
    "id, product_inventory_id, entry_type, quantity, give_date, note, created_at";

/// Inventory service
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

/// Input for committing a product to a contract
#[derive(Debug, Deserialize)]
pub struct AddProductInput {
    pub product_id: Uuid,
    pub contract_quantity: Decimal,
    pub note: Option<String>,
}

/// Input for recording a delivery or refund movement
#[derive(Debug, Deserialize)]
pub struct RecordMovementInput {
    pub entry_type: InventoryEntryType,
    pub quantity: Decimal,
    pub give_date: NaiveDate,
    pub note: Option<String>,
}

/// Input for changing a commitment; absent fields stay unchanged
#[derive(Debug, Default, Deserialize)]
pub struct UpdateInventoryInput {
    pub contract_quantity: Option<Decimal>,
    pub note: Option<String>,
}

/// A contract's inventory rows plus ledger aggregates
#[derive(Debug, Serialize)]
pub struct InventoryOverview {
    pub items: Vec<ProductInventory>,
    pub totals: InventoryTotals,
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn contract_status(&self, contract_id: Uuid) -> AppResult<ContractStatus> {
        sqlx::query_scalar::<_, ContractStatus>("SELECT status FROM contracts WHERE id = $1")
            .bind(contract_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Contract".to_string()))
    }

    fn ensure_active(status: ContractStatus) -> AppResult<()> {
        if status != ContractStatus::Active {
            return Err(AppError::InvalidStateTransition(format!(
                "Contract is {} and its inventory is frozen",
                status
            )));
        }
        Ok(())
    }

    async fn lock_inventory(
        tx: &mut Transaction<'_, Postgres>,
        inventory_id: Uuid,
    ) -> AppResult<ProductInventory> {
        sqlx::query_as::<_, ProductInventory>(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM product_inventories WHERE id = $1 FOR UPDATE",
        ))
        .bind(inventory_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory".to_string()))
    }

    // FOR SHARE so the gate conflicts with the FOR UPDATE a concurrent
    // status change holds on the contract row
    async fn contract_status_tx(
        tx: &mut Transaction<'_, Postgres>,
        contract_id: Uuid,
    ) -> AppResult<ContractStatus> {
        sqlx::query_scalar::<_, ContractStatus>(
            "SELECT status FROM contracts WHERE id = $1 FOR SHARE",
        )
        .bind(contract_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Contract".to_string()))
    }

    /// Register a product commitment on a contract
    pub async fn add_product_contract(
        &self,
        contract_id: Uuid,
        input: AddProductInput,
    ) -> AppResult<ProductInventory> {
        validate_positive(input.contract_quantity)
            .map_err(|e| AppError::validation("contract_quantity", e))?;

        let status = self.contract_status(contract_id).await?;
        Self::ensure_active(status)?;

        let product_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(input.product_id)
                .fetch_one(&self.db)
                .await?;
        if !product_exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let duplicate = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM product_inventories \
             WHERE product_id = $1 AND contract_id = $2)",
        )
        .bind(input.product_id)
        .bind(contract_id)
        .fetch_one(&self.db)
        .await?;
        if duplicate {
            return Err(AppError::conflict(
                "product",
                "Product is already committed on this contract",
            ));
        }

        let inventory = sqlx::query_as::<_, ProductInventory>(&format!(
            r#"
            INSERT INTO product_inventories (product_id, contract_id, contract_quantity, note)
            VALUES ($1, $2, $3, $4)
            RETURNING {INVENTORY_COLUMNS}
            "#,
        ))
        .bind(input.product_id)
        .bind(contract_id)
        .bind(input.contract_quantity)
        .bind(&input.note)
        .fetch_one(&self.db)
        .await?;

        Ok(inventory)
    }

    /// Record an issue or refund movement against a commitment
    pub async fn record_movement(
        &self,
        inventory_id: Uuid,
        input: RecordMovementInput,
    ) -> AppResult<InventoryMovement> {
        validate_positive(input.quantity).map_err(|e| AppError::validation("quantity", e))?;

        let mut tx = self.db.begin().await?;

        let inventory = Self::lock_inventory(&mut tx, inventory_id).await?;
        let status = Self::contract_status_tx(&mut tx, inventory.contract_id).await?;
        Self::ensure_active(status)?;

        let new_take_quantity = apply_movement(
            inventory.take_quantity,
            inventory.contract_quantity,
            input.entry_type,
            input.quantity,
        )
        .map_err(|e| AppError::conflict("quantity", e))?;

        let movement = sqlx::query_as::<_, InventoryMovement>(&format!(
            r#"
            INSERT INTO inventory_movements (
                product_inventory_id, entry_type, quantity, give_date, note
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {MOVEMENT_COLUMNS}
            "#,
        ))
        .bind(inventory_id)
        .bind(input.entry_type)
        .bind(input.quantity)
        .bind(input.give_date)
        .bind(&input.note)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE product_inventories SET take_quantity = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(new_take_quantity)
        .bind(inventory_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(movement)
    }

    /// Change a commitment's quantity or note
    pub async fn update_inventory(
        &self,
        inventory_id: Uuid,
        input: UpdateInventoryInput,
    ) -> AppResult<ProductInventory> {
        let mut tx = self.db.begin().await?;

        let existing = Self::lock_inventory(&mut tx, inventory_id).await?;
        let status = Self::contract_status_tx(&mut tx, existing.contract_id).await?;
        Self::ensure_active(status)?;

        let contract_quantity = input
            .contract_quantity
            .unwrap_or(existing.contract_quantity);
        let note = input.note.clone().or_else(|| existing.note.clone());

        if contract_quantity == existing.contract_quantity && note == existing.note {
            return Err(AppError::conflict("inventory", "Nothing changed"));
        }

        validate_positive(contract_quantity)
            .map_err(|e| AppError::validation("contract_quantity", e))?;
        validate_commitment_change(contract_quantity, existing.take_quantity)
            .map_err(|e| AppError::conflict("contract_quantity", e))?;

        let updated = sqlx::query_as::<_, ProductInventory>(&format!(
            r#"
            UPDATE product_inventories
            SET contract_quantity = $1, note = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING {INVENTORY_COLUMNS}
            "#,
        ))
        .bind(contract_quantity)
        .bind(&note)
        .bind(inventory_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Delete a commitment and its movement history
    pub async fn delete_inventory(&self, inventory_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let inventory = Self::lock_inventory(&mut tx, inventory_id).await?;
        let status = Self::contract_status_tx(&mut tx, inventory.contract_id).await?;
        Self::ensure_active(status)?;

        sqlx::query("DELETE FROM inventory_movements WHERE product_inventory_id = $1")
            .bind(inventory_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM product_inventories WHERE id = $1")
            .bind(inventory_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Inventory rows for a contract, with committed/outstanding totals
    pub async fn get_inventory(&self, contract_id: Uuid) -> AppResult<InventoryOverview> {
        // NotFound before an empty overview for a nonexistent contract
        self.contract_status(contract_id).await?;

        let items = sqlx::query_as::<_, ProductInventory>(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM product_inventories WHERE contract_id = $1 \
             ORDER BY created_at",
        ))
        .bind(contract_id)
        .fetch_all(&self.db)
        .await?;

        let (total_count, last_count) = sqlx::query_as::<_, (Decimal, Decimal)>(
            "SELECT COALESCE(SUM(contract_quantity), 0), \
                    COALESCE(SUM(contract_quantity - take_quantity), 0) \
             FROM product_inventories WHERE contract_id = $1",
        )
        .bind(contract_id)
        .fetch_one(&self.db)
        .await?;

        Ok(InventoryOverview {
            items,
            totals: InventoryTotals {
                total_count,
                last_count,
            },
        })
    }

    /// Movement history for a commitment, newest first
    pub async fn list_movements(&self, inventory_id: Uuid) -> AppResult<Vec<InventoryMovement>> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM product_inventories WHERE id = $1)",
        )
        .bind(inventory_id)
        .fetch_one(&self.db)
        .await?;
        if !exists {
            return Err(AppError::NotFound("Inventory".to_string()));
        }

        let movements = sqlx::query_as::<_, InventoryMovement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM inventory_movements WHERE product_inventory_id = $1 \
             ORDER BY give_date DESC, created_at DESC",
        ))
        .bind(inventory_id)
        .fetch_all(&self.db)
        .await?;

        Ok(movements)
    }
}
