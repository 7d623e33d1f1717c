//! Inventory commitment model and quantity ledger arithmetic

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Type of an inventory ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "inventory_entry_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InventoryEntryType {
    Issued,
    Refund,
}

impl InventoryEntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InventoryEntryType::Issued => "issued",
            InventoryEntryType::Refund => "refund",
        }
    }
}

/// A per-product delivery commitment on a contract
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductInventory {
    pub id: Uuid,
    pub product_id: Uuid,
    pub contract_id: Uuid,
    /// Committed quantity
    pub contract_quantity: Decimal,
    /// Running delivered total; maintained only by the movement ledger
    pub take_quantity: Decimal,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductInventory {
    pub fn fully_taken(&self) -> bool {
        self.take_quantity >= self.contract_quantity
    }
}

/// A movement against an inventory commitment
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InventoryMovement {
    pub id: Uuid,
    pub product_inventory_id: Uuid,
    pub entry_type: InventoryEntryType,
    pub quantity: Decimal,
    pub give_date: NaiveDate,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Apply a movement to the running delivered total
pub fn apply_movement(
    take_quantity: Decimal,
    contract_quantity: Decimal,
    entry_type: InventoryEntryType,
    quantity: Decimal,
) -> Result<Decimal, &'static str> {
    match entry_type {
        InventoryEntryType::Issued => {
            let next = take_quantity + quantity;
            if next > contract_quantity {
                return Err("Delivery would exceed the committed quantity");
            }
            Ok(next)
        }
        InventoryEntryType::Refund => {
            let next = take_quantity - quantity;
            if next < Decimal::ZERO {
                return Err("Refund would drive the delivered quantity negative");
            }
            Ok(next)
        }
    }
}

/// Check a commitment change against already-delivered quantity
pub fn validate_commitment_change(
    new_contract_quantity: Decimal,
    take_quantity: Decimal,
) -> Result<(), &'static str> {
    if new_contract_quantity < take_quantity {
        return Err("Committed quantity cannot fall below the delivered quantity");
    }
    Ok(())
}

/// Aggregates over a contract's inventory rows
#[derive(Debug, Clone, Serialize)]
pub struct InventoryTotals {
    /// Sum of committed quantities
    pub total_count: Decimal,
    /// Committed minus delivered, summed
    pub last_count: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_issue_within_commitment() {
        assert_eq!(
            apply_movement(dec("0"), dec("50"), InventoryEntryType::Issued, dec("50")).unwrap(),
            dec("50")
        );
    }

    #[test]
    fn test_issue_over_commitment_rejected() {
        assert!(apply_movement(dec("0"), dec("50"), InventoryEntryType::Issued, dec("60")).is_err());
        assert!(apply_movement(dec("45"), dec("50"), InventoryEntryType::Issued, dec("6")).is_err());
    }

    #[test]
    fn test_refund_below_zero_rejected() {
        assert!(apply_movement(dec("10"), dec("50"), InventoryEntryType::Refund, dec("11")).is_err());
        assert_eq!(
            apply_movement(dec("10"), dec("50"), InventoryEntryType::Refund, dec("10")).unwrap(),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_fractional_quantities_preserved() {
        let taken =
            apply_movement(dec("0.25"), dec("1.5"), InventoryEntryType::Issued, dec("0.75"))
                .unwrap();
        assert_eq!(taken, dec("1.00"));
    }

    #[test]
    fn test_commitment_change_floor() {
        assert!(validate_commitment_change(dec("40"), dec("50")).is_err());
        assert!(validate_commitment_change(dec("50"), dec("50")).is_ok());
        assert!(validate_commitment_change(dec("60"), dec("50")).is_ok());
    }

    #[test]
    fn test_fully_taken() {
        let row = ProductInventory {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            contract_id: Uuid::new_v4(),
            contract_quantity: dec("50"),
            take_quantity: dec("50"),
            note: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(row.fully_taken());
    }
}
