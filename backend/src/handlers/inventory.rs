//! HTTP handlers for inventory endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::inventory::{
    AddProductInput, InventoryOverview, InventoryService, RecordMovementInput,
    UpdateInventoryInput,
};
use crate::AppState;
use shared::models::{InventoryMovement, ProductInventory};

/// Commit a product to a contract
pub async fn add_product_contract(
    State(state): State<AppState>,
    Path(contract_id): Path<Uuid>,
    Json(input): Json<AddProductInput>,
) -> AppResult<Json<ProductInventory>> {
    let service = InventoryService::new(state.db);
    let inventory = service.add_product_contract(contract_id, input).await?;
    Ok(Json(inventory))
}

/// Inventory rows and totals for a contract
pub async fn get_inventory(
    State(state): State<AppState>,
    Path(contract_id): Path<Uuid>,
) -> AppResult<Json<InventoryOverview>> {
    let service = InventoryService::new(state.db);
    let overview = service.get_inventory(contract_id).await?;
    Ok(Json(overview))
}

/// Record an issue or refund movement
pub async fn record_movement(
    State(state): State<AppState>,
    Path(inventory_id): Path<Uuid>,
    Json(input): Json<RecordMovementInput>,
) -> AppResult<Json<InventoryMovement>> {
    let service = InventoryService::new(state.db);
    let movement = service.record_movement(inventory_id, input).await?;
    Ok(Json(movement))
}

/// Movement history for a commitment
pub async fn list_movements(
    State(state): State<AppState>,
    Path(inventory_id): Path<Uuid>,
) -> AppResult<Json<Vec<InventoryMovement>>> {
    let service = InventoryService::new(state.db);
    let movements = service.list_movements(inventory_id).await?;
    Ok(Json(movements))
}

/// Change a commitment's quantity or note
pub async fn update_inventory(
    State(state): State<AppState>,
    Path(inventory_id): Path<Uuid>,
    Json(input): Json<UpdateInventoryInput>,
) -> AppResult<Json<ProductInventory>> {
    let service = InventoryService::new(state.db);
    let inventory = service.update_inventory(inventory_id, input).await?;
    Ok(Json(inventory))
}

/// Delete a commitment and its history
pub async fn delete_inventory(
    State(state): State<AppState>,
    Path(inventory_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = InventoryService::new(state.db);
    service.delete_inventory(inventory_id).await?;
    Ok(Json(()))
}
