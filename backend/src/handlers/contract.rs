//! HTTP handlers for contract endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::contract::{
    ChangeStatusInput, ContractListQuery, ContractService, CreateContractInput,
    UpdateContractInput,
};
use crate::AppState;
use shared::models::Contract;
use shared::types::Page;

/// Create a contract
pub async fn create_contract(
    State(state): State<AppState>,
    Json(input): Json<CreateContractInput>,
) -> AppResult<Json<Contract>> {
    let service = ContractService::new(state.db);
    let contract = service.create_contract(input).await?;
    Ok(Json(contract))
}

/// Get a contract by ID
pub async fn get_contract(
    State(state): State<AppState>,
    Path(contract_id): Path<Uuid>,
) -> AppResult<Json<Contract>> {
    let service = ContractService::new(state.db);
    let contract = service.get_contract(contract_id).await?;
    Ok(Json(contract))
}

/// List contracts with pagination and optional search
pub async fn list_contracts(
    State(state): State<AppState>,
    Query(query): Query<ContractListQuery>,
) -> AppResult<Json<Page<Contract>>> {
    let service = ContractService::new(state.db);
    let page = service.list_contracts(query).await?;
    Ok(Json(page))
}

/// Update contract fields
pub async fn update_contract(
    State(state): State<AppState>,
    Path(contract_id): Path<Uuid>,
    Json(input): Json<UpdateContractInput>,
) -> AppResult<Json<Contract>> {
    let service = ContractService::new(state.db);
    let contract = service.update_contract(contract_id, input).await?;
    Ok(Json(contract))
}

/// Change contract status
pub async fn change_contract_status(
    State(state): State<AppState>,
    Path(contract_id): Path<Uuid>,
    Json(input): Json<ChangeStatusInput>,
) -> AppResult<Json<Contract>> {
    let service = ContractService::new(state.db);
    let contract = service.change_status(contract_id, input).await?;
    Ok(Json(contract))
}

/// Delete a contract and its ledgers
pub async fn delete_contract(
    State(state): State<AppState>,
    Path(contract_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = ContractService::new(state.db);
    service.delete_contract(contract_id).await?;
    Ok(Json(()))
}
