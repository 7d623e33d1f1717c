//! HTTP handlers for currency endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::currency::{CreateCurrencyInput, CurrencyService, UpdateCurrencyInput};
use crate::AppState;
use shared::models::Currency;

/// Create a currency
pub async fn create_currency(
    State(state): State<AppState>,
    Json(input): Json<CreateCurrencyInput>,
) -> AppResult<Json<Currency>> {
    let service = CurrencyService::new(state.db);
    let currency = service.create_currency(input).await?;
    Ok(Json(currency))
}

/// Get a currency by ID
pub async fn get_currency(
    State(state): State<AppState>,
    Path(currency_id): Path<Uuid>,
) -> AppResult<Json<Currency>> {
    let service = CurrencyService::new(state.db);
    let currency = service.get_currency(currency_id).await?;
    Ok(Json(currency))
}

/// List all currencies
pub async fn list_currencies(State(state): State<AppState>) -> AppResult<Json<Vec<Currency>>> {
    let service = CurrencyService::new(state.db);
    let currencies = service.list_currencies().await?;
    Ok(Json(currencies))
}

/// Update a currency
pub async fn update_currency(
    State(state): State<AppState>,
    Path(currency_id): Path<Uuid>,
    Json(input): Json<UpdateCurrencyInput>,
) -> AppResult<Json<Currency>> {
    let service = CurrencyService::new(state.db);
    let currency = service.update_currency(currency_id, input).await?;
    Ok(Json(currency))
}

/// Delete a currency
pub async fn delete_currency(
    State(state): State<AppState>,
    Path(currency_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = CurrencyService::new(state.db);
    service.delete_currency(currency_id).await?;
    Ok(Json(()))
}
