//! HTTP handlers for payment ledger endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::payment::{CreatePaymentInput, FinishPaymentInput, PaymentService};
use crate::AppState;
use shared::models::ContractPayment;

/// Record a payment against a contract
pub async fn create_payment(
    State(state): State<AppState>,
    Path(contract_id): Path<Uuid>,
    Json(input): Json<CreatePaymentInput>,
) -> AppResult<Json<ContractPayment>> {
    let service = PaymentService::new(state.db);
    let payment = service.create_payment(contract_id, input).await?;
    Ok(Json(payment))
}

/// Cancel a payment (soft-cancel; reverses its ledger effect)
pub async fn cancel_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
) -> AppResult<Json<ContractPayment>> {
    let service = PaymentService::new(state.db);
    let payment = service.cancel_payment(payment_id).await?;
    Ok(Json(payment))
}

/// Pay off the remaining balance in one entry
pub async fn finish_payment(
    State(state): State<AppState>,
    Path(contract_id): Path<Uuid>,
    Json(input): Json<FinishPaymentInput>,
) -> AppResult<Json<ContractPayment>> {
    let service = PaymentService::new(state.db);
    let payment = service.finish_payment(contract_id, input).await?;
    Ok(Json(payment))
}

/// Payment history for a contract
pub async fn list_payments(
    State(state): State<AppState>,
    Path(contract_id): Path<Uuid>,
) -> AppResult<Json<Vec<ContractPayment>>> {
    let service = PaymentService::new(state.db);
    let payments = service.list_payments(contract_id).await?;
    Ok(Json(payments))
}
