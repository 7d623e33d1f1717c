//! HTTP handlers for party endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::party::{CreatePartyInput, PartyListQuery, PartyService, UpdatePartyInput};
use crate::AppState;
use shared::models::Party;

/// Create a party
pub async fn create_party(
    State(state): State<AppState>,
    Json(input): Json<CreatePartyInput>,
) -> AppResult<Json<Party>> {
    let service = PartyService::new(state.db);
    let party = service.create_party(input).await?;
    Ok(Json(party))
}

/// Get a party by ID
pub async fn get_party(
    State(state): State<AppState>,
    Path(party_id): Path<Uuid>,
) -> AppResult<Json<Party>> {
    let service = PartyService::new(state.db);
    let party = service.get_party(party_id).await?;
    Ok(Json(party))
}

/// List parties, optionally filtered by kind
pub async fn list_parties(
    State(state): State<AppState>,
    Query(query): Query<PartyListQuery>,
) -> AppResult<Json<Vec<Party>>> {
    let service = PartyService::new(state.db);
    let parties = service.list_parties(query).await?;
    Ok(Json(parties))
}

/// Update a party
pub async fn update_party(
    State(state): State<AppState>,
    Path(party_id): Path<Uuid>,
    Json(input): Json<UpdatePartyInput>,
) -> AppResult<Json<Party>> {
    let service = PartyService::new(state.db);
    let party = service.update_party(party_id, input).await?;
    Ok(Json(party))
}

/// Delete a party
pub async fn delete_party(
    State(state): State<AppState>,
    Path(party_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = PartyService::new(state.db);
    service.delete_party(party_id).await?;
    Ok(Json(()))
}
