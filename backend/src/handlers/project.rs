//! HTTP handlers for project endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::project::{
    CreateProjectInput, ProjectListQuery, ProjectService, UpdateProjectInput,
};
use crate::AppState;
use shared::models::Project;
use shared::types::Page;

/// Create a project
pub async fn create_project(
    State(state): State<AppState>,
    Json(input): Json<CreateProjectInput>,
) -> AppResult<Json<Project>> {
    let service = ProjectService::new(state.db);
    let project = service.create_project(input).await?;
    Ok(Json(project))
}

/// Get a project by ID
pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> AppResult<Json<Project>> {
    let service = ProjectService::new(state.db);
    let project = service.get_project(project_id).await?;
    Ok(Json(project))
}

/// List projects with pagination and optional search
pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<ProjectListQuery>,
) -> AppResult<Json<Page<Project>>> {
    let service = ProjectService::new(state.db);
    let page = service.list_projects(query).await?;
    Ok(Json(page))
}

/// Update a project
pub async fn update_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(input): Json<UpdateProjectInput>,
) -> AppResult<Json<Project>> {
    let service = ProjectService::new(state.db);
    let project = service.update_project(project_id, input).await?;
    Ok(Json(project))
}

/// Delete a project
pub async fn delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = ProjectService::new(state.db);
    service.delete_project(project_id).await?;
    Ok(Json(()))
}
