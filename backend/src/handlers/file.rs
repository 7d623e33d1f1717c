//! HTTP handlers for contract file volumes and links

use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::file::{CreateLinkInput, FileService};
use crate::AppState;
use shared::models::{FileLink, FileVolume};

/// Upload a file volume for a contract (multipart form, "file" field)
pub async fn upload_file(
    State(state): State<AppState>,
    Path(contract_id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<Json<FileVolume>> {
    let service = FileService::new(state.db, state.storage);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation("file", e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::validation("file", e.to_string()))?
            .to_vec();

        let volume = service
            .upload_file(contract_id, file_name, content_type, bytes)
            .await?;
        return Ok(Json(volume));
    }

    Err(AppError::validation("file", "Missing file field"))
}

/// Download a file volume's bytes
pub async fn download_file(
    State(state): State<AppState>,
    Path(file_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = FileService::new(state.db, state.storage);
    let (volume, bytes) = service.download_file(file_id).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&volume.content_type)
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    let disposition = format!("attachment; filename=\"{}\"", volume.file_name);
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .unwrap_or(HeaderValue::from_static("attachment")),
    );

    Ok((headers, bytes))
}

/// Delete a file volume and its stored object
pub async fn delete_file(
    State(state): State<AppState>,
    Path(file_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = FileService::new(state.db, state.storage);
    service.delete_file(file_id).await?;
    Ok(Json(()))
}

/// List file volumes attached to a contract
pub async fn list_files(
    State(state): State<AppState>,
    Path(contract_id): Path<Uuid>,
) -> AppResult<Json<Vec<FileVolume>>> {
    let service = FileService::new(state.db, state.storage);
    let volumes = service.list_files(contract_id).await?;
    Ok(Json(volumes))
}

/// Attach an external link to a contract
pub async fn create_link(
    State(state): State<AppState>,
    Path(contract_id): Path<Uuid>,
    Json(input): Json<CreateLinkInput>,
) -> AppResult<Json<FileLink>> {
    let service = FileService::new(state.db, state.storage);
    let link = service.create_link(contract_id, input).await?;
    Ok(Json(link))
}

/// Delete an external link
pub async fn delete_link(
    State(state): State<AppState>,
    Path(link_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = FileService::new(state.db, state.storage);
    service.delete_link(link_id).await?;
    Ok(Json(()))
}

/// List external links attached to a contract
pub async fn list_links(
    State(state): State<AppState>,
    Path(contract_id): Path<Uuid>,
) -> AppResult<Json<Vec<FileLink>>> {
    let service = FileService::new(state.db, state.storage);
    let links = service.list_links(contract_id).await?;
    Ok(Json(links))
}
