//! File service: contract file volumes and external links
//!
//! Volumes are written storage-first: the metadata row only exists once the
//! object store accepted the bytes, and is removed before the object delete
//! is attempted.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::external::storage::StorageClient;
use shared::models::{FileLink, FileVolume};

const VOLUME_COLUMNS: &str =
    "id, contract_id, file_name, object_key, size_bytes, content_type, uploaded_at";

const LINK_COLUMNS: &str = "id, contract_id, name, url, created_at";

/// File service
#[derive(Clone)]
pub struct FileService {
    db: PgPool,
    storage: StorageClient,
}

/// Input for attaching an external link
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(url(message = "URL must be a valid URL"))]
    pub url: String,
}

impl FileService {
    /// Create a new FileService instance
    pub fn new(db: PgPool, storage: StorageClient) -> Self {
        Self { db, storage }
    }

    async fn ensure_contract(&self, contract_id: Uuid) -> AppResult<()> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM contracts WHERE id = $1)")
                .bind(contract_id)
                .fetch_one(&self.db)
                .await?;
        if !exists {
            return Err(AppError::NotFound("Contract".to_string()));
        }
        Ok(())
    }

    /// Upload a file volume for a contract
    pub async fn upload_file(
        &self,
        contract_id: Uuid,
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    ) -> AppResult<FileVolume> {
        if file_name.is_empty() {
            return Err(AppError::validation("file_name", "File name is required"));
        }
        self.ensure_contract(contract_id).await?;

        let object_key = format!("{}/{}", contract_id, Uuid::new_v4());
        let size_bytes = bytes.len() as i64;

        self.storage
            .put_object(&object_key, &content_type, bytes)
            .await?;

        let volume = sqlx::query_as::<_, FileVolume>(&format!(
            r#"
            INSERT INTO file_volumes (contract_id, file_name, object_key, size_bytes, content_type)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {VOLUME_COLUMNS}
            "#,
        ))
        .bind(contract_id)
        .bind(&file_name)
        .bind(&object_key)
        .bind(size_bytes)
        .bind(&content_type)
        .fetch_one(&self.db)
        .await?;

        Ok(volume)
    }

    /// Fetch a file volume's metadata and bytes
    pub async fn download_file(&self, file_id: Uuid) -> AppResult<(FileVolume, Vec<u8>)> {
        let volume = self.get_file(file_id).await?;
        let bytes = self.storage.get_object(&volume.object_key).await?;
        Ok((volume, bytes))
    }

    /// Delete a file volume and its stored object
    pub async fn delete_file(&self, file_id: Uuid) -> AppResult<()> {
        let volume = self.get_file(file_id).await?;

        sqlx::query("DELETE FROM file_volumes WHERE id = $1")
            .bind(file_id)
            .execute(&self.db)
            .await?;

        self.storage.remove_object(&volume.object_key).await?;

        Ok(())
    }

    /// Get file volume metadata by ID
    pub async fn get_file(&self, file_id: Uuid) -> AppResult<FileVolume> {
        sqlx::query_as::<_, FileVolume>(&format!(
            "SELECT {VOLUME_COLUMNS} FROM file_volumes WHERE id = $1",
        ))
        .bind(file_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("File".to_string()))
    }

    /// List file volumes attached to a contract
    pub async fn list_files(&self, contract_id: Uuid) -> AppResult<Vec<FileVolume>> {
        self.ensure_contract(contract_id).await?;

        let volumes = sqlx::query_as::<_, FileVolume>(&format!(
            "SELECT {VOLUME_COLUMNS} FROM file_volumes WHERE contract_id = $1 \
             ORDER BY uploaded_at DESC",
        ))
        .bind(contract_id)
        .fetch_all(&self.db)
        .await?;

        Ok(volumes)
    }

    /// Attach an external link to a contract
    pub async fn create_link(
        &self,
        contract_id: Uuid,
        input: CreateLinkInput,
    ) -> AppResult<FileLink> {
        input.validate()?;
        self.ensure_contract(contract_id).await?;

        let link = sqlx::query_as::<_, FileLink>(&format!(
            r#"
            INSERT INTO file_links (contract_id, name, url)
            VALUES ($1, $2, $3)
            RETURNING {LINK_COLUMNS}
            "#,
        ))
        .bind(contract_id)
        .bind(&input.name)
        .bind(&input.url)
        .fetch_one(&self.db)
        .await?;

        Ok(link)
    }

    /// Delete an external link
    pub async fn delete_link(&self, link_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM file_links WHERE id = $1")
            .bind(link_id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Link".to_string()));
        }

        Ok(())
    }

    /// List external links attached to a contract
    pub async fn list_links(&self, contract_id: Uuid) -> AppResult<Vec<FileLink>> {
        self.ensure_contract(contract_id).await?;

        let links = sqlx::query_as::<_, FileLink>(&format!(
            "SELECT {LINK_COLUMNS} FROM file_links WHERE contract_id = $1 ORDER BY created_at DESC",
        ))
        .bind(contract_id)
        .fetch_all(&self.db)
        .await?;

        Ok(links)
    }
}
