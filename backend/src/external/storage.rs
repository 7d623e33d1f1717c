//! Object storage client for contract file volumes
//!
//! Talks to an S3-style HTTP object store (MinIO in development). Only the
//! three operations the file service needs are exposed.

use reqwest::{header, Client, StatusCode};

use crate::config::StorageConfig;
use crate::error::{AppError, AppResult};

/// Object storage client
#[derive(Clone)]
pub struct StorageClient {
    client: Client,
    endpoint: String,
    bucket: String,
    access_token: String,
}

impl StorageClient {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            access_token: config.access_token.clone(),
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key)
    }

    /// Upload an object; overwrites any existing object under the same key
    pub async fn put_object(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> AppResult<()> {
        let response = self
            .client
            .put(self.object_url(key))
            .bearer_auth(&self.access_token)
            .header(header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::StorageError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::StorageError(format!(
                "upload of {} failed with status {}",
                key,
                response.status()
            )));
        }
        Ok(())
    }

    /// Fetch an object's bytes
    pub async fn get_object(&self, key: &str) -> AppResult<Vec<u8>> {
        let response = self
            .client
            .get(self.object_url(key))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| AppError::StorageError(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(AppError::NotFound("File object".to_string())),
            status if status.is_success() => {
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| AppError::StorageError(e.to_string()))?;
                Ok(bytes.to_vec())
            }
            status => Err(AppError::StorageError(format!(
                "download of {} failed with status {}",
                key, status
            ))),
        }
    }

    /// Delete an object; deleting a missing object is not an error
    pub async fn remove_object(&self, key: &str) -> AppResult<()> {
        let response = self
            .client
            .delete(self.object_url(key))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| AppError::StorageError(e.to_string()))?;

        if !response.status().is_success() && response.status() != StatusCode::NOT_FOUND {
            return Err(AppError::StorageError(format!(
                "delete of {} failed with status {}",
                key,
                response.status()
            )));
        }
        Ok(())
    }
}
