//! Contract attachment models
//!
//! File volumes carry bytes in object storage; file links only reference an
//! external URL. Both block contract deletion until removed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored file attached to a contract
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileVolume {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub file_name: String,
    /// Key of the object in storage
    pub object_key: String,
    pub size_bytes: i64,
    pub content_type: String,
    pub uploaded_at: DateTime<Utc>,
}

/// An external link attached to a contract
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileLink {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub name: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// Gate contract deletion on live attachments
pub fn validate_no_attachments(
    volume_count: i64,
    link_count: i64,
) -> Result<(), &'static str> {
    if volume_count > 0 || link_count > 0 {
        return Err("Contract has attached files or links; remove them first");
    }
    Ok(())
}
