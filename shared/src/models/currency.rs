//! Currency reference model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A currency contracts and payments are denominated in
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Currency {
    pub id: Uuid,
    /// ISO-style code, e.g. "USD"
    pub code: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
