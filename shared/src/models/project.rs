//! Project model, the owning aggregate for contracts

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A project bounding its contracts' date ranges and currency
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub currency_id: Uuid,
    pub start_date: NaiveDate,
    /// Open-ended projects have no finish date
    pub finish_date: Option<NaiveDate>,
    pub is_open: bool,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
