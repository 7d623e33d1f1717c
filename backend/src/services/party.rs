//! Party service: applicants, purchasers, and companies referenced by
//! contracts

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::models::{Party, PartyKind};

const PARTY_COLUMNS: &str = "id, kind, name, contact, note, created_at, updated_at";

/// Party service
#[derive(Clone)]
pub struct PartyService {
    db: PgPool,
}

/// Input for creating a party
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePartyInput {
    pub kind: PartyKind,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub contact: Option<String>,
    pub note: Option<String>,
}

/// Input for updating a party; the kind is immutable
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePartyInput {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub note: Option<String>,
}

/// Query parameters for party listings
#[derive(Debug, Default, Deserialize)]
pub struct PartyListQuery {
    pub kind: Option<PartyKind>,
}

impl PartyService {
    /// Create a new PartyService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a party
    pub async fn create_party(&self, input: CreatePartyInput) -> AppResult<Party> {
        input.validate()?;

        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM parties WHERE kind = $1 AND name = $2)",
        )
        .bind(input.kind)
        .bind(&input.name)
        .fetch_one(&self.db)
        .await?;
        if taken {
            return Err(AppError::DuplicateEntry("party name".to_string()));
        }

        let party = sqlx::query_as::<_, Party>(&format!(
            r#"
            INSERT INTO parties (kind, name, contact, note)
            VALUES ($1, $2, $3, $4)
            RETURNING {PARTY_COLUMNS}
            "#,
        ))
        .bind(input.kind)
        .bind(&input.name)
        .bind(&input.contact)
        .bind(&input.note)
        .fetch_one(&self.db)
        .await?;

        Ok(party)
    }

    /// Update a party
    pub async fn update_party(&self, party_id: Uuid, input: UpdatePartyInput) -> AppResult<Party> {
        let existing = self.get_party(party_id).await?;

        let name = input.name.unwrap_or_else(|| existing.name.clone());
        let contact = input.contact.clone().or_else(|| existing.contact.clone());
        let note = input.note.clone().or_else(|| existing.note.clone());

        if name != existing.name {
            let taken = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM parties WHERE kind = $1 AND name = $2 AND id <> $3)",
            )
            .bind(existing.kind)
            .bind(&name)
            .bind(party_id)
            .fetch_one(&self.db)
            .await?;
            if taken {
                return Err(AppError::DuplicateEntry("party name".to_string()));
            }
        }

        let party = sqlx::query_as::<_, Party>(&format!(
            r#"
            UPDATE parties
            SET name = $1, contact = $2, note = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING {PARTY_COLUMNS}
            "#,
        ))
        .bind(&name)
        .bind(&contact)
        .bind(&note)
        .bind(party_id)
        .fetch_one(&self.db)
        .await?;

        Ok(party)
    }

    /// Delete a party; blocked while any contract references it
    pub async fn delete_party(&self, party_id: Uuid) -> AppResult<()> {
        let referenced = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM contracts \
             WHERE applicant_id = $1 OR purchaser_id = $1 OR company_id = $1)",
        )
        .bind(party_id)
        .fetch_one(&self.db)
        .await?;
        if referenced {
            return Err(AppError::conflict(
                "contracts",
                "Party is referenced by existing contracts",
            ));
        }

        let result = sqlx::query("DELETE FROM parties WHERE id = $1")
            .bind(party_id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Party".to_string()));
        }

        Ok(())
    }

    /// Get a party by ID
    pub async fn get_party(&self, party_id: Uuid) -> AppResult<Party> {
        sqlx::query_as::<_, Party>(&format!(
            "SELECT {PARTY_COLUMNS} FROM parties WHERE id = $1",
        ))
        .bind(party_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Party".to_string()))
    }

    /// List parties, optionally restricted to one kind
    pub async fn list_parties(&self, query: PartyListQuery) -> AppResult<Vec<Party>> {
        let parties = match query.kind {
            Some(kind) => {
                sqlx::query_as::<_, Party>(&format!(
                    "SELECT {PARTY_COLUMNS} FROM parties WHERE kind = $1 ORDER BY name",
                ))
                .bind(kind)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, Party>(&format!(
                    "SELECT {PARTY_COLUMNS} FROM parties ORDER BY kind, name",
                ))
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(parties)
    }
}
