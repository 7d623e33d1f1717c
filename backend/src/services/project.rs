//! Project service: the owning aggregate for contracts

use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::Project;
use shared::types::{Page, Pagination, ProjectSearchField};

const PROJECT_COLUMNS: &str =
    "id, name, currency_id, start_date, finish_date, is_open, note, created_at, updated_at";

/// Project service
#[derive(Clone)]
pub struct ProjectService {
    db: PgPool,
}

/// Input for creating a project
#[derive(Debug, Deserialize)]
pub struct CreateProjectInput {
    pub name: String,
    pub currency_id: Uuid,
    pub start_date: NaiveDate,
    pub finish_date: Option<NaiveDate>,
    pub note: Option<String>,
}

/// Input for updating a project; absent fields stay unchanged
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProjectInput {
    pub name: Option<String>,
    pub currency_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub finish_date: Option<NaiveDate>,
    pub is_open: Option<bool>,
    pub note: Option<String>,
}

/// Query parameters for project listings
#[derive(Debug, Default, Deserialize)]
pub struct ProjectListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search_by: Option<ProjectSearchField>,
    pub search_value: Option<String>,
}

impl ProjectService {
    /// Create a new ProjectService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn ensure_currency(&self, currency_id: Uuid) -> AppResult<()> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM currencies WHERE id = $1)")
                .bind(currency_id)
                .fetch_one(&self.db)
                .await?;
        if !exists {
            return Err(AppError::NotFound("Currency".to_string()));
        }
        Ok(())
    }

    fn validate_window(
        start_date: NaiveDate,
        finish_date: Option<NaiveDate>,
    ) -> AppResult<()> {
        if let Some(finish) = finish_date {
            if finish < start_date {
                return Err(AppError::conflict(
                    "dates",
                    "Project finish date precedes its start date",
                ));
            }
        }
        Ok(())
    }

    /// Create a project
    pub async fn create_project(&self, input: CreateProjectInput) -> AppResult<Project> {
        self.ensure_currency(input.currency_id).await?;
        Self::validate_window(input.start_date, input.finish_date)?;

        let taken =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM projects WHERE name = $1)")
                .bind(&input.name)
                .fetch_one(&self.db)
                .await?;
        if taken {
            return Err(AppError::DuplicateEntry("project name".to_string()));
        }

        let project = sqlx::query_as::<_, Project>(&format!(
            r#"
            INSERT INTO projects (name, currency_id, start_date, finish_date, note)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PROJECT_COLUMNS}
            "#,
        ))
        .bind(&input.name)
        .bind(input.currency_id)
        .bind(input.start_date)
        .bind(input.finish_date)
        .bind(&input.note)
        .fetch_one(&self.db)
        .await?;

        Ok(project)
    }

    /// Update a project; the currency is immutable once contracts exist
    pub async fn update_project(
        &self,
        project_id: Uuid,
        input: UpdateProjectInput,
    ) -> AppResult<Project> {
        let existing = self.get_project(project_id).await?;

        let name = input.name.unwrap_or_else(|| existing.name.clone());
        let currency_id = input.currency_id.unwrap_or(existing.currency_id);
        let start_date = input.start_date.unwrap_or(existing.start_date);
        let finish_date = input.finish_date.or(existing.finish_date);
        let is_open = input.is_open.unwrap_or(existing.is_open);
        let note = input.note.clone().or_else(|| existing.note.clone());

        if currency_id != existing.currency_id {
            let has_contracts = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM contracts WHERE project_id = $1)",
            )
            .bind(project_id)
            .fetch_one(&self.db)
            .await?;
            if has_contracts {
                return Err(AppError::conflict(
                    "currency_id",
                    "Project currency cannot change once contracts exist",
                ));
            }
            self.ensure_currency(currency_id).await?;
        }

        if name != existing.name {
            let taken = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM projects WHERE name = $1 AND id <> $2)",
            )
            .bind(&name)
            .bind(project_id)
            .fetch_one(&self.db)
            .await?;
            if taken {
                return Err(AppError::DuplicateEntry("project name".to_string()));
            }
        }

        Self::validate_window(start_date, finish_date)?;

        let project = sqlx::query_as::<_, Project>(&format!(
            r#"
            UPDATE projects
            SET name = $1, currency_id = $2, start_date = $3, finish_date = $4,
                is_open = $5, note = $6, updated_at = NOW()
            WHERE id = $7
            RETURNING {PROJECT_COLUMNS}
            "#,
        ))
        .bind(&name)
        .bind(currency_id)
        .bind(start_date)
        .bind(finish_date)
        .bind(is_open)
        .bind(&note)
        .bind(project_id)
        .fetch_one(&self.db)
        .await?;

        Ok(project)
    }

    /// Delete a project; blocked while it still owns contracts
    pub async fn delete_project(&self, project_id: Uuid) -> AppResult<()> {
        let has_contracts = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM contracts WHERE project_id = $1)",
        )
        .bind(project_id)
        .fetch_one(&self.db)
        .await?;
        if has_contracts {
            return Err(AppError::conflict(
                "contracts",
                "Project still owns contracts; delete them first",
            ));
        }

        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(project_id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Project".to_string()));
        }

        Ok(())
    }

    /// Get a project by ID
    pub async fn get_project(&self, project_id: Uuid) -> AppResult<Project> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1",
        ))
        .bind(project_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Project".to_string()))
    }

    /// List projects with pagination and an optional typed search filter
    pub async fn list_projects(&self, query: ProjectListQuery) -> AppResult<Page<Project>> {
        let defaults = Pagination::default();
        let pagination = Pagination {
            page: query.page.unwrap_or(defaults.page),
            per_page: query.per_page.unwrap_or(defaults.per_page),
        };

        match (query.search_by, query.search_value) {
            (Some(field), Some(value)) => {
                let pattern = format!("%{}%", value);
                let total = sqlx::query_scalar::<_, i64>(&format!(
                    "SELECT COUNT(*) FROM projects WHERE {} ILIKE $1",
                    field.column(),
                ))
                .bind(&pattern)
                .fetch_one(&self.db)
                .await?;

                let items = sqlx::query_as::<_, Project>(&format!(
                    "SELECT {PROJECT_COLUMNS} FROM projects WHERE {} ILIKE $1 \
                     ORDER BY created_at DESC LIMIT $2 OFFSET $3",
                    field.column(),
                ))
                .bind(&pattern)
                .bind(pagination.limit())
                .bind(pagination.offset())
                .fetch_all(&self.db)
                .await?;

                Ok(Page::new(items, total, pagination))
            }
            _ => {
                let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects")
                    .fetch_one(&self.db)
                    .await?;

                let items = sqlx::query_as::<_, Project>(&format!(
                    "SELECT {PROJECT_COLUMNS} FROM projects \
                     ORDER BY created_at DESC LIMIT $1 OFFSET $2",
                ))
                .bind(pagination.limit())
                .bind(pagination.offset())
                .fetch_all(&self.db)
                .await?;

                Ok(Page::new(items, total, pagination))
            }
        }
    }
}
