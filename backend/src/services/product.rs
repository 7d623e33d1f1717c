//! Product reference-data service

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::Product;

const PRODUCT_COLUMNS: &str = "id, name, unit, note, created_at, updated_at";

/// Product service
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Input for creating a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub unit: String,
    pub note: Option<String>,
}

/// Input for updating a product; absent fields stay unchanged
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub note: Option<String>,
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a product
    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<Product> {
        let taken =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE name = $1)")
                .bind(&input.name)
                .fetch_one(&self.db)
                .await?;
        if taken {
            return Err(AppError::DuplicateEntry("product name".to_string()));
        }

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (name, unit, note)
            VALUES ($1, $2, $3)
            RETURNING {PRODUCT_COLUMNS}
            "#,
        ))
        .bind(&input.name)
        .bind(&input.unit)
        .bind(&input.note)
        .fetch_one(&self.db)
        .await?;

        Ok(product)
    }

    /// Update a product
    pub async fn update_product(
        &self,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> AppResult<Product> {
        let existing = self.get_product(product_id).await?;

        let name = input.name.unwrap_or_else(|| existing.name.clone());
        let unit = input.unit.unwrap_or_else(|| existing.unit.clone());
        let note = input.note.clone().or_else(|| existing.note.clone());

        if name != existing.name {
            let taken = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM products WHERE name = $1 AND id <> $2)",
            )
            .bind(&name)
            .bind(product_id)
            .fetch_one(&self.db)
            .await?;
            if taken {
                return Err(AppError::DuplicateEntry("product name".to_string()));
            }
        }

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products
            SET name = $1, unit = $2, note = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING {PRODUCT_COLUMNS}
            "#,
        ))
        .bind(&name)
        .bind(&unit)
        .bind(&note)
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        Ok(product)
    }

    /// Delete a product; blocked while committed on any contract
    pub async fn delete_product(&self, product_id: Uuid) -> AppResult<()> {
        let referenced = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM product_inventories WHERE product_id = $1)",
        )
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;
        if referenced {
            return Err(AppError::conflict(
                "inventory",
                "Product is committed on existing contracts",
            ));
        }

        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        Ok(())
    }

    /// Get a product by ID
    pub async fn get_product(&self, product_id: Uuid) -> AppResult<Product> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1",
        ))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// List all products
    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name",
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(products)
    }
}
